//! Channel sampling benchmarks: sequential playback (pivot hits), random
//! scrubbing (binary search fallback) and the unchecked `ChannelView` path.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use glam::{Quat, Vec3};

use myth_animation::animation::{Channel, InterpolationMode, ValueType};
use myth_animation::scene::{Pose, ScaledTransform, Skeleton};

const SAMPLES: usize = 1024;
const FRAME: f32 = 1.0 / 60.0;

fn vec3_channel(mode: InterpolationMode) -> Channel {
    let mut channel = Channel::new("bone/hip/position", ValueType::Vec3);
    channel.interpolation = mode;
    for i in 0..SAMPLES {
        let t = i as f32 * 0.1;
        channel.add_value(t, Vec3::new(t.sin(), t.cos(), t * 0.01)).unwrap();
    }
    channel
}

fn bench_sequential(c: &mut Criterion) {
    let linear = vec3_channel(InterpolationMode::Linear);
    let cubic = vec3_channel(InterpolationMode::CubicSpline);
    let end = linear.end_time().unwrap();

    c.bench_function("sample_vec3_linear_sequential", |b| {
        b.iter(|| {
            let mut pivot = 0;
            let mut t = 0.0;
            let mut acc = Vec3::ZERO;
            while t < end {
                acc += linear.interpolated_value::<Vec3>(black_box(t), &mut pivot).unwrap();
                t += FRAME;
            }
            acc
        });
    });

    c.bench_function("sample_vec3_cubic_view_sequential", |b| {
        let view = cubic.typed::<Vec3>().unwrap();
        b.iter(|| {
            let mut pivot = 0;
            let mut t = 0.0;
            let mut acc = Vec3::ZERO;
            while t < end {
                acc += view.interpolated_value(black_box(t), &mut pivot);
                t += FRAME;
            }
            acc
        });
    });
}

fn bench_scrubbing(c: &mut Criterion) {
    let channel = vec3_channel(InterpolationMode::Linear);
    let end = channel.end_time().unwrap();
    // Deterministic jumps across the whole range
    let times: Vec<f32> = (0..256).map(|i| ((i * 7919) % 1000) as f32 / 1000.0 * end).collect();

    c.bench_function("sample_vec3_linear_scrub", |b| {
        let view = channel.typed::<Vec3>().unwrap();
        b.iter(|| {
            let mut pivot = 0;
            let mut acc = Vec3::ZERO;
            for &t in &times {
                acc += view.interpolated_value(black_box(t), &mut pivot);
            }
            acc
        });
    });
}

fn bench_pose(c: &mut Criterion) {
    // 64 chains of 8 bones
    let mut skeleton = Skeleton::new("bench");
    for chain in 0..64 {
        let mut parent = None;
        for link in 0..8 {
            parent = Some(skeleton.add_bone(&format!("c{chain}_{link}"), parent).unwrap());
        }
    }
    let count = skeleton.bones().count();
    let mut pose = Pose::from_transforms(
        (0..count)
            .map(|i| ScaledTransform::new(Vec3::X, Quat::from_rotation_z(i as f32 * 0.01), Vec3::ONE))
            .collect(),
    );
    for bone in skeleton.bones() {
        pose.set_bone_index(bone.id as usize, bone.id);
    }

    c.bench_function("pose_globalize_localize_512", |b| {
        b.iter(|| {
            let mut p = pose.clone();
            p.globalize(black_box(&skeleton));
            p.localize(black_box(&skeleton));
            p
        });
    });
}

criterion_group!(benches, bench_sequential, bench_scrubbing, bench_pose);
criterion_main!(benches);
