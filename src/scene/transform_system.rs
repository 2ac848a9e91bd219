//! Transform System
//!
//! Converts pose transforms between bone-local and skeleton-global space by
//! walking a [`BoneHierarchy`]. Decoupled from [`Pose`] storage so the walkers
//! only borrow what they touch.
//!
//! # Ordering
//!
//! - Globalize: parents before children. An explicit stack carries the
//!   parent's global frame down the tree.
//! - Localize: children before parents. Bones are processed in level-order
//!   batches, deepest level first, so every parent still holds its global
//!   value when its children read it. Bones of one batch never depend on each
//!   other.
//!
//! A bone without pose data is skipped; its children use the nearest posed
//! ancestor's global frame instead (identity if there is none). Both
//! directions apply the same rule, so localize undoes globalize exactly.

use glam::{Quat, Vec3};

use crate::scene::pose::Pose;
use crate::scene::skeleton::{BoneHierarchy, BoneId};

/// Bones grouped by depth; `batches[0]` holds the roots.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LevelOrderBatches {
    pub batches: Vec<Vec<BoneId>>,
}

impl LevelOrderBatches {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties every batch while keeping their allocations.
    pub fn clear(&mut self) {
        for batch in &mut self.batches {
            batch.clear();
        }
    }

    #[must_use]
    pub fn total_bones(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.batches.iter().take_while(|b| !b.is_empty()).count()
    }
}

/// Expands `hierarchy` breadth-first into `output`, reusing its buffers.
///
/// Stops after `bone_count()` levels, which a well-formed forest never
/// reaches.
pub fn build_level_order_batches<H: BoneHierarchy + ?Sized>(hierarchy: &H, output: &mut LevelOrderBatches) {
    output.clear();

    let mut level = 0;
    let mut current: Vec<BoneId> = hierarchy.root_bones().to_vec();

    while !current.is_empty() {
        if level > hierarchy.bone_count() {
            log::warn!("Bone hierarchy deeper than its bone count; cycle suspected, truncating");
            break;
        }

        let mut next = Vec::new();
        for &bone in &current {
            next.extend_from_slice(hierarchy.children(bone));
        }

        if let Some(slot) = output.batches.get_mut(level) {
            *slot = current;
        } else {
            output.batches.push(current);
        }

        current = next;
        level += 1;
    }

    output.batches.truncate(level);
}

/// Rigid frame used as the parent reference during conversion.
#[derive(Clone, Copy)]
struct Frame {
    translation: Vec3,
    rotation: Quat,
}

impl Frame {
    const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };
}

/// Local to global, parents first.
pub fn globalize<H: BoneHierarchy + ?Sized>(pose: &mut Pose, hierarchy: &H) {
    let mut stack: Vec<(BoneId, Frame)> = Vec::with_capacity(64);
    for &root in hierarchy.root_bones().iter().rev() {
        stack.push((root, Frame::IDENTITY));
    }

    let mut visited = 0usize;
    while let Some((bone, parent)) = stack.pop() {
        visited += 1;
        if visited > hierarchy.bone_count() {
            log::warn!("Bone hierarchy visits more bones than it holds; cycle suspected, stopping");
            return;
        }

        let frame = match pose.transform_mut(bone) {
            Some(t) => {
                t.translation = parent.translation + parent.rotation * t.translation;
                t.rotation = parent.rotation * t.rotation;
                Frame {
                    translation: t.translation,
                    rotation: t.rotation,
                }
            }
            // No pose data: hand the parent's frame through.
            None => parent,
        };

        for &child in hierarchy.children(bone).iter().rev() {
            stack.push((child, frame));
        }
    }
}

/// Global to local, deepest level first.
pub fn localize<H: BoneHierarchy + ?Sized>(pose: &mut Pose, hierarchy: &H) {
    let mut batches = LevelOrderBatches::new();
    build_level_order_batches(hierarchy, &mut batches);

    // Roots have no parent frame; their global value is their local value.
    for batch in batches.batches.iter().skip(1).rev() {
        for &bone in batch {
            let Some(parent) = posed_ancestor(pose, hierarchy, bone) else {
                continue;
            };
            let Some(t) = pose.transform_mut(bone) else {
                continue;
            };
            let inv = parent.rotation.inverse();
            t.translation = inv * (t.translation - parent.translation);
            t.rotation = inv * t.rotation;
        }
    }
}

/// Global frame of the closest ancestor of `bone` with pose data.
fn posed_ancestor<H: BoneHierarchy + ?Sized>(pose: &Pose, hierarchy: &H, bone: BoneId) -> Option<Frame> {
    let mut current = hierarchy.parent(bone);
    let mut steps = 0usize;
    while let Some(id) = current {
        if let Some(t) = pose.transform(id) {
            return Some(Frame {
                translation: t.translation,
                rotation: t.rotation,
            });
        }
        steps += 1;
        if steps > hierarchy.bone_count() {
            return None;
        }
        current = hierarchy.parent(id);
    }
    None
}
