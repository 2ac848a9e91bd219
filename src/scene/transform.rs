use glam::{Affine3A, EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Rigid transform (translation + rotation) plus a per-axis scale.
///
/// This is the per-bone payload of a [`Pose`](crate::scene::Pose). Whether the
/// values are bone-local or skeleton-global is decided by the caller; the
/// struct itself carries no space tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl ScaledTransform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    /// Helper: rotation from Euler angles (XYZ order, radians).
    #[must_use]
    pub fn from_euler(x: f32, y: f32, z: f32) -> Self {
        Self::from_rotation(Quat::from_euler(EulerRot::XYZ, x, y, z))
    }

    /// Blends towards `other` in place.
    ///
    /// Translation and scale are lerped, rotation is slerped along the
    /// shortest arc.
    pub fn interpolate(&mut self, other: &Self, f: f32) {
        *self = self.lerp(other, f);
    }

    /// Returns the blend between `self` and `other` at factor `f`.
    #[must_use]
    pub fn lerp(&self, other: &Self, f: f32) -> Self {
        Self {
            translation: self.translation.lerp(other.translation, f),
            rotation: self.rotation.slerp(other.rotation, f),
            scale: self.scale.lerp(other.scale, f),
        }
    }

    /// Applies rotation then translation to a point; scale is not involved
    /// in hierarchy composition.
    #[inline]
    #[must_use]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.translation + self.rotation * point
    }

    /// Full TRS matrix, e.g. for skinning.
    #[inline]
    #[must_use]
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Decomposes a matrix back into TRS.
    ///
    /// Shear cannot be represented and is lost.
    #[must_use]
    pub fn from_affine(mat: Affine3A) -> Self {
        let (scale, rotation, translation) = mat.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }
}

impl Default for ScaledTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
