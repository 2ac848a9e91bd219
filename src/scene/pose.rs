use std::fmt;

use crate::scene::skeleton::{BoneHierarchy, BoneId};
use crate::scene::transform::ScaledTransform;
use crate::scene::transform_system;

/// Per-bone transforms of a skeleton, possibly covering only some bones.
///
/// Transforms are stored densely in slots; a sparse table maps bone ids to
/// slots. A bone whose entry is unset, or points past the last slot, has no
/// pose data: reads return `None` and writes are ignored.
///
/// Whether the transforms are local or global is tracked by the caller.
#[derive(Debug, Clone, Default)]
pub struct Pose {
    transforms: Vec<ScaledTransform>,
    bone_to_slot: Vec<Option<usize>>,
}

impl Pose {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A pose with the given slots and no bone mapping yet.
    #[must_use]
    pub fn from_transforms(transforms: Vec<ScaledTransform>) -> Self {
        Self {
            transforms,
            bone_to_slot: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn transforms(&self) -> &[ScaledTransform] {
        &self.transforms
    }

    #[inline]
    pub fn transforms_mut(&mut self) -> &mut [ScaledTransform] {
        &mut self.transforms
    }

    /// Bone id to slot table, indexed by bone id.
    #[inline]
    #[must_use]
    pub fn bone_translation_table(&self) -> &[Option<usize>] {
        &self.bone_to_slot
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Resizes the slot storage; new slots hold the identity transform.
    pub fn set_transform_count(&mut self, count: usize) {
        self.transforms.resize(count, ScaledTransform::IDENTITY);
    }

    /// Binds `bone` to `slot`, growing the table as needed.
    pub fn set_bone_index(&mut self, slot: usize, bone: BoneId) {
        let index = bone as usize;
        if index >= self.bone_to_slot.len() {
            self.bone_to_slot.resize(index + 1, None);
        }
        self.bone_to_slot[index] = Some(slot);
    }

    /// Slot holding `bone`'s transform, if it has pose data.
    #[must_use]
    pub fn slot(&self, bone: BoneId) -> Option<usize> {
        let slot = (*self.bone_to_slot.get(bone as usize)?)?;
        (slot < self.transforms.len()).then_some(slot)
    }

    #[must_use]
    pub fn transform(&self, bone: BoneId) -> Option<&ScaledTransform> {
        self.transforms.get(self.slot(bone)?)
    }

    pub fn transform_mut(&mut self, bone: BoneId) -> Option<&mut ScaledTransform> {
        let slot = self.slot(bone)?;
        self.transforms.get_mut(slot)
    }

    /// Overwrites `bone`'s transform; a no-op for bones without pose data.
    pub fn set_transform(&mut self, bone: BoneId, transform: ScaledTransform) {
        if let Some(t) = self.transform_mut(bone) {
            *t = transform;
        }
    }

    pub fn clear(&mut self) {
        self.transforms.clear();
        self.bone_to_slot.clear();
    }

    /// Blends every bone present in both poses towards `other` by `f`.
    pub fn lerp(&mut self, other: &Pose, f: f32) {
        for bone in 0..self.bone_to_slot.len() {
            let bone = bone as BoneId;
            let (Some(slot), Some(other_slot)) = (self.slot(bone), other.slot(bone)) else {
                continue;
            };
            self.transforms[slot].interpolate(&other.transforms[other_slot], f);
        }
    }

    /// Converts local transforms to global ones.
    pub fn globalize<H: BoneHierarchy + ?Sized>(&mut self, hierarchy: &H) {
        transform_system::globalize(self, hierarchy);
    }

    /// Converts global transforms back to local ones.
    pub fn localize<H: BoneHierarchy + ?Sized>(&mut self, hierarchy: &H) {
        transform_system::localize(self, hierarchy);
    }
}

impl PartialEq for Pose {
    /// Poses compare by their transforms only.
    fn eq(&self, other: &Self) -> bool {
        self.transforms == other.transforms
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mapped = self.bone_to_slot.iter().filter(|s| s.is_some()).count();
        write!(f, "Pose[{} transforms, {} bones mapped]", self.transforms.len(), mapped)
    }
}
