use smallvec::SmallVec;

use crate::errors::{AnimationError, Result};
use crate::scene::transform_system::{LevelOrderBatches, build_level_order_batches};

/// Index of a bone inside its hierarchy.
pub type BoneId = u32;

/// Read-only bone tree consumed by pose conversion.
///
/// Implementations must describe a forest: every bone reachable from
/// [`root_bones`](Self::root_bones) exactly once, with `parent` and
/// `children` agreeing. The hierarchy must not change while a pose is being
/// converted against it.
pub trait BoneHierarchy {
    fn root_bones(&self) -> &[BoneId];
    fn parent(&self, bone: BoneId) -> Option<BoneId>;
    /// Children in a stable order. Unknown bones have none.
    fn children(&self, bone: BoneId) -> &[BoneId];
    fn bone_count(&self) -> usize;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bone {
    pub id: BoneId,
    pub name: String,
    pub parent: Option<BoneId>,
    pub children: SmallVec<[BoneId; 4]>,
}

/// Arena of bones addressed by [`BoneId`].
///
/// Bones can only be attached to parents that already exist, so the tree is
/// acyclic by construction.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    pub name: String,
    bones: Vec<Bone>,
    roots: Vec<BoneId>,
}

impl Skeleton {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Appends a bone and returns its id. `parent` must already exist.
    pub fn add_bone(&mut self, name: &str, parent: Option<BoneId>) -> Result<BoneId> {
        let id = self.bones.len() as BoneId;

        match parent {
            Some(parent_id) => {
                let parent_bone = self
                    .bones
                    .get_mut(parent_id as usize)
                    .ok_or(AnimationError::BoneNotFound(parent_id))?;
                parent_bone.children.push(id);
            }
            None => self.roots.push(id),
        }

        self.bones.push(Bone {
            id,
            name: name.to_string(),
            parent,
            children: SmallVec::new(),
        });
        Ok(id)
    }

    #[inline]
    #[must_use]
    pub fn bone(&self, id: BoneId) -> Option<&Bone> {
        self.bones.get(id as usize)
    }

    /// First bone with the given name.
    #[must_use]
    pub fn find_bone(&self, name: &str) -> Option<BoneId> {
        self.bones.iter().find(|b| b.name == name).map(|b| b.id)
    }

    pub fn bones(&self) -> impl Iterator<Item = &Bone> {
        self.bones.iter()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Bones grouped by depth, roots first.
    #[must_use]
    pub fn depth_batches(&self) -> LevelOrderBatches {
        let mut batches = LevelOrderBatches::new();
        build_level_order_batches(self, &mut batches);
        batches
    }
}

impl BoneHierarchy for Skeleton {
    fn root_bones(&self) -> &[BoneId] {
        &self.roots
    }

    fn parent(&self, bone: BoneId) -> Option<BoneId> {
        self.bone(bone)?.parent
    }

    fn children(&self, bone: BoneId) -> &[BoneId] {
        self.bone(bone).map(|b| b.children.as_slice()).unwrap_or_default()
    }

    fn bone_count(&self) -> usize {
        self.bones.len()
    }
}
