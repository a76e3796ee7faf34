//! Armature (skeleton) source data

use bamcraft_core::Mat4;
use serde::{Deserialize, Serialize};

/// An armature datablock: a flat bone list with parent indices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Armature {
    pub name: String,
    pub bones: Vec<Bone>,
}

impl Armature {
    /// Indices of all bones without a parent
    pub fn root_bones(&self) -> Vec<usize> {
        self.bones
            .iter()
            .enumerate()
            .filter(|(_, b)| b.parent.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of the direct children of a bone
    pub fn children(&self, bone_index: usize) -> Vec<usize> {
        self.bones
            .iter()
            .enumerate()
            .filter(|(_, b)| b.parent == Some(bone_index))
            .map(|(i, _)| i)
            .collect()
    }
}

/// A single bone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    /// Parent bone index; `None` for root bones
    #[serde(default)]
    pub parent: Option<usize>,
    /// Bind-pose transform relative to the armature root
    #[serde(default)]
    pub matrix_bind: Mat4,
}

impl Bone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            matrix_bind: Mat4::IDENTITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_and_children() {
        let mut child = Bone::new("child");
        child.parent = Some(0);
        let armature = Armature {
            name: "rig".into(),
            bones: vec![Bone::new("root"), child],
        };

        assert_eq!(armature.root_bones(), vec![0]);
        assert_eq!(armature.children(0), vec![1]);
        assert!(armature.children(1).is_empty());
    }
}
