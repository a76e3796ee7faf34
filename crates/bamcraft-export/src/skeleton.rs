//! Armature to joint hierarchy conversion
//!
//! Walks an armature's bone tree into a [`Character`]: each joint carries
//! its bind transform relative to the parent joint plus the inverse of
//! the full bind transform for skinning.

use bamcraft_core::{Error, Mat4, Result};
use bamcraft_scene::Armature;

use crate::graph::{Character, JointNode};

/// Build a character from an armature's bone tree.
///
/// Bone parent pointers form a tree in well-formed source data; a bone
/// that cannot be reached from any root means the pointers loop, which is
/// treated as corrupted data and fails fast.
pub fn build_character(armature: &Armature) -> Result<Character> {
    let mut visited = vec![false; armature.bones.len()];
    let mut joints = Vec::new();

    for root in armature.root_bones() {
        joints.push(build_joint(armature, root, None, &mut visited)?);
    }

    if let Some(stray) = visited.iter().position(|seen| !seen) {
        return Err(Error::CorruptArmature {
            armature: armature.name.clone(),
            bone: armature.bones[stray].name.clone(),
        });
    }

    Ok(Character {
        name: armature.name.clone(),
        joints,
    })
}

fn build_joint(
    armature: &Armature,
    index: usize,
    parent_bind: Option<&Mat4>,
    visited: &mut [bool],
) -> Result<JointNode> {
    let bone = &armature.bones[index];
    if visited[index] {
        return Err(Error::CorruptArmature {
            armature: armature.name.clone(),
            bone: bone.name.clone(),
        });
    }
    visited[index] = true;

    // Bind matrices are stored relative to the armature root; the joint
    // wants its transform relative to the parent joint
    let transform = match parent_bind {
        Some(parent) => bone.matrix_bind.mul(&parent.affine_inverse()),
        None => bone.matrix_bind,
    };

    let mut children = Vec::new();
    for child in armature.children(index) {
        children.push(build_joint(armature, child, Some(&bone.matrix_bind), visited)?);
    }

    Ok(JointNode {
        name: bone.name.clone(),
        transform,
        inverse_bind: bone.matrix_bind.affine_inverse(),
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bamcraft_core::Vec3;
    use bamcraft_scene::Bone;

    fn two_bone_chain() -> Armature {
        let mut root = Bone::new("hip");
        root.matrix_bind = Mat4::from_translation(Vec3::new(0.0, 0.0, 1.0));
        let mut child = Bone::new("spine");
        child.parent = Some(0);
        child.matrix_bind = Mat4::from_translation(Vec3::new(0.0, 0.0, 3.0));

        Armature {
            name: "rig".into(),
            bones: vec![root, child],
        }
    }

    #[test]
    fn test_child_transform_is_parent_relative() {
        let character = build_character(&two_bone_chain()).unwrap();
        assert_eq!(character.name, "rig");
        assert_eq!(character.joints.len(), 1);

        let hip = &character.joints[0];
        assert_eq!(hip.transform.translation(), Vec3::new(0.0, 0.0, 1.0));

        // The spine sits at z=3 in armature space, so z=2 relative to
        // the hip at z=1
        let spine = &hip.children[0];
        assert_eq!(spine.transform.translation(), Vec3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_inverse_bind_undoes_bind() {
        let character = build_character(&two_bone_chain()).unwrap();
        let spine = &character.joints[0].children[0];

        let bind = Mat4::from_translation(Vec3::new(0.0, 0.0, 3.0));
        let roundtrip = bind.mul(&spine.inverse_bind);
        assert!(roundtrip.approx_eq(&Mat4::IDENTITY, 1e-5));
    }

    #[test]
    fn test_multiple_roots() {
        let armature = Armature {
            name: "rig".into(),
            bones: vec![Bone::new("left"), Bone::new("right")],
        };
        let character = build_character(&armature).unwrap();
        assert_eq!(character.joints.len(), 2);
    }

    #[test]
    fn test_parent_loop_fails() {
        // Bones 1 and 2 point at each other and are unreachable from the
        // root, which must be detected instead of silently dropped
        let mut a = Bone::new("a");
        a.parent = Some(2);
        let mut b = Bone::new("b");
        b.parent = Some(1);
        let armature = Armature {
            name: "broken".into(),
            bones: vec![Bone::new("root"), a, b],
        };

        let err = build_character(&armature).unwrap_err();
        assert!(matches!(err, Error::CorruptArmature { .. }));
    }
}
