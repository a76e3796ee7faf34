//! Transform composition, one function per semantic
//!
//! Every place the pipeline derives a node transform goes through one of
//! these functions, so the order of operations lives in exactly one spot.
//! Matrices are row-major with row-vector points; "apply A, then B" is
//! `A.mul(&B)`.

use bamcraft_core::{Mat4, Vec2, Vec3, Vec4};

/// Transform of an exported object's node relative to its parent node.
///
/// Objects are attached directly under the scene root, so this is the
/// object's world transform.
pub fn object_to_parent(matrix_world: &Mat4) -> Mat4 {
    *matrix_world
}

/// Transform of one particle relative to the emitter node: uniform scale,
/// then orientation, then position, optionally pulled back through the
/// emitter's inverse world transform when the system emits in world space.
pub fn particle_to_parent(
    parent_world_inverse: Option<&Mat4>,
    location: Vec3,
    rotation: Vec4,
    size: f32,
) -> Mat4 {
    let local = Mat4::from_uniform_scale(size)
        .mul(&Mat4::from_quat(rotation))
        .mul(&Mat4::from_translation(location));

    match parent_world_inverse {
        Some(inverse) => local.mul(inverse),
        None => local,
    }
}

/// Billboard override transform: keep the world translation and scale,
/// discard the rotation, and swap the X/Y scale axes with a quarter turn.
/// The authoring tool looks down its X axis where the engine looks down
/// Y; the runtime billboard effect supplies the actual facing rotation.
pub fn billboard_facing(matrix_world: &Mat4) -> Mat4 {
    let t = matrix_world.translation();
    let s = matrix_world.scale();

    Mat4::from_rows([
        [0.0, s.y, 0.0, 0.0],
        [-s.x, 0.0, 0.0, 0.0],
        [0.0, 0.0, s.z, 0.0],
        [t.x, t.y, t.z, 1.0],
    ])
}

/// World-space size of an area light's rectangle: the authored size
/// scaled by the object transform's X/Y scale.
pub fn area_light_size(matrix_world: &Mat4, size: [f32; 2]) -> Vec2 {
    let s = matrix_world.scale();
    Vec2::new(size[0] * s.x, size[1] * s.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_composition_order() {
        // Scale must apply before the translation: a particle of size 2 at
        // (1, 0, 0) places its geometry origin exactly at (1, 0, 0).
        let m = particle_to_parent(None, Vec3::new(1.0, 0.0, 0.0), Vec4::IDENTITY, 2.0);

        assert_eq!(m.translation(), Vec3::new(1.0, 0.0, 0.0));
        let p = m.transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert!((p.x - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_particle_rotation_applies_after_scale() {
        let s = std::f32::consts::FRAC_1_SQRT_2;
        let quat = Vec4::new(0.0, 0.0, s, s); // 90 degrees around Z
        let m = particle_to_parent(None, Vec3::ZERO, quat, 2.0);

        let p = m.transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert!((p.x - 0.0).abs() < 1e-5);
        assert!((p.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_particle_global_mode_cancels_parent() {
        let parent_world = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        let inverse = parent_world.affine_inverse();
        let m = particle_to_parent(Some(&inverse), Vec3::new(10.0, 2.0, 0.0), Vec4::IDENTITY, 1.0);

        // World position (10, 2, 0) lands at (0, 2, 0) in emitter space
        assert_eq!(m.translation(), Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_billboard_swaps_scale_axes() {
        let world = Mat4::from_scale(Vec3::new(2.0, 3.0, 4.0))
            .mul(&Mat4::from_translation(Vec3::new(5.0, 6.0, 7.0)));
        let m = billboard_facing(&world);

        assert_eq!(m.translation(), Vec3::new(5.0, 6.0, 7.0));
        assert_eq!(m.m[0], [0.0, 3.0, 0.0, 0.0]);
        assert_eq!(m.m[1], [-2.0, 0.0, 0.0, 0.0]);
        assert_eq!(m.m[2], [0.0, 0.0, 4.0, 0.0]);
    }

    #[test]
    fn test_billboard_discards_rotation() {
        let s = std::f32::consts::FRAC_1_SQRT_2;
        let world = Mat4::from_quat(Vec4::new(0.0, 0.0, s, s))
            .mul(&Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)));
        let m = billboard_facing(&world);

        // Unit scale survives, the Z rotation does not
        assert!((m.m[0][1] - 1.0).abs() < 1e-5);
        assert!((m.m[1][0] + 1.0).abs() < 1e-5);
        assert_eq!(m.translation(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_area_light_size() {
        let world = Mat4::from_scale(Vec3::new(2.0, 0.5, 1.0));
        let size = area_light_size(&world, [4.0, 4.0]);
        assert!((size.x - 8.0).abs() < 1e-5);
        assert!((size.y - 2.0).abs() < 1e-5);
    }
}
