//! Vector and matrix types used by the conversion pipeline
//!
//! Matrices are row-major with the translation in the last row; points
//! transform as row vectors (`p' = p * M`), so composing "apply A, then B"
//! is written `A * B`.

use serde::{Deserialize, Serialize};

/// 2D vector (UV coordinates, area sizes)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Default for Vec2 {
    fn default() -> Self {
        Self::ZERO
    }
}

/// 3D vector (position, normal, scale)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0, z: 1.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
                z: self.z / len,
            }
        } else {
            Self::ZERO
        }
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

/// 4D vector (quaternion, color with alpha)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 0.0 };
    /// Identity quaternion
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

impl Default for Vec4 {
    fn default() -> Self {
        Self::ZERO
    }
}

/// 4x4 transformation matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat4 {
    pub m: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Create a matrix from four rows
    pub fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        Self { m: rows }
    }

    /// Pure translation matrix
    pub fn from_translation(t: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.m[3][0] = t.x;
        m.m[3][1] = t.y;
        m.m[3][2] = t.z;
        m
    }

    /// Pure scale matrix
    pub fn from_scale(s: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.m[0][0] = s.x;
        m.m[1][1] = s.y;
        m.m[2][2] = s.z;
        m
    }

    /// Pure uniform scale matrix
    pub fn from_uniform_scale(s: f32) -> Self {
        Self::from_scale(Vec3::new(s, s, s))
    }

    /// Rotation matrix from a quaternion (x, y, z, w)
    pub fn from_quat(q: Vec4) -> Self {
        let Vec4 { x, y, z, w } = q;

        let xx = x * x;
        let xy = x * y;
        let xz = x * z;
        let xw = x * w;
        let yy = y * y;
        let yz = y * z;
        let yw = y * w;
        let zz = z * z;
        let zw = z * w;

        Self {
            m: [
                [1.0 - 2.0 * (yy + zz), 2.0 * (xy + zw), 2.0 * (xz - yw), 0.0],
                [2.0 * (xy - zw), 1.0 - 2.0 * (xx + zz), 2.0 * (yz + xw), 0.0],
                [2.0 * (xz + yw), 2.0 * (yz - xw), 1.0 - 2.0 * (xx + yy), 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Matrix product. `a.mul(&b)` applies `a` first, then `b`.
    pub fn mul(&self, other: &Mat4) -> Mat4 {
        let a = &self.m;
        let b = &other.m;
        let mut result = [[0.0f32; 4]; 4];

        for i in 0..4 {
            for j in 0..4 {
                result[i][j] =
                    a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j] + a[i][3] * b[3][j];
            }
        }

        Mat4 { m: result }
    }

    /// Get the translation component
    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.m[3][0], self.m[3][1], self.m[3][2])
    }

    /// Get the per-axis scale (length of each basis row)
    pub fn scale(&self) -> Vec3 {
        Vec3::new(
            Vec3::new(self.m[0][0], self.m[0][1], self.m[0][2]).length(),
            Vec3::new(self.m[1][0], self.m[1][1], self.m[1][2]).length(),
            Vec3::new(self.m[2][0], self.m[2][1], self.m[2][2]).length(),
        )
    }

    /// Invert an affine transform (rotation/scale block plus translation).
    ///
    /// A singular matrix inverts to the identity, mirroring how a
    /// zero-length vector normalizes to zero.
    pub fn affine_inverse(&self) -> Mat4 {
        let m = &self.m;

        // Cofactor inverse of the upper 3x3 block
        let c00 = m[1][1] * m[2][2] - m[1][2] * m[2][1];
        let c01 = m[1][2] * m[2][0] - m[1][0] * m[2][2];
        let c02 = m[1][0] * m[2][1] - m[1][1] * m[2][0];

        let det = m[0][0] * c00 + m[0][1] * c01 + m[0][2] * c02;
        if det.abs() < 1e-12 {
            return Mat4::IDENTITY;
        }
        let inv_det = 1.0 / det;

        let r = [
            [
                c00 * inv_det,
                (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det,
                (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det,
            ],
            [
                c01 * inv_det,
                (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det,
                (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det,
            ],
            [
                c02 * inv_det,
                (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det,
                (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det,
            ],
        ];

        // t' = -t * R^-1
        let t = self.translation();
        let tx = -(t.x * r[0][0] + t.y * r[1][0] + t.z * r[2][0]);
        let ty = -(t.x * r[0][1] + t.y * r[1][1] + t.z * r[2][1]);
        let tz = -(t.x * r[0][2] + t.y * r[1][2] + t.z * r[2][2]);

        Mat4 {
            m: [
                [r[0][0], r[0][1], r[0][2], 0.0],
                [r[1][0], r[1][1], r[1][2], 0.0],
                [r[2][0], r[2][1], r[2][2], 0.0],
                [tx, ty, tz, 1.0],
            ],
        }
    }

    /// Transform a point (row vector times matrix)
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3::new(
            p.x * m[0][0] + p.y * m[1][0] + p.z * m[2][0] + m[3][0],
            p.x * m[0][1] + p.y * m[1][1] + p.z * m[2][1] + m[3][1],
            p.x * m[0][2] + p.y * m[1][2] + p.z * m[2][2] + m[3][2],
        )
    }

    /// Check whether two matrices are equal within a tolerance
    pub fn approx_eq(&self, other: &Mat4, epsilon: f32) -> bool {
        for i in 0..4 {
            for j in 0..4 {
                if (self.m[i][j] - other.m[i][j]).abs() > epsilon {
                    return false;
                }
            }
        }
        true
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let v1 = Vec3::new(1.0, 2.0, 3.0);
        let v2 = Vec3::new(4.0, 5.0, 6.0);

        assert!((v1.dot(&v2) - 32.0).abs() < 0.001);

        let cross = v1.cross(&v2);
        assert!((cross.x - (-3.0)).abs() < 0.001);
        assert!((cross.y - 6.0).abs() < 0.001);
        assert!((cross.z - (-3.0)).abs() < 0.001);
    }

    #[test]
    fn test_identity_multiply() {
        let m = Mat4::IDENTITY.mul(&Mat4::IDENTITY);
        assert!(m.approx_eq(&Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn test_translation_composition() {
        let a = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let b = Mat4::from_translation(Vec3::new(-1.0, 0.5, 0.0));
        let c = a.mul(&b);

        assert_eq!(c.translation(), Vec3::new(0.0, 2.5, 3.0));
    }

    #[test]
    fn test_quat_rotation_z90() {
        // 90 degrees around Z maps the X axis onto the Y axis
        let s = std::f32::consts::FRAC_1_SQRT_2;
        let rot = Mat4::from_quat(Vec4::new(0.0, 0.0, s, s));
        let p = rot.transform_point(Vec3::new(1.0, 0.0, 0.0));

        assert!((p.x - 0.0).abs() < 1e-5);
        assert!((p.y - 1.0).abs() < 1e-5);
        assert!((p.z - 0.0).abs() < 1e-5);
    }

    #[test]
    fn test_affine_inverse_roundtrip() {
        let m = Mat4::from_scale(Vec3::new(2.0, 3.0, 0.5))
            .mul(&Mat4::from_translation(Vec3::new(4.0, -1.0, 7.0)));
        let roundtrip = m.mul(&m.affine_inverse());

        assert!(roundtrip.approx_eq(&Mat4::IDENTITY, 1e-5));
    }

    #[test]
    fn test_affine_inverse_singular() {
        let m = Mat4::from_scale(Vec3::new(0.0, 1.0, 1.0));
        assert!(m.affine_inverse().approx_eq(&Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn test_scale_extraction() {
        let m = Mat4::from_scale(Vec3::new(2.0, 5.0, 0.25));
        let s = m.scale();

        assert!((s.x - 2.0).abs() < 1e-6);
        assert!((s.y - 5.0).abs() < 1e-6);
        assert!((s.z - 0.25).abs() < 1e-6);
    }
}
