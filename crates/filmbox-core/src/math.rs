//! Vector and matrix math for scene transforms.
//!
//! Matrices are row-major 4x4 with column-vector convention: a point is
//! transformed as `M * v`, translation lives in the fourth column. Rotations
//! use Euler XYZ order (X applied first), matching FBX's default
//! RotationOrder, so a composed rotation matrix is `Rz * Ry * Rx`.

use std::ops::Mul;

/// A 3-component vector of `f32`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vec3 = Vec3 { x: 1.0, y: 1.0, z: 1.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Component-wise conversion from radians to degrees.
    pub fn to_degrees(self) -> Self {
        Self::new(
            self.x.to_degrees(),
            self.y.to_degrees(),
            self.z.to_degrees(),
        )
    }
}

/// The result of decomposing a transform into its affine parts.
///
/// `rotation` is Euler XYZ in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trs {
    pub scaling: Vec3,
    pub rotation: Vec3,
    pub translation: Vec3,
}

/// A row-major 4x4 transform matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub m: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn new(m: [[f32; 4]; 4]) -> Self {
        Self { m }
    }

    pub fn from_translation(t: Vec3) -> Self {
        let mut out = Self::IDENTITY;
        out.m[0][3] = t.x;
        out.m[1][3] = t.y;
        out.m[2][3] = t.z;
        out
    }

    pub fn from_scaling(s: Vec3) -> Self {
        let mut out = Self::IDENTITY;
        out.m[0][0] = s.x;
        out.m[1][1] = s.y;
        out.m[2][2] = s.z;
        out
    }

    /// Rotation from Euler XYZ angles in radians (`Rz * Ry * Rx`).
    pub fn from_euler_xyz(r: Vec3) -> Self {
        let (sx, cx) = r.x.sin_cos();
        let (sy, cy) = r.y.sin_cos();
        let (sz, cz) = r.z.sin_cos();

        Self::new([
            [cz * cy, cz * sy * sx - sz * cx, cz * sy * cx + sz * sx, 0.0],
            [sz * cy, sz * sy * sx + cz * cx, sz * sy * cx - cz * sx, 0.0],
            [-sy, cy * sx, cy * cx, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.m[0][3], self.m[1][3], self.m[2][3])
    }

    pub fn is_identity(&self) -> bool {
        const EPS: f32 = 1e-6;
        for (r, row) in self.m.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                let expect = if r == c { 1.0 } else { 0.0 };
                if (v - expect).abs() > EPS {
                    return false;
                }
            }
        }
        true
    }

    /// Decompose into scaling, Euler XYZ rotation (radians), and translation.
    ///
    /// Assumes `M = T * R * S` with positive scale factors. A zero scale
    /// component leaves the corresponding rotation column untouched so a
    /// degenerate matrix still decomposes without NaNs.
    pub fn decompose(&self) -> Trs {
        let translation = self.translation();

        let col = |c: usize| Vec3::new(self.m[0][c], self.m[1][c], self.m[2][c]);
        let scaling = Vec3::new(col(0).length(), col(1).length(), col(2).length());

        // Rotation matrix: scale divided out of the upper-left 3x3 columns.
        let mut r = [[0.0f32; 3]; 3];
        let s = [scaling.x, scaling.y, scaling.z];
        for c in 0..3 {
            let inv = if s[c] != 0.0 { 1.0 / s[c] } else { 1.0 };
            for (row, rr) in r.iter_mut().enumerate() {
                rr[c] = self.m[row][c] * inv;
            }
        }

        // Euler XYZ extraction from Rz * Ry * Rx.
        let rotation = if r[2][0].abs() < 1.0 - 1e-6 {
            Vec3::new(
                r[2][1].atan2(r[2][2]),
                (-r[2][0]).asin(),
                r[1][0].atan2(r[0][0]),
            )
        } else {
            // Gimbal lock: pin Z to zero and fold everything into X.
            Vec3::new(
                (-r[0][1]).atan2(r[1][1]),
                if r[2][0] <= -1.0 + 1e-6 {
                    std::f32::consts::FRAC_PI_2
                } else {
                    -std::f32::consts::FRAC_PI_2
                },
                0.0,
            )
        };

        Trs {
            scaling,
            rotation,
            translation,
        }
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut out = [[0.0f32; 4]; 4];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = (0..4).map(|k| self.m[r][k] * rhs.m[k][c]).sum();
            }
        }
        Mat4::new(out)
    }
}
