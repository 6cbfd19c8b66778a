// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 4×4 transform matrices for transform propagation.
//!
//! [`Transform3d`] stores its sixteen scalars column-major, which is the layout
//! draw commands forward verbatim to DOM `matrix3d()` and WebGL uniforms.
//! Composition is plain matrix multiplication: `parent * local` maps the
//! local frame into the parent's frame.

use core::ops::Mul;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// A column-major 4×4 matrix.
///
/// Element `(row, col)` lives at index `col * 4 + row`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    m: [f64; 16],
}

impl Transform3d {
    /// The identity matrix.
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Creates a matrix from sixteen column-major scalars.
    #[inline]
    #[must_use]
    pub const fn from_cols_array(m: [f64; 16]) -> Self {
        Self { m }
    }

    /// Returns the sixteen column-major scalars.
    #[inline]
    #[must_use]
    pub const fn to_cols_array(&self) -> [f64; 16] {
        self.m
    }

    /// Returns the element at `row`, `col`.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is 4 or more.
    #[inline]
    #[must_use]
    pub const fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < 4 && col < 4, "matrix index out of range");
        self.m[col * 4 + row]
    }

    /// Returns the translation part (the first three rows of the last column).
    #[inline]
    #[must_use]
    pub const fn translation(&self) -> [f64; 3] {
        [self.m[12], self.m[13], self.m[14]]
    }

    /// Creates a translation.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        let mut m = Self::IDENTITY.m;
        m[12] = x;
        m[13] = y;
        m[14] = z;
        Self { m }
    }

    /// Creates a non-uniform scale.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        let mut m = Self::IDENTITY.m;
        m[0] = sx;
        m[5] = sy;
        m[10] = sz;
        Self { m }
    }

    /// Creates a rotation about the Z axis, in radians.
    #[must_use]
    pub fn from_rotation_z(radians: f64) -> Self {
        #[cfg(feature = "std")]
        let (s, c) = radians.sin_cos();
        #[cfg(not(feature = "std"))]
        let (s, c) = (radians.sin(), radians.cos());
        let mut m = Self::IDENTITY.m;
        m[0] = c;
        m[1] = s;
        m[4] = -s;
        m[5] = c;
        Self { m }
    }

    /// Embeds a 2-D affine transform in the XY plane.
    #[must_use]
    pub fn from_affine(affine: kurbo::Affine) -> Self {
        let [a, b, c, d, e, f] = affine.as_coeffs();
        Self {
            m: [
                a, b, 0.0, 0.0, //
                c, d, 0.0, 0.0, //
                0.0, 0.0, 1.0, 0.0, //
                e, f, 0.0, 1.0,
            ],
        }
    }

    /// Returns `true` if every element is finite.
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.m.iter().all(|v| v.is_finite())
    }

    /// Returns `true` if any element is NaN.
    #[inline]
    #[must_use]
    pub fn is_nan(&self) -> bool {
        self.m.iter().any(|v| v.is_nan())
    }

    /// Returns `true` if every element differs from `other`'s by at most
    /// `epsilon`.
    #[must_use]
    pub fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.m
            .iter()
            .zip(other.m.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut m = [0.0_f64; 16];
        for col in 0..4 {
            for row in 0..4 {
                m[col * 4 + row] = (0..4)
                    .map(|k| self.m[k * 4 + row] * rhs.m[col * 4 + k])
                    .sum();
            }
        }
        Self { m }
    }
}
