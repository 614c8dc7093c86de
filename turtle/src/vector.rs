// tortuga/turtle/src/vector.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An immutable two-dimensional vector.

use serde_derive::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt::{Display, Formatter, Result as FormatResult};
use std::ops::{Add, Mul, Neg, Sub};

pub const FULL_CIRCLE_RADIANS: f64 = PI * 2.0;

#[inline]
pub fn to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

#[inline]
pub fn to_degrees(radians: f64) -> f64 {
    radians / PI * 180.0
}

/// A point or displacement. Every operation returns a new value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2D {
    pub x: f64,
    pub y: f64,
}

impl Vec2D {
    pub const ZERO: Vec2D = Vec2D { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Vec2D {
        Vec2D { x, y }
    }

    #[inline]
    pub fn add(self, other: Vec2D) -> Vec2D {
        Vec2D::new(self.x + other.x, self.y + other.y)
    }

    #[inline]
    pub fn sub(self, other: Vec2D) -> Vec2D {
        Vec2D::new(self.x - other.x, self.y - other.y)
    }

    /// Elementwise product.
    #[inline]
    pub fn mul(self, other: Vec2D) -> Vec2D {
        Vec2D::new(self.x * other.x, self.y * other.y)
    }

    #[inline]
    pub fn scale(self, factor: f64) -> Vec2D {
        Vec2D::new(self.x * factor, self.y * factor)
    }

    #[inline]
    pub fn abs(self) -> Vec2D {
        Vec2D::new(self.x.abs(), self.y.abs())
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Rotates counter-clockwise by `degrees`.
    pub fn rotate(self, degrees: f64) -> Vec2D {
        let perp = Vec2D::new(-self.y, self.x);
        let (s, c) = to_radians(degrees).sin_cos();
        Vec2D::new(self.x * c + perp.x * s, self.y * c + perp.y * s)
    }

    /// Angle from the positive x axis in radians, in `(-π, π]`.
    ///
    /// Uses the four-quadrant arctangent, so `(-1, 0)` is `π` rather than `0`.
    #[inline]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    #[inline]
    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }

    pub fn approx_eq(self, other: Vec2D, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }
}

impl Add for Vec2D {
    type Output = Vec2D;
    #[inline]
    fn add(self, other: Vec2D) -> Vec2D {
        Vec2D::add(self, other)
    }
}

impl Sub for Vec2D {
    type Output = Vec2D;
    #[inline]
    fn sub(self, other: Vec2D) -> Vec2D {
        Vec2D::sub(self, other)
    }
}

impl Mul<f64> for Vec2D {
    type Output = Vec2D;
    #[inline]
    fn mul(self, factor: f64) -> Vec2D {
        self.scale(factor)
    }
}

impl Neg for Vec2D {
    type Output = Vec2D;
    #[inline]
    fn neg(self) -> Vec2D {
        Vec2D::new(-self.x, -self.y)
    }
}

impl From<(f64, f64)> for Vec2D {
    #[inline]
    fn from((x, y): (f64, f64)) -> Vec2D {
        Vec2D::new(x, y)
    }
}

impl From<[f64; 2]> for Vec2D {
    #[inline]
    fn from([x, y]: [f64; 2]) -> Vec2D {
        Vec2D::new(x, y)
    }
}

impl Display for Vec2D {
    fn fmt(&self, formatter: &mut Formatter) -> FormatResult {
        write!(formatter, "({:.2}, {:.2})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_returns_new_values() {
        let a = Vec2D::new(1.0, -2.0);
        let b = Vec2D::new(3.0, 4.0);
        assert_eq!(a + b, Vec2D::new(4.0, 2.0));
        assert_eq!(a - b, Vec2D::new(-2.0, -6.0));
        assert_eq!(a.mul(b), Vec2D::new(3.0, -8.0));
        assert_eq!(a * 2.0, Vec2D::new(2.0, -4.0));
        assert_eq!(a.abs(), Vec2D::new(1.0, 2.0));
        assert_eq!(-a, Vec2D::new(-1.0, 2.0));
        assert_eq!(a, Vec2D::new(1.0, -2.0));
    }

    #[test]
    fn rotate_is_counter_clockwise() {
        let rotated = Vec2D::new(1.0, 0.0).rotate(90.0);
        assert!(rotated.approx_eq(Vec2D::new(0.0, 1.0), 1e-12));
        let back = rotated.rotate(-90.0);
        assert!(back.approx_eq(Vec2D::new(1.0, 0.0), 1e-12));
    }

    #[test]
    fn angle_covers_all_quadrants() {
        assert!((Vec2D::new(1.0, 1.0).angle() - PI / 4.0).abs() < 1e-12);
        assert!((Vec2D::new(-1.0, 0.0).angle() - PI).abs() < 1e-12);
        assert!((Vec2D::new(-1.0, -1.0).angle() + 3.0 * PI / 4.0).abs() < 1e-12);
        assert!((Vec2D::new(0.0, 1.0).angle() - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn length_is_euclidean() {
        assert_eq!(Vec2D::new(3.0, -4.0).length(), 5.0);
    }
}
