// tortuga/turtle/src/transform.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Mapping between turtle world coordinates and device pixels.
//!
//! The world is the user-defined rectangle `(llx, lly)`–`(urx, ury)` with y
//! pointing up. The device is `width × height` pixels whose origin sits in one
//! of four corners, described by a two letter code such as `"TL"`. Both axes
//! are handled independently, and world "up" always renders as screen "up".

use crate::error::{Result, TurtleError};
use crate::vector::Vec2D;
use serde_derive::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FormatResult};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vertical {
    Top,
    Bottom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Horizontal {
    Left,
    Right,
}

/// Where pixel `(0, 0)` lives on the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub vertical: Vertical,
    pub horizontal: Horizontal,
}

impl Origin {
    pub const TOP_LEFT: Origin = Origin {
        vertical: Vertical::Top,
        horizontal: Horizontal::Left,
    };
    pub const BOTTOM_LEFT: Origin = Origin {
        vertical: Vertical::Bottom,
        horizontal: Horizontal::Left,
    };

    /// True when exactly one device axis runs against the world axis, so a
    /// counter-clockwise world rotation appears clockwise on the device.
    pub fn mirrors_rotation(self) -> bool {
        (self.vertical == Vertical::Top) != (self.horizontal == Horizontal::Right)
    }
}

impl Default for Origin {
    fn default() -> Origin {
        Origin::TOP_LEFT
    }
}

impl FromStr for Origin {
    type Err = TurtleError;

    fn from_str(code: &str) -> Result<Origin> {
        let mut chars = code.trim().chars().map(|c| c.to_ascii_uppercase());
        let vertical = match chars.next() {
            Some('T') => Vertical::Top,
            Some('B') => Vertical::Bottom,
            _ => return Err(TurtleError::InvalidArgument(format!("bad origin '{}'", code))),
        };
        let horizontal = match chars.next() {
            Some('L') => Horizontal::Left,
            Some('R') => Horizontal::Right,
            _ => return Err(TurtleError::InvalidArgument(format!("bad origin '{}'", code))),
        };
        if chars.next().is_some() {
            return Err(TurtleError::InvalidArgument(format!("bad origin '{}'", code)));
        }
        Ok(Origin {
            vertical,
            horizontal,
        })
    }
}

impl Display for Origin {
    fn fmt(&self, formatter: &mut Formatter) -> FormatResult {
        let v = match self.vertical {
            Vertical::Top => 'T',
            Vertical::Bottom => 'B',
        };
        let h = match self.horizontal {
            Horizontal::Left => 'L',
            Horizontal::Right => 'R',
        };
        write!(formatter, "{}{}", v, h)
    }
}

/// The visible extent of world coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldWindow {
    pub llx: f64,
    pub lly: f64,
    pub urx: f64,
    pub ury: f64,
}

impl WorldWindow {
    pub fn new(llx: f64, lly: f64, urx: f64, ury: f64) -> Result<WorldWindow> {
        let finite = [llx, lly, urx, ury].iter().all(|v| v.is_finite());
        if !finite {
            return Err(TurtleError::InvalidWorld("coordinates must be finite".to_string()));
        }
        if urx == llx || ury == lly {
            return Err(TurtleError::InvalidWorld(format!(
                "window ({}, {}, {}, {}) has no area",
                llx, lly, urx, ury
            )));
        }
        Ok(WorldWindow { llx, lly, urx, ury })
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.urx - self.llx
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.ury - self.lly
    }
}

impl Default for WorldWindow {
    fn default() -> WorldWindow {
        WorldWindow {
            llx: -100.0,
            lly: -100.0,
            urx: 100.0,
            ury: 100.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceSize {
    pub width: f64,
    pub height: f64,
}

impl DeviceSize {
    #[inline]
    pub fn new(width: f64, height: f64) -> DeviceSize {
        DeviceSize { width, height }
    }
}

pub fn world_to_device(point: Vec2D, window: &WorldWindow, size: DeviceSize, origin: Origin) -> Vec2D {
    let sx = size.width / window.width();
    let sy = size.height / window.height();
    let x = match origin.horizontal {
        Horizontal::Left => sx * (point.x - window.llx),
        Horizontal::Right => sx * (window.urx - point.x),
    };
    let y = match origin.vertical {
        Vertical::Top => sy * (window.ury - point.y),
        Vertical::Bottom => sy * (point.y - window.lly),
    };
    Vec2D::new(x, y)
}

pub fn device_to_world(point: Vec2D, window: &WorldWindow, size: DeviceSize, origin: Origin) -> Vec2D {
    let sx = window.width() / size.width;
    let sy = window.height() / size.height;
    let x = match origin.horizontal {
        Horizontal::Left => window.llx + point.x * sx,
        Horizontal::Right => window.urx - point.x * sx,
    };
    let y = match origin.vertical {
        Vertical::Top => window.ury - point.y * sy,
        Vertical::Bottom => window.lly + point.y * sy,
    };
    Vec2D::new(x, y)
}

/// Scales a displacement; origin offsets and axis directions are ignored.
pub fn world_delta_to_device(delta: Vec2D, window: &WorldWindow, size: DeviceSize) -> Vec2D {
    Vec2D::new(
        delta.x / window.width() * size.width,
        delta.y / window.height() * size.height,
    )
}

pub fn device_delta_to_world(delta: Vec2D, window: &WorldWindow, size: DeviceSize) -> Vec2D {
    Vec2D::new(
        delta.x * window.width() / size.width,
        delta.y * window.height() / size.height,
    )
}

/// The three inputs of the mapping bundled together.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub window: WorldWindow,
    pub size: DeviceSize,
    pub origin: Origin,
}

impl Transform {
    #[inline]
    pub fn to_device(&self, point: Vec2D) -> Vec2D {
        world_to_device(point, &self.window, self.size, self.origin)
    }

    #[inline]
    pub fn to_world(&self, point: Vec2D) -> Vec2D {
        device_to_world(point, &self.window, self.size, self.origin)
    }

    #[inline]
    pub fn delta_to_device(&self, delta: Vec2D) -> Vec2D {
        world_delta_to_device(delta, &self.window, self.size)
    }

    #[inline]
    pub fn delta_to_world(&self, delta: Vec2D) -> Vec2D {
        device_delta_to_world(delta, &self.window, self.size)
    }

    /// Converts a world rotation (radians, counter-clockwise) to the device.
    #[inline]
    pub fn rotation_to_device(&self, radians: f64) -> f64 {
        if self.origin.mirrors_rotation() {
            -radians
        } else {
            radians
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGINS: [&str; 4] = ["TL", "BL", "TR", "BR"];

    fn windows() -> Vec<WorldWindow> {
        vec![
            WorldWindow::default(),
            WorldWindow::new(0.0, 0.0, 640.0, 480.0).unwrap(),
            WorldWindow::new(-3.5, 12.0, 17.25, 40.0).unwrap(),
            WorldWindow::new(10.0, 10.0, -10.0, -10.0).unwrap(),
        ]
    }

    #[test]
    fn world_device_round_trip() {
        let points = [
            Vec2D::new(0.0, 0.0),
            Vec2D::new(100.0, -100.0),
            Vec2D::new(-37.125, 12.5),
            Vec2D::new(1e6, -1e-6),
        ];
        for window in windows() {
            for size in &[DeviceSize::new(400.0, 300.0), DeviceSize::new(1.0, 977.0)] {
                for code in ORIGINS.iter() {
                    let origin: Origin = code.parse().unwrap();
                    for &p in points.iter() {
                        let device = world_to_device(p, &window, *size, origin);
                        let back = device_to_world(device, &window, *size, origin);
                        let tolerance = 1e-9 * p.length().max(1.0);
                        assert!(back.approx_eq(p, tolerance), "{:?} {} {:?}", window, code, p);

                        let delta = world_delta_to_device(p, &window, *size);
                        let delta_back = device_delta_to_world(delta, &window, *size);
                        assert!(delta_back.approx_eq(p, tolerance));
                    }
                }
            }
        }
    }

    #[test]
    fn top_left_device_keeps_world_up() {
        let transform = Transform {
            window: WorldWindow::default(),
            size: DeviceSize::new(200.0, 200.0),
            origin: Origin::TOP_LEFT,
        };
        assert_eq!(transform.to_device(Vec2D::new(0.0, 0.0)), Vec2D::new(100.0, 100.0));
        assert_eq!(transform.to_device(Vec2D::new(-100.0, 100.0)), Vec2D::new(0.0, 0.0));
        assert_eq!(transform.to_device(Vec2D::new(100.0, -100.0)), Vec2D::new(200.0, 200.0));
        assert!(transform.origin.mirrors_rotation());
    }

    #[test]
    fn bottom_and_right_origins_flip_independently() {
        let window = WorldWindow::default();
        let size = DeviceSize::new(200.0, 100.0);
        let p = Vec2D::new(50.0, 50.0);
        assert_eq!(world_to_device(p, &window, size, "BL".parse().unwrap()), Vec2D::new(150.0, 75.0));
        assert_eq!(world_to_device(p, &window, size, "TR".parse().unwrap()), Vec2D::new(50.0, 25.0));
        assert_eq!(world_to_device(p, &window, size, "BR".parse().unwrap()), Vec2D::new(50.0, 75.0));
        assert!(!Origin::BOTTOM_LEFT.mirrors_rotation());
    }

    #[test]
    fn deltas_ignore_offsets() {
        let window = WorldWindow::new(50.0, 50.0, 150.0, 250.0).unwrap();
        let size = DeviceSize::new(400.0, 400.0);
        assert_eq!(world_delta_to_device(Vec2D::new(10.0, 10.0), &window, size), Vec2D::new(40.0, 20.0));
        assert_eq!(device_delta_to_world(Vec2D::new(40.0, 20.0), &window, size), Vec2D::new(10.0, 10.0));
    }

    #[test]
    fn origin_codes() {
        for code in ORIGINS.iter() {
            assert_eq!(code.parse::<Origin>().unwrap().to_string(), *code);
        }
        assert!("XL".parse::<Origin>().is_err());
        assert!("TLX".parse::<Origin>().is_err());
        assert!(WorldWindow::new(0.0, 0.0, 0.0, 10.0).is_err());
    }
}
