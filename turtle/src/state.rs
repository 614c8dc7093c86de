// tortuga/turtle/src/state.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Plain turtle state and its small vocabulary types.

use crate::color::{Color, ColorSpec};
use crate::error::{Result, TurtleError};
use crate::shape::DEFAULT_SHAPE;
use crate::transform::WorldWindow;
use crate::vector::{Vec2D, FULL_CIRCLE_RADIANS};
use serde_derive::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FormatResult};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Standard,
    World,
    Logo,
}

impl Mode {
    /// Heading vector a fresh turtle faces.
    pub fn start_orientation(self) -> Vec2D {
        match self {
            Mode::Standard | Mode::World => Vec2D::new(1.0, 0.0),
            Mode::Logo => Vec2D::new(0.0, 1.0),
        }
    }

    /// Offset added to reported headings, in fractions of a full circle.
    fn offset_fraction(self) -> f64 {
        match self {
            Mode::Standard | Mode::World => 0.0,
            Mode::Logo => 0.25,
        }
    }

    /// +1 for counter-clockwise headings, -1 for clockwise ones.
    pub fn angle_orient(self) -> f64 {
        match self {
            Mode::Standard | Mode::World => 1.0,
            Mode::Logo => -1.0,
        }
    }

    pub fn angle_offset(self, unit: AngleUnit) -> f64 {
        self.offset_fraction() * unit.full_circle()
    }
}

impl FromStr for Mode {
    type Err = TurtleError;

    fn from_str(name: &str) -> Result<Mode> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Mode::Standard),
            "world" => Ok(Mode::World),
            "logo" => Ok(Mode::Logo),
            _ => Err(TurtleError::InvalidArgument(format!("no turtle-graphics mode '{}'", name))),
        }
    }
}

impl Display for Mode {
    fn fmt(&self, formatter: &mut Formatter) -> FormatResult {
        formatter.write_str(match self {
            Mode::Standard => "standard",
            Mode::World => "world",
            Mode::Logo => "logo",
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AngleUnit {
    #[default]
    Degrees,
    Radians,
}

impl AngleUnit {
    pub fn full_circle(self) -> f64 {
        match self {
            AngleUnit::Degrees => 360.0,
            AngleUnit::Radians => FULL_CIRCLE_RADIANS,
        }
    }

    pub fn degrees_per_unit(self) -> f64 {
        360.0 / self.full_circle()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    Auto,
    User,
    #[default]
    NoResize,
}

impl FromStr for ResizeMode {
    type Err = TurtleError;

    fn from_str(name: &str) -> Result<ResizeMode> {
        match name.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ResizeMode::Auto),
            "user" => Ok(ResizeMode::User),
            "noresize" => Ok(ResizeMode::NoResize),
            _ => Err(TurtleError::InvalidArgument(format!("no resize mode '{}'", name))),
        }
    }
}

impl Display for ResizeMode {
    fn fmt(&self, formatter: &mut Formatter) -> FormatResult {
        formatter.write_str(match self {
            ResizeMode::Auto => "auto",
            ResizeMode::User => "user",
            ResizeMode::NoResize => "noresize",
        })
    }
}

/// A requested animation speed.
#[derive(Clone, Debug, PartialEq)]
pub enum Speed {
    Value(f64),
    Name(String),
}

impl Speed {
    /// Resolves to the 0..=10 scale. Numbers outside 0.5..=10.5 mean 0.
    pub fn level(&self) -> Result<u8> {
        match self {
            Speed::Value(value) => {
                if (0.5..=10.5).contains(value) {
                    Ok(value.round() as u8)
                } else {
                    Ok(0)
                }
            }
            Speed::Name(name) => match name.trim().to_ascii_lowercase().as_str() {
                "fastest" => Ok(0),
                "fast" => Ok(10),
                "normal" => Ok(6),
                "slow" => Ok(3),
                "slowest" => Ok(1),
                _ => Err(TurtleError::InvalidArgument(format!("unknown speed '{}'", name))),
            },
        }
    }
}

impl From<f64> for Speed {
    fn from(value: f64) -> Speed {
        Speed::Value(value)
    }
}

impl From<i32> for Speed {
    fn from(value: i32) -> Speed {
        Speed::Value(value as f64)
    }
}

impl From<&str> for Speed {
    fn from(name: &str) -> Speed {
        Speed::Name(name.to_string())
    }
}

/// Snapshot of the pen and appearance attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PenState {
    pub shown: bool,
    pub pendown: bool,
    pub pencolor: Color,
    pub fillcolor: Color,
    pub pensize: f64,
    pub speed: u8,
    pub resizemode: ResizeMode,
    /// `(stretch_wid, stretch_len)`.
    pub stretchfactor: (f64, f64),
    pub outline: f64,
    pub shearfactor: f64,
    /// Radians.
    pub tilt: f64,
}

impl Default for PenState {
    fn default() -> PenState {
        PenState {
            shown: true,
            pendown: true,
            pencolor: Color::BLACK,
            fillcolor: Color::BLACK,
            pensize: 1.0,
            speed: 0,
            resizemode: ResizeMode::default(),
            stretchfactor: (1.0, 1.0),
            outline: 1.0,
            shearfactor: 0.0,
            tilt: 0.0,
        }
    }
}

/// A partial pen update for `RawTurtle::pen`. Unset fields are left alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PenSettings {
    pub shown: Option<bool>,
    pub pendown: Option<bool>,
    pub pencolor: Option<ColorSpec>,
    pub fillcolor: Option<ColorSpec>,
    pub pensize: Option<f64>,
    pub speed: Option<Speed>,
    pub resizemode: Option<ResizeMode>,
    pub stretchfactor: Option<(f64, f64)>,
    pub outline: Option<f64>,
    pub shearfactor: Option<f64>,
    pub tilt: Option<f64>,
}

/// Everything a turtle knows about itself, minus its collaborators.
#[derive(Clone, Debug, PartialEq)]
pub struct TurtleState {
    pub position: Vec2D,
    /// Counter-clockwise degrees from +x, in `[0, 360)`.
    pub orient: f64,
    pub pen: PenState,
    pub shape: String,
    pub mode: Mode,
    pub angle_unit: AngleUnit,
    pub colormode: f64,
    pub window: WorldWindow,
    pub filling: bool,
    pub fill_path: Vec<Vec2D>,
    pub poly: Option<Vec<Vec2D>>,
    pub creating_poly: bool,
}

impl TurtleState {
    pub fn new(mode: Mode) -> TurtleState {
        TurtleState {
            position: Vec2D::ZERO,
            orient: normalize_degrees(mode.start_orientation().angle().to_degrees()),
            pen: PenState::default(),
            shape: DEFAULT_SHAPE.to_string(),
            mode,
            angle_unit: AngleUnit::default(),
            colormode: 255.0,
            window: WorldWindow::default(),
            filling: false,
            fill_path: Vec::new(),
            poly: None,
            creating_poly: false,
        }
    }

    /// Heading in the current unit and mode convention.
    pub fn heading(&self) -> f64 {
        let unit = self.angle_unit;
        let full = unit.full_circle();
        let heading =
            self.mode.angle_offset(unit) + self.mode.angle_orient() * self.orient / unit.degrees_per_unit();
        normalize(heading, full)
    }

    /// Sets the internal orientation from a heading in the current convention.
    pub fn set_heading(&mut self, heading: f64) {
        let unit = self.angle_unit;
        let user = self.mode.angle_orient() * (heading - self.mode.angle_offset(unit));
        self.orient = normalize_degrees(user * unit.degrees_per_unit());
    }

    /// Rotates counter-clockwise by `angle` in the current unit.
    pub fn rotate(&mut self, angle: f64) {
        self.orient = normalize_degrees(self.orient + angle * self.angle_unit.degrees_per_unit());
    }

    pub fn orientation(&self) -> Vec2D {
        Vec2D::new(1.0, 0.0).rotate(self.orient)
    }
}

impl Default for TurtleState {
    fn default() -> TurtleState {
        TurtleState::new(Mode::default())
    }
}

/// Reduces `value` into `[0, full)`, never yielding `-0.0` or `full`.
pub fn normalize(value: f64, full: f64) -> f64 {
    let normalized = value.rem_euclid(full);
    // rem_euclid may round up to the modulus itself for tiny negatives
    if normalized >= full {
        0.0
    } else {
        normalized + 0.0
    }
}

pub fn normalize_degrees(degrees: f64) -> f64 {
    normalize(degrees, 360.0)
}
