// tortuga/turtle/src/canvas.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The rendering collaborator.
//!
//! A [`Surface`] is the shared drawing area. Every turtle binds its own
//! [`Canvas`] to it: the binding is the turtle's pen identity and owns a
//! private shape namespace, while everything it draws lands on the shared
//! surface. All coordinates crossing this boundary are device pixels.

use crate::color::Color;
use crate::error::Result;
use crate::shape::Shape;
use crate::transform::Origin;
use crate::vector::Vec2D;
use serde_derive::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

/// Placement of a shape on the device.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub at: Vec2D,
    /// Device rotation in radians.
    pub rotation: f64,
    pub scale: Vec2D,
    pub shear: f64,
    pub visible: bool,
}

impl Default for Pose {
    fn default() -> Pose {
        Pose {
            at: Vec2D::ZERO,
            rotation: 0.0,
            scale: Vec2D::new(1.0, 1.0),
            shear: 0.0,
            visible: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapeUpdate {
    pub pose: Option<Pose>,
    /// Name of a registered shape to show instead.
    pub appearance: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShapeOptions {
    /// Protected shapes are never forgotten by [`Canvas::clear`].
    pub protected: bool,
}

/// Rendered size in device pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub w: f64,
    pub h: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Default for Align {
    fn default() -> Align {
        Align::Left
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: f64,
    pub style: String,
}

impl Default for Font {
    fn default() -> Font {
        Font {
            family: "Arial".to_string(),
            size: 8.0,
            style: "normal".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub align: Align,
    pub font: Font,
    pub color: Color,
}

/// A surface dimension: fixed pixels, or tracking the host container.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Dimension {
    Pixels(f64),
    Auto,
}

pub trait Canvas: Send {
    fn line(&mut self, from: Vec2D, to: Vec2D, stroke: Stroke) -> Extent;
    fn circle(&mut self, center: Vec2D, radius: f64, color: Color, filled: bool) -> Extent;
    fn polygon(&mut self, points: &[Vec2D], fill: Color) -> Extent;

    /// Places a copy of a registered shape.
    fn draw_shape(&mut self, name: &str, pose: Pose) -> Result<ItemId>;
    fn modify_shape(&mut self, id: ItemId, update: ShapeUpdate) -> Result<()>;
    fn remove_shape(&mut self, id: ItemId);

    fn register_shape(&mut self, name: &str, shape: Arc<Shape>, options: ShapeOptions) -> Result<()>;
    fn unregister_shape(&mut self, name: &str) -> bool;
    fn shape(&self, name: &str) -> Option<Arc<Shape>>;
    fn has_shape(&self, name: &str) -> bool {
        self.shape(name).is_some()
    }
    fn shape_names(&self) -> Vec<String>;

    /// Removes everything this pen drew. With `forget_shapes` its
    /// unprotected shapes are unregistered as well.
    fn clear(&mut self, forget_shapes: bool);

    fn write(&mut self, at: Vec2D, text: &str, style: &TextStyle) -> Extent;

    fn bgcolor(&mut self, color: Color);
    fn bgpic(&mut self, picture: Option<&str>);

    fn width(&self) -> f64;
    fn height(&self) -> f64;
    fn set_width(&mut self, width: Dimension);
    fn set_height(&mut self, height: Dimension);

    /// Where the device origin is.
    fn x0y0(&self) -> Origin;
}

pub trait Surface: Send + Sync {
    /// Creates the canvas for a new pen identity.
    fn bind(&self, pen: &str) -> Box<dyn Canvas>;

    /// Drops every item and restores the default background.
    fn reset(&self);
}
