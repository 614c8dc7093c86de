// tortuga/turtle/src/lib.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Logo-style turtle graphics.
//!
//! A [`Screen`] owns a drawing [`Surface`] and the turtles on it. Each
//! [`Turtle`] feeds its operations through a single-flight
//! [`CommandQueue`] and answers every call with a [`Pending`] result, so a
//! script can issue a whole drawing up front and await only what it needs.
//! [`RawTurtle`] is the synchronous state machine underneath.

#[macro_use]
extern crate bitflags;

pub mod canvas;
pub mod color;
pub mod config;
pub mod dialog;
pub mod error;
pub mod events;
pub mod pending;
pub mod queue;
pub mod raw;
pub mod recording;
pub mod screen;
pub mod script;
pub mod shape;
pub mod state;
pub mod transform;
pub mod turtle;
pub mod undo;
pub mod vector;

pub use crate::canvas::{Align, Canvas, Dimension, Extent, Font, ItemId, Surface};
pub use crate::color::{Color, ColorSpec};
pub use crate::config::TurtleConfig;
pub use crate::dialog::{Dialog, DialogGuard, NoDialog, NumInput, Reply, ScriptedDialog, TextInput};
pub use crate::error::{ErrorKind, Result, TurtleError};
pub use crate::pending::{Arg, Pending};
pub use crate::queue::CommandQueue;
pub use crate::raw::RawTurtle;
pub use crate::recording::{DisplayItem, RecordingSurface, SceneSnapshot};
pub use crate::screen::Screen;
pub use crate::script::{RunResultFlags, ScriptRun};
pub use crate::shape::Shape;
pub use crate::state::{AngleUnit, Mode, PenSettings, PenState, ResizeMode, Speed};
pub use crate::transform::{Origin, Transform, WorldWindow};
pub use crate::turtle::Turtle;
pub use crate::vector::Vec2D;
