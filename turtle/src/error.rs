// tortuga/turtle/src/error.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors raised by turtle operations.

use thiserror::Error;

/// Broad classification of a [`TurtleError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A value was rejected (zero stretch, singular matrix, duplicate shape, ...).
    Validation,
    /// A name could not be resolved (shape, color).
    Lookup,
    /// The turtle, its queue or the runtime is gone.
    Lifecycle,
    /// Configuration could not be loaded.
    Config,
}

/// Errors produced by the turtle core.
///
/// The type is `Clone` so that one failed pending result can be observed by
/// every operation chained on it.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TurtleError {
    #[error("stretch_wid/stretch_len must not be zero")]
    ZeroStretch,

    #[error("bad shape transform matrix: must not be singular")]
    SingularTransform,

    #[error("shape with name '{0}' already registered")]
    ShapeExists(String),

    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("invalid world coordinates: {0}")]
    InvalidWorld(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown shape '{0}'")]
    UnknownShape(String),

    #[error("color {0} is not a valid color")]
    UnknownColor(String),

    #[error("command queue has shut down")]
    QueueClosed,

    #[error("no async runtime available: {0}")]
    NoRuntime(String),

    #[error("turtle has been disposed")]
    Disposed,

    #[error("configuration error: {0}")]
    Config(String),
}

impl TurtleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TurtleError::ZeroStretch
            | TurtleError::SingularTransform
            | TurtleError::ShapeExists(_)
            | TurtleError::InvalidShape(_)
            | TurtleError::InvalidWorld(_)
            | TurtleError::InvalidArgument(_) => ErrorKind::Validation,
            TurtleError::UnknownShape(_) | TurtleError::UnknownColor(_) => ErrorKind::Lookup,
            TurtleError::QueueClosed | TurtleError::NoRuntime(_) | TurtleError::Disposed => {
                ErrorKind::Lifecycle
            }
            TurtleError::Config(_) => ErrorKind::Config,
        }
    }

    #[inline]
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    #[inline]
    pub fn is_lookup(&self) -> bool {
        self.kind() == ErrorKind::Lookup
    }
}

pub type Result<T, E = TurtleError> = std::result::Result<T, E>;
