// tortuga/turtle/src/config.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Screen and turtle defaults, loadable from TOML.
//!
//! ```toml
//! width = 640
//! height = "auto"
//! mode = "logo"
//! pencolor = "navy"
//! undobuffersize = 0
//! world = [0.0, 0.0, 640.0, 480.0]
//! ```

use crate::canvas::Dimension;
use crate::color::ColorSpec;
use crate::error::{Result, TurtleError};
use crate::shape::DEFAULT_SHAPE;
use crate::state::{Mode, PenState, ResizeMode, Speed, TurtleState};
use crate::transform::{Origin, WorldWindow};
use serde_derive::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A surface dimension as written in a config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeSetting {
    Pixels(f64),
    Named(String),
}

impl SizeSetting {
    pub fn dimension(&self) -> Result<Dimension> {
        match self {
            SizeSetting::Pixels(pixels) if *pixels > 0.0 => Ok(Dimension::Pixels(*pixels)),
            SizeSetting::Named(name) if name == "auto" => Ok(Dimension::Auto),
            other => Err(TurtleError::Config(format!("bad surface size {:?}", other))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TurtleConfig {
    pub width: SizeSetting,
    pub height: SizeSetting,
    pub mode: Mode,
    pub colormode: f64,
    /// Zero disables the undo buffer.
    pub undobuffersize: usize,
    pub shape: String,
    pub pencolor: String,
    pub fillcolor: String,
    pub pensize: f64,
    pub resizemode: ResizeMode,
    pub visible: bool,
    pub speed: f64,
    pub origin: String,
    pub world: Option<[f64; 4]>,
}

impl Default for TurtleConfig {
    fn default() -> TurtleConfig {
        TurtleConfig {
            width: SizeSetting::Pixels(400.0),
            height: SizeSetting::Pixels(400.0),
            mode: Mode::Standard,
            colormode: 255.0,
            undobuffersize: 1000,
            shape: DEFAULT_SHAPE.to_string(),
            pencolor: "black".to_string(),
            fillcolor: "black".to_string(),
            pensize: 1.0,
            resizemode: ResizeMode::NoResize,
            visible: true,
            speed: 0.0,
            origin: "TL".to_string(),
            world: None,
        }
    }
}

impl TurtleConfig {
    pub fn from_toml_str(text: &str) -> Result<TurtleConfig> {
        let config: TurtleConfig = toml::from_str(text).map_err(|err| TurtleError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<TurtleConfig> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|err| TurtleError::Config(format!("{}: {}", path.display(), err)))?;
        TurtleConfig::from_toml_str(&text)
    }

    /// Checks every field by building what it describes.
    pub fn validate(&self) -> Result<()> {
        self.width.dimension()?;
        self.height.dimension()?;
        self.origin()?;
        self.template()?;
        Ok(())
    }

    pub fn origin(&self) -> Result<Origin> {
        self.origin
            .parse()
            .map_err(|err: TurtleError| TurtleError::Config(err.to_string()))
    }

    pub fn window(&self) -> Result<WorldWindow> {
        match self.world {
            Some([llx, lly, urx, ury]) => WorldWindow::new(llx, lly, urx, ury),
            None => Ok(WorldWindow::default()),
        }
    }

    pub fn undo_capacity(&self) -> Option<usize> {
        Some(self.undobuffersize).filter(|&n| n > 0)
    }

    /// The state a new turtle starts from and `reset` returns to.
    pub fn template(&self) -> Result<TurtleState> {
        let bad = |err: TurtleError| TurtleError::Config(err.to_string());
        if self.colormode != 1.0 && self.colormode != 255.0 {
            return Err(TurtleError::Config(format!("colormode must be 1.0 or 255, got {}", self.colormode)));
        }
        if !(self.pensize > 0.0) {
            return Err(TurtleError::Config(format!("pensize must be positive, got {}", self.pensize)));
        }
        let mode = match (self.mode, self.world) {
            (Mode::Standard, Some(_)) => Mode::World,
            (mode, _) => mode,
        };
        let mut state = TurtleState::new(mode);
        state.colormode = self.colormode;
        state.window = self.window().map_err(bad)?;
        state.shape = self.shape.clone();
        state.pen = PenState {
            shown: self.visible,
            pencolor: ColorSpec::from(self.pencolor.as_str()).resolve(self.colormode).map_err(bad)?,
            fillcolor: ColorSpec::from(self.fillcolor.as_str()).resolve(self.colormode).map_err(bad)?,
            pensize: self.pensize,
            speed: Speed::Value(self.speed).level().map_err(bad)?,
            resizemode: self.resizemode,
            ..PenState::default()
        };
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn empty_file_gives_defaults() {
        let config = TurtleConfig::from_toml_str("").unwrap();
        assert_eq!(config, TurtleConfig::default());
        assert_eq!(config.undo_capacity(), Some(1000));
        assert_eq!(config.origin().unwrap(), Origin::TOP_LEFT);
    }

    #[test]
    fn fields_feed_the_template() {
        let config = TurtleConfig::from_toml_str(
            r#"
            width = 640
            height = "auto"
            mode = "logo"
            pencolor = "navy"
            pensize = 3
            undobuffersize = 0
            speed = 4
            origin = "BL"
            "#,
        )
        .unwrap();
        assert_eq!(config.width.dimension().unwrap(), Dimension::Pixels(640.0));
        assert_eq!(config.height.dimension().unwrap(), Dimension::Auto);
        assert_eq!(config.undo_capacity(), None);
        let state = config.template().unwrap();
        assert_eq!(state.mode, Mode::Logo);
        assert_eq!(state.pen.pencolor, Color::rgb(0, 0, 128));
        assert_eq!(state.pen.pensize, 3.0);
        assert_eq!(state.pen.speed, 4);
        assert!((state.heading() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn world_switches_to_world_mode() {
        let config = TurtleConfig::from_toml_str("world = [0.0, 0.0, 640.0, 480.0]").unwrap();
        let state = config.template().unwrap();
        assert_eq!(state.mode, Mode::World);
        assert_eq!(state.window.width(), 640.0);
    }

    #[test]
    fn bad_values_are_config_errors() {
        for text in [
            "colour = \"red\"",
            "pencolor = \"octarine\"",
            "width = \"huge\"",
            "origin = \"XX\"",
            "world = [1.0, 1.0, 1.0, 5.0]",
            "colormode = 100",
        ] {
            let err = TurtleConfig::from_toml_str(text).unwrap_err();
            assert!(matches!(err, TurtleError::Config(_)), "{}: {:?}", text, err);
        }
    }
}
