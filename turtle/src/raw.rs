// tortuga/turtle/src/raw.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The synchronous turtle state machine.
//!
//! `RawTurtle` owns one pen's state and canvas binding. Every method runs to
//! completion immediately; the queued [`crate::Turtle`] handle sequences
//! calls to it.

use crate::canvas::{
    Align, Canvas, Extent, Font, ItemId, Pose, ShapeOptions, ShapeUpdate, Stroke, TextStyle,
};
use crate::color::{Color, ColorSpec};
use crate::error::{Result, TurtleError};
use crate::events::{Dispatch, PointerAction, PointerCallback, PointerEvent, PointerListeners};
use crate::shape::{builtin_shapes, Shape};
use crate::state::{
    normalize, normalize_degrees, AngleUnit, Mode, PenSettings, PenState, ResizeMode, Speed,
    TurtleState,
};
use crate::transform::{DeviceSize, Transform, WorldWindow};
use crate::undo::{UndoBuffer, UndoEntry};
use crate::vector::{to_degrees, to_radians, Vec2D, FULL_CIRCLE_RADIANS};
use tracing::{debug, warn};

pub struct RawTurtle {
    pen: String,
    canvas: Box<dyn Canvas>,
    state: TurtleState,
    template: TurtleState,
    undo: UndoBuffer,
    stamps: Vec<ItemId>,
    marker: Option<ItemId>,
    listeners: PointerListeners,
}

impl RawTurtle {
    /// Binds a new turtle to `canvas`. `template` supplies the state that
    /// `reset` restores.
    pub fn new(
        pen: impl Into<String>,
        mut canvas: Box<dyn Canvas>,
        template: TurtleState,
        undo_capacity: Option<usize>,
    ) -> Result<RawTurtle> {
        for (name, shape) in builtin_shapes() {
            if !canvas.has_shape(name) {
                canvas.register_shape(name, shape, ShapeOptions { protected: true })?;
            }
        }
        if !canvas.has_shape(&template.shape) {
            return Err(TurtleError::UnknownShape(template.shape.clone()));
        }
        let mut turtle = RawTurtle {
            pen: pen.into(),
            canvas,
            state: template.clone(),
            template,
            undo: UndoBuffer::new(undo_capacity),
            stamps: Vec::new(),
            marker: None,
            listeners: PointerListeners::default(),
        };
        turtle.sync_marker()?;
        Ok(turtle)
    }

    /// A new turtle on `canvas` with a copy of this one's state and shapes.
    pub fn duplicate(&self, pen: impl Into<String>, mut canvas: Box<dyn Canvas>) -> Result<RawTurtle> {
        for name in self.canvas.shape_names() {
            if canvas.has_shape(&name) {
                continue;
            }
            if let Some(shape) = self.canvas.shape(&name) {
                canvas.register_shape(&name, shape, ShapeOptions::default())?;
            }
        }
        let mut twin = RawTurtle::new(pen, canvas, self.template.clone(), self.undo.capacity())?;
        twin.state = self.state.clone();
        twin.sync_marker()?;
        Ok(twin)
    }

    pub fn pen_id(&self) -> &str {
        &self.pen
    }

    pub fn state(&self) -> &TurtleState {
        &self.state
    }

    pub(crate) fn canvas_mut(&mut self) -> &mut dyn Canvas {
        self.canvas.as_mut()
    }

    /// Runs a mutating operation and records it in the undo buffer when it
    /// succeeds.
    pub fn apply<T>(&mut self, op: &'static str, f: impl FnOnce(&mut RawTurtle) -> Result<T>) -> Result<T> {
        let value = f(self)?;
        self.undo.push(UndoEntry { op });
        Ok(value)
    }

    pub fn transform(&self) -> Transform {
        Transform {
            window: self.state.window,
            size: DeviceSize::new(self.canvas.width(), self.canvas.height()),
            origin: self.canvas.x0y0(),
        }
    }

    fn full_circle(&self) -> f64 {
        self.state.angle_unit.full_circle()
    }

    fn degrees_per_unit(&self) -> f64 {
        self.state.angle_unit.degrees_per_unit()
    }

    fn resolve_color(&self, spec: &ColorSpec) -> Result<Color> {
        spec.resolve(self.state.colormode)
    }

    // Motion

    /// Applies a positional change, drawing the trail when the pen is down.
    fn motion(&mut self, change: impl FnOnce(&mut TurtleState)) -> Result<()> {
        let before = self.state.position;
        change(&mut self.state);
        let after = self.state.position;
        if after != before {
            if self.state.pen.pendown {
                let transform = self.transform();
                let stroke = Stroke {
                    color: self.state.pen.pencolor,
                    width: self.state.pen.pensize,
                };
                self.canvas
                    .line(transform.to_device(before), transform.to_device(after), stroke);
            }
            if self.state.filling {
                self.state.fill_path.push(after);
            }
            if self.state.creating_poly {
                if let Some(poly) = self.state.poly.as_mut() {
                    poly.push(after);
                }
            }
        }
        self.sync_marker()
    }

    pub fn forward(&mut self, distance: f64) -> Result<()> {
        let step = self.state.orientation().scale(distance);
        self.motion(|state| state.position = state.position + step)
    }

    pub fn backward(&mut self, distance: f64) -> Result<()> {
        self.forward(-distance)
    }

    pub fn left(&mut self, angle: f64) -> Result<()> {
        self.motion(|state| state.rotate(angle))
    }

    pub fn right(&mut self, angle: f64) -> Result<()> {
        self.left(-angle)
    }

    pub fn goto(&mut self, x: f64, y: f64) -> Result<()> {
        self.motion(|state| state.position = Vec2D::new(x, y))
    }

    pub fn setx(&mut self, x: f64) -> Result<()> {
        self.motion(|state| state.position.x = x)
    }

    pub fn sety(&mut self, y: f64) -> Result<()> {
        self.motion(|state| state.position.y = y)
    }

    pub fn setheading(&mut self, heading: f64) -> Result<()> {
        self.motion(|state| state.set_heading(heading))
    }

    pub fn home(&mut self) -> Result<()> {
        self.motion(|state| {
            state.position = Vec2D::ZERO;
            state.set_heading(0.0);
        })
    }

    /// The default number of chords for an arc.
    pub fn circle_steps(&self, radius: f64, extent: f64) -> u32 {
        let frac = extent.abs() / self.full_circle();
        1 + ((11.0 + radius.abs() / 6.0).min(59.0) * frac).floor() as u32
    }

    /// Approximates an arc with `steps` chords, centred `radius` units to
    /// the left. Negative radii curve to the right.
    pub fn circle(&mut self, radius: f64, extent: Option<f64>, steps: Option<u32>) -> Result<()> {
        let extent = extent.unwrap_or_else(|| self.full_circle());
        let steps = steps
            .filter(|&n| n > 0)
            .unwrap_or_else(|| self.circle_steps(radius, extent));
        // half the turn per chord
        let mut w2 = 0.5 * extent / steps as f64;
        let mut l = 2.0 * radius * to_radians(w2 * self.degrees_per_unit()).sin();
        if radius < 0.0 {
            l = -l;
            w2 = -w2;
        }
        for _ in 0..steps {
            self.state.rotate(w2);
            self.forward(l)?;
            self.state.rotate(w2);
        }
        self.sync_marker()
    }

    /// Draws a filled circle of diameter `size` pixels at the turtle.
    pub fn dot(&mut self, size: Option<f64>, color: Option<ColorSpec>) -> Result<()> {
        let pensize = self.state.pen.pensize;
        let size = size.unwrap_or_else(|| (pensize + 4.0).max(2.0 * pensize));
        let color = match color {
            Some(spec) => self.resolve_color(&spec)?,
            None => self.state.pen.pencolor,
        };
        let at = self.transform().to_device(self.state.position);
        self.canvas.circle(at, size / 2.0, color, true);
        Ok(())
    }

    pub fn stamp(&mut self) -> Result<ItemId> {
        let pose = self.pose();
        let id = self.canvas.draw_shape(&self.state.shape, pose)?;
        self.stamps.push(id);
        Ok(id)
    }

    pub fn stamps(&self) -> &[ItemId] {
        &self.stamps
    }

    pub fn clearstamp(&mut self, id: ItemId) {
        match self.stamps.iter().position(|stamp| *stamp == id) {
            Some(index) => {
                self.stamps.remove(index);
                self.canvas.remove_shape(id);
            }
            None => debug!("{}: no stamp {:?}", self.pen, id),
        }
    }

    /// `None` clears every stamp, `n >= 0` the oldest `n`, `n < 0` the
    /// newest `|n|`.
    pub fn clearstamps(&mut self, n: Option<i64>) {
        let count = self.stamps.len();
        let range = match n {
            None => 0..count,
            Some(n) if n >= 0 => 0..(n as usize).min(count),
            Some(n) => count.saturating_sub(n.unsigned_abs() as usize)..count,
        };
        let removed: Vec<ItemId> = self.stamps.drain(range).collect();
        for id in removed {
            self.canvas.remove_shape(id);
        }
    }

    /// Undo replay is not supported; history is only recorded.
    pub fn undo(&mut self) {
        warn!(
            "{}: undo is not supported ({} entries recorded)",
            self.pen,
            self.undo.len()
        );
    }

    pub fn speed(&self) -> u8 {
        self.state.pen.speed
    }

    pub fn set_speed(&mut self, speed: Speed) -> Result<()> {
        self.state.pen.speed = speed.level()?;
        Ok(())
    }

    // Queries

    pub fn position(&self) -> Vec2D {
        self.state.position
    }

    pub fn xcor(&self) -> f64 {
        self.state.position.x
    }

    pub fn ycor(&self) -> f64 {
        self.state.position.y
    }

    pub fn heading(&self) -> f64 {
        self.state.heading()
    }

    /// Heading from the turtle to `(x, y)` in the current convention.
    pub fn towards(&self, x: f64, y: f64) -> f64 {
        let delta = Vec2D::new(x, y) - self.state.position;
        let degrees = normalize_degrees(to_degrees(delta.angle()));
        let unit = self.state.angle_unit;
        let mode = self.state.mode;
        normalize(
            mode.angle_offset(unit) + mode.angle_orient() * degrees / unit.degrees_per_unit(),
            unit.full_circle(),
        )
    }

    pub fn distance(&self, x: f64, y: f64) -> f64 {
        (Vec2D::new(x, y) - self.state.position).length()
    }

    // Settings

    pub fn degrees(&mut self) {
        self.state.angle_unit = AngleUnit::Degrees;
    }

    pub fn radians(&mut self) {
        self.state.angle_unit = AngleUnit::Radians;
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Switches mode and turns the turtle to the mode's start orientation.
    pub fn set_mode(&mut self, mode: Mode) -> Result<()> {
        self.state.mode = mode;
        self.template.mode = mode;
        self.state.orient = normalize_degrees(to_degrees(mode.start_orientation().angle()));
        self.sync_marker()
    }

    pub fn setworldcoordinates(&mut self, llx: f64, lly: f64, urx: f64, ury: f64) -> Result<()> {
        let window = WorldWindow::new(llx, lly, urx, ury)?;
        if self.state.mode != Mode::World {
            self.state.mode = Mode::World;
            self.template.mode = Mode::World;
        }
        self.state.window = window;
        self.sync_marker()
    }

    pub fn colormode(&self) -> f64 {
        self.state.colormode
    }

    pub fn set_colormode(&mut self, colormode: f64) -> Result<()> {
        if colormode != 1.0 && colormode != 255.0 {
            return Err(TurtleError::InvalidArgument(format!(
                "colormode must be 1.0 or 255, got {}",
                colormode
            )));
        }
        self.state.colormode = colormode;
        Ok(())
    }

    // Pen

    pub fn pendown(&mut self) {
        self.state.pen.pendown = true;
    }

    pub fn penup(&mut self) {
        self.state.pen.pendown = false;
    }

    pub fn isdown(&self) -> bool {
        self.state.pen.pendown
    }

    pub fn pensize(&self) -> f64 {
        self.state.pen.pensize
    }

    pub fn set_pensize(&mut self, width: f64) -> Result<()> {
        self.state.pen.pensize = check_positive("pensize", width)?;
        self.sync_marker()
    }

    pub fn pencolor(&self) -> Color {
        self.state.pen.pencolor
    }

    pub fn set_pencolor(&mut self, color: ColorSpec) -> Result<()> {
        self.state.pen.pencolor = self.resolve_color(&color)?;
        Ok(())
    }

    pub fn fillcolor(&self) -> Color {
        self.state.pen.fillcolor
    }

    pub fn set_fillcolor(&mut self, color: ColorSpec) -> Result<()> {
        self.state.pen.fillcolor = self.resolve_color(&color)?;
        Ok(())
    }

    /// `(pencolor, fillcolor)`.
    pub fn color(&self) -> (Color, Color) {
        (self.state.pen.pencolor, self.state.pen.fillcolor)
    }

    pub fn set_color(&mut self, pen: ColorSpec, fill: ColorSpec) -> Result<()> {
        let (pen, fill) = (self.resolve_color(&pen)?, self.resolve_color(&fill)?);
        self.state.pen.pencolor = pen;
        self.state.pen.fillcolor = fill;
        Ok(())
    }

    /// Applies every field set in `settings`, or none of them if any is
    /// invalid, and returns the resulting pen.
    pub fn pen(&mut self, settings: PenSettings) -> Result<PenState> {
        let mut pen = self.state.pen.clone();
        if let Some(shown) = settings.shown {
            pen.shown = shown;
        }
        if let Some(pendown) = settings.pendown {
            pen.pendown = pendown;
        }
        if let Some(spec) = &settings.pencolor {
            pen.pencolor = self.resolve_color(spec)?;
        }
        if let Some(spec) = &settings.fillcolor {
            pen.fillcolor = self.resolve_color(spec)?;
        }
        if let Some(size) = settings.pensize {
            pen.pensize = check_positive("pensize", size)?;
        }
        if let Some(speed) = &settings.speed {
            pen.speed = speed.level()?;
        }
        if let Some(mode) = settings.resizemode {
            pen.resizemode = mode;
        }
        if let Some((wid, len)) = settings.stretchfactor {
            if wid == 0.0 || len == 0.0 {
                return Err(TurtleError::ZeroStretch);
            }
            pen.stretchfactor = (wid, len);
        }
        if let Some(outline) = settings.outline {
            pen.outline = check_positive("outline", outline)?;
        }
        if let Some(shear) = settings.shearfactor {
            pen.shearfactor = shear;
        }
        if let Some(tilt) = settings.tilt {
            pen.tilt = tilt;
        }
        self.state.pen = pen;
        self.sync_marker()?;
        Ok(self.state.pen.clone())
    }

    pub fn showturtle(&mut self) -> Result<()> {
        self.state.pen.shown = true;
        self.sync_marker()
    }

    pub fn hideturtle(&mut self) -> Result<()> {
        self.state.pen.shown = false;
        self.sync_marker()
    }

    pub fn isvisible(&self) -> bool {
        self.state.pen.shown
    }

    // Filling

    pub fn filling(&self) -> bool {
        self.state.filling
    }

    pub fn begin_fill(&mut self) {
        self.state.filling = true;
        self.state.fill_path = vec![self.state.position];
    }

    /// Fills the outline traced since `begin_fill`.
    pub fn end_fill(&mut self) {
        if !self.state.filling {
            return;
        }
        let path = std::mem::take(&mut self.state.fill_path);
        self.state.filling = false;
        if path.len() >= 3 {
            let transform = self.transform();
            let points: Vec<Vec2D> = path.iter().map(|&p| transform.to_device(p)).collect();
            self.canvas.polygon(&points, self.state.pen.fillcolor);
        }
    }

    // Polygon recording

    pub fn begin_poly(&mut self) {
        self.state.poly = Some(vec![self.state.position]);
        self.state.creating_poly = true;
    }

    pub fn end_poly(&mut self) {
        self.state.creating_poly = false;
    }

    pub fn get_poly(&self) -> Option<Vec<Vec2D>> {
        self.state.poly.clone()
    }

    // Appearance

    pub fn shape(&self) -> &str {
        &self.state.shape
    }

    pub fn set_shape(&mut self, name: &str) -> Result<()> {
        if !self.canvas.has_shape(name) {
            return Err(TurtleError::UnknownShape(name.to_string()));
        }
        self.state.shape = name.to_string();
        self.sync_marker()
    }

    pub fn resizemode(&self) -> ResizeMode {
        self.state.pen.resizemode
    }

    pub fn set_resizemode(&mut self, mode: ResizeMode) -> Result<()> {
        self.state.pen.resizemode = mode;
        self.sync_marker()
    }

    /// `(stretch_wid, stretch_len, outline)`.
    pub fn shapesize(&self) -> (f64, f64, f64) {
        let (wid, len) = self.state.pen.stretchfactor;
        (wid, len, self.state.pen.outline)
    }

    /// A missing `stretch_len` follows `stretch_wid`. Switches to user
    /// resizing.
    pub fn set_shapesize(
        &mut self,
        stretch_wid: Option<f64>,
        stretch_len: Option<f64>,
        outline: Option<f64>,
    ) -> Result<()> {
        if stretch_wid == Some(0.0) || stretch_len == Some(0.0) {
            return Err(TurtleError::ZeroStretch);
        }
        let (wid, len) = self.state.pen.stretchfactor;
        let stretchfactor = match (stretch_wid, stretch_len) {
            (Some(wid), None) => (wid, wid),
            (wid_arg, len_arg) => (wid_arg.unwrap_or(wid), len_arg.unwrap_or(len)),
        };
        self.pen(PenSettings {
            resizemode: Some(ResizeMode::User),
            stretchfactor: Some(stretchfactor),
            outline,
            ..PenSettings::default()
        })?;
        Ok(())
    }

    pub fn shearfactor(&self) -> f64 {
        self.state.pen.shearfactor
    }

    pub fn set_shearfactor(&mut self, shear: f64) -> Result<()> {
        self.pen(PenSettings {
            resizemode: Some(ResizeMode::User),
            shearfactor: Some(shear),
            ..PenSettings::default()
        })?;
        Ok(())
    }

    /// Tilt relative to the heading, in the current angle unit.
    pub fn tiltangle(&self) -> f64 {
        let degrees = -to_degrees(self.state.pen.tilt) * self.state.mode.angle_orient();
        normalize(degrees / self.degrees_per_unit(), self.full_circle())
    }

    /// Sets the tilt to `angle`, regardless of the current tilt.
    pub fn settiltangle(&mut self, angle: f64) -> Result<()> {
        let degrees = -angle * self.degrees_per_unit() * self.state.mode.angle_orient();
        self.pen(PenSettings {
            resizemode: Some(ResizeMode::User),
            tilt: Some(normalize(to_radians(degrees), FULL_CIRCLE_RADIANS)),
            ..PenSettings::default()
        })?;
        Ok(())
    }

    /// Rotates the shape by `angle` on top of its current tilt.
    pub fn tilt(&mut self, angle: f64) -> Result<()> {
        let current = self.tiltangle();
        self.settiltangle(current + angle)
    }

    /// `[m11, m12, m21, m22]` built from stretch, shear and tilt.
    pub fn shapetransform(&self) -> [f64; 4] {
        let pen = &self.state.pen;
        let (sx, sy) = pen.stretchfactor;
        let shear = pen.shearfactor;
        let (sa, ca) = pen.tilt.sin_cos();
        [sx * ca, sy * (shear * ca + sa), -sx * sa, sy * (ca - shear * sa)]
    }

    /// Decomposes `matrix` into tilt, stretch and shear. A singular matrix
    /// leaves the turtle untouched.
    pub fn set_shapetransform(&mut self, matrix: [f64; 4]) -> Result<()> {
        let [m11, m12, m21, m22] = matrix;
        if m11 * m22 - m12 * m21 == 0.0 {
            return Err(TurtleError::SingularTransform);
        }
        let alpha = normalize((-m21).atan2(m11), FULL_CIRCLE_RADIANS);
        let (sa, ca) = alpha.sin_cos();
        let (a11, a12, a22) = (ca * m11 - sa * m21, ca * m12 - sa * m22, sa * m12 + ca * m22);
        self.pen(PenSettings {
            resizemode: Some(ResizeMode::User),
            stretchfactor: Some((a11, a22)),
            shearfactor: Some(a12 / a22),
            tilt: Some(alpha),
            ..PenSettings::default()
        })?;
        Ok(())
    }

    /// The current shape's outline after the shape transform.
    pub fn get_shapepoly(&self) -> Option<Vec<Vec2D>> {
        let shape = self.canvas.shape(&self.state.shape)?;
        let [t11, t12, t21, t22] = self.shapetransform();
        let outline = shape.outline()?;
        Some(
            outline
                .iter()
                .map(|p| Vec2D::new(t11 * p.x + t12 * p.y, t21 * p.x + t22 * p.y))
                .collect(),
        )
    }

    pub fn register_shape(&mut self, name: &str, shape: Shape) -> Result<()> {
        self.canvas
            .register_shape(name, shape.intern(), ShapeOptions::default())
    }

    pub fn getshapes(&self) -> Vec<String> {
        let mut names = self.canvas.shape_names();
        names.sort();
        names
    }

    // Text

    /// Writes `text` at the turtle. With `advance` the turtle moves to the
    /// end of the text.
    pub fn write(&mut self, text: &str, advance: bool, align: Align, font: Font) -> Result<Extent> {
        let transform = self.transform();
        let style = TextStyle {
            align,
            font,
            color: self.state.pen.pencolor,
        };
        let extent = self
            .canvas
            .write(transform.to_device(self.state.position), text, &style);
        if advance {
            let width = transform.delta_to_world(Vec2D::new(extent.w, extent.h)).x.abs();
            let offset = match align {
                Align::Left => width,
                Align::Center => width / 2.0,
                Align::Right => 0.0,
            };
            let x = self.state.position.x + offset;
            self.setx(x)?;
        }
        Ok(extent)
    }

    // Lifecycle

    /// Removes this turtle's drawings and stamps. State is kept.
    pub fn clear(&mut self) -> Result<()> {
        self.canvas.clear(false);
        self.stamps.clear();
        self.marker = None;
        self.state.filling = false;
        self.state.fill_path.clear();
        self.state.poly = None;
        self.state.creating_poly = false;
        self.sync_marker()
    }

    /// Clears and restores the pen and pose defaults. Mode, angle unit,
    /// colormode, world window and shape are kept.
    pub fn reset(&mut self) -> Result<()> {
        let kept = self.state.clone();
        self.canvas.clear(false);
        self.stamps.clear();
        self.marker = None;
        self.state = TurtleState {
            mode: kept.mode,
            angle_unit: kept.angle_unit,
            colormode: kept.colormode,
            window: kept.window,
            shape: kept.shape,
            ..TurtleState::new(kept.mode)
        };
        self.state.pen = self.template.pen.clone();
        self.state.position = self.template.position;
        self.sync_marker()
    }

    /// Takes the marker off the surface for good.
    pub(crate) fn retire(&mut self) {
        if let Some(id) = self.marker.take() {
            self.canvas.remove_shape(id);
        }
    }

    pub fn setundobuffer(&mut self, capacity: Option<usize>) {
        self.undo.set_capacity(capacity);
    }

    pub fn undobufferentries(&self) -> usize {
        self.undo.len()
    }

    // Events

    pub fn onclick(&mut self, callback: Option<PointerCallback>, button: u8, add: bool) {
        self.listeners.bind(PointerEvent::Click, callback, button, add);
    }

    pub fn onrelease(&mut self, callback: Option<PointerCallback>, button: u8, add: bool) {
        self.listeners.bind(PointerEvent::Release, callback, button, add);
    }

    pub fn ondrag(&mut self, callback: Option<PointerCallback>, button: u8, add: bool) {
        self.listeners.bind(PointerEvent::Drag, callback, button, add);
    }

    /// Selects the listeners for a host pointer event at `device`.
    pub fn pointer(&mut self, action: PointerAction, button: u8, device: Vec2D) -> Dispatch {
        Dispatch {
            callbacks: self.listeners.select(action, button),
            at: self.transform().to_world(device),
        }
    }

    // Marker

    fn pose(&self) -> Pose {
        let pen = &self.state.pen;
        let transform = self.transform();
        let (scale, shear) = match pen.resizemode {
            ResizeMode::Auto => (Vec2D::new(pen.pensize, pen.pensize), 0.0),
            ResizeMode::User => (Vec2D::new(pen.stretchfactor.0, pen.stretchfactor.1), pen.shearfactor),
            ResizeMode::NoResize => (Vec2D::new(1.0, 1.0), 0.0),
        };
        let rotation = to_radians(self.state.orient) - pen.tilt;
        Pose {
            at: transform.to_device(self.state.position),
            rotation: transform.rotation_to_device(rotation),
            scale,
            shear,
            visible: pen.shown,
        }
    }

    fn sync_marker(&mut self) -> Result<()> {
        let pose = self.pose();
        match self.marker {
            Some(id) => self.canvas.modify_shape(
                id,
                ShapeUpdate {
                    pose: Some(pose),
                    appearance: Some(self.state.shape.clone()),
                },
            ),
            None => {
                self.marker = Some(self.canvas.draw_shape(&self.state.shape, pose)?);
                Ok(())
            }
        }
    }

    pub fn marker(&self) -> Option<ItemId> {
        self.marker
    }
}

fn check_positive(what: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(TurtleError::InvalidArgument(format!("{} must be positive, got {}", what, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{DisplayItem, RecordingSurface};
    use crate::canvas::Surface;
    use crate::transform::Origin;

    fn turtle() -> (RecordingSurface, RawTurtle) {
        let surface = RecordingSurface::new(400.0, 400.0, Origin::TOP_LEFT);
        let raw = RawTurtle::new("PEN_t", surface.bind("PEN_t"), TurtleState::default(), Some(10)).unwrap();
        (surface, raw)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn forward_draws_one_segment() {
        let (surface, mut raw) = turtle();
        raw.forward(20.0).unwrap();
        assert!(raw.position().approx_eq(Vec2D::new(20.0, 0.0), 1e-9));
        let lines = surface.lines();
        assert_eq!(lines.len(), 1);
        let t = raw.transform();
        assert!(t.to_world(lines[0].0).approx_eq(Vec2D::ZERO, 1e-9));
        assert!(t.to_world(lines[0].1).approx_eq(Vec2D::new(20.0, 0.0), 1e-9));
    }

    #[test]
    fn rotations_and_pen_up_draw_nothing() {
        let (surface, mut raw) = turtle();
        raw.left(30.0).unwrap();
        raw.penup();
        raw.forward(10.0).unwrap();
        assert_eq!(surface.count("line"), 0);
        assert!(close(raw.heading(), 30.0));
    }

    #[test]
    fn heading_stays_normalized() {
        let (_, mut raw) = turtle();
        for angle in [0.0, 45.0, 359.0, 720.5, -1000.0] {
            let before = raw.heading();
            raw.left(angle).unwrap();
            assert!((0.0..360.0).contains(&raw.heading()));
            raw.right(angle).unwrap();
            let diff = (raw.heading() - before).rem_euclid(360.0);
            assert!(diff < 1e-9 || 360.0 - diff < 1e-9, "angle {}", angle);
        }
    }

    #[test]
    fn circle_uses_default_step_count() {
        let (surface, mut raw) = turtle();
        assert_eq!(raw.circle_steps(60.0, 360.0), 22);
        assert_eq!(raw.circle_steps(600.0, 360.0), 60);
        assert_eq!(raw.circle_steps(6.0, 180.0), 7);
        raw.circle(60.0, None, None).unwrap();
        assert_eq!(surface.count("line"), 22);
        assert!(raw.position().approx_eq(Vec2D::ZERO, 1e-9));
        assert!(close(raw.heading(), 0.0) || close(raw.heading(), 360.0));
    }

    #[test]
    fn half_circle_ends_opposite() {
        let (_, mut raw) = turtle();
        raw.circle(50.0, Some(180.0), None).unwrap();
        assert!(raw.position().approx_eq(Vec2D::new(0.0, 100.0), 1e-9));
        assert!(close(raw.heading(), 180.0));

        let (_, mut raw) = turtle();
        raw.circle(-50.0, Some(180.0), Some(12)).unwrap();
        assert!(raw.position().approx_eq(Vec2D::new(0.0, -100.0), 1e-9));
    }

    #[test]
    fn towards_and_distance() {
        let (_, mut raw) = turtle();
        assert!(close(raw.towards(0.0, 10.0), 90.0));
        assert!(close(raw.towards(-10.0, 0.0), 180.0));
        assert!(close(raw.towards(0.0, -10.0), 270.0));
        assert!(close(raw.distance(3.0, 4.0), 5.0));
        raw.set_mode(Mode::Logo).unwrap();
        assert!(close(raw.towards(10.0, 0.0), 90.0));
        assert!(close(raw.heading(), 0.0));
    }

    #[test]
    fn color_reads_back_resolved_pair() {
        let (_, mut raw) = turtle();
        assert_eq!(raw.color(), (Color::BLACK, Color::BLACK));
        raw.set_color("red".into(), (0.0, 0.0, 255.0).into()).unwrap();
        assert_eq!(raw.color(), (Color::rgb(255, 0, 0), Color::rgb(0, 0, 255)));
        assert!(raw.set_color("no such color".into(), "red".into()).is_err());
        assert_eq!(raw.pencolor(), Color::rgb(255, 0, 0));
    }

    #[test]
    fn logo_home_faces_north() {
        let (_, mut raw) = turtle();
        raw.set_mode(Mode::Logo).unwrap();
        raw.left(45.0).unwrap();
        raw.forward(10.0).unwrap();
        raw.home().unwrap();
        assert!(close(raw.heading(), 0.0));
        assert!(close(raw.state.orient, 90.0));
        raw.forward(10.0).unwrap();
        assert!(raw.position().approx_eq(Vec2D::new(0.0, 10.0), 1e-9));
    }

    #[test]
    fn logo_angles_stay_below_full_circle() {
        let (_, mut raw) = turtle();
        raw.set_mode(Mode::Logo).unwrap();
        raw.left(1e-14).unwrap();
        let heading = raw.heading();
        assert!((0.0..360.0).contains(&heading), "heading {heading} outside [0, 360)");
        let towards = raw.towards(-1e-15, 1.0);
        assert!((0.0..360.0).contains(&towards), "towards {towards} outside [0, 360)");
        raw.settiltangle(-1e-14).unwrap();
        let tilt = raw.tiltangle();
        assert!((0.0..360.0).contains(&tilt), "tilt {tilt} outside [0, 360)");
    }

    #[test]
    fn identity_shapetransform() {
        let (_, mut raw) = turtle();
        raw.set_shapetransform([1.0, 0.0, 0.0, 1.0]).unwrap();
        assert_eq!(raw.shapesize(), (1.0, 1.0, 1.0));
        assert!(close(raw.shearfactor(), 0.0));
        assert!(close(raw.tiltangle(), 0.0));
        assert_eq!(raw.resizemode(), ResizeMode::User);
    }

    #[test]
    fn shapetransform_decomposes_and_recomposes() {
        let (_, mut raw) = turtle();
        let matrix = [2.0, 1.0, -1.0, 3.0];
        raw.set_shapetransform(matrix).unwrap();
        for (got, want) in raw.shapetransform().iter().zip(matrix.iter()) {
            assert!(close(*got, *want), "{:?}", raw.shapetransform());
        }
    }

    #[test]
    fn singular_shapetransform_changes_nothing() {
        let (_, mut raw) = turtle();
        raw.set_shapesize(Some(2.0), None, None).unwrap();
        let before = raw.state().clone();
        assert_eq!(raw.set_shapetransform([1.0, 2.0, 2.0, 4.0]), Err(TurtleError::SingularTransform));
        assert_eq!(raw.state(), &before);
        assert_eq!(raw.set_shapesize(Some(0.0), None, None), Err(TurtleError::ZeroStretch));
    }

    #[test]
    fn tilt_is_relative_and_settiltangle_absolute() {
        let (_, mut raw) = turtle();
        raw.tilt(30.0).unwrap();
        raw.tilt(15.0).unwrap();
        assert!(close(raw.tiltangle(), 45.0));
        raw.settiltangle(10.0).unwrap();
        assert!(close(raw.tiltangle(), 10.0));
    }

    #[test]
    fn stamps_clear_by_count_sign() {
        let (surface, mut raw) = turtle();
        let ids: Vec<ItemId> = (0..5).map(|_| raw.stamp().unwrap()).collect();
        raw.clearstamps(Some(2));
        assert_eq!(raw.stamps(), &ids[2..]);
        raw.clearstamps(Some(-2));
        assert_eq!(raw.stamps(), &ids[2..3]);
        raw.clearstamp(ItemId(9999));
        raw.clearstamp(ids[2]);
        assert!(raw.stamps().is_empty());
        // only the marker is left
        assert_eq!(surface.count("shape"), 1);
    }

    #[test]
    fn unknown_shape_and_color_are_lookup_errors() {
        let (_, mut raw) = turtle();
        assert!(raw.set_shape("dragon").unwrap_err().is_lookup());
        assert!(raw.set_pencolor("octarine".into()).unwrap_err().is_lookup());
        raw.set_shape("turtle").unwrap();
        let shape = Shape::polygon(vec![(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)], 0.0).unwrap();
        raw.register_shape("wedge", shape.clone()).unwrap();
        assert_eq!(raw.register_shape("wedge", shape), Err(TurtleError::ShapeExists("wedge".to_string())));
        assert!(raw.getshapes().contains(&"wedge".to_string()));
    }

    #[test]
    fn fill_emits_one_polygon() {
        let (surface, mut raw) = turtle();
        raw.set_fillcolor("red".into()).unwrap();
        raw.begin_fill();
        for _ in 0..3 {
            raw.forward(30.0).unwrap();
            raw.left(120.0).unwrap();
        }
        assert!(raw.filling());
        raw.end_fill();
        assert!(!raw.filling());
        assert_eq!(surface.count("polygon"), 1);
        match surface.items().into_iter().find(|item| item.kind() == "polygon") {
            Some(DisplayItem::Polygon { points, fill }) => {
                assert_eq!(points.len(), 4);
                assert_eq!(fill, Color::rgb(255, 0, 0));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn poly_recording() {
        let (_, mut raw) = turtle();
        raw.begin_poly();
        raw.forward(10.0).unwrap();
        raw.left(90.0).unwrap();
        raw.forward(10.0).unwrap();
        raw.end_poly();
        raw.forward(10.0).unwrap();
        let poly = raw.get_poly().unwrap();
        assert_eq!(poly.len(), 3);
        assert!(poly[2].approx_eq(Vec2D::new(10.0, 10.0), 1e-9));
    }

    #[test]
    fn write_with_move_advances() {
        let (_, mut raw) = turtle();
        raw.penup();
        let extent = raw.write("hello", true, Align::Left, Font::default()).unwrap();
        // 400 px over 200 world units
        assert!(close(raw.xcor(), extent.w / 2.0));
    }

    #[test]
    fn reset_keeps_mode_and_clears_drawings() {
        let (surface, mut raw) = turtle();
        raw.radians();
        raw.forward(10.0).unwrap();
        raw.set_pensize(3.0).unwrap();
        raw.stamp().unwrap();
        raw.reset().unwrap();
        assert_eq!(raw.position(), Vec2D::ZERO);
        assert_eq!(raw.pensize(), 1.0);
        assert_eq!(raw.state().angle_unit, AngleUnit::Radians);
        assert_eq!(surface.count("line"), 0);
        assert_eq!(surface.count("shape"), 1);
    }

    #[test]
    fn pen_rejects_partial_updates() {
        let (_, mut raw) = turtle();
        let result = raw.pen(PenSettings {
            pensize: Some(5.0),
            pencolor: Some("nope".into()),
            ..PenSettings::default()
        });
        assert!(result.is_err());
        assert_eq!(raw.pensize(), 1.0);
        let pen = raw
            .pen(PenSettings {
                pendown: Some(false),
                speed: Some(Speed::from("slow")),
                ..PenSettings::default()
            })
            .unwrap();
        assert!(!pen.pendown);
        assert_eq!(raw.speed(), 3);
    }

    #[test]
    fn undo_entries_come_from_apply() {
        let (_, mut raw) = turtle();
        raw.apply("forward", |t| t.forward(1.0)).unwrap();
        assert!(raw.apply("shape", |t| t.set_shape("nope")).is_err());
        assert_eq!(raw.undobufferentries(), 1);
        raw.setundobuffer(None);
        assert_eq!(raw.undobufferentries(), 0);
    }

    #[test]
    fn pointer_events_arrive_in_world_coordinates() {
        use std::sync::{Arc, Mutex};
        let (_, mut raw) = turtle();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        raw.onclick(Some(Arc::new(move |x: f64, y: f64| sink.lock().unwrap().push((x, y)))), 1, false);
        raw.pointer(PointerAction::Down, 1, Vec2D::new(200.0, 200.0)).fire();
        raw.pointer(PointerAction::Down, 2, Vec2D::new(0.0, 0.0)).fire();
        raw.pointer(PointerAction::Down, 1, Vec2D::new(0.0, 0.0)).fire();
        assert_eq!(*seen.lock().unwrap(), vec![(0.0, 0.0), (-100.0, 100.0)]);
    }
}
