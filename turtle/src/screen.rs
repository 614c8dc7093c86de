// tortuga/turtle/src/screen.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The shared drawing surface and the registry of turtles on it.

use crate::canvas::{Canvas, Dimension, Surface};
use crate::color::ColorSpec;
use crate::config::TurtleConfig;
use crate::dialog::{Dialog, DialogGuard, NoDialog, NumInput, TextInput};
use crate::error::{Result, TurtleError};
use crate::events::{Dispatch, KeyCallback, KeyEvent, KeyListeners, PointerCallback, PointerEvent, PointerListeners};
use crate::pending::Pending;
use crate::queue::CommandQueue;
use crate::recording::RecordingSurface;
use crate::state::TurtleState;
use crate::transform::{DeviceSize, Transform};
use crate::turtle::Turtle;
use crate::vector::Vec2D;
use std::mem;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info};

static NEXT_PEN: AtomicU64 = AtomicU64::new(1);

const SCREEN_PEN: &str = "SCREEN";

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to a screen. Clones refer to the same screen.
#[derive(Clone)]
pub struct Screen {
    shared: Arc<ScreenShared>,
}

pub(crate) struct ScreenShared {
    surface: Arc<dyn Surface>,
    dialog: DialogGuard,
    config: TurtleConfig,
    template: TurtleState,
    control: Mutex<Box<dyn Canvas>>,
    registry: Mutex<Vec<Turtle>>,
    keys: Mutex<KeyListeners>,
    clicks: Mutex<PointerListeners>,
    exit_on_click: AtomicBool,
    closed: AtomicBool,
}

impl Screen {
    pub fn new(surface: Arc<dyn Surface>, dialog: Arc<dyn Dialog>, config: TurtleConfig) -> Result<Screen> {
        config.validate()?;
        let template = config.template()?;
        let mut control = surface.bind(SCREEN_PEN);
        control.set_width(config.width.dimension()?);
        control.set_height(config.height.dimension()?);
        Ok(Screen {
            shared: Arc::new(ScreenShared {
                surface,
                dialog: DialogGuard::new(dialog),
                config,
                template,
                control: Mutex::new(control),
                registry: Mutex::new(Vec::new()),
                keys: Mutex::new(KeyListeners::default()),
                clicks: Mutex::new(PointerListeners::default()),
                exit_on_click: AtomicBool::new(false),
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// A screen drawing into a fresh [`RecordingSurface`], without dialogs.
    pub fn recording(config: TurtleConfig) -> Result<(Screen, RecordingSurface)> {
        let surface = RecordingSurface::new(400.0, 400.0, config.origin()?);
        let screen = Screen::new(Arc::new(surface.clone()), Arc::new(NoDialog), config)?;
        Ok((screen, surface))
    }

    pub(crate) fn from_shared(shared: Arc<ScreenShared>) -> Screen {
        Screen { shared }
    }

    pub(crate) fn downgrade(&self) -> Weak<ScreenShared> {
        Arc::downgrade(&self.shared)
    }

    pub(crate) fn next_pen(&self) -> String {
        format!("PEN_{}", NEXT_PEN.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn bind(&self, pen: &str) -> Box<dyn Canvas> {
        self.shared.surface.bind(pen)
    }

    pub(crate) fn template(&self) -> &TurtleState {
        &self.shared.template
    }

    pub fn config(&self) -> &TurtleConfig {
        &self.shared.config
    }

    pub fn dialog(&self) -> &DialogGuard {
        &self.shared.dialog
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    // Registry

    /// A new turtle on its own queue.
    pub fn turtle(&self) -> Result<Turtle> {
        Turtle::new(self)
    }

    /// A new turtle on `queue`, ordered with every other user of it.
    pub fn turtle_with_queue(&self, queue: CommandQueue) -> Result<Turtle> {
        Turtle::with_queue(self, queue)
    }

    pub(crate) fn register(&self, turtle: Turtle) -> Result<()> {
        if self.is_closed() {
            turtle.dispose();
            return Err(TurtleError::Disposed);
        }
        lock(&self.shared.registry).push(turtle);
        Ok(())
    }

    pub(crate) fn unregister(&self, pen: &str) {
        lock(&self.shared.registry).retain(|turtle| turtle.pen_id() != pen);
    }

    /// The live turtles, oldest first.
    pub fn turtles(&self) -> Vec<Turtle> {
        let mut registry = lock(&self.shared.registry);
        registry.retain(|turtle| !turtle.is_disposed());
        registry.clone()
    }

    // Surface

    /// Sets the background color, in the screen's configured color mode.
    pub fn bgcolor(&self, color: impl Into<ColorSpec>) -> Result<()> {
        let color = color.into().resolve(self.shared.config.colormode)?;
        lock(&self.shared.control).bgcolor(color);
        Ok(())
    }

    pub fn bgpic(&self, picture: Option<&str>) {
        lock(&self.shared.control).bgpic(picture);
    }

    /// `(width, height)` of the drawing area in pixels.
    pub fn screensize(&self) -> (f64, f64) {
        let control = lock(&self.shared.control);
        (control.width(), control.height())
    }

    pub fn set_screensize(&self, width: Dimension, height: Dimension) {
        let mut control = lock(&self.shared.control);
        control.set_width(width);
        control.set_height(height);
    }

    pub fn window_width(&self) -> f64 {
        lock(&self.shared.control).width()
    }

    pub fn window_height(&self) -> f64 {
        lock(&self.shared.control).height()
    }

    // Keys

    /// Binds `callback` to the release of `key`, or of any key when `key`
    /// is `None`. `None` callback unbinds.
    pub fn onkey(&self, callback: Option<KeyCallback>, key: Option<&str>) {
        lock(&self.shared.keys).bind(KeyEvent::Release, callback, key);
    }

    pub fn onkeyrelease(&self, callback: Option<KeyCallback>, key: Option<&str>) {
        self.onkey(callback, key);
    }

    pub fn onkeypress(&self, callback: Option<KeyCallback>, key: Option<&str>) {
        lock(&self.shared.keys).bind(KeyEvent::Press, callback, key);
    }

    /// Delivers a host key press. Returns how many callbacks ran.
    pub fn key_pressed(&self, key: &str) -> usize {
        self.key_event(KeyEvent::Press, key)
    }

    pub fn key_released(&self, key: &str) -> usize {
        self.key_event(KeyEvent::Release, key)
    }

    fn key_event(&self, event: KeyEvent, key: &str) -> usize {
        let callbacks = lock(&self.shared.keys).dispatch(event, key);
        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }

    // Clicks

    pub fn onscreenclick(&self, callback: Option<PointerCallback>, button: u8, add: bool) {
        lock(&self.shared.clicks).bind(PointerEvent::Click, callback, button, add);
    }

    /// Delivers a host click at device coordinates. After `exitonclick`
    /// the click closes the screen instead.
    pub fn click(&self, button: u8, device: Vec2D) -> Result<()> {
        if self.shared.exit_on_click.load(Ordering::SeqCst) {
            self.bye();
            return Ok(());
        }
        let transform = {
            let control = lock(&self.shared.control);
            Transform {
                window: self.shared.config.window()?,
                size: DeviceSize::new(control.width(), control.height()),
                origin: control.x0y0(),
            }
        };
        let callbacks = {
            let mut clicks = lock(&self.shared.clicks);
            let callbacks = clicks.press(button);
            clicks.release(button);
            callbacks
        };
        Dispatch {
            callbacks,
            at: transform.to_world(device),
        }
        .fire();
        Ok(())
    }

    pub fn exitonclick(&self) {
        self.shared.exit_on_click.store(true, Ordering::SeqCst);
    }

    /// Runs `callback` after `ms` milliseconds unless the screen has
    /// closed by then.
    pub fn ontimer<F>(&self, callback: F, ms: u64) -> Result<Pending<()>>
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = Handle::try_current().map_err(|err| TurtleError::NoRuntime(err.to_string()))?;
        let screen = self.downgrade();
        let timer = handle.spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            match screen.upgrade() {
                Some(shared) if !shared.closed.load(Ordering::SeqCst) => {
                    callback();
                    Ok(())
                }
                _ => Err(TurtleError::Disposed),
            }
        });
        Ok(Pending::from_future(async move {
            timer
                .await
                .unwrap_or_else(|err| Err(TurtleError::NoRuntime(err.to_string())))
        }))
    }

    /// Disposes every turtle, empties the surface and closes the screen.
    pub fn bye(&self) {
        if self.shared.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let turtles = mem::take(&mut *lock(&self.shared.registry));
        for turtle in &turtles {
            turtle.dispose();
        }
        self.shared.surface.reset();
        info!(turtles = turtles.len(), "screen closed");
    }

    // Dialogs

    pub async fn textinput(&self, title: impl Into<String>, prompt: impl Into<String>) -> Option<String> {
        let request = TextInput {
            title: title.into(),
            prompt: prompt.into(),
        };
        self.shared.dialog.text_input(request).await
    }

    pub async fn numinput(&self, request: NumInput) -> Option<f64> {
        debug!(title = %request.title, "numinput");
        self.shared.dialog.num_input(request).await
    }
}
