// tortuga/turtle/src/turtle.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The queued turtle handle.
//!
//! Every operation on a [`Turtle`] is appended to its [`CommandQueue`] and
//! answered with a [`Pending`]. Arguments may themselves be pending results
//! of earlier operations; they are resolved inside the queue, right before
//! the operation runs against the turtle's [`RawTurtle`].

use crate::canvas::{Align, Extent, Font, ItemId};
use crate::color::{Color, ColorSpec};
use crate::dialog::{NumInput, TextInput};
use crate::error::{Result, TurtleError};
use crate::events::{PointerAction, PointerCallback};
use crate::pending::{Arg, Pending};
use crate::queue::{pause_for_speed, CommandQueue, Step};
use crate::raw::RawTurtle;
use crate::screen::{Screen, ScreenShared};
use crate::shape::Shape;
use crate::state::{Mode, PenSettings, PenState, ResizeMode, Speed};
use crate::vector::Vec2D;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, warn};

#[derive(Clone)]
pub struct Turtle {
    shared: Arc<TurtleShared>,
}

struct TurtleShared {
    pen: String,
    raw: Mutex<RawTurtle>,
    queue: CommandQueue,
    screen: Weak<ScreenShared>,
    disposed: AtomicBool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Effects {
    /// Recorded for undo and followed by the speed pause.
    Mutating,
    /// Runs in order but never pauses.
    Instant,
}

impl TurtleShared {
    fn lock(&self) -> MutexGuard<'_, RawTurtle> {
        self.raw.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn screen(&self) -> Result<Screen> {
        self.screen
            .upgrade()
            .map(Screen::from_shared)
            .ok_or(TurtleError::Disposed)
    }

    fn execute<T, F>(&self, name: &'static str, effects: Effects, op: F) -> Step<T>
    where
        F: FnOnce(&mut RawTurtle) -> Result<T>,
    {
        if self.disposed.load(Ordering::SeqCst) {
            return Step::immediate(Err(TurtleError::Disposed));
        }
        let mut raw = self.lock();
        match effects {
            Effects::Instant => Step::immediate(op(&mut raw)),
            Effects::Mutating => {
                let result = raw.apply(name, op);
                Step {
                    result,
                    pause: pause_for_speed(raw.speed()),
                }
            }
        }
    }
}

impl TurtleShared {
    fn twin(&self) -> Result<Turtle> {
        let screen = self.screen()?;
        let pen = screen.next_pen();
        let raw = self.lock().duplicate(pen.clone(), screen.bind(&pen))?;
        Turtle::adopt(&screen, raw, CommandQueue::new()?)
    }
}

impl Turtle {
    /// Binds a new turtle to `screen`, fed by `queue`, and registers it.
    pub(crate) fn spawn(screen: &Screen, queue: CommandQueue) -> Result<Turtle> {
        let pen = screen.next_pen();
        let raw = RawTurtle::new(
            pen.clone(),
            screen.bind(&pen),
            screen.template().clone(),
            screen.config().undo_capacity(),
        )?;
        Turtle::adopt(screen, raw, queue)
    }

    fn adopt(screen: &Screen, raw: RawTurtle, queue: CommandQueue) -> Result<Turtle> {
        let turtle = Turtle {
            shared: Arc::new(TurtleShared {
                pen: raw.pen_id().to_string(),
                raw: Mutex::new(raw),
                queue,
                screen: screen.downgrade(),
                disposed: AtomicBool::new(false),
            }),
        };
        screen.register(turtle.clone())?;
        debug!(pen = %turtle.shared.pen, queue = turtle.shared.queue.id(), "turtle created");
        Ok(turtle)
    }

    /// A new turtle on its own queue.
    pub fn new(screen: &Screen) -> Result<Turtle> {
        Turtle::spawn(screen, CommandQueue::new()?)
    }

    /// A new turtle sharing `queue` with whoever else uses it.
    pub fn with_queue(screen: &Screen, queue: CommandQueue) -> Result<Turtle> {
        Turtle::spawn(screen, queue)
    }

    pub fn pen_id(&self) -> &str {
        &self.shared.pen
    }

    pub fn queue(&self) -> CommandQueue {
        self.shared.queue.clone()
    }

    pub fn getscreen(&self) -> Result<Screen> {
        self.shared.screen()
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.disposed.load(Ordering::SeqCst)
    }

    /// Unregisters the turtle and removes its marker. Later operations
    /// fail with [`TurtleError::Disposed`].
    pub fn dispose(&self) {
        if self.shared.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shared.lock().retire();
        if let Ok(screen) = self.shared.screen() {
            screen.unregister(&self.shared.pen);
        }
        debug!(pen = %self.shared.pen, "turtle disposed");
    }

    pub(crate) fn with_raw<T>(&self, f: impl FnOnce(&mut RawTurtle) -> T) -> T {
        f(&mut self.shared.lock())
    }

    fn schedule<T, F, Fut>(&self, name: &'static str, effects: Effects, prepare: Fut) -> Pending<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(&mut RawTurtle) -> Result<T> + Send + 'static,
        Fut: Future<Output = Result<F>> + Send + 'static,
    {
        let shared = self.shared.clone();
        self.shared.queue.submit(name, async move {
            match prepare.await {
                Ok(op) => shared.execute(name, effects, op),
                Err(err) => Step::immediate(Err(err)),
            }
        })
    }

    fn mutate<T, F, Fut>(&self, name: &'static str, prepare: Fut) -> Pending<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(&mut RawTurtle) -> Result<T> + Send + 'static,
        Fut: Future<Output = Result<F>> + Send + 'static,
    {
        self.schedule(name, Effects::Mutating, prepare)
    }

    fn instant<T, F, Fut>(&self, name: &'static str, prepare: Fut) -> Pending<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(&mut RawTurtle) -> Result<T> + Send + 'static,
        Fut: Future<Output = Result<F>> + Send + 'static,
    {
        self.schedule(name, Effects::Instant, prepare)
    }
}

/// Generates the submit-and-defer wrapper for each listed operation.
///
/// `mutate` operations are recorded for undo and followed by the speed
/// pause; `instant` ones are neither.
macro_rules! turtle_ops {
    (
        $(
            $(#[$meta:meta])*
            $effects:ident fn $name:ident($($arg:ident: $ty:ty),*) -> $ret:ty = |$raw:ident| $body:expr;
        )*
    ) => {
        impl Turtle {
            $(
                $(#[$meta])*
                pub fn $name(&self, $($arg: impl Into<Arg<$ty>>),*) -> Pending<$ret> {
                    $(let $arg: Arg<$ty> = $arg.into();)*
                    self.$effects(stringify!($name), async move {
                        $(let $arg = $arg.resolve().await?;)*
                        Ok::<_, TurtleError>(move |$raw: &mut RawTurtle| -> Result<$ret> { $body })
                    })
                }
            )*
        }
    };
}

turtle_ops! {
    mutate fn forward(distance: f64) -> () = |t| t.forward(distance);
    mutate fn backward(distance: f64) -> () = |t| t.backward(distance);
    /// Turns counter-clockwise in standard mode.
    mutate fn left(angle: f64) -> () = |t| t.left(angle);
    mutate fn right(angle: f64) -> () = |t| t.right(angle);
    mutate fn goto(x: f64, y: f64) -> () = |t| t.goto(x, y);
    mutate fn setx(x: f64) -> () = |t| t.setx(x);
    mutate fn sety(y: f64) -> () = |t| t.sety(y);
    mutate fn setheading(heading: f64) -> () = |t| t.setheading(heading);
    mutate fn home() -> () = |t| t.home();
    /// `None` extent is a full circle; `None` steps picks a count from
    /// the radius.
    mutate fn circle(radius: f64, extent: Option<f64>, steps: Option<u32>) -> () =
        |t| t.circle(radius, extent, steps);
    /// A dot in the pen color.
    mutate fn dot(size: Option<f64>) -> () = |t| t.dot(size, None);
    mutate fn stamp() -> ItemId = |t| t.stamp();
    mutate fn clearstamp(id: ItemId) -> () = |t| {
        t.clearstamp(id);
        Ok(())
    };
    mutate fn clearstamps(n: Option<i64>) -> () = |t| {
        t.clearstamps(n);
        Ok(())
    };
    mutate fn undo() -> () = |t| {
        t.undo();
        Ok(())
    };
    mutate fn degrees() -> () = |t| {
        t.degrees();
        Ok(())
    };
    mutate fn radians() -> () = |t| {
        t.radians();
        Ok(())
    };
    mutate fn set_mode(mode: Mode) -> () = |t| t.set_mode(mode);
    mutate fn setworldcoordinates(llx: f64, lly: f64, urx: f64, ury: f64) -> () =
        |t| t.setworldcoordinates(llx, lly, urx, ury);
    mutate fn set_colormode(colormode: f64) -> () = |t| t.set_colormode(colormode);
    mutate fn pendown() -> () = |t| {
        t.pendown();
        Ok(())
    };
    mutate fn penup() -> () = |t| {
        t.penup();
        Ok(())
    };
    mutate fn set_pensize(width: f64) -> () = |t| t.set_pensize(width);
    mutate fn pen(settings: PenSettings) -> PenState = |t| t.pen(settings);
    mutate fn showturtle() -> () = |t| t.showturtle();
    mutate fn hideturtle() -> () = |t| t.hideturtle();
    mutate fn begin_fill() -> () = |t| {
        t.begin_fill();
        Ok(())
    };
    mutate fn end_fill() -> () = |t| {
        t.end_fill();
        Ok(())
    };
    mutate fn begin_poly() -> () = |t| {
        t.begin_poly();
        Ok(())
    };
    mutate fn end_poly() -> () = |t| {
        t.end_poly();
        Ok(())
    };
    mutate fn set_resizemode(mode: ResizeMode) -> () = |t| t.set_resizemode(mode);
    mutate fn set_shapesize(stretch_wid: Option<f64>, stretch_len: Option<f64>, outline: Option<f64>) -> () =
        |t| t.set_shapesize(stretch_wid, stretch_len, outline);
    mutate fn set_shearfactor(shear: f64) -> () = |t| t.set_shearfactor(shear);
    mutate fn tilt(angle: f64) -> () = |t| t.tilt(angle);
    mutate fn settiltangle(angle: f64) -> () = |t| t.settiltangle(angle);
    mutate fn set_shapetransform(matrix: [f64; 4]) -> () = |t| t.set_shapetransform(matrix);
    mutate fn reset() -> () = |t| t.reset();
    /// Clears this turtle's drawings only.
    mutate fn clear() -> () = |t| t.clear();

    instant fn position() -> Vec2D = |t| Ok(t.position());
    instant fn xcor() -> f64 = |t| Ok(t.xcor());
    instant fn ycor() -> f64 = |t| Ok(t.ycor());
    instant fn heading() -> f64 = |t| Ok(t.heading());
    instant fn towards(x: f64, y: f64) -> f64 = |t| Ok(t.towards(x, y));
    instant fn distance(x: f64, y: f64) -> f64 = |t| Ok(t.distance(x, y));
    instant fn speed() -> u8 = |t| Ok(t.speed());
    instant fn mode() -> Mode = |t| Ok(t.mode());
    instant fn colormode() -> f64 = |t| Ok(t.colormode());
    instant fn isdown() -> bool = |t| Ok(t.isdown());
    instant fn pensize() -> f64 = |t| Ok(t.pensize());
    instant fn pencolor() -> Color = |t| Ok(t.pencolor());
    instant fn fillcolor() -> Color = |t| Ok(t.fillcolor());
    /// `(pencolor, fillcolor)`.
    instant fn color() -> (Color, Color) = |t| Ok(t.color());
    instant fn isvisible() -> bool = |t| Ok(t.isvisible());
    instant fn filling() -> bool = |t| Ok(t.filling());
    instant fn get_poly() -> Option<Vec<Vec2D>> = |t| Ok(t.get_poly());
    instant fn shape() -> String = |t| Ok(t.shape().to_string());
    instant fn resizemode() -> ResizeMode = |t| Ok(t.resizemode());
    instant fn shapesize() -> (f64, f64, f64) = |t| Ok(t.shapesize());
    instant fn shearfactor() -> f64 = |t| Ok(t.shearfactor());
    instant fn tiltangle() -> f64 = |t| Ok(t.tiltangle());
    instant fn shapetransform() -> [f64; 4] = |t| Ok(t.shapetransform());
    instant fn get_shapepoly() -> Option<Vec<Vec2D>> = |t| Ok(t.get_shapepoly());
    instant fn getshapes() -> Vec<String> = |t| Ok(t.getshapes());
    instant fn undobufferentries() -> usize = |t| Ok(t.undobufferentries());
    /// `None` or zero disables the undo buffer.
    instant fn setundobuffer(capacity: Option<usize>) -> () = |t| {
        t.setundobuffer(capacity);
        Ok(())
    };
    /// `None` drops every click listener; `add` false replaces the
    /// button's listeners.
    instant fn onclick(callback: Option<PointerCallback>, button: u8, add: bool) -> () = |t| {
        t.onclick(callback, button, add);
        Ok(())
    };
    instant fn onrelease(callback: Option<PointerCallback>, button: u8, add: bool) -> () = |t| {
        t.onrelease(callback, button, add);
        Ok(())
    };
    instant fn ondrag(callback: Option<PointerCallback>, button: u8, add: bool) -> () = |t| {
        t.ondrag(callback, button, add);
        Ok(())
    };
}

macro_rules! aliases {
    ($($alias:ident => $target:ident($($arg:ident: $ty:ty),*) -> $ret:ty;)*) => {
        impl Turtle {
            $(
                #[doc = concat!("Same as [`Turtle::", stringify!($target), "`].")]
                pub fn $alias(&self, $($arg: impl Into<Arg<$ty>>),*) -> Pending<$ret> {
                    self.$target($($arg),*)
                }
            )*
        }
    };
}

aliases! {
    fd => forward(distance: f64) -> ();
    bk => backward(distance: f64) -> ();
    back => backward(distance: f64) -> ();
    lt => left(angle: f64) -> ();
    rt => right(angle: f64) -> ();
    setpos => goto(x: f64, y: f64) -> ();
    setposition => goto(x: f64, y: f64) -> ();
    seth => setheading(heading: f64) -> ();
    pd => pendown() -> ();
    down => pendown() -> ();
    pu => penup() -> ();
    up => penup() -> ();
    width => set_pensize(width: f64) -> ();
    pos => position() -> Vec2D;
    st => showturtle() -> ();
    ht => hideturtle() -> ();
    turtlesize => set_shapesize(stretch_wid: Option<f64>, stretch_len: Option<f64>, outline: Option<f64>) -> ();
}

impl Turtle {
    pub fn set_pencolor(&self, color: impl Into<ColorSpec>) -> Pending<()> {
        let color = color.into();
        self.mutate("pencolor", async move {
            Ok::<_, TurtleError>(move |t: &mut RawTurtle| t.set_pencolor(color))
        })
    }

    pub fn set_fillcolor(&self, color: impl Into<ColorSpec>) -> Pending<()> {
        let color = color.into();
        self.mutate("fillcolor", async move {
            Ok::<_, TurtleError>(move |t: &mut RawTurtle| t.set_fillcolor(color))
        })
    }

    pub fn set_color(&self, pen: impl Into<ColorSpec>, fill: impl Into<ColorSpec>) -> Pending<()> {
        let (pen, fill) = (pen.into(), fill.into());
        self.mutate("color", async move {
            Ok::<_, TurtleError>(move |t: &mut RawTurtle| t.set_color(pen, fill))
        })
    }

    pub fn dot_with_color(&self, size: impl Into<Arg<Option<f64>>>, color: impl Into<ColorSpec>) -> Pending<()> {
        let (size, color) = (size.into(), color.into());
        self.mutate("dot", async move {
            let size = size.resolve().await?;
            Ok::<_, TurtleError>(move |t: &mut RawTurtle| t.dot(size, Some(color)))
        })
    }

    /// Numbers in `0.5..=10.5` are rounded, anything else means no pause.
    /// Also accepts `fastest`, `fast`, `normal`, `slow` and `slowest`.
    pub fn set_speed(&self, speed: impl Into<Speed>) -> Pending<()> {
        let speed = speed.into();
        self.mutate("speed", async move {
            Ok::<_, TurtleError>(move |t: &mut RawTurtle| t.set_speed(speed))
        })
    }

    pub fn set_shape(&self, name: impl Into<String>) -> Pending<()> {
        let name = name.into();
        self.mutate("shape", async move {
            Ok::<_, TurtleError>(move |t: &mut RawTurtle| t.set_shape(&name))
        })
    }

    pub fn register_shape(&self, name: impl Into<String>, shape: Shape) -> Pending<()> {
        let name = name.into();
        self.mutate("register_shape", async move {
            Ok::<_, TurtleError>(move |t: &mut RawTurtle| t.register_shape(&name, shape))
        })
    }

    pub fn addshape(&self, name: impl Into<String>, shape: Shape) -> Pending<()> {
        self.register_shape(name, shape)
    }

    /// Writes `text` in the pen color. With `advance` the turtle moves to
    /// the end of the text.
    pub fn write(&self, text: impl Into<String>, advance: bool, align: Align, font: Font) -> Pending<Extent> {
        let text = text.into();
        self.mutate("write", async move {
            Ok::<_, TurtleError>(move |t: &mut RawTurtle| t.write(&text, advance, align, font))
        })
    }

    pub fn bgcolor(&self, color: impl Into<ColorSpec>) -> Pending<()> {
        let color = color.into();
        self.mutate("bgcolor", async move {
            Ok::<_, TurtleError>(move |t: &mut RawTurtle| {
                let color = color.resolve(t.colormode())?;
                t.canvas_mut().bgcolor(color);
                Ok(())
            })
        })
    }

    pub fn bgpic(&self, picture: Option<String>) -> Pending<()> {
        self.mutate("bgpic", async move {
            Ok::<_, TurtleError>(move |t: &mut RawTurtle| {
                t.canvas_mut().bgpic(picture.as_deref());
                Ok(())
            })
        })
    }

    /// Clears every live turtle on the screen, starting with this one, and
    /// restores the default background.
    pub fn clearscreen(&self) -> Pending<()> {
        self.clearscreen_scoped(true)
    }

    /// Clears this turtle, then with `deep` every other live turtle on
    /// the screen, and restores the default background.
    pub fn clearscreen_scoped(&self, deep: impl Into<Arg<bool>>) -> Pending<()> {
        self.broadcast("clearscreen", deep.into(), true, RawTurtle::clear)
    }

    /// Resets every live turtle on the screen, starting with this one.
    pub fn resetscreen(&self) -> Pending<()> {
        self.resetscreen_scoped(true)
    }

    /// Resets this turtle, then with `deep` every other live turtle.
    pub fn resetscreen_scoped(&self, deep: impl Into<Arg<bool>>) -> Pending<()> {
        self.broadcast("resetscreen", deep.into(), false, RawTurtle::reset)
    }

    fn broadcast(
        &self,
        name: &'static str,
        deep: Arg<bool>,
        background: bool,
        op: fn(&mut RawTurtle) -> Result<()>,
    ) -> Pending<()> {
        let shared = self.shared.clone();
        self.shared.queue.submit(name, async move {
            let deep = match deep.resolve().await {
                Ok(deep) => deep,
                Err(err) => return Step::immediate(Err(err)),
            };
            let step = shared.execute(name, Effects::Mutating, |raw: &mut RawTurtle| {
                op(raw)?;
                if background {
                    let canvas = raw.canvas_mut();
                    canvas.bgcolor(Color::WHITE);
                    canvas.bgpic(None);
                }
                Ok(())
            });
            if step.result.is_err() || !deep {
                return step;
            }
            match shared.screen() {
                Ok(screen) => {
                    for other in screen.turtles() {
                        if other.pen_id() == shared.pen {
                            continue;
                        }
                        if let Err(err) = other.with_raw(op) {
                            warn!(pen = %other.pen_id(), %err, "{} failed", name);
                        }
                    }
                    step
                }
                Err(err) => Step::immediate(Err(err)),
            }
        })
    }

    /// A new registered turtle with a copy of this one's state, on its own
    /// queue.
    pub fn clone_turtle(&self) -> Pending<Turtle> {
        let shared = self.shared.clone();
        self.shared.queue.submit("clone", async move {
            Step::immediate(shared.twin())
        })
    }

    /// Asks for a line of text. The queue waits for the answer.
    pub fn textinput(&self, title: impl Into<String>, prompt: impl Into<String>) -> Pending<Option<String>> {
        let request = TextInput {
            title: title.into(),
            prompt: prompt.into(),
        };
        let shared = self.shared.clone();
        self.shared.queue.submit("textinput", async move {
            match shared.screen() {
                Ok(screen) => Step::immediate(Ok(screen.dialog().text_input(request).await)),
                Err(err) => Step::immediate(Err(err)),
            }
        })
    }

    /// Asks for a number in `[min, max]`. The queue waits for the answer.
    pub fn numinput(&self, request: NumInput) -> Pending<Option<f64>> {
        let shared = self.shared.clone();
        self.shared.queue.submit("numinput", async move {
            match shared.screen() {
                Ok(screen) => Step::immediate(Ok(screen.dialog().num_input(request).await)),
                Err(err) => Step::immediate(Err(err)),
            }
        })
    }

    /// Delivers a host pointer event at device coordinates to this
    /// turtle's listeners.
    pub fn pointer(&self, action: PointerAction, button: u8, device: Vec2D) {
        let dispatch = self.shared.lock().pointer(action, button, device);
        dispatch.fire();
    }
}
