// tortuga/turtle/src/script.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Plays a parsed turtle program on a [`Turtle`].

use crate::canvas::{Align, Font};
use crate::color::{Color, ColorSpec};
use crate::error::{ErrorKind, TurtleError};
use crate::pending::Pending;
use crate::state::{Mode, Speed};
use crate::turtle::Turtle;
use futures::future;
use std::fmt::{Display, Formatter, Result as FormatResult};
use tracing::{debug, warn};
use uturtle::ast::{ColorArg, Command, Program};

bitflags! {
    // NB: If you change this, make sure to update the `Display`
    // implementation as well.
    pub struct RunResultFlags: u16 {
        const ERR_INVALID_ARGUMENT = 0x0001;
        const ERR_UNKNOWN_NAME     = 0x0002;
        const ERR_ABORTED          = 0x0004;
    }
}

impl Display for RunResultFlags {
    fn fmt(&self, formatter: &mut Formatter) -> FormatResult {
        if self.is_empty() {
            return Ok(());
        }

        let mut first = true;
        for (bit, name) in NAMES.iter().enumerate() {
            if (self.bits() >> bit) & 1 == 0 {
                continue;
            }
            if !first {
                formatter.write_str(", ")?;
            } else {
                first = false;
            }
            formatter.write_str(name)?;
        }

        return Ok(());

        // Must match the order in `RunResultFlags`.
        static NAMES: &[&str] = &["invalid argument", "unknown name", "aborted"];
    }
}

impl From<&TurtleError> for RunResultFlags {
    fn from(error: &TurtleError) -> RunResultFlags {
        match error.kind() {
            ErrorKind::Validation => RunResultFlags::ERR_INVALID_ARGUMENT,
            ErrorKind::Lookup => RunResultFlags::ERR_UNKNOWN_NAME,
            ErrorKind::Lifecycle | ErrorKind::Config => RunResultFlags::ERR_ABORTED,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ScriptFailure {
    /// Position of the primitive command once loops are unrolled.
    pub index: usize,
    pub command: &'static str,
    pub error: TurtleError,
}

#[derive(Clone, Debug)]
pub struct ScriptRun {
    pub flags: RunResultFlags,
    pub commands: usize,
    pub failures: Vec<ScriptFailure>,
}

impl ScriptRun {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Submits every command of `program` to `turtle`, then waits for all of
/// them. A failing command does not stop the ones after it.
pub async fn run(turtle: &Turtle, program: &Program) -> ScriptRun {
    let mut submitted = Vec::new();
    submit(turtle, program, &mut submitted);
    debug!(pen = %turtle.pen_id(), commands = submitted.len(), "script submitted");

    let (names, pendings): (Vec<_>, Vec<_>) = submitted.into_iter().unzip();
    let results = future::join_all(pendings).await;

    let mut run = ScriptRun {
        flags: RunResultFlags::empty(),
        commands: names.len(),
        failures: Vec::new(),
    };
    for (index, (command, result)) in names.into_iter().zip(results).enumerate() {
        if let Err(error) = result {
            warn!(index, command, %error, "script command failed");
            run.flags |= RunResultFlags::from(&error);
            run.failures.push(ScriptFailure { index, command, error });
        }
    }
    run
}

fn submit(turtle: &Turtle, program: &[Command], out: &mut Vec<(&'static str, Pending<()>)>) {
    for command in program {
        if let Command::Repeat(count, body) = command {
            for _ in 0..*count {
                submit(turtle, body, out);
            }
            continue;
        }
        out.push((name(command), dispatch(turtle, command)));
    }
}

fn color(arg: &ColorArg) -> ColorSpec {
    match arg {
        ColorArg::Rgb(r, g, b) => ColorSpec::Exact(Color::rgb(*r, *g, *b)),
        ColorArg::Name(name) => ColorSpec::Name(name.clone()),
    }
}

fn dispatch(turtle: &Turtle, command: &Command) -> Pending<()> {
    match command {
        Command::Reset => turtle.reset(),
        Command::Clear => turtle.clear(),
        Command::Home => turtle.home(),
        Command::PenUp => turtle.penup(),
        Command::PenDown => turtle.pendown(),
        Command::Turn(angle) => turtle.left(*angle),
        Command::Move(distance) => turtle.forward(*distance),
        Command::Direction(heading) => turtle.setheading(*heading),
        Command::Go(x, y) => turtle.goto(*x, *y),
        Command::GoX(x) => turtle.setx(*x),
        Command::GoY(y) => turtle.sety(*y),
        Command::PenWidth(width) => turtle.set_pensize(*width),
        Command::PenColor(arg) => turtle.set_pencolor(color(arg)),
        Command::FillColor(arg) => turtle.set_fillcolor(color(arg)),
        Command::CanvasColor(arg) => turtle.bgcolor(color(arg)),
        Command::Circle { radius, extent, steps } => turtle.circle(*radius, *extent, *steps),
        Command::Dot(size) => turtle.dot(*size),
        Command::Stamp => turtle.stamp().then_map(|_| ()),
        Command::ClearStamps(n) => turtle.clearstamps(*n),
        Command::BeginFill => turtle.begin_fill(),
        Command::EndFill => turtle.end_fill(),
        Command::Show => turtle.showturtle(),
        Command::Hide => turtle.hideturtle(),
        Command::Shape(shape) => turtle.set_shape(shape.as_str()),
        Command::Speed(speed) => turtle.set_speed(Speed::Value(*speed)),
        Command::Print(text) => turtle
            .write(text.as_str(), false, Align::Left, Font::default())
            .then_map(|_| ()),
        Command::Degrees => turtle.degrees(),
        Command::Radians => turtle.radians(),
        Command::Mode(mode) => match mode.parse::<Mode>() {
            Ok(mode) => turtle.set_mode(mode),
            Err(err) => Pending::failed(err),
        },
        Command::World(llx, lly, urx, ury) => turtle.setworldcoordinates(*llx, *lly, *urx, *ury),
        Command::Repeat(..) => Pending::ready(()),
    }
}

fn name(command: &Command) -> &'static str {
    match command {
        Command::Reset => "reset",
        Command::Clear => "clear",
        Command::Home => "home",
        Command::PenUp => "penup",
        Command::PenDown => "pendown",
        Command::Turn(_) => "turn",
        Command::Move(_) => "move",
        Command::Direction(_) => "direction",
        Command::Go(..) => "go",
        Command::GoX(_) => "gox",
        Command::GoY(_) => "goy",
        Command::PenWidth(_) => "penwidth",
        Command::PenColor(_) => "pencolor",
        Command::FillColor(_) => "fillcolor",
        Command::CanvasColor(_) => "canvascolor",
        Command::Circle { .. } => "circle",
        Command::Dot(_) => "dot",
        Command::Stamp => "stamp",
        Command::ClearStamps(_) => "clearstamps",
        Command::BeginFill => "beginfill",
        Command::EndFill => "endfill",
        Command::Show => "spriteshow",
        Command::Hide => "spritehide",
        Command::Shape(_) => "shape",
        Command::Speed(_) => "speed",
        Command::Print(_) => "print",
        Command::Degrees => "degrees",
        Command::Radians => "radians",
        Command::Mode(_) => "mode",
        Command::World(..) => "world",
        Command::Repeat(..) => "repeat",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TurtleConfig;
    use crate::screen::Screen;
    use crate::vector::Vec2D;

    #[test]
    fn flags_display_in_bit_order() {
        assert_eq!(RunResultFlags::empty().to_string(), "");
        let flags = RunResultFlags::ERR_ABORTED | RunResultFlags::ERR_INVALID_ARGUMENT;
        assert_eq!(flags.to_string(), "invalid argument, aborted");
    }

    #[tokio::test]
    async fn square_returns_home() {
        let (screen, surface) = Screen::recording(TurtleConfig::default()).unwrap();
        let turtle = screen.turtle().unwrap();
        let program = uturtle::parse("repeat 4 { forward 50 turnleft } stamp").unwrap();

        let run = run(&turtle, &program).await;
        assert!(run.is_clean(), "{:?}", run.failures);
        assert_eq!(run.commands, 9);
        assert_eq!(surface.count("line"), 4);
        let home = turtle.position().await.unwrap();
        assert!(home.approx_eq(Vec2D::ZERO, 1e-9), "{:?}", home);
    }

    #[tokio::test]
    async fn failures_are_reported_and_do_not_stop_the_run() {
        let (screen, surface) = Screen::recording(TurtleConfig::default()).unwrap();
        let turtle = screen.turtle().unwrap();
        let program = uturtle::parse(
            "shape \"blob\" forward 10 pencolor \"mauvish\" world 1 1 1 1 mode \"sideways\" forward 10",
        )
        .unwrap();

        let run = run(&turtle, &program).await;
        let failed: Vec<_> = run.failures.iter().map(|f| (f.index, f.command)).collect();
        assert_eq!(failed, vec![(0, "shape"), (2, "pencolor"), (3, "world"), (4, "mode")]);
        assert_eq!(
            run.flags,
            RunResultFlags::ERR_UNKNOWN_NAME | RunResultFlags::ERR_INVALID_ARGUMENT
        );
        assert_eq!(surface.count("line"), 2);
    }
}
