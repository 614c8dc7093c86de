// tortuga/uturtle/src/ast.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Inspiration for the commands are from https://docs.kde.org/trunk5/en/kdeedu/kturtle/commands.html

/// A color as written in a script: either RGB components or a quoted name.
#[derive(Clone, Debug, PartialEq)]
pub enum ColorArg {
    Rgb(u8, u8, u8),
    Name(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Reset,
    Clear,
    Home,
    PenUp,
    PenDown,
    /// Counter-clockwise turn in the turtle's angle unit.
    Turn(f64),
    Move(f64),
    Direction(f64),
    Go(f64, f64),
    GoX(f64),
    GoY(f64),
    PenWidth(f64),
    PenColor(ColorArg),
    FillColor(ColorArg),
    CanvasColor(ColorArg),
    Circle {
        radius: f64,
        extent: Option<f64>,
        steps: Option<u32>,
    },
    Dot(Option<f64>),
    Stamp,
    ClearStamps(Option<i64>),
    BeginFill,
    EndFill,
    Show,
    Hide,
    Shape(String),
    Speed(f64),
    Print(String),
    Degrees,
    Radians,
    Mode(String),
    World(f64, f64, f64, f64),
    Repeat(u32, Vec<Command>),
}

pub type Program = Vec<Command>;

impl Command {
    /// Number of primitive commands this command expands to once loops are
    /// unrolled.
    pub fn weight(&self) -> usize {
        match self {
            Command::Repeat(count, body) => {
                *count as usize * body.iter().map(Command::weight).sum::<usize>()
            }
            _ => 1,
        }
    }
}
