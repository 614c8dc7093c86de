// tortuga/uturtle/src/lib.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The turtle command language.

#[macro_use]
extern crate lalrpop_util;

pub mod ast;

lalrpop_mod!(pub turtle); // synthesized by LALRPOP

pub type Parser = turtle::TopLevelParser;

/// Parses a whole program, flattening the parser error into a message.
pub fn parse(source: &str) -> Result<ast::Program, String> {
    Parser::new().parse(source).map_err(|err| err.to_string())
}

#[test]
fn turtle_command_parser() {
    assert!(turtle::CommandParser::new().parse("penup").is_ok());
    assert!(turtle::CommandParser::new().parse("pendown").is_ok());
    assert!(turtle::CommandParser::new().parse("turnleft").is_ok());
    assert!(turtle::CommandParser::new().parse("turnleft 22.7").is_ok());
    assert!(turtle::CommandParser::new().parse("turnright").is_ok());
    assert!(turtle::CommandParser::new().parse("turnright 12.3").is_ok());
    assert!(turtle::CommandParser::new().parse("go 1 3").is_ok());
    assert!(turtle::CommandParser::new().parse("gox 5.3").is_ok());
    assert!(turtle::CommandParser::new().parse("goy 44.2").is_ok());
    assert!(turtle::CommandParser::new().parse("penwidth 2").is_ok());
    assert!(turtle::CommandParser::new()
        .parse("pencolor 255,128 ,    128")
        .is_ok());
    assert!(turtle::CommandParser::new().parse("pencolor \"red\"").is_ok());
    assert!(turtle::CommandParser::new().parse("circle 50").is_ok());
    assert!(turtle::CommandParser::new().parse("circle 50 180").is_ok());
    assert!(turtle::CommandParser::new().parse("circle 50 180 7").is_ok());
    assert!(turtle::CommandParser::new().parse("world -10 -10 10 10").is_ok());

    assert!(turtle::CommandParser::new().parse("bleh").is_err());
    assert!(turtle::CommandParser::new().parse("penup pendown").is_err());
    assert!(turtle::CommandParser::new().parse("stamp 22").is_err());
    assert!(turtle::CommandParser::new()
        .parse("pencolor 255,128")
        .is_err());
    assert!(turtle::CommandParser::new()
        .parse("pencolor 256,0,0")
        .is_err());
    assert!(turtle::CommandParser::new().parse("circle 50 180 2.5").is_err());
}

#[test]
fn turtle_program_parser() {
    assert!(turtle::TopLevelParser::new()
        .parse("turnright turnright 12.3 turnleft")
        .is_ok());
}

#[test]
fn turtle_command_values() {
    use ast::{ColorArg, Command};

    let program = parse("fw 10 bw 4 tr tl 30 pc \"navy\" circle -20 90").unwrap();
    assert_eq!(
        program,
        vec![
            Command::Move(10.0),
            Command::Move(-4.0),
            Command::Turn(-90.0),
            Command::Turn(30.0),
            Command::PenColor(ColorArg::Name("navy".to_string())),
            Command::Circle {
                radius: -20.0,
                extent: Some(90.0),
                steps: None,
            },
        ]
    );
}

#[test]
fn turtle_repeat_and_comments() {
    use ast::Command;

    let source = "
        // a square
        repeat 4 {
            forward 10 // side
            turnleft
        }
        stamp
    ";
    let program = parse(source).unwrap();
    assert_eq!(program.len(), 2);
    match &program[0] {
        Command::Repeat(4, body) => assert_eq!(body.len(), 2),
        other => panic!("expected a repeat block, got {:?}", other),
    }
    assert_eq!(program.iter().map(Command::weight).sum::<usize>(), 9);
    assert!(parse("repeat 2 { forward 1").is_err());
}
