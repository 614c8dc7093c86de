// tortuga/turtle/tests/screen.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::sync::Arc;
use std::time::Duration;
use tortuga::events::{PointerAction, PointerCallback};
use tortuga::{
    Color, NumInput, RecordingSurface, Reply, Screen, ScriptedDialog, Turtle, TurtleConfig, TurtleError, Vec2D,
};

fn recording() -> (Screen, RecordingSurface) {
    Screen::recording(TurtleConfig::default()).unwrap()
}

async fn three_lines(screen: &Screen) -> Vec<Turtle> {
    let turtles: Vec<Turtle> = (0..3).map(|_| screen.turtle().unwrap()).collect();
    for (i, turtle) in turtles.iter().enumerate() {
        turtle.left(i as f64 * 90.0);
        turtle.forward(30.0).await.unwrap();
    }
    turtles
}

#[tokio::test]
async fn forward_twenty_end_to_end() {
    let (screen, surface) = recording();
    let turtle = screen.turtle().unwrap();

    turtle.forward(20.0).await.unwrap();
    assert_eq!(turtle.position().await, Ok(Vec2D::new(20.0, 0.0)));
    // 400x400 pixels, origin top left, world -100..100 on both axes.
    assert_eq!(surface.lines(), vec![(Vec2D::new(200.0, 200.0), Vec2D::new(240.0, 200.0))]);
}

#[tokio::test]
async fn deep_clearscreen_clears_every_turtle() {
    let (screen, surface) = recording();
    let turtles = three_lines(&screen).await;
    screen.bgcolor("navy").unwrap();
    assert_eq!(surface.count("line"), 3);

    turtles[0].clearscreen_scoped(true).await.unwrap();
    assert_eq!(surface.count("line"), 0);
    assert_eq!(surface.background(), (Color::WHITE, None));
    for turtle in &turtles {
        assert_eq!(turtle.isvisible().await, Ok(true));
    }
}

#[tokio::test]
async fn shallow_clearscreen_clears_only_the_caller() {
    let (screen, surface) = recording();
    let turtles = three_lines(&screen).await;

    turtles[1].clearscreen_scoped(false).await.unwrap();
    assert_eq!(surface.count("line"), 2);
    assert!(surface.items_of(turtles[1].pen_id()).iter().all(|item| item.kind() != "line"));
}

#[tokio::test]
async fn resetscreen_returns_turtles_home() {
    let (screen, surface) = recording();
    let turtles = three_lines(&screen).await;

    turtles[2].resetscreen_scoped(false).await.unwrap();
    assert_eq!(turtles[2].position().await, Ok(Vec2D::ZERO));
    assert_ne!(turtles[0].position().await, Ok(Vec2D::ZERO));

    turtles[2].resetscreen_scoped(true).await.unwrap();
    for turtle in &turtles {
        assert_eq!(turtle.position().await, Ok(Vec2D::ZERO));
        assert_eq!(turtle.heading().await, Ok(0.0));
    }
    assert_eq!(surface.count("line"), 0);
}

#[tokio::test]
async fn screen_broadcasts_are_deep_by_default() {
    let (screen, surface) = recording();
    let turtles = three_lines(&screen).await;
    assert_eq!(surface.count("line"), 3);

    turtles[1].clearscreen().await.unwrap();
    assert_eq!(surface.count("line"), 0);
    for turtle in &turtles {
        assert_ne!(turtle.position().await, Ok(Vec2D::ZERO));
    }

    turtles[2].resetscreen().await.unwrap();
    for turtle in &turtles {
        assert_eq!(turtle.position().await, Ok(Vec2D::ZERO));
        assert_eq!(turtle.heading().await, Ok(0.0));
    }
}

#[tokio::test]
async fn broadcasts_skip_disposed_turtles() {
    let (screen, surface) = recording();
    let turtles = three_lines(&screen).await;
    turtles[2].dispose();

    turtles[0].clearscreen_scoped(true).await.unwrap();
    assert_eq!(surface.count("line"), 1);
    assert_eq!(screen.turtles().len(), 2);
}

#[tokio::test]
async fn color_reports_pen_and_fill() {
    let (screen, _) = recording();
    let turtle = screen.turtle().unwrap();

    turtle.set_color("red", "#00ff00");
    assert_eq!(turtle.color().await, Ok((Color::rgb(255, 0, 0), Color::rgb(0, 255, 0))));
}

#[tokio::test]
async fn clone_copies_state_onto_a_new_pen() {
    let (screen, surface) = recording();
    let turtle = screen.turtle().unwrap();
    turtle.goto(10.0, 5.0);
    turtle.set_pencolor("red");
    turtle.left(90.0);

    let twin = turtle.clone_turtle().await.unwrap();
    assert_ne!(twin.pen_id(), turtle.pen_id());
    assert_eq!(screen.turtles().len(), 2);
    assert_eq!(twin.position().await, Ok(Vec2D::new(10.0, 5.0)));
    assert_eq!(twin.pencolor().await, Ok(Color::rgb(255, 0, 0)));

    twin.forward(10.0).await.unwrap();
    assert_eq!(surface.items_of(twin.pen_id()).iter().filter(|item| item.kind() == "line").count(), 1);
    assert_eq!(turtle.position().await, Ok(Vec2D::new(10.0, 5.0)));
}

#[tokio::test]
async fn disposed_turtles_leave_no_marker_and_refuse_work() {
    let (screen, surface) = recording();
    let turtle = screen.turtle().unwrap();
    assert_eq!(surface.items_of(turtle.pen_id()).len(), 1);

    turtle.dispose();
    assert!(turtle.is_disposed());
    assert!(surface.items_of(turtle.pen_id()).is_empty());
    assert_eq!(turtle.forward(1.0).await, Err(TurtleError::Disposed));
    assert!(screen.turtles().is_empty());
}

#[tokio::test]
async fn bye_disposes_everything() {
    let (screen, surface) = recording();
    let turtles = three_lines(&screen).await;

    screen.bye();
    assert!(screen.is_closed());
    assert!(turtles.iter().all(Turtle::is_disposed));
    assert!(surface.items().is_empty());
    assert_eq!(turtles[0].getscreen().map(|s| s.is_closed()).ok(), Some(true));
}

#[tokio::test]
async fn dialogs_answer_through_the_queue() {
    let surface = RecordingSurface::new(400.0, 400.0, Default::default());
    let dialog = ScriptedDialog::new([Reply::Text("Ada".to_string()), Reply::Number(142.0), Reply::Number(42.0)]);
    let screen = Screen::new(Arc::new(surface), Arc::new(dialog), TurtleConfig::default()).unwrap();
    let turtle = screen.turtle().unwrap();
    let range = || NumInput {
        title: "Size".to_string(),
        prompt: "How big?".to_string(),
        min: Some(0.0),
        max: Some(100.0),
        ..NumInput::default()
    };

    assert_eq!(turtle.textinput("Name", "Who?").await, Ok(Some("Ada".to_string())));
    assert_eq!(turtle.numinput(range()).await, Ok(None));
    assert_eq!(turtle.numinput(range()).await, Ok(Some(42.0)));
}

#[tokio::test(start_paused = true)]
async fn only_one_dialog_is_open_at_a_time() {
    let surface = RecordingSurface::new(400.0, 400.0, Default::default());
    let dialog = ScriptedDialog::new([Reply::Text("one".to_string()), Reply::Text("two".to_string())])
        .with_delay(Duration::from_millis(50));
    let screen = Screen::new(Arc::new(surface), Arc::new(dialog), TurtleConfig::default()).unwrap();
    let first = screen.turtle().unwrap();
    let second = screen.turtle().unwrap();

    let (a, b) = tokio::join!(first.textinput("A", "?"), second.textinput("B", "?"));
    let answers = [a.unwrap(), b.unwrap()];
    assert_eq!(answers.iter().filter(|answer| answer.is_none()).count(), 1);
    assert!(answers.contains(&Some("one".to_string())));
}

#[tokio::test]
async fn pointer_events_reach_the_turtle_listeners() {
    let (screen, _) = recording();
    let turtle = screen.turtle().unwrap();
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = seen.clone();
    let callback: PointerCallback = Arc::new(move |x: f64, y: f64| sink.lock().unwrap().push((x, y)));
    turtle.onclick(Some(callback), 1, false).await.unwrap();

    turtle.pointer(PointerAction::Down, 1, Vec2D::new(300.0, 100.0));
    assert_eq!(*seen.lock().unwrap(), vec![(50.0, 50.0)]);
}
