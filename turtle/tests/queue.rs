// tortuga/turtle/tests/queue.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::time::Duration;
use tokio::time::Instant;
use tortuga::{CommandQueue, Screen, TurtleConfig, TurtleError, Vec2D};

fn screen() -> Screen {
    Screen::recording(TurtleConfig::default()).unwrap().0
}

#[tokio::test]
async fn chained_arguments_resolve_in_submission_order() {
    let screen = screen();
    let turtle = screen.turtle().unwrap();

    let a = turtle.forward(20.0);
    let x = turtle.xcor();
    let b = turtle.forward(&x);
    let c = turtle.xcor();

    assert_eq!(c.await, Ok(40.0));
    assert_eq!(a.await, Ok(()));
    assert_eq!(x.await, Ok(20.0));
    assert_eq!(b.await, Ok(()));
}

#[tokio::test]
async fn pending_arithmetic_feeds_later_operations() {
    let screen = screen();
    let turtle = screen.turtle().unwrap();

    turtle.goto(10.0, 4.0);
    let x = turtle.xcor().mul(2.0);
    let y = turtle.ycor().sub(1.0);
    turtle.goto(x, y);
    let far = turtle.distance(0.0, 0.0).gt(20.0);

    assert_eq!(turtle.position().await, Ok(Vec2D::new(20.0, 3.0)));
    assert_eq!(far.await, Ok(true));
}

#[tokio::test]
async fn a_failed_argument_fails_the_dependent_operation_only() {
    let screen = screen();
    let turtle = screen.turtle().unwrap();

    let bad = turtle.set_shapesize(Some(0.0), None, None);
    let width = bad.then_map(|_| 5.0);
    let dependent = turtle.set_pensize(width);
    let after = turtle.forward(10.0);

    assert_eq!(dependent.await, Err(TurtleError::ZeroStretch));
    assert_eq!(after.await, Ok(()));
    assert_eq!(turtle.pensize().await, Ok(1.0));
}

#[tokio::test(start_paused = true)]
async fn speed_pauses_after_each_mutation() {
    let screen = screen();
    let turtle = screen.turtle().unwrap();

    let start = Instant::now();
    turtle.forward(10.0).await.unwrap();
    assert!(start.elapsed() < Duration::from_millis(1));

    turtle.set_speed(2.0).await.unwrap();
    let start = Instant::now();
    turtle.forward(10.0).await.unwrap();
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(200), "{:?}", elapsed);
    assert!(elapsed < Duration::from_millis(250), "{:?}", elapsed);

    let start = Instant::now();
    assert_eq!(turtle.speed().await, Ok(2));
    assert!(start.elapsed() < Duration::from_millis(1));

    turtle.set_speed("fastest").await.unwrap();
    let start = Instant::now();
    turtle.forward(10.0).await.unwrap();
    assert!(start.elapsed() < Duration::from_millis(1));
}

#[tokio::test(start_paused = true)]
async fn only_turtles_sharing_a_queue_wait_for_each_other() {
    let screen = screen();
    let queue = CommandQueue::new().unwrap();
    let slow = screen.turtle_with_queue(queue.clone()).unwrap();
    let partner = screen.turtle_with_queue(queue).unwrap();
    let loner = screen.turtle().unwrap();

    let start = Instant::now();
    let speed = slow.set_speed(1.0);
    loner.forward(10.0).await.unwrap();
    assert!(start.elapsed() < Duration::from_millis(1));

    partner.forward(10.0).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(100));
    assert_eq!(speed.await, Ok(()));
}

#[tokio::test]
async fn failures_are_isolated_per_operation() {
    let screen = screen();
    let turtle = screen.turtle().unwrap();

    let shape = turtle.set_shape("no such shape");
    let color = turtle.set_pencolor("no such color");
    let moved = turtle.forward(10.0);
    let singular = turtle.set_shapetransform([1.0, 2.0, 2.0, 4.0]);
    let matrix = turtle.shapetransform();

    assert!(shape.await.unwrap_err().is_lookup());
    assert!(color.await.unwrap_err().is_lookup());
    assert_eq!(moved.await, Ok(()));
    assert_eq!(singular.await, Err(TurtleError::SingularTransform));
    assert_eq!(matrix.await, Ok([1.0, 0.0, 0.0, 1.0]));
    assert_eq!(turtle.shape().await, Ok("classic".to_string()));
}

#[tokio::test]
async fn shapetransform_identity_decomposes_to_defaults() {
    let screen = screen();
    let turtle = screen.turtle().unwrap();

    turtle.set_shapetransform([1.0, 0.0, 0.0, 1.0]).await.unwrap();
    let (wid, len, _) = turtle.shapesize().await.unwrap();
    assert!((wid - 1.0).abs() < 1e-12 && (len - 1.0).abs() < 1e-12);
    assert!(turtle.shearfactor().await.unwrap().abs() < 1e-12);
    assert!(turtle.tiltangle().await.unwrap().abs() < 1e-12);
}

#[tokio::test]
async fn undo_entries_count_mutations_only() {
    let screen = screen();
    let turtle = screen.turtle().unwrap();

    turtle.forward(10.0);
    turtle.left(90.0);
    turtle.heading();
    turtle.set_pensize(-1.0);
    assert_eq!(turtle.undobufferentries().await, Ok(2));

    turtle.setundobuffer(None);
    turtle.forward(10.0);
    assert_eq!(turtle.undobufferentries().await, Ok(0));
}
