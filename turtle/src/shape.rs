// tortuga/turtle/src/shape.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Drawable turtle shapes and the shape cache.

use crate::color::Color;
use crate::error::{Result, TurtleError};
use crate::vector::Vec2D;
use std::collections::HashMap;
use std::f64::consts::FRAC_PI_2;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

#[derive(Clone, Debug, PartialEq)]
pub struct Component {
    pub poly: Vec<Vec2D>,
    pub fill: Color,
    pub outline: Option<Color>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Outline points plus a pre-rotation in radians.
    Polygon { points: Vec<Vec2D>, rotate: f64 },
    Compound(Vec<Component>),
    /// Reference to an image asset.
    Image(String),
    /// Raw RGBA pixels.
    Binary {
        data: Vec<u8>,
        width: u32,
        height: u32,
    },
}

impl Shape {
    pub fn polygon<P>(points: P, rotate: f64) -> Result<Shape>
    where
        P: IntoIterator,
        P::Item: Into<Vec2D>,
    {
        let points: Vec<Vec2D> = points.into_iter().map(Into::into).collect();
        check_polygon(&points)?;
        if !rotate.is_finite() {
            return Err(TurtleError::InvalidShape("rotation must be finite".to_string()));
        }
        Ok(Shape::Polygon { points, rotate })
    }

    /// An empty compound shape; fill it with [`Shape::add_component`].
    pub fn compound() -> Shape {
        Shape::Compound(Vec::new())
    }

    pub fn image<S: Into<String>>(source: S) -> Shape {
        Shape::Image(source.into())
    }

    pub fn binary(data: Vec<u8>, width: u32, height: u32) -> Result<Shape> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || data.len() != expected {
            return Err(TurtleError::InvalidShape(format!(
                "{}x{} RGBA buffer needs {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }
        Ok(Shape::Binary {
            data,
            width,
            height,
        })
    }

    pub fn add_component<P>(&mut self, poly: P, fill: Color, outline: Option<Color>) -> Result<()>
    where
        P: IntoIterator,
        P::Item: Into<Vec2D>,
    {
        let components = match self {
            Shape::Compound(components) => components,
            _ => {
                return Err(TurtleError::InvalidShape(
                    "components can only be added to compound shapes".to_string(),
                ))
            }
        };
        let poly: Vec<Vec2D> = poly.into_iter().map(Into::into).collect();
        check_polygon(&poly)?;
        components.push(Component {
            poly,
            fill,
            outline,
        });
        Ok(())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Polygon { .. } => "polygon",
            Shape::Compound(_) => "compound",
            Shape::Image(_) => "image",
            Shape::Binary { .. } => "binary",
        }
    }

    /// The outline used for hit-testing and `get_shapepoly`, if any.
    pub fn outline(&self) -> Option<&[Vec2D]> {
        match self {
            Shape::Polygon { points, .. } => Some(points),
            Shape::Compound(components) => components.first().map(|c| c.poly.as_slice()),
            Shape::Image(_) | Shape::Binary { .. } => None,
        }
    }

    /// Returns the shared instance for this definition.
    ///
    /// Structurally identical definitions resolve to the same `Arc` for as long
    /// as one of them is alive.
    pub fn intern(self) -> Arc<Shape> {
        static CACHE: OnceLock<Mutex<HashMap<ShapeKey, Weak<Shape>>>> = OnceLock::new();

        let key = ShapeKey::of(&self);
        let mut cache = CACHE
            .get_or_init(|| Mutex::new(HashMap::new()))
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(shared) = cache.get(&key).and_then(Weak::upgrade) {
            return shared;
        }
        cache.retain(|_, weak| weak.strong_count() > 0);
        let shared = Arc::new(self);
        cache.insert(key, Arc::downgrade(&shared));
        shared
    }
}

fn check_polygon(points: &[Vec2D]) -> Result<()> {
    if points.len() < 3 {
        return Err(TurtleError::InvalidShape(format!(
            "a polygon needs at least 3 points, got {}",
            points.len()
        )));
    }
    if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(TurtleError::InvalidShape("polygon points must be finite".to_string()));
    }
    Ok(())
}

type PointBits = Vec<(u64, u64)>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum ShapeKey {
    Polygon(PointBits, u64),
    Compound(Vec<(PointBits, Color, Option<Color>)>),
    Image(String),
    Binary(Vec<u8>, u32, u32),
}

impl ShapeKey {
    fn of(shape: &Shape) -> ShapeKey {
        fn bits(points: &[Vec2D]) -> PointBits {
            points.iter().map(|p| (p.x.to_bits(), p.y.to_bits())).collect()
        }
        match shape {
            Shape::Polygon { points, rotate } => ShapeKey::Polygon(bits(points), rotate.to_bits()),
            Shape::Compound(components) => ShapeKey::Compound(
                components
                    .iter()
                    .map(|c| (bits(&c.poly), c.fill, c.outline))
                    .collect(),
            ),
            Shape::Image(source) => ShapeKey::Image(source.clone()),
            Shape::Binary {
                data,
                width,
                height,
            } => ShapeKey::Binary(data.clone(), *width, *height),
        }
    }
}

pub const DEFAULT_SHAPE: &str = "classic";

/// The classic turtle shapes. Their points face +y, so each carries a quarter
/// turn clockwise to face heading 0.
pub fn builtin_shapes() -> Vec<(&'static str, Arc<Shape>)> {
    const ARROW: &[(f64, f64)] = &[(-10.0, 0.0), (10.0, 0.0), (0.0, 10.0)];
    const TURTLE: &[(f64, f64)] = &[
        (0.0, 16.0), (-2.0, 14.0), (-1.0, 10.0), (-4.0, 7.0), (-7.0, 9.0), (-9.0, 8.0),
        (-6.0, 5.0), (-7.0, 1.0), (-5.0, -3.0), (-8.0, -6.0), (-6.0, -8.0), (-4.0, -5.0),
        (0.0, -7.0), (4.0, -5.0), (6.0, -8.0), (8.0, -6.0), (5.0, -3.0), (7.0, 1.0),
        (6.0, 5.0), (9.0, 8.0), (7.0, 9.0), (4.0, 7.0), (1.0, 10.0), (2.0, 14.0),
    ];
    const SQUARE: &[(f64, f64)] = &[(10.0, -10.0), (10.0, 10.0), (-10.0, 10.0), (-10.0, -10.0)];
    const TRIANGLE: &[(f64, f64)] = &[(10.0, -5.77), (0.0, 11.55), (-10.0, -5.77)];
    const CLASSIC: &[(f64, f64)] = &[(0.0, 0.0), (-5.0, -9.0), (0.0, -7.0), (5.0, -9.0)];

    let circle: Vec<Vec2D> = (0..20)
        .map(|i| Vec2D::new(10.0, 0.0).rotate(i as f64 * 18.0))
        .collect();
    let polygon = |points: Vec<Vec2D>| -> Arc<Shape> {
        Shape::Polygon {
            points,
            rotate: -FRAC_PI_2,
        }
        .intern()
    };
    let points = |raw: &[(f64, f64)]| raw.iter().map(|&p| Vec2D::from(p)).collect::<Vec<_>>();

    vec![
        ("arrow", polygon(points(ARROW))),
        ("blank", Shape::compound().intern()),
        ("circle", polygon(circle)),
        ("classic", polygon(points(CLASSIC))),
        ("square", polygon(points(SQUARE))),
        ("triangle", polygon(points(TRIANGLE))),
        ("turtle", polygon(points(TURTLE))),
    ]
}
