// tortuga/turtle/src/recording.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An in-memory surface that records a display list.

use crate::canvas::{Canvas, Dimension, Extent, ItemId, Pose, ShapeOptions, ShapeUpdate, Stroke};
use crate::canvas::{Surface, TextStyle};
use crate::color::Color;
use crate::error::{Result, TurtleError};
use crate::shape::Shape;
use crate::transform::{DeviceSize, Origin};
use crate::vector::Vec2D;
use serde_derive::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayItem {
    Line {
        from: Vec2D,
        to: Vec2D,
        color: Color,
        width: f64,
    },
    Circle {
        center: Vec2D,
        radius: f64,
        color: Color,
        filled: bool,
    },
    Polygon {
        points: Vec<Vec2D>,
        fill: Color,
    },
    Shape {
        shape: String,
        pose: Pose,
    },
    Text {
        at: Vec2D,
        text: String,
        style: TextStyle,
    },
}

impl DisplayItem {
    pub fn kind(&self) -> &'static str {
        match self {
            DisplayItem::Line { .. } => "line",
            DisplayItem::Circle { .. } => "circle",
            DisplayItem::Polygon { .. } => "polygon",
            DisplayItem::Shape { .. } => "shape",
            DisplayItem::Text { .. } => "text",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Entry {
    pub id: ItemId,
    pub pen: String,
    pub item: DisplayItem,
}

/// Everything on the surface at one moment.
#[derive(Clone, Debug, Serialize)]
pub struct SceneSnapshot {
    pub width: f64,
    pub height: f64,
    pub origin: String,
    pub background: Color,
    pub picture: Option<String>,
    pub items: Vec<Entry>,
}

#[derive(Debug)]
struct Scene {
    items: Vec<Entry>,
    background: Color,
    picture: Option<String>,
    width: Dimension,
    height: Dimension,
    container: DeviceSize,
    origin: Origin,
    next_id: u64,
}

impl Scene {
    fn push(&mut self, pen: &str, item: DisplayItem) -> ItemId {
        self.next_id += 1;
        let id = ItemId(self.next_id);
        self.items.push(Entry {
            id,
            pen: pen.to_string(),
            item,
        });
        id
    }

    fn resolve(dimension: Dimension, container: f64) -> f64 {
        match dimension {
            Dimension::Pixels(pixels) => pixels,
            Dimension::Auto => container,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RecordingSurface {
    scene: Arc<Mutex<Scene>>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64, origin: Origin) -> RecordingSurface {
        RecordingSurface {
            scene: Arc::new(Mutex::new(Scene {
                items: Vec::new(),
                background: Color::WHITE,
                picture: None,
                width: Dimension::Pixels(width),
                height: Dimension::Pixels(height),
                container: DeviceSize::new(width, height),
                origin,
                next_id: 0,
            })),
        }
    }

    fn scene(&self) -> MutexGuard<'_, Scene> {
        self.scene.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resizes the host container that `"auto"` dimensions follow.
    pub fn resize_container(&self, width: f64, height: f64) {
        self.scene().container = DeviceSize::new(width, height);
    }

    pub fn items(&self) -> Vec<DisplayItem> {
        self.scene().items.iter().map(|entry| entry.item.clone()).collect()
    }

    pub fn items_of(&self, pen: &str) -> Vec<DisplayItem> {
        self.scene()
            .items
            .iter()
            .filter(|entry| entry.pen == pen)
            .map(|entry| entry.item.clone())
            .collect()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.scene().items.iter().filter(|entry| entry.item.kind() == kind).count()
    }

    pub fn lines(&self) -> Vec<(Vec2D, Vec2D)> {
        self.scene()
            .items
            .iter()
            .filter_map(|entry| match entry.item {
                DisplayItem::Line { from, to, .. } => Some((from, to)),
                _ => None,
            })
            .collect()
    }

    pub fn item(&self, id: ItemId) -> Option<DisplayItem> {
        let scene = self.scene();
        scene.items.iter().find(|entry| entry.id == id).map(|entry| entry.item.clone())
    }

    pub fn background(&self) -> (Color, Option<String>) {
        let scene = self.scene();
        (scene.background, scene.picture.clone())
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        let scene = self.scene();
        SceneSnapshot {
            width: Scene::resolve(scene.width, scene.container.width),
            height: Scene::resolve(scene.height, scene.container.height),
            origin: scene.origin.to_string(),
            background: scene.background,
            picture: scene.picture.clone(),
            items: scene.items.clone(),
        }
    }
}

impl Surface for RecordingSurface {
    fn bind(&self, pen: &str) -> Box<dyn Canvas> {
        Box::new(RecordingCanvas {
            pen: pen.to_string(),
            surface: self.clone(),
            shapes: BTreeMap::new(),
            objects: Vec::new(),
        })
    }

    fn reset(&self) {
        let mut scene = self.scene();
        scene.items.clear();
        scene.background = Color::WHITE;
        scene.picture = None;
    }
}

/// One pen's view of a [`RecordingSurface`].
pub struct RecordingCanvas {
    pen: String,
    surface: RecordingSurface,
    shapes: BTreeMap<String, (Arc<Shape>, ShapeOptions)>,
    objects: Vec<ItemId>,
}

impl RecordingCanvas {
    fn record(&mut self, item: DisplayItem) -> ItemId {
        let id = self.surface.scene().push(&self.pen, item);
        self.objects.push(id);
        id
    }
}

impl Canvas for RecordingCanvas {
    fn line(&mut self, from: Vec2D, to: Vec2D, stroke: Stroke) -> Extent {
        self.record(DisplayItem::Line {
            from,
            to,
            color: stroke.color,
            width: stroke.width,
        });
        let size = (to - from).abs();
        Extent {
            w: size.x,
            h: size.y,
        }
    }

    fn circle(&mut self, center: Vec2D, radius: f64, color: Color, filled: bool) -> Extent {
        self.record(DisplayItem::Circle {
            center,
            radius,
            color,
            filled,
        });
        Extent {
            w: radius * 2.0,
            h: radius * 2.0,
        }
    }

    fn polygon(&mut self, points: &[Vec2D], fill: Color) -> Extent {
        let (mut min, mut max) = (Vec2D::new(f64::MAX, f64::MAX), Vec2D::new(f64::MIN, f64::MIN));
        for p in points {
            min = Vec2D::new(min.x.min(p.x), min.y.min(p.y));
            max = Vec2D::new(max.x.max(p.x), max.y.max(p.y));
        }
        self.record(DisplayItem::Polygon {
            points: points.to_vec(),
            fill,
        });
        if points.is_empty() {
            return Extent::default();
        }
        Extent {
            w: max.x - min.x,
            h: max.y - min.y,
        }
    }

    fn draw_shape(&mut self, name: &str, pose: Pose) -> Result<ItemId> {
        if !self.shapes.contains_key(name) {
            return Err(TurtleError::UnknownShape(name.to_string()));
        }
        Ok(self.record(DisplayItem::Shape {
            shape: name.to_string(),
            pose,
        }))
    }

    fn modify_shape(&mut self, id: ItemId, update: ShapeUpdate) -> Result<()> {
        if let Some(name) = &update.appearance {
            if !self.shapes.contains_key(name) {
                return Err(TurtleError::UnknownShape(name.clone()));
            }
        }
        let mut scene = self.surface.scene();
        let entry = scene
            .items
            .iter_mut()
            .find(|entry| entry.id == id && entry.pen == self.pen);
        if let Some(Entry {
            item: DisplayItem::Shape { shape, pose },
            ..
        }) = entry
        {
            if let Some(new_pose) = update.pose {
                *pose = new_pose;
            }
            if let Some(name) = update.appearance {
                *shape = name;
            }
        }
        Ok(())
    }

    fn remove_shape(&mut self, id: ItemId) {
        self.objects.retain(|object| *object != id);
        self.surface.scene().items.retain(|entry| entry.id != id);
    }

    fn register_shape(&mut self, name: &str, shape: Arc<Shape>, options: ShapeOptions) -> Result<()> {
        if self.shapes.contains_key(name) {
            return Err(TurtleError::ShapeExists(name.to_string()));
        }
        self.shapes.insert(name.to_string(), (shape, options));
        Ok(())
    }

    fn unregister_shape(&mut self, name: &str) -> bool {
        self.shapes.remove(name).is_some()
    }

    fn shape(&self, name: &str) -> Option<Arc<Shape>> {
        self.shapes.get(name).map(|(shape, _)| shape.clone())
    }

    fn shape_names(&self) -> Vec<String> {
        self.shapes.keys().cloned().collect()
    }

    fn clear(&mut self, forget_shapes: bool) {
        let objects = std::mem::take(&mut self.objects);
        self.surface
            .scene()
            .items
            .retain(|entry| !objects.contains(&entry.id));
        if forget_shapes {
            self.shapes.retain(|_, (_, options)| options.protected);
        }
    }

    fn write(&mut self, at: Vec2D, text: &str, style: &TextStyle) -> Extent {
        self.record(DisplayItem::Text {
            at,
            text: text.to_string(),
            style: style.clone(),
        });
        Extent {
            w: 0.6 * style.font.size * text.chars().count() as f64,
            h: 1.2 * style.font.size,
        }
    }

    fn bgcolor(&mut self, color: Color) {
        self.surface.scene().background = color;
    }

    fn bgpic(&mut self, picture: Option<&str>) {
        self.surface.scene().picture = picture.map(str::to_string);
    }

    fn width(&self) -> f64 {
        let scene = self.surface.scene();
        Scene::resolve(scene.width, scene.container.width)
    }

    fn height(&self) -> f64 {
        let scene = self.surface.scene();
        Scene::resolve(scene.height, scene.container.height)
    }

    fn set_width(&mut self, width: Dimension) {
        self.surface.scene().width = width;
    }

    fn set_height(&mut self, height: Dimension) {
        self.surface.scene().height = height;
    }

    fn x0y0(&self) -> Origin {
        self.surface.scene().origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::builtin_shapes;

    fn canvas_with_shapes(surface: &RecordingSurface, pen: &str) -> Box<dyn Canvas> {
        let mut canvas = surface.bind(pen);
        for (name, shape) in builtin_shapes() {
            canvas
                .register_shape(name, shape, ShapeOptions { protected: true })
                .unwrap();
        }
        canvas
    }

    #[test]
    fn pens_share_the_surface_but_not_shapes() {
        let surface = RecordingSurface::new(200.0, 100.0, Origin::TOP_LEFT);
        let mut a = canvas_with_shapes(&surface, "PEN_a");
        let mut b = canvas_with_shapes(&surface, "PEN_b");
        let custom = Shape::polygon(vec![(0.0, 0.0), (3.0, 0.0), (0.0, 3.0)], 0.0).unwrap().intern();

        a.register_shape("wedge", custom.clone(), ShapeOptions::default()).unwrap();
        b.register_shape("wedge", custom, ShapeOptions::default()).unwrap();
        assert!(a.has_shape("wedge"));

        a.line(Vec2D::ZERO, Vec2D::new(5.0, 5.0), Stroke { color: Color::BLACK, width: 1.0 });
        b.circle(Vec2D::ZERO, 2.0, Color::BLACK, true);
        assert_eq!(surface.items().len(), 2);

        a.clear(false);
        assert_eq!(surface.items_of("PEN_a").len(), 0);
        assert_eq!(surface.items_of("PEN_b").len(), 1);
        assert!(a.has_shape("wedge"));
        a.clear(true);
        assert!(a.shape("wedge").is_none());
        assert!(a.shape("turtle").is_some());
        assert!(b.shape("wedge").is_some());
    }

    #[test]
    fn duplicate_and_unknown_shapes() {
        let surface = RecordingSurface::new(200.0, 100.0, Origin::TOP_LEFT);
        let mut canvas = canvas_with_shapes(&surface, "PEN_0");
        let turtle = canvas.shape("turtle").unwrap();
        let err = canvas
            .register_shape("turtle", turtle, ShapeOptions::default())
            .unwrap_err();
        assert!(err.is_validation());
        assert!(canvas.draw_shape("nope", Pose::default()).unwrap_err().is_lookup());

        let id = canvas.draw_shape("turtle", Pose::default()).unwrap();
        let update = ShapeUpdate {
            appearance: Some("nope".to_string()),
            ..ShapeUpdate::default()
        };
        assert!(canvas.modify_shape(id, update).is_err());
        canvas
            .modify_shape(id, ShapeUpdate { appearance: Some("square".to_string()), pose: None })
            .unwrap();
        match surface.item(id) {
            Some(DisplayItem::Shape { shape, .. }) => assert_eq!(shape, "square"),
            other => panic!("unexpected {:?}", other),
        }
        canvas.remove_shape(id);
        assert!(surface.item(id).is_none());
    }

    #[test]
    fn auto_size_tracks_container() {
        let surface = RecordingSurface::new(200.0, 100.0, Origin::TOP_LEFT);
        let mut canvas = surface.bind("PEN_0");
        canvas.set_width(Dimension::Auto);
        surface.resize_container(640.0, 480.0);
        assert_eq!(canvas.width(), 640.0);
        assert_eq!(canvas.height(), 100.0);
        canvas.bgcolor(Color::BLACK);
        canvas.bgpic(Some("sky.png"));
        surface.reset();
        assert_eq!(surface.background(), (Color::WHITE, None));
    }
}
