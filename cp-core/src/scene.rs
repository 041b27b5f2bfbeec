//! In-memory [`Renderer`] that keeps every live shape until it is removed.
//!
//! The viewer paints a [`Scene`] each frame; headless runs use it to inspect
//! what a playback left behind.

use std::collections::BTreeMap;

use crate::{
    player::Renderer,
    types::{BlockTag, Bounds, LineKind, Point},
};

/// Handle of a shape inside a [`Scene`]. Ids increase in drawing order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Point(Point),
    Line { a: Point, b: Point, kind: LineKind },
    Rect { bounds: Bounds, tag: BlockTag },
}

#[derive(Debug, Default)]
pub struct Scene {
    shapes: BTreeMap<ShapeId, Shape>,
    next_id: u64,
    draw_calls: usize,
    remove_calls: usize,
}

impl Scene {
    /// Live shapes in drawing order.
    pub fn shapes(&self) -> impl Iterator<Item = (ShapeId, &Shape)> + '_ {
        self.shapes.iter().map(|(id, shape)| (*id, shape))
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn draw_calls(&self) -> usize {
        self.draw_calls
    }

    pub fn remove_calls(&self) -> usize {
        self.remove_calls
    }

    fn insert(&mut self, shape: Shape) -> ShapeId {
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        self.draw_calls += 1;
        self.shapes.insert(id, shape);
        id
    }
}

impl Renderer for Scene {
    type Handle = ShapeId;

    fn draw_point(&mut self, p: Point) -> ShapeId {
        self.insert(Shape::Point(p))
    }

    fn draw_line(&mut self, a: Point, b: Point, kind: LineKind) -> ShapeId {
        self.insert(Shape::Line { a, b, kind })
    }

    fn draw_rect(&mut self, bounds: Bounds, tag: BlockTag) -> ShapeId {
        self.insert(Shape::Rect { bounds, tag })
    }

    fn remove(&mut self, handle: ShapeId) {
        self.remove_calls += 1;
        if self.shapes.remove(&handle).is_none() {
            tracing::warn!(?handle, "removing a shape that is not in the scene");
        }
    }
}
