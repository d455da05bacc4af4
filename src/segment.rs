//! Stroke segmentation against the canvas viewport.
//!
//! A stroke may wander outside the plottable area. Every contiguous run of
//! strictly-inside points becomes its own pen-down path; runs of a single
//! point cannot form a line and are dropped.

use serde::{Deserialize, Serialize};

use crate::errors::LayoutError;
use crate::mapper::to_canvas;
use crate::types::{DataRect, Point, Viewport};

/// One continuous pen-down gesture in data space. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    points: Vec<Point>,
}

impl Stroke {
    pub fn new(points: Vec<Point>) -> Result<Self, LayoutError> {
        if points.is_empty() {
            return Err(LayoutError::EmptyStroke);
        }
        Ok(Stroke { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Two or more canvas-space points drawn as one continuous line.
///
/// Serialized as a bare point list; deserializing a shorter list fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct CanvasPath {
    points: Vec<Point>,
}

impl CanvasPath {
    /// Returns `None` for fewer than two points.
    pub fn new(points: Vec<Point>) -> Option<Self> {
        (points.len() > 1).then_some(CanvasPath { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl TryFrom<Vec<Point>> for CanvasPath {
    type Error = LayoutError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        let count = points.len();
        CanvasPath::new(points).ok_or(LayoutError::ShortPath { points: count })
    }
}

impl From<CanvasPath> for Vec<Point> {
    fn from(path: CanvasPath) -> Self {
        path.points
    }
}

/// Lazily split `stroke` into in-viewport canvas paths.
pub fn segment<'a>(stroke: &'a Stroke, data_rect: &DataRect, viewport: &Viewport) -> Segments<'a> {
    Segments {
        points: stroke.points().iter().enumerate(),
        last_index: stroke.len() - 1,
        data_rect: *data_rect,
        viewport: *viewport,
        run: Vec::new(),
    }
}

/// Iterator returned by [`segment`].
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    points: std::iter::Enumerate<std::slice::Iter<'a, Point>>,
    last_index: usize,
    data_rect: DataRect,
    viewport: Viewport,
    run: Vec<Point>,
}

impl Iterator for Segments<'_> {
    type Item = CanvasPath;

    fn next(&mut self) -> Option<CanvasPath> {
        for (index, point) in self.points.by_ref() {
            let mapped = to_canvas(*point, &self.data_rect, &self.viewport);
            let inside = self.viewport.contains_strict(mapped);
            if inside {
                self.run.push(mapped);
            }

            // The final point closes the run whether or not it was inside
            if !inside || index == self.last_index {
                let run = std::mem::take(&mut self.run);
                if let Some(path) = CanvasPath::new(run) {
                    return Some(path);
                }
            }
        }
        None
    }
}
