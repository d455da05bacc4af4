//! Canvas document assembly: one viewport, placed decorations, and the
//! segmented strokes, in the order the plotter draws them.

use glam::{DVec2, dvec2};
use serde::{Deserialize, Serialize};

use crate::errors::LayoutError;
use crate::mapper::{compute_viewport, to_canvas};
use crate::path_data::parse_polylines;
use crate::segment::{CanvasPath, Stroke, segment};
use crate::types::{CanvasSpec, DataRect, Point, Viewport};

/// Decorative line art as configured: path data in its own coordinates,
/// anchored at a data-space position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub title: String,
    /// Rotation in degrees, clockwise on the canvas
    #[serde(default)]
    pub rotate: f64,
    #[serde(default = "unit_scale")]
    pub scale: f64,
    /// Data-space anchor the path origin is translated to
    pub anchor: [f64; 2],
    pub paths: Vec<String>,
}

fn unit_scale() -> f64 {
    1.0
}

/// Canvas placement of a decoration: `translate(..) rotate(..) scale(..)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub translate: Point,
    pub rotate: f64,
    pub scale: f64,
}

impl Placement {
    /// Path coordinates → canvas coordinates.
    pub fn apply(&self, p: Point) -> Point {
        DVec2::from_angle(self.rotate.to_radians()).rotate(p * self.scale) + self.translate
    }

    /// SVG `transform` attribute value.
    pub fn to_transform(&self) -> String {
        format!(
            "translate({} {}) rotate({}) scale({})",
            crate::svg::fmt_num(self.translate.x),
            crate::svg::fmt_num(self.translate.y),
            crate::svg::fmt_num(self.rotate),
            crate::svg::fmt_num(self.scale)
        )
    }
}

/// One path of a placed decoration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecorationPath {
    pub title: String,
    /// Original path data, emitted untouched into the SVG
    pub d: String,
    pub placement: Placement,
    /// The same geometry in canvas space, for the plotter
    pub polylines: Vec<CanvasPath>,
}

impl DecorationPath {
    fn place(title: &str, d: &str, placement: Placement) -> Result<Self, LayoutError> {
        let polylines = parse_polylines(d)
            .map_err(|message| LayoutError::InvalidPathData {
                title: title.to_string(),
                message,
            })?
            .into_iter()
            .filter_map(|line| CanvasPath::new(line.into_iter().map(|p| placement.apply(p)).collect()))
            .collect();
        Ok(DecorationPath {
            title: title.to_string(),
            d: d.to_string(),
            placement,
            polylines,
        })
    }
}

/// A single drawable unit, in plotting order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlotItem {
    Decoration(DecorationPath),
    Path { path: CanvasPath },
}

impl PlotItem {
    /// Pen-down polylines that make up this item.
    pub fn polylines(&self) -> &[CanvasPath] {
        match self {
            PlotItem::Decoration(deco) => &deco.polylines,
            PlotItem::Path { path } => std::slice::from_ref(path),
        }
    }
}

/// Everything the plotter will draw for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasDocument {
    pub canvas: CanvasSpec,
    pub width_px: f64,
    pub height_px: f64,
    pub data_rect: DataRect,
    pub viewport: Viewport,
    pub decorations: Vec<DecorationPath>,
    pub paths: Vec<CanvasPath>,
}

impl CanvasDocument {
    /// Lay out decorations and strokes on the canvas.
    ///
    /// Decorations are positioned but never clipped; strokes are segmented
    /// against the viewport.
    pub fn build(
        data_rect: DataRect,
        canvas: CanvasSpec,
        decorations: &[Decoration],
        strokes: &[Stroke],
    ) -> Result<Self, LayoutError> {
        let width_px = canvas.width_px();
        let height_px = canvas.height_px();
        let viewport = compute_viewport(width_px, height_px, canvas.padding_px(), &data_rect)?;

        let mut placed = Vec::new();
        for deco in decorations {
            let placement = Placement {
                translate: to_canvas(dvec2(deco.anchor[0], deco.anchor[1]), &data_rect, &viewport),
                rotate: deco.rotate,
                scale: deco.scale,
            };
            for d in &deco.paths {
                placed.push(DecorationPath::place(&deco.title, d, placement)?);
            }
        }

        let paths: Vec<CanvasPath> = strokes
            .iter()
            .flat_map(|stroke| segment(stroke, &data_rect, &viewport))
            .collect();

        crate::log::info!(
            decorations = placed.len(),
            strokes = strokes.len(),
            paths = paths.len(),
            "built canvas document"
        );

        Ok(CanvasDocument {
            canvas,
            width_px,
            height_px,
            data_rect,
            viewport,
            decorations: placed,
            paths,
        })
    }

    /// Decorations first, then derived paths.
    pub fn items(&self) -> impl Iterator<Item = PlotItem> + '_ {
        self.decorations
            .iter()
            .cloned()
            .map(PlotItem::Decoration)
            .chain(self.paths.iter().cloned().map(|path| PlotItem::Path { path }))
    }

    pub fn item_count(&self) -> usize {
        self.decorations.len() + self.paths.len()
    }
}
