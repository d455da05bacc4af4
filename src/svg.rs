//! SVG generation for canvas documents
//!
//! The plotter reads physical size from `width`/`height` (inches) and maps the
//! pixel `viewBox` onto it. Lines keep a constant width regardless of the
//! decoration scale through `vector-effect: non-scaling-stroke`.

use facet_svg::{Defs, Path, SVG_NS, Style, Svg, SvgNode};

use crate::document::{CanvasDocument, DecorationPath};
use crate::errors::SvgError;
use crate::segment::CanvasPath;

const STROKE: &str = "#000";
const STROKE_WIDTH: &str = "1";
const NON_SCALING_CLASS: &str = "vectorEffectClass";

/// Build the `d` attribute for a canvas path: `M x,y L x,y ...`.
pub fn path_data(path: &CanvasPath) -> String {
    path.points()
        .iter()
        .enumerate()
        .map(|(index, p)| {
            let cmd = if index == 0 { 'M' } else { 'L' };
            format!("{}{},{}", cmd, fmt_num(p.x), fmt_num(p.y))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn decoration_node(deco: &DecorationPath) -> SvgNode {
    SvgNode::Path(Path {
        class: Some(NON_SCALING_CLASS.to_string()),
        transform: Some(deco.placement.to_transform()),
        ..Path::stroked(deco.d.as_str(), STROKE, STROKE_WIDTH)
    })
}

fn path_node(path: &CanvasPath) -> SvgNode {
    SvgNode::Path(Path::stroked(path_data(path), STROKE, STROKE_WIDTH))
}

/// Build the SVG element tree for a document: the stylesheet, then the
/// decorations, then the stroke paths in drawing order.
pub fn build_svg(doc: &CanvasDocument) -> Svg {
    let style = Style {
        type_: Some("text/css".to_string()),
        content: format!(
            ".{} {{ vector-effect: non-scaling-stroke; }}",
            NON_SCALING_CLASS
        ),
    };

    let mut children = Vec::with_capacity(1 + doc.decorations.len() + doc.paths.len());
    children.push(SvgNode::Defs(Defs {
        children: vec![SvgNode::Style(style)],
    }));
    children.extend(doc.decorations.iter().map(decoration_node));
    children.extend(doc.paths.iter().map(path_node));

    Svg {
        xmlns: Some(SVG_NS.to_string()),
        width: Some(format!("{}in", fmt_num(doc.canvas.width.raw()))),
        height: Some(format!("{}in", fmt_num(doc.canvas.height.raw()))),
        view_box: Some(format!(
            "0 0 {} {}",
            fmt_num(doc.width_px),
            fmt_num(doc.height_px)
        )),
        children,
    }
}

/// Serialize a canvas document to an SVG string.
pub fn to_svg(doc: &CanvasDocument) -> Result<String, SvgError> {
    let svg = build_svg(doc);
    facet_svg::facet_xml::to_string(&svg).map_err(|e| SvgError {
        message: e.to_string(),
    })
}

/// Format a number with 6 significant figures, trailing zeros trimmed.
pub(crate) fn fmt_num(value: f64) -> String {
    fmt_num_precision(value, 6)
}

/// Format a number with specified significant figures, trailing zeros trimmed.
fn fmt_num_precision(value: f64, sig_figs: i32) -> String {
    if value == 0.0 || !value.is_finite() {
        return "0".to_string();
    }

    // Round to specified significant figures
    let abs_val = value.abs();
    let magnitude = abs_val.log10().floor() as i32;
    let scale = 10_f64.powi(sig_figs - 1 - magnitude);
    let rounded = (value * scale).round() / scale;

    // Format with enough decimal places, then trim
    let decimals = (sig_figs - 1 - magnitude).max(0) as usize;
    let s = format!("{:.prec$}", rounded, prec = decimals);
    if !s.contains('.') {
        return s;
    }
    let s = s.trim_end_matches('0');
    let s = s.trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}
