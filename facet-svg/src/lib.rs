//! Facet-derived SVG elements for pen-plotter documents.
//!
//! Only the elements a plot needs are modeled: the root, groups, `<defs>`
//! with a `<style>` sheet, and `<path>`. Serialize with [`facet_xml`].

use facet::Facet;
use facet_xml as xml;

/// SVG namespace URI
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Root SVG element
#[derive(Facet, Debug, Clone, Default)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
pub struct Svg {
    #[facet(xml::attribute)]
    pub xmlns: Option<String>,
    /// Physical width, e.g. `23.4in`
    #[facet(xml::attribute)]
    pub width: Option<String>,
    #[facet(xml::attribute)]
    pub height: Option<String>,
    #[facet(xml::attribute, rename = "viewBox")]
    pub view_box: Option<String>,
    #[facet(xml::elements)]
    pub children: Vec<SvgNode>,
}

/// Any node a plot document contains
#[derive(Facet, Debug, Clone)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
#[repr(u8)]
pub enum SvgNode {
    #[facet(rename = "g")]
    G(Group),
    #[facet(rename = "defs")]
    Defs(Defs),
    #[facet(rename = "style")]
    Style(Style),
    #[facet(rename = "path")]
    Path(Path),
}

/// SVG group element (`<g>`)
#[derive(Facet, Debug, Clone, Default)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
pub struct Group {
    #[facet(xml::attribute)]
    pub id: Option<String>,
    #[facet(xml::attribute)]
    pub class: Option<String>,
    #[facet(xml::attribute)]
    pub transform: Option<String>,
    #[facet(xml::elements)]
    pub children: Vec<SvgNode>,
}

/// SVG defs element (`<defs>`)
#[derive(Facet, Debug, Clone, Default)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
pub struct Defs {
    #[facet(xml::elements)]
    pub children: Vec<SvgNode>,
}

/// SVG style element (`<style>`)
#[derive(Facet, Debug, Clone, Default)]
pub struct Style {
    #[facet(xml::attribute, rename = "type")]
    pub type_: Option<String>,
    #[facet(xml::text)]
    pub content: String,
}

/// SVG path element (`<path>`)
#[derive(Facet, Debug, Clone, Default)]
#[facet(xml::ns_all = "http://www.w3.org/2000/svg")]
pub struct Path {
    #[facet(xml::attribute)]
    pub d: Option<String>,
    #[facet(xml::attribute)]
    pub stroke: Option<String>,
    #[facet(xml::attribute)]
    pub fill: Option<String>,
    #[facet(xml::attribute, rename = "stroke-width")]
    pub stroke_width: Option<String>,
    #[facet(xml::attribute)]
    pub class: Option<String>,
    #[facet(xml::attribute)]
    pub transform: Option<String>,
    #[facet(xml::attribute)]
    pub style: Option<String>,
}

impl Path {
    /// An unfilled stroked path.
    pub fn stroked(d: impl Into<String>, stroke: &str, stroke_width: &str) -> Self {
        Path {
            d: Some(d.into()),
            stroke: Some(stroke.to_string()),
            fill: Some("none".to_string()),
            stroke_width: Some(stroke_width.to_string()),
            ..Default::default()
        }
    }
}

// Re-export facet_xml for convenience
pub use facet_xml;
