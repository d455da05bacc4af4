//! plotyard: turns recorded 2-D strokes into pen-plotter drawings.
//!
//! Strokes are mapped from their data range onto a letterboxed viewport of a
//! fixed physical canvas, split wherever they leave the viewport, and combined
//! with decorative line art into a [`CanvasDocument`]. A [`PlotSession`] then
//! drives a [`PlotDevice`] through the document; a device fault leaves a
//! [`RunArtifact`] behind so the drawing can be resumed where it stopped.

pub mod config;
pub mod defaults;
pub mod device;
pub mod dispatch;
pub mod document;
pub mod errors;
pub mod guard;
pub mod log;
pub mod mapper;
pub mod path_data;
pub mod segment;
pub mod session;
pub mod source;
pub mod svg;
pub mod types;

pub use config::Config;
pub use device::{DeviceOptions, PlotDevice, PlotMode, PreviewDevice, RuntimeFault};
pub use dispatch::{Dispatcher, Trigger, TriggerSender};
pub use document::{CanvasDocument, Decoration, PlotItem};
pub use errors::{ArtifactError, ConfigError, LayoutError, PlotError, SessionError, SourceError, SvgError};
pub use guard::{SessionGuard, SessionPermit};
pub use segment::{CanvasPath, Stroke};
pub use session::{FaultCategory, PlotSession, RunArtifact, RunOutcome, SessionState};
pub use source::{JsonLinesSource, MemorySource, RecordSource};
pub use types::{CanvasSpec, DataRect, Length, Point, Viewport};

/// Lay out `strokes` with the configured canvas and decorations and render
/// the result to SVG.
pub fn render_svg(config: &Config, strokes: &[Stroke]) -> Result<String, miette::Report> {
    let canvas = config.canvas.to_spec()?;
    let document = CanvasDocument::build(config.data_rect, canvas, &config.decorations, strokes)?;
    Ok(svg::to_svg(&document)?)
}
