//! Default canvas, data range and run settings

use crate::types::{DataRect, Length as Inches};

/// Paper size: A1 portrait
pub const CANVAS_WIDTH: Inches = Inches::inches(23.4);
pub const CANVAS_HEIGHT: Inches = Inches::inches(33.1);
pub const CANVAS_PADDING: Inches = Inches::inches(0.25);
pub const DPI: f64 = 100.0;

/// Data range the records are recorded in
pub const DATA_RECT: DataRect = DataRect::new(-4.2, 2.2, 1.5, 14.0);

/// Most recent strokes fetched per run
pub const RECORD_LIMIT: usize = 40;

pub const OUTPUT_DIR: &str = "outputs";
