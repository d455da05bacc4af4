//! Record sources: where strokes come from.
//!
//! A record carries one stroke as a list of positions whose coordinates are
//! serialized as text. Sources hand out the most recent strokes first.

use camino::Utf8PathBuf;
use glam::dvec2;
use serde::Deserialize;

use crate::errors::SourceError;
use crate::segment::Stroke;

/// Supplies the strokes for a run.
pub trait RecordSource {
    /// Up to `limit` strokes, newest first. No retries.
    fn recent_strokes(&mut self, limit: usize) -> Result<Vec<Stroke>, SourceError>;
}

/// A coordinate as stored in a record: usually text, occasionally a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Text(String),
    Number(f64),
}

impl Coordinate {
    fn value(&self) -> Result<f64, String> {
        match self {
            Coordinate::Number(v) => Ok(*v),
            Coordinate::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("coordinate `{}` is not a number", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Position {
    x: Coordinate,
    y: Coordinate,
}

#[derive(Debug, Clone, Deserialize)]
struct Record {
    #[serde(default)]
    pos: Vec<Position>,
}

impl Record {
    /// `None` for a record without positions.
    fn into_stroke(self) -> Result<Option<Stroke>, String> {
        if self.pos.is_empty() {
            return Ok(None);
        }
        let points = self
            .pos
            .iter()
            .map(|p| Ok(dvec2(p.x.value()?, p.y.value()?)))
            .collect::<Result<Vec<_>, String>>()?;
        Stroke::new(points).map(Some).map_err(|e| e.to_string())
    }
}

/// Parse one JSON record into a stroke.
pub fn parse_record(json: &str) -> Result<Option<Stroke>, String> {
    let record: Record = serde_json::from_str(json).map_err(|e| e.to_string())?;
    record.into_stroke()
}

/// One JSON record per line, oldest first; the newest record is the last line.
#[derive(Debug, Clone)]
pub struct JsonLinesSource {
    path: Utf8PathBuf,
}

impl JsonLinesSource {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for JsonLinesSource {
    fn recent_strokes(&mut self, limit: usize) -> Result<Vec<Stroke>, SourceError> {
        crate::log::info!(path = %self.path, limit, "pulling records");

        let text = std::fs::read_to_string(&self.path).map_err(|cause| SourceError::Connectivity {
            location: self.path.to_string(),
            cause,
        })?;

        let mut strokes = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_record(line) {
                Ok(Some(stroke)) => strokes.push(stroke),
                Ok(None) => {
                    crate::log::warn!(line = index + 1, "skipping record without positions");
                }
                Err(message) => {
                    return Err(SourceError::MalformedRecord { line: index + 1, message });
                }
            }
        }

        Ok(strokes.into_iter().rev().take(limit).collect())
    }
}

/// In-memory source; strokes are pushed oldest first.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    strokes: Vec<Stroke>,
}

impl MemorySource {
    pub fn new(strokes: Vec<Stroke>) -> Self {
        Self { strokes }
    }

    pub fn push(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }
}

impl RecordSource for MemorySource {
    fn recent_strokes(&mut self, limit: usize) -> Result<Vec<Stroke>, SourceError> {
        Ok(self.strokes.iter().rev().take(limit).cloned().collect())
    }
}
