//! Error types with rich diagnostics using miette
//!
//! Device runtime faults are not errors here: the plot session turns them into
//! `RunOutcome::Faulted` values (see `session`).

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

use crate::session::SessionState;

// ============================================================================
// Layout Errors
// ============================================================================

/// Errors that abort document construction before anything is drawn
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("invalid data range: x [{x_min}, {x_max}], y [{y_min}, {y_max}]")]
    #[diagnostic(
        code(plotyard::layout::invalid_range),
        help("every axis of the data rectangle needs max > min and finite bounds")
    )]
    InvalidRange {
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
    },

    #[error("canvas {width}x{height} leaves no drawable area with padding {padding}")]
    #[diagnostic(code(plotyard::layout::invalid_canvas))]
    InvalidCanvas { width: f64, height: f64, padding: f64 },

    #[error("stroke has no points")]
    #[diagnostic(code(plotyard::layout::empty_stroke))]
    EmptyStroke,

    #[error("invalid path data in decoration `{title}`: {message}")]
    #[diagnostic(
        code(plotyard::layout::invalid_path_data),
        help("decoration paths support the M, L, H, V and Z commands")
    )]
    InvalidPathData { title: String, message: String },

    #[error("canvas path needs at least two points, got {points}")]
    #[diagnostic(code(plotyard::layout::short_path))]
    ShortPath { points: usize },
}

// ============================================================================
// Source Errors
// ============================================================================

/// Errors from the record source
#[derive(Error, Diagnostic, Debug)]
pub enum SourceError {
    #[error("record source unreachable: {location}")]
    #[diagnostic(
        code(plotyard::source::connectivity),
        help("check that the record source is reachable; nothing is retried automatically")
    )]
    Connectivity {
        location: String,
        #[source]
        cause: std::io::Error,
    },

    #[error("malformed record on line {line}: {message}")]
    #[diagnostic(code(plotyard::source::malformed_record))]
    MalformedRecord { line: usize, message: String },
}

// ============================================================================
// Session Errors
// ============================================================================

/// Caller errors against the plot session state machine
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("cannot {operation} while the session is {found:?}")]
    #[diagnostic(
        code(plotyard::session::invalid_state),
        help("call `reset` to abandon the previous run first")
    )]
    InvalidState {
        operation: &'static str,
        found: SessionState,
    },
}

/// Errors while persisting or restoring a run artifact
#[derive(Error, Diagnostic, Debug)]
pub enum ArtifactError {
    #[error("failed to access run artifact {path}")]
    #[diagnostic(code(plotyard::artifact::io))]
    Io {
        path: Utf8PathBuf,
        #[source]
        cause: std::io::Error,
    },

    #[error("run artifact {path} is malformed")]
    #[diagnostic(code(plotyard::artifact::format))]
    Format {
        path: Utf8PathBuf,
        #[source]
        cause: serde_json::Error,
    },
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Errors while loading the static configuration
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    #[diagnostic(code(plotyard::config::io))]
    Io {
        path: Utf8PathBuf,
        #[source]
        cause: std::io::Error,
    },

    #[error("invalid config {path}")]
    #[diagnostic(
        code(plotyard::config::format),
        help("config is JSON; every field is optional and falls back to its default")
    )]
    Format {
        path: Utf8PathBuf,
        #[source]
        cause: serde_json::Error,
    },

    #[error("canvas dpi {dpi} is not usable: {cause}")]
    #[diagnostic(code(plotyard::config::invalid_dpi))]
    InvalidDpi {
        dpi: f64,
        #[source]
        cause: crate::types::NumericError,
    },

    #[error("config is invalid")]
    #[diagnostic(code(plotyard::config::layout))]
    Layout(#[from] LayoutError),
}

// ============================================================================
// Output Errors
// ============================================================================

/// The SVG tree could not be serialized
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
#[error("XML serialization error: {message}")]
#[diagnostic(code(plotyard::svg::serialize))]
pub struct SvgError {
    pub message: String,
}

// ============================================================================
// Dispatcher Errors
// ============================================================================

/// Everything a dispatched run can fail with before the device is touched
#[derive(Error, Diagnostic, Debug)]
pub enum PlotError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Svg(#[from] SvgError),

    #[error("failed to write {path}")]
    #[diagnostic(code(plotyard::output::io))]
    Output {
        path: Utf8PathBuf,
        #[source]
        cause: std::io::Error,
    },
}
