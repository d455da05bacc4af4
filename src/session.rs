//! Plot session state machine.
//!
//! ```text
//! Idle -> Setup -> Running -> Completed
//!                         \-> Faulted -> Setup (resume) -> Running -> ...
//! ```
//!
//! A device fault never escapes as an error: the session raises the pen,
//! records what is left to draw and returns [`RunOutcome::Faulted`]. The caller
//! decides whether to resume, retry or give up.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::device::{DeviceOptions, PlotDevice, PlotMode, RuntimeFault};
use crate::document::{CanvasDocument, PlotItem};
use crate::errors::{ArtifactError, SessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Setup,
    Running,
    Faulted,
    Completed,
}

/// Human-readable grouping of device fault codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultCategory {
    ConnectionFailed,
    ButtonAbort,
    KeyboardAbort,
    Disconnected,
    Unknown,
}

impl FaultCategory {
    pub fn description(self) -> &'static str {
        match self {
            FaultCategory::ConnectionFailed => "failed to connect to the plotter",
            FaultCategory::ButtonAbort => "stopped by the pause button",
            FaultCategory::KeyboardAbort => "stopped by a keyboard interrupt",
            FaultCategory::Disconnected => "plotter disconnected",
            FaultCategory::Unknown => "unrecognized fault code",
        }
    }
}

/// Device fault codes and what they mean.
const FAULT_CODES: &[(i32, FaultCategory)] = &[
    (101, FaultCategory::ConnectionFailed),
    (102, FaultCategory::ButtonAbort),
    (103, FaultCategory::KeyboardAbort),
    (104, FaultCategory::Disconnected),
];

/// Look up a device fault code; unknown codes map to [`FaultCategory::Unknown`].
pub fn classify_fault(code: i32) -> FaultCategory {
    FAULT_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, category)| *category)
        .unwrap_or(FaultCategory::Unknown)
}

/// What is left to draw of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunArtifact {
    /// Items not yet drawn, in drawing order
    pub remaining: Vec<PlotItem>,
    /// Items drawn so far across all runs of this document
    pub drawn: usize,
    pub total: usize,
}

impl RunArtifact {
    /// Nothing drawn yet.
    pub fn from_document(document: &CanvasDocument) -> Self {
        let remaining: Vec<PlotItem> = document.items().collect();
        let total = remaining.len();
        RunArtifact { remaining, drawn: 0, total }
    }

    pub fn is_complete(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn save(&self, path: &Utf8Path) -> Result<(), ArtifactError> {
        let json = serde_json::to_string_pretty(self).map_err(|cause| ArtifactError::Format {
            path: path.to_owned(),
            cause,
        })?;
        std::fs::write(path, json).map_err(|cause| ArtifactError::Io {
            path: path.to_owned(),
            cause,
        })
    }

    pub fn load(path: &Utf8Path) -> Result<Self, ArtifactError> {
        let json = std::fs::read_to_string(path).map_err(|cause| ArtifactError::Io {
            path: path.to_owned(),
            cause,
        })?;
        serde_json::from_str(&json).map_err(|cause| ArtifactError::Format {
            path: path.to_owned(),
            cause,
        })
    }

    /// Mark the first `count` remaining items as drawn.
    fn advance(&mut self, count: usize) {
        self.remaining.drain(..count);
        self.drawn += count;
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Everything was drawn; the artifact has no remaining items
    Completed(RunArtifact),
    /// The device faulted; resume with the artifact to finish the drawing
    Faulted {
        code: i32,
        category: FaultCategory,
        artifact: RunArtifact,
    },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }

    pub fn artifact(&self) -> &RunArtifact {
        match self {
            RunOutcome::Completed(artifact) | RunOutcome::Faulted { artifact, .. } => artifact,
        }
    }

    pub fn into_artifact(self) -> RunArtifact {
        match self {
            RunOutcome::Completed(artifact) | RunOutcome::Faulted { artifact, .. } => artifact,
        }
    }
}

/// Drives one plotting device through runs of a document.
#[derive(Debug)]
pub struct PlotSession<D> {
    device: D,
    options: DeviceOptions,
    state: SessionState,
}

impl<D: PlotDevice> PlotSession<D> {
    pub fn new(device: D, options: DeviceOptions) -> Self {
        Self {
            device,
            options,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn into_device(self) -> D {
        self.device
    }

    /// Forget the previous run and go back to `Idle`.
    pub fn reset(&mut self) {
        if self.state == SessionState::Faulted {
            crate::log::info!("abandoning faulted run");
        }
        self.state = SessionState::Idle;
    }

    /// Plot a fresh document. Requires `Idle`.
    pub fn start(&mut self, document: &CanvasDocument) -> Result<RunOutcome, SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::InvalidState {
                operation: "start",
                found: self.state,
            });
        }
        crate::log::info!(items = document.item_count(), "starting plot");
        Ok(self.execute(RunArtifact::from_document(document), PlotMode::Plot))
    }

    /// Continue a faulted run. Requires `Idle` (new process) or `Faulted`.
    pub fn resume(&mut self, artifact: RunArtifact) -> Result<RunOutcome, SessionError> {
        if !matches!(self.state, SessionState::Idle | SessionState::Faulted) {
            return Err(SessionError::InvalidState {
                operation: "resume",
                found: self.state,
            });
        }
        crate::log::info!(
            remaining = artifact.remaining.len(),
            drawn = artifact.drawn,
            "resuming plot"
        );
        Ok(self.execute(artifact, PlotMode::ResumePlot))
    }

    fn setup(&mut self, items: &[PlotItem], mode: PlotMode) -> Result<(), RuntimeFault> {
        self.device.configure(&self.options)?;
        self.device.load_document(items)?;
        self.device.set_mode(mode)?;
        crate::log::debug!(%mode, "device ready");
        Ok(())
    }

    fn execute(&mut self, mut artifact: RunArtifact, mode: PlotMode) -> RunOutcome {
        self.state = SessionState::Setup;
        if let Err(fault) = self.setup(&artifact.remaining, mode) {
            return self.fault(fault, artifact);
        }

        self.state = SessionState::Running;
        let mut drawn = 0;
        let mut failure = None;
        for item in &artifact.remaining {
            if let Err(fault) = self.device.draw(item) {
                failure = Some(fault);
                break;
            }
            drawn += 1;
        }
        artifact.advance(drawn);

        match failure {
            Some(fault) => self.fault(fault, artifact),
            None => {
                self.state = SessionState::Completed;
                crate::log::info!(drawn = artifact.drawn, "plot complete");
                RunOutcome::Completed(artifact)
            }
        }
    }

    /// Park the device in align mode and report the fault.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn fault(&mut self, fault: RuntimeFault, artifact: RunArtifact) -> RunOutcome {
        let code = self.device.last_fault_code();
        let category = classify_fault(code);

        let parked = self
            .device
            .set_mode(PlotMode::Align)
            .and_then(|()| self.device.run_mode());
        if let Err(align_fault) = parked {
            crate::log::warn!(error = %align_fault, "could not park the plotter in align mode");
        }

        crate::log::error!(
            code,
            category = category.description(),
            error = %fault,
            remaining = artifact.remaining.len(),
            "plot failed"
        );

        self.state = SessionState::Faulted;
        RunOutcome::Faulted { code, category, artifact }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Command, PreviewDevice};
    use crate::segment::CanvasPath;
    use glam::dvec2;

    fn artifact_of(count: usize) -> RunArtifact {
        let remaining: Vec<PlotItem> = (0..count)
            .map(|i| PlotItem::Path {
                path: CanvasPath::new(vec![dvec2(i as f64, 0.0), dvec2(i as f64, 1.0)]).unwrap(),
            })
            .collect();
        RunArtifact { total: remaining.len(), remaining, drawn: 0 }
    }

    /// Refuses to configure; everything else succeeds.
    struct Unplugged;

    impl PlotDevice for Unplugged {
        fn configure(&mut self, _: &DeviceOptions) -> Result<(), RuntimeFault> {
            Err(RuntimeFault::new("no port"))
        }
        fn load_document(&mut self, _: &[PlotItem]) -> Result<(), RuntimeFault> {
            Ok(())
        }
        fn set_mode(&mut self, _: PlotMode) -> Result<(), RuntimeFault> {
            Ok(())
        }
        fn draw(&mut self, _: &PlotItem) -> Result<(), RuntimeFault> {
            Ok(())
        }
        fn run_mode(&mut self) -> Result<(), RuntimeFault> {
            Ok(())
        }
        fn last_fault_code(&self) -> i32 {
            101
        }
    }

    #[test]
    fn fault_table_classifies_known_codes() {
        assert_eq!(classify_fault(101), FaultCategory::ConnectionFailed);
        assert_eq!(classify_fault(102), FaultCategory::ButtonAbort);
        assert_eq!(classify_fault(103), FaultCategory::KeyboardAbort);
        assert_eq!(classify_fault(104), FaultCategory::Disconnected);
        assert_eq!(classify_fault(7), FaultCategory::Unknown);
    }

    #[test]
    fn resume_from_faulted_in_same_session() {
        let device = PreviewDevice::new().fail_after(2, 102);
        let mut session = PlotSession::new(device, DeviceOptions::default());

        let outcome = session.resume(artifact_of(5)).unwrap();
        let RunOutcome::Faulted { code, category, artifact } = outcome else {
            panic!("expected a fault");
        };
        assert_eq!(code, 102);
        assert_eq!(category, FaultCategory::ButtonAbort);
        assert_eq!(artifact.remaining.len(), 3);
        assert_eq!(artifact.drawn, 2);
        assert_eq!(session.state(), SessionState::Faulted);

        let outcome = session.resume(artifact).unwrap();
        assert!(outcome.is_completed());
        assert_eq!(outcome.artifact().drawn, 5);
        assert_eq!(session.state(), SessionState::Completed);
    }

    #[test]
    fn fault_parks_device_in_align_mode() {
        let device = PreviewDevice::new().fail_after(1, 104);
        let mut session = PlotSession::new(device, DeviceOptions::default());
        session.resume(artifact_of(3)).unwrap();

        let commands = session.device().commands();
        let tail = &commands[commands.len() - 2..];
        assert_eq!(tail, &[Command::SetMode(PlotMode::Align), Command::RunMode(PlotMode::Align)]);
        assert_eq!(session.device().mode(), PlotMode::Align);
    }

    #[test]
    fn resume_selects_resume_mode() {
        let mut session = PlotSession::new(PreviewDevice::new(), DeviceOptions::default());
        session.resume(artifact_of(1)).unwrap();
        assert!(session.device().commands().contains(&Command::SetMode(PlotMode::ResumePlot)));
    }

    #[test]
    fn setup_fault_leaves_everything_undrawn() {
        let mut session = PlotSession::new(Unplugged, DeviceOptions::default());
        let outcome = session.resume(artifact_of(4)).unwrap();
        match outcome {
            RunOutcome::Faulted { code, category, artifact } => {
                assert_eq!(code, 101);
                assert_eq!(category, FaultCategory::ConnectionFailed);
                assert_eq!(artifact.remaining.len(), 4);
            }
            RunOutcome::Completed(_) => panic!("unplugged device cannot complete"),
        }
        assert_eq!(session.state(), SessionState::Faulted);
    }

    #[test]
    fn resume_rejected_after_completion() {
        let mut session = PlotSession::new(PreviewDevice::new(), DeviceOptions::default());
        session.resume(artifact_of(1)).unwrap();
        assert_eq!(
            session.resume(artifact_of(1)),
            Err(SessionError::InvalidState {
                operation: "resume",
                found: SessionState::Completed,
            })
        );
        session.reset();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.resume(artifact_of(1)).is_ok());
    }

    #[test]
    fn empty_artifact_completes_immediately() {
        let mut session = PlotSession::new(PreviewDevice::new(), DeviceOptions::default());
        let outcome = session.resume(artifact_of(0)).unwrap();
        assert!(outcome.is_completed());
        assert!(outcome.into_artifact().is_complete());
    }

    #[test]
    fn artifact_survives_disk_round_trip() {
        let artifact = artifact_of(3);
        let dir = camino::Utf8PathBuf::from_path_buf(std::env::temp_dir()).unwrap();
        let path = dir.join(format!("plotyard-artifact-{}.json", std::process::id()));
        artifact.save(&path).unwrap();
        assert_eq!(RunArtifact::load(&path).unwrap(), artifact);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn loading_garbage_artifact_fails() {
        let dir = camino::Utf8PathBuf::from_path_buf(std::env::temp_dir()).unwrap();
        let path = dir.join(format!("plotyard-garbage-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(RunArtifact::load(&path), Err(ArtifactError::Format { .. })));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn loading_artifact_with_short_path_fails() {
        let dir = camino::Utf8PathBuf::from_path_buf(std::env::temp_dir()).unwrap();
        let path = dir.join(format!("plotyard-short-path-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"remaining":[{"kind":"path","path":[]}],"drawn":0,"total":1}"#).unwrap();
        let result = RunArtifact::load(&path);
        std::fs::remove_file(&path).unwrap();
        let Err(ArtifactError::Format { cause, .. }) = result else {
            panic!("expected a format error, got {:?}", result);
        };
        assert!(cause.to_string().contains("at least two points"));
    }
}
