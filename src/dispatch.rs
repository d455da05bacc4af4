//! Trigger dispatch: turns "run" and "resume" requests into plot sessions.
//!
//! Triggers are sent from any thread through a [`TriggerSender`]. The sender
//! claims the [`SessionGuard`] before queueing, so a trigger that arrives while
//! another session is queued or running is dropped. The [`Dispatcher`] owns the
//! session and handles one trigger at a time on its own thread.

use std::sync::Arc;
use std::sync::mpsc;
use std::time::{SystemTime, UNIX_EPOCH};

use camino::{Utf8Path, Utf8PathBuf};

use crate::config::Config;
use crate::device::PlotDevice;
use crate::document::CanvasDocument;
use crate::errors::{ConfigError, PlotError};
use crate::guard::{SessionGuard, SessionPermit};
use crate::session::{PlotSession, RunArtifact, RunOutcome};
use crate::source::RecordSource;
use crate::svg::to_svg;
use crate::types::CanvasSpec;

/// What an external trigger asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Fetch fresh strokes and plot them from scratch
    Run,
    /// Finish the pending faulted run
    Resume,
}

/// Cloneable handle for firing triggers at a [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct TriggerSender {
    guard: Arc<SessionGuard>,
    sender: mpsc::Sender<(Trigger, SessionPermit)>,
}

impl TriggerSender {
    /// Queue a trigger. Returns `false` if it was dropped because a session is
    /// already active or the dispatcher is gone.
    pub fn fire(&self, trigger: Trigger) -> bool {
        let Some(permit) = self.guard.try_acquire() else {
            crate::log::info!(?trigger, "session already active, dropping trigger");
            return false;
        };
        // On failure the permit comes back inside the error and is dropped
        self.sender.send((trigger, permit)).is_ok()
    }

    pub fn is_busy(&self) -> bool {
        self.guard.is_active()
    }
}

/// A faulted run waiting to be resumed.
#[derive(Debug, Clone)]
struct Pending {
    run_id: String,
    artifact: RunArtifact,
}

/// Owns the plot session and executes triggers one at a time.
pub struct Dispatcher<D, S> {
    session: PlotSession<D>,
    source: S,
    config: Config,
    canvas: CanvasSpec,
    pending: Option<Pending>,
    receiver: mpsc::Receiver<(Trigger, SessionPermit)>,
}

impl<D: PlotDevice, S: RecordSource> Dispatcher<D, S> {
    pub fn new(device: D, source: S, config: Config) -> Result<(Self, TriggerSender), ConfigError> {
        config.validate()?;
        let canvas = config.canvas.to_spec()?;

        crate::log::info!(
            width_px = canvas.width_px(),
            height_px = canvas.height_px(),
            record_limit = config.record_limit,
            decorations = config.decorations.len(),
            output_dir = %config.output_dir,
            "dispatcher configured"
        );

        let (sender, receiver) = mpsc::channel();
        let guard = Arc::new(SessionGuard::new());
        let dispatcher = Dispatcher {
            session: PlotSession::new(device, config.device.clone()),
            source,
            config,
            canvas,
            pending: None,
            receiver,
        };
        Ok((dispatcher, TriggerSender { guard, sender }))
    }

    /// Make a previously saved artifact available to the next resume trigger.
    pub fn with_pending(mut self, run_id: impl Into<String>, artifact: RunArtifact) -> Self {
        self.pending = Some(Pending {
            run_id: run_id.into(),
            artifact,
        });
        self
    }

    pub fn pending(&self) -> Option<&RunArtifact> {
        self.pending.as_ref().map(|p| &p.artifact)
    }

    pub fn session(&self) -> &PlotSession<D> {
        &self.session
    }

    /// Handle triggers until every [`TriggerSender`] is dropped.
    pub fn run(&mut self) {
        while let Ok((trigger, permit)) = self.receiver.recv() {
            if let Err(_err) = self.handle(trigger) {
                crate::log::error!(?trigger, error = %_err, "trigger failed");
            }
            drop(permit);
        }
        crate::log::debug!("all trigger senders gone, dispatcher stopping");
    }

    /// Handle a single trigger. `Ok(None)` means there was nothing to do.
    pub fn handle(&mut self, trigger: Trigger) -> Result<Option<RunOutcome>, PlotError> {
        match trigger {
            Trigger::Run => self.handle_run().map(Some),
            Trigger::Resume => self.handle_resume(),
        }
    }

    fn handle_run(&mut self) -> Result<RunOutcome, PlotError> {
        let run_id = run_id();
        crate::log::info!(%run_id, "run triggered");

        let strokes = self.source.recent_strokes(self.config.record_limit)?;
        let document = CanvasDocument::build(
            self.config.data_rect,
            self.canvas,
            &self.config.decorations,
            &strokes,
        )?;
        self.write_svg(&run_id, &document)?;

        self.session.reset();
        self.pending = None;
        let outcome = self.session.start(&document)?;
        self.settle(run_id, outcome)
    }

    fn handle_resume(&mut self) -> Result<Option<RunOutcome>, PlotError> {
        let Some(Pending { run_id, artifact }) = self.pending.take() else {
            crate::log::info!("resume triggered with no faulted run pending");
            return Ok(None);
        };
        crate::log::info!(%run_id, remaining = artifact.remaining.len(), "resume triggered");

        let outcome = match self.session.resume(artifact.clone()) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.pending = Some(Pending { run_id, artifact });
                return Err(err.into());
            }
        };
        self.settle(run_id, outcome).map(Some)
    }

    /// Keep the artifact of a faulted run for resuming, then persist it.
    ///
    /// A failed save is reported but the artifact stays pending.
    fn settle(&mut self, run_id: String, outcome: RunOutcome) -> Result<RunOutcome, PlotError> {
        if let RunOutcome::Faulted { artifact, .. } = &outcome {
            let path = self.output_path(&run_id, "artifact.json");
            self.pending = Some(Pending {
                run_id,
                artifact: artifact.clone(),
            });
            self.ensure_output_dir()?;
            artifact.save(&path)?;
            crate::log::info!(%path, "saved run artifact for resume");
        }
        Ok(outcome)
    }

    fn write_svg(&self, run_id: &str, document: &CanvasDocument) -> Result<(), PlotError> {
        let path = self.output_path(run_id, "output.svg");
        self.ensure_output_dir()?;
        let svg = to_svg(document)?;
        std::fs::write(&path, svg).map_err(|cause| PlotError::Output {
            path: path.clone(),
            cause,
        })?;
        crate::log::info!(%path, "saved SVG");
        Ok(())
    }

    fn ensure_output_dir(&self) -> Result<(), PlotError> {
        let dir = &self.config.output_dir;
        std::fs::create_dir_all(dir).map_err(|cause| PlotError::Output {
            path: dir.clone(),
            cause,
        })
    }

    fn output_path(&self, run_id: &str, suffix: &str) -> Utf8PathBuf {
        output_path(&self.config.output_dir, run_id, suffix)
    }
}

/// `<dir>/<run>_<suffix>`
pub fn output_path(dir: &Utf8Path, run_id: &str, suffix: &str) -> Utf8PathBuf {
    dir.join(format!("{}_{}", run_id, suffix))
}

/// Run identifier: milliseconds since the Unix epoch.
fn run_id() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::PreviewDevice;
    use crate::session::SessionState;
    use crate::segment::Stroke;
    use crate::source::MemorySource;
    use glam::dvec2;

    fn temp_output(name: &str) -> Utf8PathBuf {
        let dir = Utf8PathBuf::from_path_buf(std::env::temp_dir()).unwrap();
        let dir = dir.join(format!("plotyard-dispatch-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn source() -> MemorySource {
        MemorySource::new(
            (0..4)
                .map(|i| {
                    let y = 3.0 + i as f64;
                    Stroke::new(vec![dvec2(-3.0, y), dvec2(0.0, y), dvec2(1.0, y + 0.5)]).unwrap()
                })
                .collect(),
        )
    }

    fn config(output_dir: Utf8PathBuf) -> Config {
        Config {
            output_dir,
            ..Config::default()
        }
    }

    fn files_with_suffix(dir: &Utf8Path, suffix: &str) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().ends_with(suffix))
            .count()
    }

    #[test]
    fn faulted_run_is_saved_and_resumed() {
        let out = temp_output("resume");
        let device = PreviewDevice::new().fail_after(1, 102);
        let (mut dispatcher, _sender) = Dispatcher::new(device, source(), config(out.clone())).unwrap();

        let outcome = dispatcher.handle(Trigger::Run).unwrap().unwrap();
        assert!(!outcome.is_completed());
        assert_eq!(dispatcher.session().state(), SessionState::Faulted);
        assert_eq!(dispatcher.pending().unwrap().remaining.len(), 3);
        assert_eq!(files_with_suffix(&out, "_output.svg"), 1);
        assert_eq!(files_with_suffix(&out, "_artifact.json"), 1);

        let outcome = dispatcher.handle(Trigger::Resume).unwrap().unwrap();
        assert!(outcome.is_completed());
        assert!(dispatcher.pending().is_none());
        assert_eq!(dispatcher.session().device().drawn(), 4);

        std::fs::remove_dir_all(&out).unwrap();
    }

    #[test]
    fn resume_without_pending_does_nothing() {
        let out = temp_output("idle");
        let (mut dispatcher, _sender) =
            Dispatcher::new(PreviewDevice::new(), source(), config(out)).unwrap();
        assert!(dispatcher.handle(Trigger::Resume).unwrap().is_none());
        assert_eq!(dispatcher.session().state(), SessionState::Idle);
    }

    #[test]
    fn trigger_while_queued_is_dropped() {
        let out = temp_output("dropped");
        let (mut dispatcher, sender) =
            Dispatcher::new(PreviewDevice::new(), source(), config(out.clone())).unwrap();

        assert!(sender.fire(Trigger::Run));
        assert!(sender.is_busy());
        assert!(!sender.fire(Trigger::Run));
        drop(sender);

        dispatcher.run();
        assert_eq!(dispatcher.session().state(), SessionState::Completed);
        assert_eq!(files_with_suffix(&out, "_output.svg"), 1);

        std::fs::remove_dir_all(&out).unwrap();
    }

    #[test]
    fn saved_artifact_can_seed_a_new_dispatcher() {
        let out = temp_output("seed");
        let (mut first, _sender) = Dispatcher::new(
            PreviewDevice::new().fail_after(2, 104),
            source(),
            config(out.clone()),
        )
        .unwrap();
        first.handle(Trigger::Run).unwrap();
        let saved = first.pending().unwrap().clone();

        let (second, _sender) = Dispatcher::new(PreviewDevice::new(), MemorySource::default(), config(out.clone())).unwrap();
        let mut second = second.with_pending("restored", saved);
        let outcome = second.handle(Trigger::Resume).unwrap().unwrap();
        assert!(outcome.is_completed());
        assert_eq!(outcome.artifact().drawn, 4);

        std::fs::remove_dir_all(&out).unwrap();
    }

    #[test]
    fn unsaved_artifact_stays_pending() {
        // A regular file where the output directory should be
        let blocker = temp_output("blocker");
        std::fs::write(&blocker, "").unwrap();
        let seeded = RunArtifact::from_document(&seeded_document());
        assert_eq!(seeded.remaining.len(), 2);

        let (dispatcher, _sender) = Dispatcher::new(
            PreviewDevice::new().fail_after(1, 102),
            MemorySource::default(),
            config(blocker.join("out")),
        )
        .unwrap();
        let mut dispatcher = dispatcher.with_pending("seeded", seeded);

        let result = dispatcher.handle(Trigger::Resume);
        assert!(matches!(result, Err(PlotError::Output { .. })));
        assert_eq!(dispatcher.session().state(), SessionState::Faulted);
        let pending = dispatcher.pending().expect("artifact kept after failed save");
        assert_eq!(pending.remaining.len(), 1);
        assert_eq!(pending.drawn, 1);

        std::fs::remove_file(&blocker).unwrap();
    }

    /// Two in-bounds paths on the default canvas.
    fn seeded_document() -> CanvasDocument {
        let config = Config::default();
        let strokes = [
            Stroke::new(vec![dvec2(-3.0, 3.0), dvec2(0.0, 4.0)]).unwrap(),
            Stroke::new(vec![dvec2(-3.0, 8.0), dvec2(0.0, 9.0)]).unwrap(),
        ];
        CanvasDocument::build(config.data_rect, config.canvas.to_spec().unwrap(), &[], &strokes).unwrap()
    }

    #[test]
    fn output_paths_are_prefixed_by_run() {
        assert_eq!(
            output_path(Utf8Path::new("outputs"), "1700000000000", "output.svg"),
            Utf8PathBuf::from("outputs/1700000000000_output.svg")
        );
    }
}
