//! Test double for [`StageReporter`] that records events for assertions.

use std::sync::Mutex;

use figstage_config::Config;
use figstage_layout::{Placement, PlacementError};
use figstage_scene::DecodeError;

use crate::bootstrap::BootstrapError;
use crate::frame::{DiscardReason, FrameError};
use crate::registry::SceneId;
use crate::reporter::StageReporter;

/// Events tracked during scenarios.
#[derive(Debug, Clone, PartialEq)]
pub enum StageEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    SessionAccepted,
    SessionCompleted(usize),
    SessionAborted(String),
    MessageDiscarded(DiscardReason),
    SceneDecoded(SceneId),
    SceneRejected(String),
    SceneResolved(SceneId),
    ScenePlaced(SceneId, Placement),
    PlacementExhausted(SceneId),
    PassStarted(usize),
    PassFinished { placed: usize, exhausted: usize },
}

/// Records stage events for assertions.
#[derive(Debug, Default)]
pub struct RecordingStageReporter {
    events: Mutex<Vec<StageEvent>>,
}

impl RecordingStageReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<StageEvent> {
        self.events
            .lock()
            .expect("stage reporter mutex poisoned")
            .clone()
    }

    /// Counts recorded events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&StageEvent) -> bool) -> usize {
        self.events().iter().filter(|event| predicate(event)).count()
    }

    pub fn record(&self, event: StageEvent) {
        self.events
            .lock()
            .expect("stage reporter mutex poisoned")
            .push(event);
    }
}

impl StageReporter for RecordingStageReporter {
    fn bootstrap_starting(&self) {
        self.record(StageEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(StageEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(StageEvent::BootstrapFailed(error.to_string()));
    }

    fn session_accepted(&self, _peer: &str) {
        self.record(StageEvent::SessionAccepted);
    }

    fn session_completed(&self, messages: usize) {
        self.record(StageEvent::SessionCompleted(messages));
    }

    fn session_aborted(&self, error: &FrameError) {
        self.record(StageEvent::SessionAborted(error.to_string()));
    }

    fn message_discarded(&self, reason: DiscardReason) {
        self.record(StageEvent::MessageDiscarded(reason));
    }

    fn scene_decoded(&self, scene: SceneId, _nodes: usize) {
        self.record(StageEvent::SceneDecoded(scene));
    }

    fn scene_rejected(&self, error: &DecodeError) {
        self.record(StageEvent::SceneRejected(error.to_string()));
    }

    fn scene_resolved(&self, scene: SceneId) {
        self.record(StageEvent::SceneResolved(scene));
    }

    fn scene_placed(&self, scene: SceneId, placement: &Placement) {
        self.record(StageEvent::ScenePlaced(scene, *placement));
    }

    fn placement_exhausted(&self, scene: SceneId, _error: &PlacementError) {
        self.record(StageEvent::PlacementExhausted(scene));
    }

    fn pass_started(&self, scenes: usize) {
        self.record(StageEvent::PassStarted(scenes));
    }

    fn pass_finished(&self, placed: usize, exhausted: usize) {
        self.record(StageEvent::PassFinished { placed, exhausted });
    }
}
