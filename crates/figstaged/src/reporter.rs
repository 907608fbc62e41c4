//! Structured reporting for daemon lifecycle and pipeline events.

use std::sync::Arc;

use figstage_config::Config;
use figstage_layout::{Placement, PlacementError};
use figstage_scene::DecodeError;

use crate::bootstrap::BootstrapError;
use crate::frame::{DiscardReason, FrameError};
use crate::registry::SceneId;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface daemon events to telemetry sinks and to
/// collaborators that react to committed placements.
pub trait StageReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when the receiver accepts a producer connection.
    fn session_accepted(&self, peer: &str);

    /// Invoked when a session hands its messages to the stage.
    fn session_completed(&self, messages: usize);

    /// Invoked when a session aborts and its messages are dropped.
    fn session_aborted(&self, error: &FrameError);

    /// Invoked when one framed message is dropped mid-session.
    fn message_discarded(&self, reason: DiscardReason);

    /// Invoked when a message body decodes into a scene.
    fn scene_decoded(&self, scene: SceneId, nodes: usize);

    /// Invoked when a message body cannot be decoded at all.
    fn scene_rejected(&self, error: &DecodeError);

    /// Invoked once every node of a scene has resolved.
    fn scene_resolved(&self, scene: SceneId);

    /// Invoked when a scene is committed to a placement.
    fn scene_placed(&self, scene: SceneId, placement: &Placement);

    /// Invoked when no placement candidate is free for a scene.
    fn placement_exhausted(&self, scene: SceneId, error: &PlacementError);

    /// Invoked when a rearrangement pass begins.
    fn pass_started(&self, scenes: usize);

    /// Invoked when a rearrangement pass has handled every scene.
    fn pass_finished(&self, placed: usize, exhausted: usize);
}

impl<T> StageReporter for Arc<T>
where
    T: StageReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn session_accepted(&self, peer: &str) {
        (**self).session_accepted(peer);
    }

    fn session_completed(&self, messages: usize) {
        (**self).session_completed(messages);
    }

    fn session_aborted(&self, error: &FrameError) {
        (**self).session_aborted(error);
    }

    fn message_discarded(&self, reason: DiscardReason) {
        (**self).message_discarded(reason);
    }

    fn scene_decoded(&self, scene: SceneId, nodes: usize) {
        (**self).scene_decoded(scene, nodes);
    }

    fn scene_rejected(&self, error: &DecodeError) {
        (**self).scene_rejected(error);
    }

    fn scene_resolved(&self, scene: SceneId) {
        (**self).scene_resolved(scene);
    }

    fn scene_placed(&self, scene: SceneId, placement: &Placement) {
        (**self).scene_placed(scene, placement);
    }

    fn placement_exhausted(&self, scene: SceneId, error: &PlacementError) {
        (**self).placement_exhausted(scene, error);
    }

    fn pass_started(&self, scenes: usize) {
        (**self).pass_started(scenes);
    }

    fn pass_finished(&self, placed: usize, exhausted: usize) {
        (**self).pass_finished(placed, exhausted);
    }
}

/// Default reporter that records events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredStageReporter;

impl StructuredStageReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl StageReporter for StructuredStageReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting daemon bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            socket = %config.listen_socket(),
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            strategy = %config.layout_strategy(),
            "daemon bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "daemon bootstrap failed"
        );
    }

    fn session_accepted(&self, peer: &str) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "session_accepted",
            peer,
            "producer connected"
        );
    }

    fn session_completed(&self, messages: usize) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "session_completed",
            messages,
            "session handed off"
        );
    }

    fn session_aborted(&self, error: &FrameError) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "session_aborted",
            error = %error,
            "session aborted, received messages dropped"
        );
    }

    fn message_discarded(&self, reason: DiscardReason) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "message_discarded",
            %reason,
            "framed message discarded"
        );
    }

    fn scene_decoded(&self, scene: SceneId, nodes: usize) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "scene_decoded",
            %scene,
            nodes,
            "figure decoded"
        );
    }

    fn scene_rejected(&self, error: &DecodeError) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "scene_rejected",
            error = %error,
            "figure rejected"
        );
    }

    fn scene_resolved(&self, scene: SceneId) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "scene_resolved",
            %scene,
            "figure geometry resolved"
        );
    }

    fn scene_placed(&self, scene: SceneId, placement: &Placement) {
        let translation = placement.translation.to_array();
        let rotation = placement.rotation.to_array();
        tracing::info!(
            target: HEALTH_TARGET,
            event = "scene_placed",
            %scene,
            translation = ?translation,
            rotation = ?rotation,
            "figure placed"
        );
    }

    fn placement_exhausted(&self, scene: SceneId, error: &PlacementError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "placement_exhausted",
            %scene,
            error = %error,
            "no free placement, figure keeps its previous position"
        );
    }

    fn pass_started(&self, scenes: usize) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "pass_started",
            scenes,
            "rearrangement pass started"
        );
    }

    fn pass_finished(&self, placed: usize, exhausted: usize) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "pass_finished",
            placed,
            exhausted,
            "rearrangement pass finished"
        );
    }
}
