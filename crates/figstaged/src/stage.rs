//! Scheduler loop that turns received sessions into placed scenes.

use std::sync::Arc;
use std::sync::mpsc::Receiver;

use figstage_config::Config;
use figstage_scene::decode_scene;
use tracing::debug;

use crate::arrange::{ArrangeCoordinator, ArrangeStep};
use crate::frame::Session;
use crate::registry::{SceneEntry, SceneId, SceneRegistry};
use crate::reporter::StageReporter;

const STAGE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::stage");

/// Work done by one [`Stage::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    /// Scenes decoded from received sessions.
    pub decoded: usize,
    /// Scenes whose last pending node resolved on this tick.
    pub resolved: usize,
    /// Placement work done on this tick.
    pub arrange: ArrangeStep,
}

/// Owns the live scenes and drives decoding, resolution and placement.
pub struct Stage {
    registry: SceneRegistry,
    coordinator: ArrangeCoordinator,
    sessions: Receiver<Session>,
    reporter: Arc<dyn StageReporter>,
    pixels_per_unit: f64,
}

impl Stage {
    /// Builds a stage fed by `sessions`.
    #[must_use]
    pub fn new(
        config: &Config,
        sessions: Receiver<Session>,
        reporter: Arc<dyn StageReporter>,
    ) -> Self {
        Self::with_coordinator(
            ArrangeCoordinator::new(config),
            config.pixels_per_unit(),
            sessions,
            reporter,
        )
    }

    /// Builds a stage around an explicit coordinator.
    #[must_use]
    pub fn with_coordinator(
        coordinator: ArrangeCoordinator,
        pixels_per_unit: f64,
        sessions: Receiver<Session>,
        reporter: Arc<dyn StageReporter>,
    ) -> Self {
        Self {
            registry: SceneRegistry::new(),
            coordinator,
            sessions,
            reporter,
            pixels_per_unit,
        }
    }

    /// Live scenes.
    #[must_use]
    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    /// Rearrangement scheduler.
    #[must_use]
    pub fn coordinator(&self) -> &ArrangeCoordinator {
        &self.coordinator
    }

    /// Asks for every eligible scene to be placed again.
    pub fn request_rearrange(&mut self) {
        self.coordinator.request();
    }

    /// Tears down one scene.
    pub fn remove_scene(&mut self, id: SceneId) -> Option<SceneEntry> {
        self.registry.remove(id)
    }

    /// Tears down every scene.
    pub fn clear(&mut self) -> usize {
        self.registry.clear()
    }

    /// Decodes one message body into a new scene.
    ///
    /// Bodies that fail to decode as a whole are reported and skipped.
    pub fn ingest(&mut self, body: &str) -> Option<SceneId> {
        match decode_scene(body) {
            Ok(graph) => {
                let nodes = graph.len();
                let id = self.registry.insert(graph);
                self.reporter.scene_decoded(id, nodes);
                Some(id)
            }
            Err(error) => {
                self.reporter.scene_rejected(&error);
                None
            }
        }
    }

    /// Runs one scheduler step.
    ///
    /// Decodes every session received since the last tick in receipt order,
    /// runs one resolution pass over pending scenes, requests a
    /// rearrangement when a scene finished resolving, then advances the
    /// coordinator by one placement.
    pub fn tick(&mut self) -> TickSummary {
        let mut decoded = 0;
        while let Ok(session) = self.sessions.try_recv() {
            for body in session.into_bodies() {
                if self.ingest(&body).is_some() {
                    decoded += 1;
                }
            }
        }

        let resolved = self.resolve_pending();
        if resolved > 0 {
            self.coordinator.request();
        }

        let arrange = self
            .coordinator
            .advance(&mut self.registry, self.reporter.as_ref());
        if decoded > 0 || resolved > 0 {
            debug!(target: STAGE_TARGET, decoded, resolved, ?arrange, "tick");
        }
        TickSummary {
            decoded,
            resolved,
            arrange,
        }
    }

    fn resolve_pending(&mut self) -> usize {
        let mut resolved = 0;
        for (id, entry) in self.registry.iter_mut() {
            if !entry.is_pending() {
                continue;
            }
            let report = entry.graph_mut().resolve();
            if entry.is_pending() {
                debug!(
                    target: STAGE_TARGET,
                    scene = %id,
                    deferred = report.deferred.len(),
                    "scene still resolving"
                );
                continue;
            }
            let bounds = entry.graph().bounds(self.pixels_per_unit);
            entry.set_local_bounds(bounds);
            self.reporter.scene_resolved(id);
            resolved += 1;
        }
        resolved
    }
}
