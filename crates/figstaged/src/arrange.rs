//! Rearrangement passes over the scene registry.
//!
//! A pass parks the scenes it will move, then places them one per
//! [`ArrangeCoordinator::advance`] call so each stage tick stays short. The
//! placement engine's parameters live for the whole pass: later scenes
//! resume the search where earlier ones stopped.

use std::collections::VecDeque;

use figstage_config::{Config, LayoutStrategy, RearrangeScope};
use figstage_layout::{
    Aabb, DomeStrategy, GridStrategy, Placement, PlacementEngine, PlacementStrategy,
};
use glam::DVec3;
use tracing::{debug, info};

use crate::registry::{SceneId, SceneRegistry};
use crate::reporter::StageReporter;

const ARRANGE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::arrange");

/// What one call to [`ArrangeCoordinator::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrangeStep {
    /// No pass is active and none was requested.
    Idle,
    /// A pass was requested but some scene is still resolving.
    Waiting,
    /// A scene was committed to a new placement.
    Placed(SceneId),
    /// No free placement existed; the scene went back to its old position.
    Exhausted(SceneId),
    /// The active pass had nothing left to place and finished.
    Finished,
}

#[derive(Debug)]
struct Queued {
    id: SceneId,
    previous: Option<Placement>,
}

#[derive(Debug, Default)]
struct Pass {
    queue: VecDeque<Queued>,
    placed: usize,
    exhausted: usize,
}

/// Schedules rearrangement passes so only one runs at a time.
///
/// Requests are never dropped: a request made while a pass is active, or
/// while any scene is still resolving, starts a pass as soon as both
/// conditions clear.
pub struct ArrangeCoordinator {
    engine: PlacementEngine<Box<dyn PlacementStrategy + Send>>,
    scope: RearrangeScope,
    requested: bool,
    pass: Option<Pass>,
}

impl ArrangeCoordinator {
    /// Builds a coordinator with the configured strategy, scope and margin.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let origin = DVec3::from_array(config.layout_origin());
        let strategy: Box<dyn PlacementStrategy + Send> = match config.layout_strategy() {
            LayoutStrategy::Grid => Box::new(GridStrategy::new(origin)),
            LayoutStrategy::Dome => Box::new(DomeStrategy::new(origin)),
        };
        Self::with_strategy(strategy, config.spacing_margin(), config.rearrange_scope())
    }

    /// Builds a coordinator around an explicit strategy.
    #[must_use]
    pub fn with_strategy(
        strategy: Box<dyn PlacementStrategy + Send>,
        margin: f64,
        scope: RearrangeScope,
    ) -> Self {
        Self {
            engine: PlacementEngine::new(strategy, margin),
            scope,
            requested: false,
            pass: None,
        }
    }

    /// Asks for a pass. Repeated requests before the pass starts coalesce.
    pub fn request(&mut self) {
        self.requested = true;
    }

    /// `true` while a request is waiting for a pass to start.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.requested
    }

    /// `true` while a pass is placing scenes.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.pass.is_some()
    }

    /// Name of the strategy driving placement.
    #[must_use]
    pub fn strategy_name(&self) -> &'static str {
        self.engine.strategy().name()
    }

    /// Does at most one unit of placement work.
    ///
    /// Starts a pass when one was requested and no scene is pending
    /// resolution, then places the next queued scene.
    pub fn advance(
        &mut self,
        registry: &mut SceneRegistry,
        reporter: &dyn StageReporter,
    ) -> ArrangeStep {
        if self.pass.is_none() {
            if !self.requested {
                return ArrangeStep::Idle;
            }
            if registry.any_pending() {
                return ArrangeStep::Waiting;
            }
            self.requested = false;
            self.begin(registry, reporter);
        }
        let Some(pass) = self.pass.as_mut() else {
            return ArrangeStep::Idle;
        };

        while let Some(Queued { id, previous }) = pass.queue.pop_front() {
            let Some(entry) = registry.get(id) else {
                debug!(target: ARRANGE_TARGET, scene = %id, "scene removed before placement");
                continue;
            };
            let local = entry
                .local_bounds()
                .unwrap_or_else(|| Aabb::new(DVec3::ZERO, DVec3::ZERO));
            let obstacles = registry.obstacles(id);
            return match self.engine.place(&local, &obstacles) {
                Ok(outcome) => {
                    debug!(
                        target: ARRANGE_TARGET,
                        scene = %id,
                        evaluations = outcome.evaluations,
                        "placement found"
                    );
                    registry.place(id, outcome.placement);
                    pass.placed += 1;
                    reporter.scene_placed(id, &outcome.placement);
                    ArrangeStep::Placed(id)
                }
                Err(error) => {
                    registry.restore(id, previous);
                    pass.exhausted += 1;
                    reporter.placement_exhausted(id, &error);
                    ArrangeStep::Exhausted(id)
                }
            };
        }

        let finished = self.pass.take().unwrap_or_default();
        info!(
            target: ARRANGE_TARGET,
            placed = finished.placed,
            exhausted = finished.exhausted,
            "pass complete"
        );
        reporter.pass_finished(finished.placed, finished.exhausted);
        ArrangeStep::Finished
    }

    fn begin(&mut self, registry: &mut SceneRegistry, reporter: &dyn StageReporter) {
        let scope = self.scope;
        let queue: VecDeque<Queued> = registry
            .iter()
            .filter(|(_, entry)| match scope {
                RearrangeScope::All => true,
                RearrangeScope::New => entry.placement().is_none(),
            })
            .map(|(id, entry)| Queued {
                id,
                previous: if entry.is_parked() {
                    None
                } else {
                    entry.placement()
                },
            })
            .collect();
        for queued in &queue {
            registry.park(queued.id);
        }
        self.engine.reset();
        info!(
            target: ARRANGE_TARGET,
            strategy = self.engine.strategy().name(),
            %scope,
            scenes = queue.len(),
            "pass started"
        );
        reporter.pass_started(queue.len());
        self.pass = Some(Pass {
            queue,
            ..Pass::default()
        });
    }
}
