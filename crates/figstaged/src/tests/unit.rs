//! Unit tests for the arrange coordinator and the stage loop.

use std::sync::Arc;
use std::sync::mpsc;

use figstage_config::{Config, RearrangeScope};
use figstage_layout::{
    Aabb, GridStrategy, ParameterSet, Placement, PlacementParameter, PlacementStrategy,
};
use figstage_scene::decode_scene;
use glam::DVec3;
use rstest::{fixture, rstest};

use crate::arrange::{ArrangeCoordinator, ArrangeStep};
use crate::frame::Session;
use crate::registry::{SceneId, SceneRegistry};
use crate::stage::Stage;

use super::support::{RecordingStageReporter, StageEvent, axes_with_line, figure};

/// Two candidate slots two units apart along `x`.
struct TwoSlots;

impl PlacementStrategy for TwoSlots {
    fn name(&self) -> &'static str {
        "two-slots"
    }

    fn parameters(&self) -> ParameterSet {
        ParameterSet::new(vec![PlacementParameter::new("slot", 0.0, 1.0, 1.0)])
    }

    fn candidate(&self, parameters: &ParameterSet) -> Placement {
        let slot = parameters.value(0).unwrap_or_default();
        Placement::at(DVec3::new(slot * 2.0, 0.0, 0.0))
    }
}

#[fixture]
fn reporter() -> RecordingStageReporter {
    RecordingStageReporter::default()
}

fn two_slots(scope: RearrangeScope) -> ArrangeCoordinator {
    ArrangeCoordinator::with_strategy(Box::new(TwoSlots), 0.0, scope)
}

/// Adds a resolved scene with a unit box.
fn add_scene(registry: &mut SceneRegistry) -> SceneId {
    let mut graph = decode_scene(&figure(serde_json::json!([]))).expect("empty figure decodes");
    graph.resolve();
    let id = registry.insert(graph);
    let entry = registry.get_mut(id).expect("scene just inserted");
    entry.set_local_bounds(Some(Aabb::new(DVec3::ZERO, DVec3::splat(0.5))));
    id
}

fn translation(registry: &SceneRegistry, id: SceneId) -> Option<DVec3> {
    registry
        .get(id)
        .and_then(|entry| entry.placement())
        .map(|placement| placement.translation)
}

#[rstest]
fn idle_without_a_request(reporter: RecordingStageReporter) {
    let mut registry = SceneRegistry::new();
    add_scene(&mut registry);
    let mut coordinator = two_slots(RearrangeScope::All);

    assert_eq!(coordinator.advance(&mut registry, &reporter), ArrangeStep::Idle);
    assert!(reporter.events().is_empty());
}

#[rstest]
fn places_one_scene_per_advance_then_reports_exhaustion(reporter: RecordingStageReporter) {
    let mut registry = SceneRegistry::new();
    let first = add_scene(&mut registry);
    let second = add_scene(&mut registry);
    let third = add_scene(&mut registry);
    let mut coordinator = two_slots(RearrangeScope::All);
    coordinator.request();

    assert_eq!(coordinator.advance(&mut registry, &reporter), ArrangeStep::Placed(first));
    assert!(coordinator.is_active());
    assert_eq!(
        registry.get(second).map(|entry| entry.is_parked()),
        Some(true),
        "queued scenes wait parked"
    );
    assert_eq!(coordinator.advance(&mut registry, &reporter), ArrangeStep::Placed(second));
    assert_eq!(coordinator.advance(&mut registry, &reporter), ArrangeStep::Exhausted(third));
    assert_eq!(coordinator.advance(&mut registry, &reporter), ArrangeStep::Finished);
    assert!(!coordinator.is_active());

    assert_eq!(translation(&registry, first), Some(DVec3::ZERO));
    assert_eq!(translation(&registry, second), Some(DVec3::new(2.0, 0.0, 0.0)));
    let third_entry = registry.get(third).expect("third scene");
    assert_eq!(third_entry.placement(), None, "never-placed scene goes back to unplaced");
    assert!(!third_entry.is_parked());
    assert_eq!(
        reporter.events().last(),
        Some(&StageEvent::PassFinished {
            placed: 2,
            exhausted: 1
        })
    );
}

#[rstest]
fn exhausted_scene_returns_to_its_previous_placement(reporter: RecordingStageReporter) {
    let mut registry = SceneRegistry::new();
    add_scene(&mut registry);
    add_scene(&mut registry);
    let last = add_scene(&mut registry);
    let previous = Placement::at(DVec3::new(10.0, 0.0, 0.0));
    registry.place(last, previous);
    let mut coordinator = two_slots(RearrangeScope::All);
    coordinator.request();

    let steps: Vec<ArrangeStep> = (0..4)
        .map(|_| coordinator.advance(&mut registry, &reporter))
        .collect();

    assert_eq!(steps.get(2), Some(&ArrangeStep::Exhausted(last)));
    let entry = registry.get(last).expect("scene");
    assert_eq!(entry.placement(), Some(previous));
    assert!(!entry.is_parked());
    assert_eq!(
        registry.obstacles(last).len(),
        2,
        "restored scene still sees both placed neighbours"
    );
}

#[rstest]
fn new_scope_leaves_placed_scenes_alone(reporter: RecordingStageReporter) {
    let mut registry = SceneRegistry::new();
    let settled = add_scene(&mut registry);
    let fresh = add_scene(&mut registry);
    let anchor = DVec3::new(5.0, 5.0, 5.0);
    registry.place(settled, Placement::at(anchor));
    let mut coordinator = ArrangeCoordinator::with_strategy(
        Box::new(GridStrategy::new(DVec3::ZERO)),
        0.1,
        RearrangeScope::New,
    );
    coordinator.request();

    assert_eq!(coordinator.advance(&mut registry, &reporter), ArrangeStep::Placed(fresh));
    assert_eq!(coordinator.advance(&mut registry, &reporter), ArrangeStep::Finished);
    assert_eq!(translation(&registry, settled), Some(anchor));
    assert!(reporter.events().contains(&StageEvent::PassStarted(1)));
}

#[rstest]
fn requests_during_a_pass_start_one_more_pass(reporter: RecordingStageReporter) {
    let mut registry = SceneRegistry::new();
    let first = add_scene(&mut registry);
    let mut coordinator = two_slots(RearrangeScope::All);
    coordinator.request();

    assert_eq!(coordinator.advance(&mut registry, &reporter), ArrangeStep::Placed(first));
    coordinator.request();
    coordinator.request();
    assert_eq!(coordinator.advance(&mut registry, &reporter), ArrangeStep::Finished);
    assert_eq!(coordinator.advance(&mut registry, &reporter), ArrangeStep::Placed(first));
    assert_eq!(coordinator.advance(&mut registry, &reporter), ArrangeStep::Finished);
    assert_eq!(coordinator.advance(&mut registry, &reporter), ArrangeStep::Idle);
    assert_eq!(
        reporter.count(|event| matches!(event, StageEvent::PassStarted(_))),
        2
    );
}

#[rstest]
fn removed_scenes_are_skipped_mid_pass(reporter: RecordingStageReporter) {
    let mut registry = SceneRegistry::new();
    let first = add_scene(&mut registry);
    let removed = add_scene(&mut registry);
    let last = add_scene(&mut registry);
    let mut coordinator = two_slots(RearrangeScope::All);
    coordinator.request();

    assert_eq!(coordinator.advance(&mut registry, &reporter), ArrangeStep::Placed(first));
    registry.remove(removed);
    assert_eq!(coordinator.advance(&mut registry, &reporter), ArrangeStep::Placed(last));
    assert_eq!(coordinator.advance(&mut registry, &reporter), ArrangeStep::Finished);
}

#[rstest]
fn stage_tick_without_sessions_is_idle() {
    let (_sender, sessions) = mpsc::channel();
    let reporter = Arc::new(RecordingStageReporter::default());
    let mut stage = Stage::new(&Config::default(), sessions, reporter.clone());

    let summary = stage.tick();

    assert_eq!(summary.decoded, 0);
    assert_eq!(summary.resolved, 0);
    assert_eq!(summary.arrange, ArrangeStep::Idle);
    assert!(reporter.events().is_empty());
}

#[rstest]
fn stage_decodes_sessions_in_receipt_order() {
    let (sender, sessions) = mpsc::channel();
    let reporter = Arc::new(RecordingStageReporter::default());
    let mut stage = Stage::new(&Config::default(), sessions, reporter.clone());
    sender
        .send(Session::new(vec![axes_with_line(), "not a figure".to_owned()]))
        .expect("send first session");
    sender
        .send(Session::new(vec![axes_with_line()]))
        .expect("send second session");

    let summary = stage.tick();

    assert_eq!(summary.decoded, 2);
    assert_eq!(summary.resolved, 2);
    assert!(matches!(summary.arrange, ArrangeStep::Placed(_)));
    let decoded: Vec<StageEvent> = reporter
        .events()
        .into_iter()
        .filter(|event| {
            matches!(
                event,
                StageEvent::SceneDecoded(_) | StageEvent::SceneRejected(_)
            )
        })
        .collect();
    assert!(matches!(
        decoded.as_slice(),
        [
            StageEvent::SceneDecoded(_),
            StageEvent::SceneRejected(_),
            StageEvent::SceneDecoded(_)
        ]
    ));
    let bounds = stage
        .registry()
        .iter()
        .filter_map(|(_, entry)| entry.local_bounds())
        .count();
    assert_eq!(bounds, 2, "resolved scenes carry native-space bounds");
}

#[rstest]
fn clear_tears_down_every_scene() {
    let (sender, sessions) = mpsc::channel();
    let reporter = Arc::new(RecordingStageReporter::default());
    let mut stage = Stage::new(&Config::default(), sessions, reporter);
    sender
        .send(Session::new(vec![axes_with_line(), axes_with_line()]))
        .expect("send session");
    stage.tick();

    assert_eq!(stage.clear(), 2);
    assert!(stage.registry().is_empty());
}
