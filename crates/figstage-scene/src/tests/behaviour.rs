//! Behaviour-driven tests for decoding and resolving scenes.

use std::cell::RefCell;

use glam::DVec3;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::json;

use super::support::{LINE_CLASS, axes, diagonal_line, figure, triangle_patch};
use crate::{DecodeError, Geometry, NodeKind, ResolutionReport, SceneGraph, decode_scene};

#[derive(Default)]
struct TestWorld {
    body: String,
    graph: Option<SceneGraph>,
    report: Option<ResolutionReport>,
    error: Option<DecodeError>,
}

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

impl TestWorld {
    fn graph(&self) -> &SceneGraph {
        self.graph.as_ref().expect("scene should have decoded")
    }
}

#[given("a figure whose axes contain a diagonal line")]
fn given_line_in_axes(world: &RefCell<TestWorld>) {
    world.borrow_mut().body = figure(json!([axes(json!([diagonal_line()]))]));
}

#[given("a figure with an unknown node beside a line")]
fn given_unknown_sibling(world: &RefCell<TestWorld>) {
    world.borrow_mut().body = figure(json!([
        {"ObjectClass": "unknown.type", "XData": [1]},
        {"ObjectClass": LINE_CLASS, "XData": [0, 1], "YData": [0, 1]},
    ]));
}

#[given("a figure whose axes contain a triangle patch")]
fn given_patch(world: &RefCell<TestWorld>) {
    world.borrow_mut().body = figure(json!([axes(json!([triangle_patch()]))]));
}

#[given("a normalized group inside a group without a usable size")]
fn given_unsized_parent(world: &RefCell<TestWorld>) {
    world.borrow_mut().body = figure(json!([{
        "ObjectClass": "matlab.graphics.primitive.Group",
        "Position": [0, 0, null, null],
        "Children": [{
            "ObjectClass": "matlab.graphics.primitive.Group",
            "Units": "normalized",
            "Position": [0.5, 0.5, 0],
        }],
    }]));
}

#[given("a message whose root is a line")]
fn given_line_root(world: &RefCell<TestWorld>) {
    world.borrow_mut().body = diagonal_line().to_string();
}

#[when("the scene is decoded and resolved")]
fn when_decoded(world: &RefCell<TestWorld>) {
    let mut state = world.borrow_mut();
    match decode_scene(&state.body) {
        Ok(mut graph) => {
            state.report = Some(graph.resolve());
            state.graph = Some(graph);
        }
        Err(error) => state.error = Some(error),
    }
}

#[then("the scene is fully resolved")]
fn then_resolved(world: &RefCell<TestWorld>) {
    let state = world.borrow();
    assert!(state.report.as_ref().is_some_and(ResolutionReport::is_complete));
    assert!(!state.graph().needs_resolution());
}

#[then("the scene still needs resolution")]
fn then_pending(world: &RefCell<TestWorld>) {
    let state = world.borrow();
    assert!(state.report.as_ref().is_some_and(|report| !report.is_complete()));
    assert!(state.graph().needs_resolution());
}

#[then("the figure has {count} descendants")]
fn then_descendants(world: &RefCell<TestWorld>, count: usize) {
    let state = world.borrow();
    let graph = state.graph();
    assert_eq!(graph.descendants(graph.root()).len(), count);
}

#[then("line point {index} sits at pixel x {x} y {y} z {z}")]
fn then_line_point(world: &RefCell<TestWorld>, index: usize, x: f64, y: f64, z: f64) {
    let state = world.borrow();
    let graph = state.graph();
    let point = graph
        .iter()
        .filter(|(_, node)| matches!(node.kind(), NodeKind::Line(_)))
        .find_map(|(_, node)| match node.resolved().map(|resolved| &resolved.geometry) {
            Some(Geometry::Polyline(points)) => points.get(index).copied(),
            _ => None,
        })
        .expect("line point should be resolved");
    assert!(point.abs_diff_eq(DVec3::new(x, y, z), 1e-9), "{point}");
}

#[then("the patch has {vertices} vertices and {faces} faces")]
fn then_patch_counts(world: &RefCell<TestWorld>, vertices: usize, faces: usize) {
    let state = world.borrow();
    let mesh = state
        .graph()
        .iter()
        .find_map(|(_, node)| match node.kind() {
            NodeKind::Patch(patch) => Some(&patch.mesh),
            _ => None,
        })
        .expect("patch should be present");
    assert_eq!(mesh.vertices().len(), vertices);
    assert_eq!(mesh.faces().len(), faces);
}

#[then("the message is rejected as not a figure")]
fn then_rejected(world: &RefCell<TestWorld>) {
    let state = world.borrow();
    assert!(matches!(state.error, Some(DecodeError::NotAFigure { .. })));
    assert!(state.graph.is_none());
}

#[scenario(path = "tests/features/scene.feature")]
fn scene_behaviour(world: RefCell<TestWorld>) {
    let _ = world;
}
