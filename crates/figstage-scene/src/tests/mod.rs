//! Resolution and bounding-volume tests over decoded scenes.

mod behaviour;
mod support;

use glam::DVec3;
use rstest::rstest;
use serde_json::json;

use self::support::{axes, decode_and_resolve, diagonal_line, figure, text, triangle_patch};
use crate::{Deferred, Geometry, NodeId, NodeKind, Position, SceneGraph, Unit};

fn close(actual: DVec3, expected: DVec3) -> bool {
    actual.abs_diff_eq(expected, 1e-9)
}

fn find(graph: &SceneGraph, predicate: impl Fn(&NodeKind) -> bool) -> NodeId {
    graph
        .iter()
        .find(|(_, node)| predicate(node.kind()))
        .map(|(id, _)| id)
        .expect("node should exist")
}

fn geometry(graph: &SceneGraph, id: NodeId) -> &Geometry {
    &graph
        .node(id)
        .and_then(|node| node.resolved())
        .expect("node should be resolved")
        .geometry
}

#[rstest]
fn line_resolves_through_axes_scale() {
    let graph = decode_and_resolve(&figure(json!([axes(json!([diagonal_line()]))])));
    assert!(!graph.needs_resolution());
    assert_eq!(graph.descendants(graph.root()).len(), 2);

    let line = find(&graph, |kind| matches!(kind, NodeKind::Line(_)));
    let Geometry::Polyline(points) = geometry(&graph, line) else {
        panic!("expected a polyline");
    };
    let [start, end] = points.as_slice() else {
        panic!("expected two points");
    };
    assert!(close(*start, DVec3::new(70.0, 0.0, 21.0)), "{start}");
    assert!(close(*end, DVec3::new(490.0, 420.0, 21.0)), "{end}");
    // Ten data units span 420 pixels at a scale of 42.
    assert!((start.distance(*end) - 420.0 * 2.0_f64.sqrt()).abs() < 1e-9);
}

#[rstest]
fn axes_draw_ticks_along_each_axis() {
    let graph = decode_and_resolve(&figure(json!([axes(json!([]))])));
    let axes_id = find(&graph, |kind| matches!(kind, NodeKind::Axes(_)));
    let Geometry::Axes(lines) = geometry(&graph, axes_id) else {
        panic!("expected axis lines");
    };
    let [x_axis, y_axis, z_axis] = &**lines;
    assert!(close(x_axis.end, DVec3::new(490.0, 0.0, 21.0)));
    assert!(close(y_axis.end, DVec3::new(70.0, 420.0, 21.0)));
    assert!(close(z_axis.end, DVec3::new(70.0, 0.0, -21.0)));

    let positions: Vec<DVec3> = x_axis.ticks.iter().map(|tick| tick.position).collect();
    assert!(close(positions[1], DVec3::new(280.0, 0.0, 21.0)));
    let middle = &x_axis.ticks[1];
    assert_eq!(middle.label, "5");
    let mark = middle.mark_end - middle.position;
    assert!((mark.length() - 10.0).abs() < 1e-9);
    assert!(mark.x.abs() < 1e-12 && mark.y < 0.0 && mark.z > 0.0);
    assert!(close(middle.label_anchor - middle.position, mark * 2.0));
}

#[rstest]
fn axis_labels_and_title_are_repositioned() {
    let mut body_axes = axes(json!([diagonal_line()]));
    body_axes["XLabel"] = text("x");
    body_axes["Title"] = text("title");
    let graph = decode_and_resolve(&figure(json!([body_axes])));
    assert!(!graph.needs_resolution());

    let axes_id = find(&graph, |kind| matches!(kind, NodeKind::Axes(_)));
    let NodeKind::Axes(decoded) = graph.node(axes_id).expect("axes").kind() else {
        panic!("expected axes");
    };
    let label = graph.node(decoded.labels.x.expect("x label")).expect("label");
    assert_eq!(label.unit(), Unit::Data);
    let offset = label.resolved().expect("label resolved").frame.offset;
    assert!(close(offset, DVec3::new(280.0, -84.0, 29.4)), "{offset}");

    let title = graph.node(decoded.labels.title.expect("title")).expect("title");
    assert_eq!(title.unit(), Unit::Native);
    assert!(matches!(title.position(), Some(Position::Point(_))));
    let offset = title.resolved().expect("title resolved").frame.offset;
    assert!(close(offset, DVec3::new(280.0, 525.0, 10.5)), "{offset}");
}

#[rstest]
fn bounds_exclude_text_and_scale_to_native_units() {
    let mut body_axes = axes(json!([diagonal_line()]));
    body_axes["XTick"] = json!([]);
    body_axes["Title"] = text("far above");
    let graph = decode_and_resolve(&figure(json!([body_axes])));
    let bounds = graph.bounds(1000.0).expect("scene has geometry");
    assert!(close(bounds.min(), DVec3::new(0.07, 0.0, -0.021)), "{}", bounds.min());
    assert!(close(bounds.max(), DVec3::new(0.49, 0.42, 0.021)), "{}", bounds.max());
}

#[rstest]
fn scatter_markers_resolve_with_radius() {
    let scatter = json!({
        "ObjectClass": "matlab.graphics.chart.primitive.Scatter",
        "XData": [5],
        "YData": [5],
        "SizeData": [36],
    });
    let graph = decode_and_resolve(&figure(json!([axes(json!([scatter]))])));
    let id = find(&graph, |kind| matches!(kind, NodeKind::Scatter(_)));
    let Geometry::Markers(markers) = geometry(&graph, id) else {
        panic!("expected markers");
    };
    let [marker] = markers.as_slice() else {
        panic!("expected one marker");
    };
    assert!(close(marker.center, DVec3::new(280.0, 210.0, 21.0)));
    let expected = 2.0 * (36.0 / std::f64::consts::PI).sqrt();
    assert!((marker.radius - expected).abs() < 1e-12);
}

#[rstest]
fn patch_vertices_convert_on_both_sides() {
    let graph = decode_and_resolve(&figure(json!([axes(json!([triangle_patch()]))])));
    let id = find(&graph, |kind| matches!(kind, NodeKind::Patch(_)));
    let Geometry::Mesh(mesh) = geometry(&graph, id) else {
        panic!("expected a mesh");
    };
    assert_eq!(mesh.vertices().len(), 6);
    assert!(close(mesh.vertices()[1], DVec3::new(490.0, 0.0, 21.0)));
    assert!(close(mesh.vertices()[4], DVec3::new(490.0, 0.0, 21.0)));
    assert!(close(mesh.normals()[0], -mesh.normals()[3]));
}

#[rstest]
fn normalized_units_scale_by_parent_extent() {
    let body = figure(json!([{
        "ObjectClass": "matlab.graphics.primitive.Group",
        "Units": "normalized",
        "Position": [0.5, 0.25, 0.5, 0.5],
        "Children": [{"ObjectClass": "matlab.graphics.primitive.Group"}],
    }]));
    let graph = decode_and_resolve(&body);
    let [group] = graph.children(graph.root()) else {
        panic!("expected one group");
    };
    let frame = graph.node(*group).and_then(|node| node.resolved()).expect("resolved").frame;
    assert!(close(frame.offset, DVec3::new(280.0, 105.0, 0.0)));
    assert_eq!(frame.extent, Some(glam::DVec2::new(280.0, 210.0)));

    let inner = graph.children(*group)[0];
    let inner_frame = graph.node(inner).and_then(|node| node.resolved()).expect("resolved").frame;
    assert!(close(inner_frame.origin, DVec3::new(280.0, 105.0, 0.0)));
    assert_eq!(inner_frame.extent, frame.extent);
}

#[rstest]
fn nodes_without_a_usable_extent_stay_pending() {
    let body = figure(json!([{
        "ObjectClass": "matlab.graphics.primitive.Group",
        "Position": [0, 0, null, null],
        "Children": [{
            "ObjectClass": "matlab.graphics.primitive.Group",
            "Units": "normalized",
            "Position": [0.5, 0.5, 0],
            "Children": [diagonal_line()],
        }],
    }]));
    let mut graph = crate::decode_scene(&body).expect("scene decodes");
    let report = graph.resolve();
    assert!(!report.is_complete());
    assert_eq!(report.deferred.len(), 2);
    assert_eq!(report.deferred[0].1, Deferred::MissingParentExtent);
    assert_eq!(report.deferred[1].1, Deferred::ParentPending);
    assert!(graph.needs_resolution());

    let retry = graph.resolve();
    assert_eq!(retry.deferred.len(), 2);
    assert!(graph.needs_resolution());
}

#[rstest]
fn data_outside_axes_passes_through() {
    let graph = decode_and_resolve(&figure(json!([diagonal_line()])));
    let line = find(&graph, |kind| matches!(kind, NodeKind::Line(_)));
    let Geometry::Polyline(points) = geometry(&graph, line) else {
        panic!("expected a polyline");
    };
    assert_eq!(points, &vec![DVec3::ZERO, DVec3::new(10.0, 10.0, 0.0)]);
}
