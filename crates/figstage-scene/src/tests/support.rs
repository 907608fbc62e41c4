//! Shared scene documents for tests.

use serde_json::{Value, json};

use crate::{SceneGraph, decode_scene};

pub(super) const LINE_CLASS: &str = "matlab.graphics.primitive.Line";

pub(super) fn figure(children: Value) -> String {
    json!({
        "ObjectClass": "matlab.ui.Figure",
        "Colormap": [[0.0, 0.0, 1.0], [1.0, 0.0, 0.0]],
        "Children": children,
    })
    .to_string()
}

pub(super) fn text(content: &str) -> Value {
    json!({"ObjectClass": "matlab.graphics.primitive.Text", "String": content})
}

/// Axes limited to `[0, 10] x [0, 10] x [0, 1]` around `children`.
pub(super) fn axes(children: Value) -> Value {
    json!({
        "ObjectClass": "matlab.graphics.axis.Axes",
        "XLim": [0, 10],
        "YLim": [0, 10],
        "ZLim": [0, 1],
        "XTick": [0, 5, 10],
        "XTickLabel": ["0", "5", "10"],
        "Children": children,
    })
}

pub(super) fn diagonal_line() -> Value {
    json!({"ObjectClass": LINE_CLASS, "XData": [0, 10], "YData": [0, 10]})
}

pub(super) fn triangle_patch() -> Value {
    json!({
        "ObjectClass": "matlab.graphics.primitive.Patch",
        "Vertices": [[0, 0, 0], [10, 0, 0], [0, 10, 0]],
        "Faces": [[1, 2, 3]],
    })
}

pub(super) fn decode_and_resolve(body: &str) -> SceneGraph {
    let mut graph = decode_scene(body).expect("scene should decode");
    graph.resolve();
    graph
}
