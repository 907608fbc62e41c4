//! Figure documents shared by the stage suites.

use serde_json::{Value, json};

use crate::frame::{END_MARKER, START_MARKER};

/// Figure document wrapping `children`.
pub fn figure(children: Value) -> String {
    json!({
        "ObjectClass": "matlab.ui.Figure",
        "Children": children,
    })
    .to_string()
}

/// Axes limited to `[0, 10]` on each axis holding one diagonal line.
pub fn axes_with_line() -> String {
    figure(json!([{
        "ObjectClass": "matlab.graphics.axis.Axes",
        "XLim": [0, 10],
        "YLim": [0, 10],
        "ZLim": [0, 1],
        "XTick": [],
        "Children": [{
            "ObjectClass": "matlab.graphics.primitive.Line",
            "XData": [0, 10],
            "YData": [0, 10],
        }],
    }]))
}

/// An unrecognised node next to a line.
pub fn line_beside_unknown() -> String {
    figure(json!([
        {"ObjectClass": "unknown.type", "XData": [1]},
        {
            "ObjectClass": "matlab.graphics.primitive.Line",
            "XData": [0, 1],
            "YData": [0, 1],
        },
    ]))
}

/// A normalized group whose parent never gains a usable size.
pub fn normalized_group_in_unsized_parent() -> String {
    figure(json!([{
        "ObjectClass": "matlab.graphics.primitive.Group",
        "Position": [0, 0, null, null],
        "Children": [{
            "ObjectClass": "matlab.graphics.primitive.Group",
            "Units": "normalized",
            "Position": [0.5, 0.5, 0],
            "Children": [],
        }],
    }]))
}

/// Frames `body` the way producers send it.
pub fn framed(body: &str) -> Vec<u8> {
    let length = u32::try_from(body.len()).expect("body fits in a u32 prefix");
    let mut bytes = START_MARKER.to_vec();
    bytes.extend_from_slice(&length.to_le_bytes());
    bytes.extend_from_slice(body.as_bytes());
    bytes.extend_from_slice(END_MARKER);
    bytes
}
