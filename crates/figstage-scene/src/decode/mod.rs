//! Builds a [`SceneGraph`] from a message body.
//!
//! Decoding happens in two steps per node: every field of the node document
//! is read and validated first, and only then is the node placed in the arena
//! and its children decoded. A node that fails validation therefore leaves
//! nothing behind, and the failure stays confined to that node's subtree.

mod variants;


use serde_json::Value;
use tracing::{debug, warn};

use crate::colormap::Colormap;
use crate::error::DecodeError;
use crate::field::{self, Document};
use crate::graph::SceneGraph;
use crate::node::{AxesLabels, Node, NodeId, NodeKind, Position, Unit};

const DECODE_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::decode");

/// Discriminator values understood by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Figure,
    Group,
    Axes,
    Line,
    Scatter,
    Patch,
    Text,
}

impl Class {
    fn parse(object_class: &str) -> Option<Self> {
        match object_class {
            "matlab.ui.Figure" => Some(Self::Figure),
            "matlab.graphics.primitive.Group" => Some(Self::Group),
            "matlab.graphics.axis.Axes" => Some(Self::Axes),
            "matlab.graphics.primitive.Line" | "matlab.graphics.chart.primitive.Line" => {
                Some(Self::Line)
            }
            "matlab.graphics.chart.primitive.Scatter" => Some(Self::Scatter),
            "matlab.graphics.primitive.Patch" => Some(Self::Patch),
            "matlab.graphics.primitive.Text" => Some(Self::Text),
            _ => None,
        }
    }

    fn read(doc: &Document) -> Result<Self, DecodeError> {
        match doc.get("ObjectClass") {
            None | Some(Value::Null) => Err(DecodeError::MissingClass),
            Some(Value::String(class)) => Self::parse(class).ok_or_else(|| {
                DecodeError::UnknownClass {
                    class: class.clone(),
                }
            }),
            Some(other) => Err(DecodeError::UnknownClass {
                class: other.to_string(),
            }),
        }
    }
}

/// State shared by every node of one message.
struct DecodeContext {
    colormap: Colormap,
}

/// Attributes every node carries.
struct Common {
    unit: Unit,
    position: Option<Position>,
    color: [f64; 3],
}

impl Common {
    fn read(doc: &Document) -> Result<Self, DecodeError> {
        let unit = match field::text(doc, "Units")? {
            None => Unit::default(),
            Some(keyword) => Unit::from_keyword(&keyword).ok_or_else(|| {
                DecodeError::field_shape("Units", "one of pixels, normalized, data or Unity")
            })?,
        };
        let position = match field::numbers(doc, "Position")?.as_deref() {
            None | Some([]) => None,
            Some(&[x, y, z]) => Some(Position::Point(glam::DVec3::new(x, y, z))),
            Some(&[x, y, width, height]) => Some(Position::Rect {
                origin: glam::DVec2::new(x, y),
                size: glam::DVec2::new(width, height),
            }),
            Some(_) => return Err(DecodeError::field_shape("Position", "3 or 4 numbers")),
        };
        let color = field::fixed::<3>(doc, "Color", "an RGB triple")?.unwrap_or_default();
        Ok(Self {
            unit,
            position,
            color,
        })
    }

    const fn into_node(self, kind: NodeKind) -> Node {
        Node::new(kind, self.unit, self.position, self.color)
    }
}

/// Decodes one message body into a scene graph.
///
/// The root document is always read as a figure. Child nodes that fail to
/// decode are logged and dropped together with their subtree.
///
/// # Errors
///
/// Fails when the body is not JSON, when the root is not a figure, or when
/// the root figure's own fields are malformed.
pub fn decode_scene(body: &str) -> Result<SceneGraph, DecodeError> {
    let value: Value =
        serde_json::from_str(body).map_err(|source| DecodeError::Parse { source })?;
    let Value::Object(doc) = &value else {
        return Err(DecodeError::NotAFigure {
            class: json_kind(&value).to_owned(),
        });
    };

    // A root without a discriminator is read as a figure.
    match doc.get("ObjectClass") {
        None | Some(Value::Null) => {}
        Some(Value::String(class)) if Class::parse(class) == Some(Class::Figure) => {}
        Some(other) => {
            return Err(DecodeError::NotAFigure {
                class: other
                    .as_str()
                    .map_or_else(|| other.to_string(), str::to_owned),
            });
        }
    }

    let mut common = Common::read(doc)?;
    if common.unit != Unit::Pixels {
        warn!(
            target: DECODE_TARGET,
            unit = ?common.unit,
            "figure units other than pixels are not supported; using pixels"
        );
        common.unit = Unit::Pixels;
    }
    let figure = variants::figure(doc)?;
    let context = DecodeContext {
        colormap: figure.colormap.clone(),
    };

    let mut graph = SceneGraph::with_root(common.into_node(NodeKind::Figure(figure)));
    let root = graph.root();
    decode_list(&mut graph, root, doc, "Children", &context);
    debug!(
        target: DECODE_TARGET,
        nodes = graph.len(),
        "decoded figure"
    );
    Ok(graph)
}

/// Decodes every node listed under `field` as children of `parent`.
///
/// Returns the handles of the nodes that decoded successfully.
fn decode_list(
    graph: &mut SceneGraph,
    parent: NodeId,
    doc: &Document,
    field_name: &'static str,
    context: &DecodeContext,
) -> Vec<NodeId> {
    field::nodes(doc, field_name)
        .into_iter()
        .filter_map(|child| match decode_node(graph, parent, child, context) {
            Ok(id) => Some(id),
            Err(error) => {
                warn!(
                    target: DECODE_TARGET,
                    field = field_name,
                    error = %error,
                    "dropping node that failed to decode"
                );
                None
            }
        })
        .collect()
}

fn decode_node(
    graph: &mut SceneGraph,
    parent: NodeId,
    value: &Value,
    context: &DecodeContext,
) -> Result<NodeId, DecodeError> {
    let Value::Object(doc) = value else {
        return Err(DecodeError::field_shape("Children", "node documents"));
    };
    let class = Class::read(doc)?;
    let common = Common::read(doc)?;
    let kind = match class {
        Class::Figure => {
            return Err(DecodeError::field_shape(
                "ObjectClass",
                "a graphics class; figures cannot be nested",
            ));
        }
        Class::Group => NodeKind::Group,
        Class::Axes => NodeKind::Axes(variants::axes(doc)?),
        Class::Line => NodeKind::Line(variants::line(doc)?),
        Class::Scatter => {
            NodeKind::Scatter(variants::scatter(doc, &context.colormap, common.color)?)
        }
        Class::Patch => NodeKind::Patch(variants::patch(doc, &context.colormap)?),
        Class::Text => NodeKind::Text(variants::text(doc)?),
    };

    let id = graph.attach(parent, common.into_node(kind));
    decode_list(graph, id, doc, "Children", context);
    if class == Class::Axes {
        let labels = AxesLabels {
            x: decode_list(graph, id, doc, "XLabel", context).first().copied(),
            y: decode_list(graph, id, doc, "YLabel", context).first().copied(),
            z: decode_list(graph, id, doc, "ZLabel", context).first().copied(),
            title: decode_list(graph, id, doc, "Title", context).first().copied(),
        };
        if let Some(NodeKind::Axes(axes)) = graph.node_mut(id).map(|node| &mut node.kind) {
            axes.labels = labels;
        }
    }
    Ok(id)
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
