//! Scene graphs decoded from figure documents.
//!
//! A message body is a nested document describing one figure. [`decode_scene`]
//! turns it into a [`SceneGraph`]: an arena of [`Node`]s addressed by
//! [`NodeId`], each tagged with a [`NodeKind`] variant. Nodes that fail to
//! decode are dropped with their subtree while their siblings survive.
//!
//! [`SceneGraph::resolve`] then converts every node's declared units into
//! figure pixels. Resolution may need several passes; until every node has
//! resolved, [`SceneGraph::needs_resolution`] stays `true`. Once it is clear,
//! [`SceneGraph::bounds`] yields the scene's bounding box in native units for
//! the placement engine.
//!
//! # Example
//!
//! ```ignore
//! use figstage_scene::decode_scene;
//!
//! let mut graph = decode_scene(body)?;
//! while !graph.resolve().is_complete() {}
//! let bounds = graph.bounds(1000.0);
//! ```

mod bounds;
mod colormap;
mod decode;
mod error;
mod field;
mod geometry;
mod graph;
mod mesh;
mod node;
mod resolve;
mod units;

pub use colormap::{Colormap, Rgb};
pub use decode::decode_scene;
pub use error::{DecodeError, Deferred};
pub use field::{ColorSpec, MatrixOrVec};
pub use geometry::{AxisLine, Frame, Geometry, Marker, Resolved, Tick};
pub use graph::SceneGraph;
pub use mesh::Mesh;
pub use node::{
    Axes, AxesLabels, Figure, HorizontalAlignment, Line, Node, NodeId, NodeKind, Patch, Position,
    Scatter, Text, Ticks, Unit, VerticalAlignment,
};
pub use resolve::{DEFAULT_FIGURE_EXTENT, ResolutionReport};
pub use units::{AxesFrame, Conversion};

#[cfg(test)]
mod tests;
