//! Resolved node geometry in figure pixel space.

use glam::{DVec2, DVec3};

use crate::colormap::Rgb;
use crate::mesh::Mesh;

/// Where a node sits relative to its parent and the figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Offset from the parent's origin.
    pub offset: DVec3,
    /// Offset from the figure origin.
    pub origin: DVec3,
    /// Width and height available to children, inherited when the node
    /// declares no size of its own. `None` when the declared size is not
    /// finite.
    pub extent: Option<DVec2>,
}

/// One scatter marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    /// Centre in the node's local frame.
    pub center: DVec3,
    /// Radius in pixels.
    pub radius: f64,
    /// Fill or edge colour.
    pub color: Rgb,
}

/// One tick along an axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Point on the axis line.
    pub position: DVec3,
    /// Far end of the tick mark.
    pub mark_end: DVec3,
    /// Where the tick label is anchored.
    pub label_anchor: DVec3,
    /// Label text.
    pub label: String,
}

/// Axis line with its ticks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisLine {
    /// Data origin of the axes.
    pub start: DVec3,
    /// Upper limit along this axis.
    pub end: DVec3,
    /// Ticks in document order.
    pub ticks: Vec<Tick>,
}

/// Per-variant geometry, local to the node's frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Containers draw nothing themselves.
    Empty,
    /// Axis lines for x, y and z.
    Axes(Box<[AxisLine; 3]>),
    /// Polyline vertices.
    Polyline(Vec<DVec3>),
    /// Scatter markers.
    Markers(Vec<Marker>),
    /// Patch surface.
    Mesh(Mesh),
    /// Text anchored at the node origin.
    Anchor,
}

impl Geometry {
    /// Points whose bounding box encloses the drawn geometry.
    #[must_use]
    pub fn extremes(&self) -> Vec<DVec3> {
        match self {
            Self::Empty | Self::Anchor => Vec::new(),
            Self::Axes(lines) => lines
                .iter()
                .flat_map(|line| {
                    [line.start, line.end]
                        .into_iter()
                        .chain(line.ticks.iter().flat_map(|tick| [tick.position, tick.mark_end]))
                })
                .collect(),
            Self::Polyline(points) => points.clone(),
            Self::Markers(markers) => markers
                .iter()
                .flat_map(|marker| {
                    let reach = DVec3::splat(marker.radius.abs());
                    [marker.center - reach, marker.center + reach]
                })
                .collect(),
            Self::Mesh(mesh) => mesh.vertices().to_vec(),
        }
    }
}

/// Outcome of resolving one node.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// Placement of the node.
    pub frame: Frame,
    /// Geometry in the node's local frame.
    pub geometry: Geometry,
}
