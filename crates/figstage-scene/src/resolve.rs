//! Resolution of declared units into figure pixel geometry.
//!
//! A pass walks the graph in pre-order so every node sees its parent's frame
//! from the same pass. Axes nodes reposition their axis labels before their
//! children resolve and position their title after the rest of their
//! children, since the title sits above whatever the axes ended up drawing.

use figstage_layout::Aabb;
use glam::{BVec3, DVec2, DVec3};
use tracing::{debug, warn};

use crate::error::Deferred;
use crate::geometry::{AxisLine, Frame, Geometry, Marker, Resolved, Tick};
use crate::graph::SceneGraph;
use crate::node::{Axes, AxesLabels, Node, NodeId, NodeKind, Position, Ticks, Unit};
use crate::units::{AxesFrame, Conversion};

const RESOLVE_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::resolve");

/// Figure size in pixels when the figure declares none.
pub const DEFAULT_FIGURE_EXTENT: DVec2 = DVec2::new(560.0, 420.0);

const TICK_LENGTH: f64 = 10.0;
const LABEL_OFFSET_FRACTION: f64 = 0.2;
const TITLE_LIFT: f64 = 1.5;
const AXIS_MASKS: [BVec3; 3] = [
    BVec3::new(true, false, false),
    BVec3::new(false, true, false),
    BVec3::new(false, false, true),
];

/// Outcome of one resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    /// Nodes that resolved on this pass.
    pub resolved: usize,
    /// Nodes that must wait for a later pass, with the reason.
    pub deferred: Vec<(NodeId, Deferred)>,
}

impl ResolutionReport {
    /// Returns `true` when no node was deferred.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.deferred.is_empty()
    }
}

impl SceneGraph {
    /// Runs one resolution pass over the whole graph.
    ///
    /// Nodes that cannot resolve yet are recorded in the report and keep
    /// [`Node::needs_resolution`] set, as do all their ancestors.
    pub fn resolve(&mut self) -> ResolutionReport {
        let mut report = ResolutionReport::default();
        self.resolve_subtree(self.root(), &mut report);
        debug!(
            target: RESOLVE_TARGET,
            resolved = report.resolved,
            deferred = report.deferred.len(),
            "resolution pass finished"
        );
        report
    }

    fn resolve_subtree(&mut self, id: NodeId, report: &mut ResolutionReport) {
        let Some(outcome) = self.node(id).map(|node| self.resolve_node(id, node)) else {
            return;
        };
        let resolved = match outcome {
            Ok(resolved) => {
                report.resolved += 1;
                Some(resolved)
            }
            Err(reason) => {
                debug!(
                    target: RESOLVE_TARGET,
                    node = id.index(),
                    reason = %reason,
                    "deferring node"
                );
                report.deferred.push((id, reason));
                None
            }
        };
        if let Some(node) = self.node_mut(id) {
            node.resolved = resolved;
        }

        let children = self.children(id).to_vec();
        let labels = self.axes_labels(id);
        let title = labels.and_then(|declared| declared.title);
        if let Some(declared) = labels {
            self.place_axis_labels(id, declared);
        }
        for &child in children.iter().filter(|&&child| Some(child) != title) {
            self.resolve_subtree(child, report);
        }
        if let Some(title) = title {
            self.place_title(id, title);
            self.resolve_subtree(title, report);
        }

        let pending = self.node(id).is_none_or(|node| node.resolved.is_none())
            || children
                .iter()
                .any(|&child| self.node(child).is_some_and(Node::needs_resolution));
        if let Some(node) = self.node_mut(id) {
            node.needs_resolution = pending;
        }
    }

    fn resolve_node(&self, id: NodeId, node: &Node) -> Result<Resolved, Deferred> {
        let parent_frame = match node.parent() {
            None => None,
            Some(parent) => Some(
                self.node(parent)
                    .and_then(Node::resolved)
                    .ok_or(Deferred::ParentPending)?
                    .frame,
            ),
        };
        let offset = self.offset(id, node, parent_frame.as_ref())?;
        let inherited = parent_frame
            .as_ref()
            .map_or(Some(DEFAULT_FIGURE_EXTENT), |frame| frame.extent);
        let frame = Frame {
            offset,
            origin: parent_frame.map_or(DVec3::ZERO, |frame| frame.origin) + offset,
            extent: match self.own_extent(id, node, parent_frame.as_ref())? {
                Some(size) => size.is_finite().then_some(size),
                None => inherited,
            },
        };
        let geometry = self.geometry(id, node, &frame)?;
        Ok(Resolved { frame, geometry })
    }

    /// Offset of the node's origin from its parent's origin, in pixels.
    fn offset(
        &self,
        id: NodeId,
        node: &Node,
        parent: Option<&Frame>,
    ) -> Result<DVec3, Deferred> {
        let point = match node.position() {
            None => return Ok(DVec3::ZERO),
            Some(Position::Point(point)) => point,
            Some(Position::Rect { origin, .. }) => origin.extend(0.0),
        };
        match node.unit() {
            Unit::Pixels | Unit::Native => Ok(point),
            Unit::Normalized => {
                let extent = parent_extent(parent)?;
                Ok(point * extent.extend(1.0))
            }
            Unit::Data => self.data_to_pixels(id, point, Conversion::Absolute),
        }
    }

    /// Size the node declares for itself, converted to pixels.
    fn own_extent(
        &self,
        id: NodeId,
        node: &Node,
        parent: Option<&Frame>,
    ) -> Result<Option<DVec2>, Deferred> {
        let Some(Position::Rect { size, .. }) = node.position() else {
            return Ok(None);
        };
        let converted = match node.unit() {
            Unit::Pixels | Unit::Native => size,
            Unit::Normalized => size * parent_extent(parent)?,
            Unit::Data => self
                .data_to_pixels(id, size.extend(0.0), Conversion::Relative)?
                .truncate(),
        };
        Ok(Some(converted))
    }

    fn geometry(&self, id: NodeId, node: &Node, frame: &Frame) -> Result<Geometry, Deferred> {
        let geometry = match node.kind() {
            NodeKind::Figure(_) | NodeKind::Group => Geometry::Empty,
            NodeKind::Text(_) => Geometry::Anchor,
            NodeKind::Axes(axes) => {
                let extent = frame.extent.ok_or(Deferred::MissingParentExtent)?;
                Geometry::Axes(Box::new(decorations(axes, &AxesFrame::new(axes, extent))))
            }
            NodeKind::Line(line) => {
                let convert = self.data_converter(id)?;
                Geometry::Polyline(line.points.iter().map(|&point| convert(point)).collect())
            }
            NodeKind::Scatter(scatter) => {
                let convert = self.data_converter(id)?;
                Geometry::Markers(
                    scatter
                        .points
                        .iter()
                        .zip(&scatter.sizes)
                        .zip(&scatter.colors)
                        .map(|((&point, &size), &color)| Marker {
                            center: convert(point),
                            radius: marker_radius(size),
                            color,
                        })
                        .collect(),
                )
            }
            NodeKind::Patch(patch) => {
                Geometry::Mesh(patch.mesh.map_vertices(self.data_converter(id)?))
            }
        };
        Ok(geometry)
    }

    /// Data-to-pixel mapping of the nearest enclosing axes.
    ///
    /// Without an enclosing axes the coordinates pass through unchanged.
    fn data_converter(&self, id: NodeId) -> Result<impl Fn(DVec3) -> DVec3 + use<>, Deferred> {
        let frame = self.data_frame(id)?;
        if frame.is_none() {
            warn!(
                target: RESOLVE_TARGET,
                node = id.index(),
                "data coordinates outside any axes; using them as pixels"
            );
        }
        Ok(move |point| frame.map_or(point, |axes| axes.to_pixels(point, Conversion::Absolute)))
    }

    fn data_to_pixels(
        &self,
        id: NodeId,
        point: DVec3,
        conversion: Conversion,
    ) -> Result<DVec3, Deferred> {
        match self.data_frame(id)? {
            Some(frame) => Ok(frame.to_pixels(point, conversion)),
            None => {
                warn!(
                    target: RESOLVE_TARGET,
                    node = id.index(),
                    "data position outside any axes; using it as pixels"
                );
                Ok(point)
            }
        }
    }

    fn data_frame(&self, id: NodeId) -> Result<Option<AxesFrame>, Deferred> {
        let Some(axes_id) = self.nearest_axes(id) else {
            return Ok(None);
        };
        let node = self.node(axes_id).ok_or(Deferred::ParentPending)?;
        let NodeKind::Axes(axes) = node.kind() else {
            return Ok(None);
        };
        let extent = node
            .resolved()
            .ok_or(Deferred::ParentPending)?
            .frame
            .extent
            .ok_or(Deferred::MissingParentExtent)?;
        Ok(Some(AxesFrame::new(axes, extent)))
    }

    fn axes_labels(&self, id: NodeId) -> Option<AxesLabels> {
        match self.node(id).map(Node::kind) {
            Some(NodeKind::Axes(axes)) => Some(axes.labels),
            _ => None,
        }
    }

    /// Moves the axis labels to mid-span of their axis, pushed out along the
    /// other two axes by a fifth of the span.
    fn place_axis_labels(&mut self, axes_id: NodeId, labels: AxesLabels) {
        let Some(NodeKind::Axes(axes)) = self.node(axes_id).map(Node::kind) else {
            return;
        };
        let lower = axes.lower;
        let span = axes.upper - axes.lower;
        for (label, mask) in [labels.x, labels.y, labels.z].into_iter().zip(AXIS_MASKS) {
            let Some(node) = label.and_then(|label_id| self.node_mut(label_id)) else {
                continue;
            };
            let position = lower + DVec3::select(mask, span * 0.5, -span * LABEL_OFFSET_FRACTION);
            node.unit = Unit::Data;
            node.position = Some(Position::Point(position));
        }
    }

    /// Centres the title above everything the axes draws except text.
    fn place_title(&mut self, axes_id: NodeId, title: NodeId) {
        let Some(node) = self.node(axes_id) else {
            return;
        };
        let (NodeKind::Axes(axes), Some(resolved)) = (node.kind(), node.resolved()) else {
            return;
        };
        let Some(extent) = resolved.frame.extent else {
            return;
        };
        let frame = AxesFrame::new(axes, extent);
        let centre = frame.to_pixels(axes.lower + frame.span() * 0.5, Conversion::Absolute);
        let origin = resolved.frame.origin;

        let drawn: Vec<DVec3> = self
            .children(axes_id)
            .iter()
            .filter(|&&child| child != title)
            .flat_map(|&child| std::iter::once(child).chain(self.descendants(child)))
            .filter(|&member| !self.within_text(member))
            .filter_map(|member| self.node(member).and_then(Node::resolved))
            .flat_map(|member| {
                let shift = member.frame.origin - origin;
                member
                    .geometry
                    .extremes()
                    .into_iter()
                    .map(move |point| point + shift)
            })
            .collect();
        let Some(bounds) = Aabb::enclosing(std::iter::once(centre).chain(drawn)) else {
            return;
        };
        let position = bounds.center() + DVec3::new(0.0, bounds.half_extents().y * TITLE_LIFT, 0.0);

        if let Some(title_node) = self.node_mut(title) {
            title_node.unit = Unit::Native;
            title_node.position = Some(Position::Point(position));
        }
    }
}

fn parent_extent(parent: Option<&Frame>) -> Result<DVec2, Deferred> {
    parent
        .ok_or(Deferred::MissingParent)?
        .extent
        .ok_or(Deferred::MissingParentExtent)
}

/// Marker radius in pixels for a marker area in square points.
fn marker_radius(size: f64) -> f64 {
    2.0 * (size.max(0.0) / std::f64::consts::PI).sqrt()
}

fn component(value: DVec3, mask: BVec3) -> f64 {
    DVec3::select(mask, value, DVec3::ZERO).element_sum()
}

fn decorations(axes: &Axes, frame: &AxesFrame) -> [AxisLine; 3] {
    let start = frame.to_pixels(axes.lower, Conversion::Absolute);
    let [x_mask, y_mask, z_mask] = AXIS_MASKS;
    let [x_ticks, y_ticks, z_ticks] = &axes.ticks;
    [
        axis_line(axes, frame, start, x_mask, x_ticks),
        axis_line(axes, frame, start, y_mask, y_ticks),
        axis_line(axes, frame, start, z_mask, z_ticks),
    ]
}

fn axis_line(
    axes: &Axes,
    frame: &AxesFrame,
    start: DVec3,
    mask: BVec3,
    declared: &Ticks,
) -> AxisLine {
    let end = frame.to_pixels(DVec3::select(mask, axes.upper, axes.lower), Conversion::Absolute);
    let lower = component(axes.lower, mask);
    let span = component(axes.upper - axes.lower, mask);
    // Ticks point away from the data box along the other two axes.
    let direction =
        DVec3::select(mask, DVec3::ZERO, DVec3::NEG_ONE).normalize() * DVec3::new(1.0, 1.0, -1.0);
    let mark = direction * TICK_LENGTH;

    let ticks = declared
        .values
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            let fraction = if span == 0.0 { 0.0 } else { (value - lower) / span };
            let position = start.lerp(end, fraction);
            Tick {
                position,
                mark_end: position + mark,
                label_anchor: position + mark * 2.0,
                label: declared.labels.get(index).cloned().unwrap_or_default(),
            }
        })
        .collect();
    AxisLine { start, end, ticks }
}
