//! Graphic node variants and their decoded attributes.

use glam::{DVec2, DVec3};

use crate::colormap::{Colormap, Rgb};
use crate::field::ColorSpec;
use crate::geometry::Resolved;
use crate::mesh::Mesh;

/// Handle to a node in a [`SceneGraph`](crate::SceneGraph) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Measurement unit a node declares for its position and size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Unit {
    /// Figure pixels.
    #[default]
    Pixels,
    /// Fractions of the parent's extent.
    Normalized,
    /// Data coordinates of the nearest enclosing axes.
    Data,
    /// Already in the working coordinate space.
    Native,
}

impl Unit {
    /// Parses the producer's unit keyword.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "pixels" => Some(Self::Pixels),
            "normalized" => Some(Self::Normalized),
            "data" => Some(Self::Data),
            "Unity" => Some(Self::Native),
            _ => None,
        }
    }
}

/// Declared placement of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    /// A point, usually in data coordinates.
    Point(DVec3),
    /// A rectangle with its lower-left corner and size.
    Rect {
        /// Lower-left corner.
        origin: DVec2,
        /// Width and height.
        size: DVec2,
    },
}

/// Figure attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Figure {
    /// Window title.
    pub name: String,
    /// Figure number, when the producer assigned one.
    pub number: Option<i64>,
    /// Palette shared by every descendant.
    pub colormap: Colormap,
}

/// Nodes an axes positions itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxesLabels {
    /// Label of the x axis.
    pub x: Option<NodeId>,
    /// Label of the y axis.
    pub y: Option<NodeId>,
    /// Label of the z axis.
    pub z: Option<NodeId>,
    /// Title above the axes.
    pub title: Option<NodeId>,
}

/// Ticks along one axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ticks {
    /// Tick positions in data coordinates.
    pub values: Vec<f64>,
    /// Label per tick; missing labels read as empty.
    pub labels: Vec<String>,
}

/// Axes attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    /// Lower data limit per axis.
    pub lower: DVec3,
    /// Upper data limit per axis.
    pub upper: DVec3,
    /// Ticks for x, y and z.
    pub ticks: [Ticks; 3],
    /// Relative data scale per axis.
    pub aspect: DVec3,
    /// Label and title nodes.
    pub labels: AxesLabels,
}

/// Polyline attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    /// Vertices in data coordinates.
    pub points: Vec<DVec3>,
}

/// Scatter attributes with colours already expanded per point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scatter {
    /// Marker centres in data coordinates.
    pub points: Vec<DVec3>,
    /// Marker area per point, in square points.
    pub sizes: Vec<f64>,
    /// Marker colour per point.
    pub colors: Vec<Rgb>,
    /// Marker shape keyword.
    pub marker: String,
    /// Edge colour, flat or per vertex.
    pub edge_color: Option<ColorSpec>,
    /// Whether markers are drawn filled.
    pub filled: bool,
}

/// Patch attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// Double-sided mesh in data coordinates.
    pub mesh: Mesh,
    /// Face colour, flat or per vertex.
    pub face_color: Option<ColorSpec>,
    /// Edge colour, flat or per vertex.
    pub edge_color: Option<ColorSpec>,
}

/// Horizontal text anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    /// Anchor at the left edge.
    #[default]
    Left,
    /// Anchor at the centre.
    Center,
    /// Anchor at the right edge.
    Right,
}

/// Vertical text anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerticalAlignment {
    /// Anchor at the top edge.
    Top,
    /// Anchor at the middle.
    #[default]
    Middle,
    /// Anchor at the bottom edge.
    Bottom,
}

/// Text attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    /// Content, lines separated by `\n`.
    pub content: String,
    /// Horizontal anchor.
    pub horizontal: HorizontalAlignment,
    /// Vertical anchor.
    pub vertical: VerticalAlignment,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Font size in points.
    pub font_size: f64,
}

impl Default for Text {
    fn default() -> Self {
        Self {
            content: String::new(),
            horizontal: HorizontalAlignment::default(),
            vertical: VerticalAlignment::default(),
            rotation: 0.0,
            font_size: 10.0,
        }
    }
}

/// Closed set of graphic node variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Scene root.
    Figure(Figure),
    /// Plain container.
    Group,
    /// Data coordinate frame.
    Axes(Axes),
    /// Polyline.
    Line(Line),
    /// Point markers.
    Scatter(Scatter),
    /// Triangle mesh.
    Patch(Patch),
    /// Text label.
    Text(Text),
}

impl NodeKind {
    /// Variant name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Figure(_) => "figure",
            Self::Group => "group",
            Self::Axes(_) => "axes",
            Self::Line(_) => "line",
            Self::Scatter(_) => "scatter",
            Self::Patch(_) => "patch",
            Self::Text(_) => "text",
        }
    }

    /// Returns `true` for text nodes.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

/// One graphic node in the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) unit: Unit,
    pub(crate) position: Option<Position>,
    pub(crate) color: Rgb,
    pub(crate) kind: NodeKind,
    pub(crate) resolved: Option<Resolved>,
    pub(crate) needs_resolution: bool,
}

impl Node {
    pub(crate) const fn new(
        kind: NodeKind,
        unit: Unit,
        position: Option<Position>,
        color: Rgb,
    ) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            unit,
            position,
            color,
            kind,
            resolved: None,
            needs_resolution: true,
        }
    }

    /// Parent handle; `None` only for the root figure.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child handles in document order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Declared unit.
    #[must_use]
    pub const fn unit(&self) -> Unit {
        self.unit
    }

    /// Declared position.
    #[must_use]
    pub const fn position(&self) -> Option<Position> {
        self.position
    }

    /// Node colour.
    #[must_use]
    pub const fn color(&self) -> Rgb {
        self.color
    }

    /// Variant data.
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Resolved frame and geometry, once available.
    #[must_use]
    pub const fn resolved(&self) -> Option<&Resolved> {
        self.resolved.as_ref()
    }

    /// `true` until this node and every descendant are resolved.
    #[must_use]
    pub const fn needs_resolution(&self) -> bool {
        self.needs_resolution
    }
}
