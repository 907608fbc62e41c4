//! Error and deferral types for decoding and resolution.

use thiserror::Error;

/// Errors raised while decoding a scene document.
///
/// [`DecodeError::Parse`] and [`DecodeError::NotAFigure`] fail the whole
/// message. Every other variant is scoped to one node: the decoder drops that
/// node and its subtree and continues with its siblings.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body is not a well-formed document.
    #[error("message body is not valid JSON: {source}")]
    Parse {
        /// Underlying parser failure.
        #[source]
        source: serde_json::Error,
    },

    /// The root document is not a figure.
    #[error("root node is '{class}', expected a figure")]
    NotAFigure {
        /// Discriminator found on the root.
        class: String,
    },

    /// The discriminator names no known variant.
    #[error("unrecognised ObjectClass '{class}'")]
    UnknownClass {
        /// Discriminator value.
        class: String,
    },

    /// A node document carries no discriminator.
    #[error("node has no ObjectClass")]
    MissingClass,

    /// A field holds a value of the wrong shape.
    #[error("field '{field}' must be {expected}")]
    FieldShape {
        /// Field name as it appears in the document.
        field: &'static str,
        /// Description of the accepted shapes.
        expected: &'static str,
    },

    /// A mesh face is not a triangle.
    #[error("face {face} has {arity} vertices, only triangles are supported")]
    FaceArity {
        /// Zero-based face number.
        face: usize,
        /// Number of indices in the face.
        arity: usize,
    },

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index} but only {vertices} vertices exist")]
    FaceIndex {
        /// Zero-based face number.
        face: usize,
        /// One-based index found in the document.
        index: i64,
        /// Number of vertices in the mesh.
        vertices: usize,
    },

    /// Scalar colours were given but no usable colormap is in scope.
    #[error("scalar colours need a colormap with at least one entry")]
    Colormap,

    /// A colour list length matches neither the elements nor a broadcast.
    #[error("field '{field}' has {rows} colours for {elements} elements")]
    ColorCount {
        /// Field name as it appears in the document.
        field: &'static str,
        /// Colour rows supplied.
        rows: usize,
        /// Elements that need a colour.
        elements: usize,
    },
}

impl DecodeError {
    /// Creates a new `FieldShape` error.
    #[must_use]
    pub const fn field_shape(field: &'static str, expected: &'static str) -> Self {
        Self::FieldShape { field, expected }
    }
}

/// Why a node could not be resolved on this pass.
///
/// Deferral is not a failure: the node is retried on the next pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Deferred {
    /// Relative units need a parent and the node has none.
    #[error("node has no parent to resolve relative units against")]
    MissingParent,
    /// No ancestor provides a pixel extent.
    #[error("no ancestor provides a pixel extent")]
    MissingParentExtent,
    /// An ancestor this node depends on is not resolved yet.
    #[error("waiting for an ancestor to resolve")]
    ParentPending,
}
