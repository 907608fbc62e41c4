//! Triangle meshes for patch nodes.

use glam::DVec3;

use crate::colormap::Rgb;

/// Indexed triangle mesh with per-vertex normals and optional colours.
///
/// A double-sided mesh stores the front surface first and its mirrored back
/// surface second, so both halves hold the same number of vertices and faces.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<DVec3>,
    normals: Vec<DVec3>,
    faces: Vec<[u32; 3]>,
    colors: Option<Vec<Rgb>>,
    /// Vertex and face counts of the front surface.
    front: (usize, usize),
    double_sided: bool,
}

impl Mesh {
    /// Builds a single-sided mesh and derives its normals.
    ///
    /// Faces must index into `vertices`; `colors`, when present, holds one
    /// entry per vertex.
    #[must_use]
    pub fn new(vertices: Vec<DVec3>, faces: Vec<[u32; 3]>, colors: Option<Vec<Rgb>>) -> Self {
        let normals = area_weighted_normals(&vertices, &faces);
        let front = (vertices.len(), faces.len());
        Self {
            vertices,
            normals,
            faces,
            colors,
            front,
            double_sided: false,
        }
    }

    /// Vertex positions.
    #[must_use]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Unit normal per vertex.
    #[must_use]
    pub fn normals(&self) -> &[DVec3] {
        &self.normals
    }

    /// Zero-based triangle indices.
    #[must_use]
    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Colour per vertex.
    #[must_use]
    pub fn colors(&self) -> Option<&[Rgb]> {
        self.colors.as_deref()
    }

    /// Returns `true` once the back surface has been appended.
    #[must_use]
    pub const fn is_double_sided(&self) -> bool {
        self.double_sided
    }

    /// Appends a back surface so the mesh is visible from both sides.
    ///
    /// The copy repeats every vertex and colour, negates the normals and
    /// reverses the winding of every face.
    #[must_use]
    pub fn double_sided(&self) -> Self {
        if self.double_sided {
            return self.clone();
        }
        let count = u32::try_from(self.vertices.len()).unwrap_or(u32::MAX);
        let back_faces = self.faces.iter().map(|&[a, b, c]| {
            [
                c.saturating_add(count),
                b.saturating_add(count),
                a.saturating_add(count),
            ]
        });

        Self {
            vertices: self.vertices.repeat(2),
            normals: self
                .normals
                .iter()
                .copied()
                .chain(self.normals.iter().map(|normal| -*normal))
                .collect(),
            faces: self.faces.iter().copied().chain(back_faces).collect(),
            colors: self.colors.as_ref().map(|colors| colors.repeat(2)),
            front: self.front,
            double_sided: true,
        }
    }

    /// Mesh with every vertex mapped through `convert`, normals re-derived.
    ///
    /// Double-sided meshes stay double-sided.
    #[must_use]
    pub fn map_vertices(&self, convert: impl Fn(DVec3) -> DVec3) -> Self {
        let (vertex_count, face_count) = self.front;
        let front = Self::new(
            self.vertices.iter().take(vertex_count).map(|&v| convert(v)).collect(),
            self.faces.iter().take(face_count).copied().collect(),
            self.colors
                .as_ref()
                .map(|colors| colors.iter().take(vertex_count).copied().collect()),
        );
        if self.double_sided {
            front.double_sided()
        } else {
            front
        }
    }
}

/// Sums un-normalised face normals (twice the face area) onto each corner.
fn area_weighted_normals(vertices: &[DVec3], faces: &[[u32; 3]]) -> Vec<DVec3> {
    let mut normals = vec![DVec3::ZERO; vertices.len()];
    let corner = |index: u32| vertices.get(index as usize).copied();
    for &[a, b, c] in faces {
        let (Some(p0), Some(p1), Some(p2)) = (corner(a), corner(b), corner(c)) else {
            continue;
        };
        let face_normal = (p1 - p0).cross(p2 - p0);
        for index in [a, b, c] {
            if let Some(slot) = normals.get_mut(index as usize) {
                *slot += face_normal;
            }
        }
    }
    normals
        .into_iter()
        .map(|normal| normal.try_normalize().unwrap_or(DVec3::ZERO))
        .collect()
}
