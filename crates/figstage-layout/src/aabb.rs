//! Axis-aligned bounding boxes in native space.

use glam::{DMat3, DQuat, DVec3};

/// An axis-aligned box described by its centre and half-extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    center: DVec3,
    half_extents: DVec3,
}

impl Aabb {
    /// Creates a box from its centre and half-extents.
    ///
    /// Negative half-extents are folded to their magnitude.
    #[must_use]
    pub fn new(center: DVec3, half_extents: DVec3) -> Self {
        Self {
            center,
            half_extents: half_extents.abs(),
        }
    }

    /// Creates the box spanning two opposite corners.
    #[must_use]
    pub fn from_corners(a: DVec3, b: DVec3) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self::new((min + max) * 0.5, (max - min) * 0.5)
    }

    /// Smallest box enclosing every finite point, or `None` when there are none.
    pub fn enclosing(points: impl IntoIterator<Item = DVec3>) -> Option<Self> {
        let mut finite = points.into_iter().filter(|point| point.is_finite());
        let first = finite.next()?;
        let (min, max) = finite.fold((first, first), |(min, max), point| {
            (min.min(point), max.max(point))
        });
        Some(Self::from_corners(min, max))
    }

    /// Centre of the box.
    #[must_use]
    pub const fn center(&self) -> DVec3 {
        self.center
    }

    /// Half the size of the box along each axis.
    #[must_use]
    pub const fn half_extents(&self) -> DVec3 {
        self.half_extents
    }

    /// Minimum corner.
    #[must_use]
    pub fn min(&self) -> DVec3 {
        self.center - self.half_extents
    }

    /// Maximum corner.
    #[must_use]
    pub fn max(&self) -> DVec3 {
        self.center + self.half_extents
    }

    /// Inclusive overlap test. Touching faces count as an intersection.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        let gap = (self.center - other.center).abs();
        let reach = self.half_extents + other.half_extents;
        gap.cmple(reach).all()
    }

    /// Smallest box enclosing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::from_corners(self.min().min(other.min()), self.max().max(other.max()))
    }

    /// Box moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: DVec3) -> Self {
        Self::new(self.center + offset, self.half_extents)
    }

    /// Box with each half-extent multiplied by `factor`, centre unchanged.
    #[must_use]
    pub fn inflated(&self, factor: f64) -> Self {
        Self::new(self.center, self.half_extents * factor)
    }

    /// Box with both the centre and the extents multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.center * factor, self.half_extents * factor)
    }

    /// Axis-aligned box enclosing this box after rotating it about the origin.
    #[must_use]
    pub fn rotated(&self, rotation: DQuat) -> Self {
        let matrix = DMat3::from_quat(rotation);
        let abs = DMat3::from_cols(
            matrix.x_axis.abs(),
            matrix.y_axis.abs(),
            matrix.z_axis.abs(),
        );
        Self::new(rotation * self.center, abs * self.half_extents)
    }
}
