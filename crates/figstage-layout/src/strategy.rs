//! Mappings from parameter values to candidate transforms.

use glam::{DMat3, DQuat, DVec3};

use crate::aabb::Aabb;
use crate::parameters::{ParameterSet, PlacementParameter};

/// Rigid transform committed for a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Offset of the scene origin in native space.
    pub translation: DVec3,
    /// Orientation of the scene about its origin.
    pub rotation: DQuat,
}

impl Placement {
    /// Placement with the given translation and no rotation.
    #[must_use]
    pub const fn at(translation: DVec3) -> Self {
        Self {
            translation,
            rotation: DQuat::IDENTITY,
        }
    }

    /// Native-space box of a scene whose local bounds are `local`.
    #[must_use]
    pub fn apply(&self, local: &Aabb) -> Aabb {
        local.rotated(self.rotation).translated(self.translation)
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::at(DVec3::ZERO)
    }
}

/// Defines a search space and maps its points to candidate placements.
pub trait PlacementStrategy {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Parameters positioned at the start of the search.
    fn parameters(&self) -> ParameterSet;

    /// Candidate placement for the current parameter values.
    fn candidate(&self, parameters: &ParameterSet) -> Placement;
}

impl<T: PlacementStrategy + ?Sized> PlacementStrategy for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn parameters(&self) -> ParameterSet {
        (**self).parameters()
    }

    fn candidate(&self, parameters: &ParameterSet) -> Placement {
        (**self).candidate(parameters)
    }
}

/// Rows of scenes in front of the origin: `x` then `y` then depth `z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStrategy {
    origin: DVec3,
}

impl GridStrategy {
    /// Creates a grid anchored at `origin`.
    #[must_use]
    pub const fn new(origin: DVec3) -> Self {
        Self { origin }
    }
}

impl PlacementStrategy for GridStrategy {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn parameters(&self) -> ParameterSet {
        ParameterSet::new(vec![
            PlacementParameter::new("x", -1.0, 5.0, 0.1),
            PlacementParameter::new("y", 0.0, 1.0, 0.1),
            PlacementParameter::new("z", 0.5, f64::INFINITY, 1.0),
        ])
    }

    fn candidate(&self, parameters: &ParameterSet) -> Placement {
        let offset = DVec3::new(
            parameters.value(0).unwrap_or_default(),
            parameters.value(1).unwrap_or_default(),
            parameters.value(2).unwrap_or_default(),
        );
        Placement::at(self.origin + offset)
    }
}

/// Scenes on concentric domes around the origin, each turned away from it.
///
/// `theta` sweeps around the vertical axis, `phi` sets the elevation and
/// `radius` grows once a dome is full. Angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomeStrategy {
    origin: DVec3,
}

impl DomeStrategy {
    /// Creates a dome centred on `origin`.
    #[must_use]
    pub const fn new(origin: DVec3) -> Self {
        Self { origin }
    }
}

impl PlacementStrategy for DomeStrategy {
    fn name(&self) -> &'static str {
        "dome"
    }

    fn parameters(&self) -> ParameterSet {
        ParameterSet::new(vec![
            PlacementParameter::new("theta", 0.0, 180.0, 2.0),
            PlacementParameter::new("phi", 30.0, 80.0, 2.0),
            PlacementParameter::new("radius", 1.0, f64::INFINITY, 0.5),
        ])
    }

    fn candidate(&self, parameters: &ParameterSet) -> Placement {
        let theta = parameters.value(0).unwrap_or_default().to_radians();
        let phi = parameters.value(1).unwrap_or_default().to_radians();
        let radius = parameters.value(2).unwrap_or(1.0);

        let direction = DVec3::new(theta.sin(), phi.sin(), theta.cos());
        let translation = self.origin + direction * radius;
        let forward = direction.try_normalize().unwrap_or(DVec3::Z);
        Placement {
            translation,
            rotation: facing(forward),
        }
    }
}

/// Rotation whose local `+z` points along `forward` with `+y` kept upright.
fn facing(forward: DVec3) -> DQuat {
    let up = (DVec3::Y - forward * forward.dot(DVec3::Y))
        .try_normalize()
        .unwrap_or(DVec3::Z);
    let right = up.cross(forward);
    DQuat::from_mat3(&DMat3::from_cols(right, up, forward))
}
