//! Shared fixtures for placement tests.

use glam::DVec3;

use crate::{Aabb, ParameterSet, Placement, PlacementParameter, PlacementStrategy};

/// Single-parameter strategy sliding along `x`.
#[derive(Debug, Clone, Copy)]
pub(super) struct SlideStrategy {
    min: f64,
    max: f64,
    increment: f64,
}

impl SlideStrategy {
    pub(super) const fn new(min: f64, max: f64, increment: f64) -> Self {
        Self {
            min,
            max,
            increment,
        }
    }
}

impl PlacementStrategy for SlideStrategy {
    fn name(&self) -> &'static str {
        "slide"
    }

    fn parameters(&self) -> ParameterSet {
        ParameterSet::new(vec![PlacementParameter::new(
            "x",
            self.min,
            self.max,
            self.increment,
        )])
    }

    fn candidate(&self, parameters: &ParameterSet) -> Placement {
        Placement::at(DVec3::new(parameters.value(0).unwrap_or_default(), 0.0, 0.0))
    }
}

/// Unit cube centred on the scene origin.
pub(super) fn unit_box() -> Aabb {
    Aabb::new(DVec3::ZERO, DVec3::splat(0.5))
}
