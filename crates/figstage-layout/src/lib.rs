//! Non-overlapping placement of scenes in native space.
//!
//! A placement pass enumerates candidate transforms from a
//! [`PlacementStrategy`] by advancing an odometer-style [`ParameterSet`]. Each
//! candidate moves the scene's local bounding box; the first candidate whose
//! inflated box overlaps no obstacle is committed.
//!
//! # Core Types
//!
//! - [`Aabb`] - Axis-aligned bounding box used for collision tests
//! - [`ParameterSet`] - Ordered search parameters advanced with carry
//! - [`GridStrategy`] and [`DomeStrategy`] - Parameter-to-transform mappings
//! - [`PlacementEngine`] - Drives the search for one scene at a time
//!
//! # Example
//!
//! ```ignore
//! use figstage_layout::{Aabb, GridStrategy, PlacementEngine};
//!
//! let mut engine = PlacementEngine::new(GridStrategy::new(origin), 0.1);
//! let outcome = engine.place(&local_bounds, &placed_boxes)?;
//! ```

mod aabb;
mod engine;
mod error;
mod parameters;
mod strategy;

pub use aabb::Aabb;
pub use engine::{PlacementEngine, PlacementOutcome};
pub use error::PlacementError;
pub use parameters::{ParameterSet, PlacementParameter};
pub use strategy::{DomeStrategy, GridStrategy, Placement, PlacementStrategy};

#[cfg(test)]
mod tests;
