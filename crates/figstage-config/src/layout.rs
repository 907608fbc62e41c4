//! Selectors for the placement engine.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Placement strategy used when rearranging figures.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LayoutStrategy {
    /// Rows of figures marching away from the viewer.
    #[default]
    Grid,
    /// Figures on a dome around the viewer, turned to face it.
    Dome,
}

/// Which figures a rearrangement pass moves.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RearrangeScope {
    /// Every live figure is parked and placed again.
    #[default]
    All,
    /// Only figures that have never been placed move.
    New,
}
