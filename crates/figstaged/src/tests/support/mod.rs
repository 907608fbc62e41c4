//! Test harness utilities for the daemon behavioural suites.

mod config_loader;
mod reporter;
mod scenes;
mod world;

pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use reporter::{RecordingStageReporter, StageEvent};
pub use scenes::{
    axes_with_line, figure, framed, line_beside_unknown, normalized_group_in_unsized_parent,
};
pub use world::{TestWorld, world};
