use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How `figstaged` renders log events on stderr.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, fields at the top level.
    #[default]
    Json,
    /// Terse single-line text for terminals.
    Compact,
}

/// Returned when `--log-format` names neither `json` nor `compact`.
pub type LogFormatParseError = strum::ParseError;
