//! MP3 quality presets.
//!
//! Each preset maps to one fixed LAME flag set. Adding a preset means adding a
//! variant here; presets are not configurable at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Target quality for a transcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    /// LAME VBR preset 0.
    #[serde(rename = "V0", alias = "v0")]
    V0,
    /// 320 kbps constant bitrate.
    #[serde(rename = "320")]
    Cbr320,
}

/// Returned when a label does not name a known preset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown quality preset: {0} (expected one of: V0, 320)")]
pub struct UnknownQuality(pub String);

impl Quality {
    /// Every preset, in the order they are usually offered.
    pub const ALL: [Quality; 2] = [Quality::V0, Quality::Cbr320];

    /// Label used in folder names and descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            Self::V0 => "V0",
            Self::Cbr320 => "320",
        }
    }

    /// LAME arguments selecting this preset.
    pub fn lame_args(&self) -> &'static [&'static str] {
        match self {
            Self::V0 => &["-V", "0", "--vbr-new"],
            Self::Cbr320 => &["-b", "320", "-h"],
        }
    }

    /// LAME flags as quoted in the published transcode description.
    pub fn description_flags(&self) -> &'static str {
        match self {
            Self::V0 => "-V 0 --vbr-new --ignore-tag-errors",
            Self::Cbr320 => "-h -b 320 --ignore-tag-errors",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Quality {
    type Err = UnknownQuality;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "V0" | "v0" => Ok(Self::V0),
            "320" => Ok(Self::Cbr320),
            other => Err(UnknownQuality(other.to_string())),
        }
    }
}
