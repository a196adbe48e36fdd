//! Types for the encoder module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// External tool involved in a transcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// The FLAC decoder.
    Flac,
    /// The LAME MP3 encoder.
    Lame,
}

impl Tool {
    /// Executable name used when no path is configured.
    pub fn default_program(&self) -> &'static str {
        match self {
            Self::Flac => "flac",
            Self::Lame => "lame",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_program())
    }
}

/// Result of a successful decode and encode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeResult {
    /// Path of the encoded file.
    pub output_path: PathBuf,
    /// Size of the encoded file in bytes.
    pub output_size_bytes: u64,
    /// Wall time of both processes in milliseconds.
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_display() {
        assert_eq!(Tool::Flac.to_string(), "flac");
        assert_eq!(Tool::Lame.to_string(), "lame");
    }

    #[test]
    fn test_encode_result_serialization() {
        let result = EncodeResult {
            output_path: PathBuf::from("/out/01.mp3"),
            output_size_bytes: 4096,
            duration_ms: 1500,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"output_size_bytes\":4096"));
    }
}
