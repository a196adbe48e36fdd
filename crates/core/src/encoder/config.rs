//! Configuration for the encoder module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the FLAC + LAME transcoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Path to the flac binary.
    #[serde(default = "default_flac_path")]
    pub flac_path: PathBuf,

    /// Path to the lame binary.
    #[serde(default = "default_lame_path")]
    pub lame_path: PathBuf,

    /// Arguments passed to flac before the output and input paths.
    #[serde(default = "default_decode_args")]
    pub decode_args: Vec<String>,

    /// Arguments passed to lame after the quality preset flags.
    #[serde(default = "default_lame_common_args")]
    pub lame_common_args: Vec<String>,

    /// Directory for temporary WAV intermediates.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Timeout for a single process in seconds (0 disables the timeout).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_flac_path() -> PathBuf {
    PathBuf::from("flac")
}

fn default_lame_path() -> PathBuf {
    PathBuf::from("lame")
}

fn default_decode_args() -> Vec<String> {
    // best compression analysis, verify, decode, silent, force overwrite
    ["-8", "-V", "-d", "-s", "-f"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_lame_common_args() -> Vec<String> {
    ["--quiet", "--add-id3v2", "--ignore-tag-errors"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("flactrans")
}

fn default_timeout() -> u64 {
    3600 // 1 hour
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            flac_path: default_flac_path(),
            lame_path: default_lame_path(),
            decode_args: default_decode_args(),
            lame_common_args: default_lame_common_args(),
            temp_dir: default_temp_dir(),
            timeout_secs: default_timeout(),
        }
    }
}

impl EncoderConfig {
    /// Creates a new config with custom flac/lame paths.
    pub fn with_paths(flac_path: PathBuf, lame_path: PathBuf) -> Self {
        Self {
            flac_path,
            lame_path,
            ..Default::default()
        }
    }

    /// Sets the temp directory.
    pub fn with_temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.temp_dir = temp_dir;
        self
    }

    /// Sets the per-process timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
