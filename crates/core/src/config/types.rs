use serde::{Deserialize, Serialize};

use crate::batch::BatchConfig;
use crate::encoder::EncoderConfig;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// External tools and their arguments.
    #[serde(default)]
    pub encoder: EncoderConfig,
    /// Per-folder concurrency.
    #[serde(default)]
    pub batch: BatchConfig,
}
