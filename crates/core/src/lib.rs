pub mod batch;
pub mod config;
pub mod description;
pub mod encoder;
pub mod engine;
pub mod folder;
pub mod metrics;
pub mod naming;
pub mod quality;
pub mod source;
pub mod tags;
pub mod testing;

pub use batch::{BatchConfig, BatchError, BatchProgress, BatchReport, BatchRunner, ItemFailure};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config, ConfigError,
};
pub use description::transcode_description;
pub use encoder::{AudioTranscoder, EncoderConfig, EncoderError, FlacLameTranscoder};
pub use engine::{ItemError, TranscodeEngine};
pub use folder::{FolderTranscoder, TranscodeError};
pub use naming::{destination_folder, destination_folder_name};
pub use quality::{Quality, UnknownQuality};
