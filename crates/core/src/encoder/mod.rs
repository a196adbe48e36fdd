//! Encoder module driving the external FLAC decoder and LAME encoder.
//!
//! Each transcode runs two supervised child processes: `flac` decodes the
//! source into a private temporary WAV file, then `lame` encodes that file
//! into the destination MP3. The temporary file is removed on every exit
//! path, including when the future is dropped mid-way (children are spawned
//! with `kill_on_drop`).
//!
//! # Example
//!
//! ```ignore
//! use transcoder_core::encoder::{AudioTranscoder, EncoderConfig, FlacLameTranscoder};
//! use transcoder_core::Quality;
//!
//! let transcoder = FlacLameTranscoder::new(EncoderConfig::default());
//! transcoder.validate().await?;
//!
//! let result = transcoder
//!     .transcode(Path::new("/in/01.flac"), Path::new("/out/01.mp3"), Quality::V0)
//!     .await?;
//! println!("Encoded {} bytes in {} ms", result.output_size_bytes, result.duration_ms);
//! ```

mod config;
mod error;
mod flac_lame;
mod traits;
mod types;

pub use config::EncoderConfig;
pub use error::EncoderError;
pub use flac_lame::FlacLameTranscoder;
pub use traits::AudioTranscoder;
pub use types::{EncodeResult, Tool};
