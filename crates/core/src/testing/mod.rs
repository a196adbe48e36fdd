//! Testing utilities and mock implementations.
//!
//! This module provides a mock transcoder and byte-level fixtures so that
//! whole folders can be processed in tests without `flac` or `lame`
//! installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use transcoder_core::testing::{fixtures::FlacFixture, MockTranscoder};
//!
//! FlacFixture::new()
//!     .comment("TITLE", "Intro")
//!     .write(&album.join("01.flac"));
//!
//! let transcoder = MockTranscoder::new();
//! transcoder.fail_on("02.flac").await;
//! // Hand it to a TranscodeEngine...
//! ```

mod mock_transcoder;

pub use mock_transcoder::{MockTranscoder, RecordedTranscode};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    const STREAMINFO: u8 = 0;
    const VORBIS_COMMENT: u8 = 4;
    const PICTURE: u8 = 6;

    /// Length in bytes of one MPEG-1 layer III frame at 128 kbps / 44.1 kHz.
    pub const MPEG_FRAME_LEN: usize = 417;

    /// Fake `flac` decoder: writes `decoded:` followed by the source bytes
    /// to the `-o` path.
    pub const FAKE_FLAC: &str = r#"case "$1" in --version) echo "flac 1.4.3"; exit 0;; esac
out=""
while [ $# -gt 1 ]; do
  if [ "$1" = "-o" ]; then out="$2"; fi
  shift
done
printf 'decoded:' > "$out"
cat "$1" >> "$out""#;

    /// Fake `lame` encoder: copies its input to its output.
    pub const FAKE_LAME_COPY: &str = r#"case "$1" in --version) echo "LAME 3.100"; exit 0;; esac
for arg; do input="$output"; output="$arg"; done
cp "$input" "$output""#;

    /// Fake `lame` encoder that checks its input was decoded and writes a
    /// copy of the MP3 at `mp3`.
    pub fn fake_lame_emitting(mp3: &Path) -> String {
        format!(
            r#"case "$1" in --version) echo "LAME 3.100"; exit 0;; esac
for arg; do input="$output"; output="$arg"; done
[ -s "$input" ] || {{ echo "empty input $input" >&2; exit 5; }}
cp '{}' "$output""#,
            mp3.display()
        )
    }

    /// Writes an executable `/bin/sh` script named `name` into `dir`.
    #[cfg(unix)]
    pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("make script executable");
        path
    }

    /// A bare MPEG audio stream of `count` silent frames, no tags.
    pub fn mpeg_frames(count: usize) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(count * MPEG_FRAME_LEN);
        for _ in 0..count {
            let mut frame = vec![0u8; MPEG_FRAME_LEN];
            // MPEG-1 layer III, no CRC, 128 kbps, 44.1 kHz, no padding, stereo.
            frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
            bytes.extend_from_slice(&frame);
        }
        bytes
    }

    /// An embedded picture block for [`FlacFixture`].
    #[derive(Debug, Clone)]
    pub struct FixturePicture {
        pub picture_type: u32,
        pub mime_type: String,
        pub description: String,
        pub data: Vec<u8>,
    }

    impl FixturePicture {
        /// A JPEG front cover described as "front".
        pub fn front_cover(data: Vec<u8>) -> Self {
            Self {
                picture_type: 3,
                mime_type: "image/jpeg".to_string(),
                description: "front".to_string(),
                data,
            }
        }

        /// A PNG back cover described as "back".
        pub fn back_cover(data: Vec<u8>) -> Self {
            Self {
                picture_type: 4,
                mime_type: "image/png".to_string(),
                description: "back".to_string(),
                data,
            }
        }

        fn block_body(&self) -> Vec<u8> {
            let mut body = Vec::new();
            body.extend_from_slice(&self.picture_type.to_be_bytes());
            body.extend_from_slice(&(self.mime_type.len() as u32).to_be_bytes());
            body.extend_from_slice(self.mime_type.as_bytes());
            body.extend_from_slice(&(self.description.len() as u32).to_be_bytes());
            body.extend_from_slice(self.description.as_bytes());
            // width, height, depth, indexed colors
            for value in [1u32, 1, 24, 0] {
                body.extend_from_slice(&value.to_be_bytes());
            }
            body.extend_from_slice(&(self.data.len() as u32).to_be_bytes());
            body.extend_from_slice(&self.data);
            body
        }
    }

    /// Builder for minimal, parseable FLAC files.
    ///
    /// The audio stream is a run of zero bytes; only the metadata blocks are
    /// meaningful.
    #[derive(Debug, Clone)]
    pub struct FlacFixture {
        channels: u8,
        comments: Option<Vec<(String, String)>>,
        pictures: Vec<FixturePicture>,
        id3v2_title: Option<String>,
    }

    impl Default for FlacFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl FlacFixture {
        /// A stereo file with an empty comment block.
        pub fn new() -> Self {
            Self {
                channels: 2,
                comments: Some(Vec::new()),
                pictures: Vec::new(),
                id3v2_title: None,
            }
        }

        /// Sets the channel count (1..=8).
        pub fn channels(mut self, channels: u8) -> Self {
            self.channels = channels;
            self
        }

        /// Adds a vendor comment.
        pub fn comment(mut self, key: &str, value: &str) -> Self {
            self.comments
                .get_or_insert_with(Vec::new)
                .push((key.to_string(), value.to_string()));
            self
        }

        /// Adds an embedded picture.
        pub fn picture(mut self, picture: FixturePicture) -> Self {
            self.pictures.push(picture);
            self
        }

        /// Leaves out the comment block entirely.
        pub fn without_comments(mut self) -> Self {
            self.comments = None;
            self
        }

        /// Prepends an ID3v2.4 tag holding a single `TIT2` frame.
        pub fn id3v2_title(mut self, title: &str) -> Self {
            self.id3v2_title = Some(title.to_string());
            self
        }

        /// Serializes the file.
        pub fn to_bytes(&self) -> Vec<u8> {
            let mut blocks: Vec<(u8, Vec<u8>)> = vec![(STREAMINFO, self.stream_info())];
            if let Some(comments) = &self.comments {
                blocks.push((VORBIS_COMMENT, vorbis_comment_body(comments)));
            }
            for picture in &self.pictures {
                blocks.push((PICTURE, picture.block_body()));
            }

            let mut bytes = match &self.id3v2_title {
                Some(title) => id3v2_title_tag(title),
                None => Vec::new(),
            };
            bytes.extend_from_slice(b"fLaC");
            let last = blocks.len() - 1;
            for (index, (block_type, body)) in blocks.into_iter().enumerate() {
                let flag = if index == last { 0x80 } else { 0 };
                bytes.push(flag | block_type);
                bytes.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
                bytes.extend_from_slice(&body);
            }
            bytes.extend_from_slice(&[0u8; 64]);
            bytes
        }

        /// Writes the file to `path`, creating parent directories.
        pub fn write(&self, path: &Path) {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("create fixture directory");
            }
            std::fs::write(path, self.to_bytes()).expect("write fixture");
        }

        fn stream_info(&self) -> Vec<u8> {
            const SAMPLE_RATE: u64 = 44_100;
            const BITS_PER_SAMPLE: u64 = 16;
            const TOTAL_SAMPLES: u64 = 44_100;

            let mut body = Vec::with_capacity(34);
            body.extend_from_slice(&4096u16.to_be_bytes());
            body.extend_from_slice(&4096u16.to_be_bytes());
            body.extend_from_slice(&[0u8; 6]); // min/max frame size unknown
            let packed = (SAMPLE_RATE << 44)
                | ((u64::from(self.channels) - 1) << 41)
                | ((BITS_PER_SAMPLE - 1) << 36)
                | TOTAL_SAMPLES;
            body.extend_from_slice(&packed.to_be_bytes());
            body.extend_from_slice(&[0u8; 16]); // md5
            body
        }
    }

    fn id3v2_title_tag(title: &str) -> Vec<u8> {
        let mut frame_body = vec![3u8]; // UTF-8
        frame_body.extend_from_slice(title.as_bytes());

        let mut frame = b"TIT2".to_vec();
        frame.extend_from_slice(&synchsafe(frame_body.len()));
        frame.extend_from_slice(&[0, 0]);
        frame.extend_from_slice(&frame_body);

        let mut tag = b"ID3".to_vec();
        tag.extend_from_slice(&[4, 0, 0]);
        tag.extend_from_slice(&synchsafe(frame.len()));
        tag.extend_from_slice(&frame);
        tag
    }

    fn synchsafe(len: usize) -> [u8; 4] {
        let len = len as u32;
        [
            ((len >> 21) & 0x7f) as u8,
            ((len >> 14) & 0x7f) as u8,
            ((len >> 7) & 0x7f) as u8,
            (len & 0x7f) as u8,
        ]
    }

    fn vorbis_comment_body(comments: &[(String, String)]) -> Vec<u8> {
        let vendor = b"fixture";
        let mut body = Vec::new();
        body.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
        body.extend_from_slice(vendor);
        body.extend_from_slice(&(comments.len() as u32).to_le_bytes());
        for (key, value) in comments {
            let entry = format!("{key}={value}");
            body.extend_from_slice(&(entry.len() as u32).to_le_bytes());
            body.extend_from_slice(entry.as_bytes());
        }
        body
    }
}
