//! `flac` + `lame` transcoder implementation.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tempfile::TempPath;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use super::config::EncoderConfig;
use super::error::EncoderError;
use super::traits::AudioTranscoder;
use super::types::{EncodeResult, Tool};
use crate::quality::Quality;

/// Transcoder running `flac` to decode and `lame` to encode.
pub struct FlacLameTranscoder {
    config: EncoderConfig,
}

impl FlacLameTranscoder {
    /// Creates a new transcoder with the given configuration.
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Creates a transcoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EncoderConfig::default())
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    fn program(&self, tool: Tool) -> &Path {
        match tool {
            Tool::Flac => &self.config.flac_path,
            Tool::Lame => &self.config.lame_path,
        }
    }

    /// Builds flac arguments decoding `source` into `intermediate`.
    fn build_decode_args(&self, source: &Path, intermediate: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.config.decode_args.iter().map(OsString::from).collect();
        args.push("-o".into());
        args.push(intermediate.into());
        args.push("--".into());
        args.push(source.into());
        args
    }

    /// Builds lame arguments encoding `intermediate` into `dest`.
    fn build_encode_args(&self, quality: Quality, intermediate: &Path, dest: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = quality.lame_args().iter().map(OsString::from).collect();
        args.extend(self.config.lame_common_args.iter().map(OsString::from));
        args.push(intermediate.into());
        args.push(dest.into());
        args
    }

    fn spawn_error(&self, tool: Tool, error: std::io::Error) -> EncoderError {
        if error.kind() == std::io::ErrorKind::NotFound {
            EncoderError::ToolNotFound {
                tool,
                path: self.program(tool).to_path_buf(),
            }
        } else {
            EncoderError::Io(error)
        }
    }

    /// Runs one tool to completion, capturing stderr.
    async fn run_tool(&self, tool: Tool, args: &[OsString]) -> Result<(), EncoderError> {
        debug!(tool = %tool, ?args, "Spawning process");

        let child = Command::new(self.program(tool))
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(tool, e))?;

        let output = if self.config.timeout_secs == 0 {
            child.wait_with_output().await?
        } else {
            let limit = Duration::from_secs(self.config.timeout_secs);
            match timeout(limit, child.wait_with_output()).await {
                Ok(result) => result?,
                // Dropping the wait future kills the child.
                Err(_) => {
                    return Err(EncoderError::Timeout {
                        tool,
                        timeout_secs: self.config.timeout_secs,
                    })
                }
            }
        };

        if !output.status.success() {
            return Err(EncoderError::process_failed(
                tool,
                output.status.code(),
                &output.stderr,
            ));
        }
        Ok(())
    }

    /// Reserves a fresh temporary WAV path, deleted when dropped.
    async fn intermediate_path(&self) -> Result<TempPath, EncoderError> {
        let dir = &self.config.temp_dir;
        let temp_error = |source| EncoderError::TempFile {
            dir: dir.clone(),
            source,
        };
        tokio::fs::create_dir_all(dir).await.map_err(temp_error)?;
        tempfile::Builder::new()
            .prefix("decode-")
            .suffix(".wav")
            .tempfile_in(dir)
            .map(|file| file.into_temp_path())
            .map_err(temp_error)
    }

    async fn check_tool(&self, tool: Tool) -> Result<(), EncoderError> {
        let output = Command::new(self.program(tool))
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(tool, e))?;
        if !output.status.success() {
            return Err(EncoderError::process_failed(
                tool,
                output.status.code(),
                &output.stderr,
            ));
        }
        Ok(())
    }
}

async fn remove_partial_output(dest: &Path) {
    match tokio::fs::remove_file(dest).await {
        Ok(()) => debug!(path = %dest.display(), "Removed partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %dest.display(), error = %e, "Failed to remove partial output"),
    }
}

#[async_trait]
impl AudioTranscoder for FlacLameTranscoder {
    fn name(&self) -> &str {
        "flac+lame"
    }

    async fn transcode(
        &self,
        source: &Path,
        dest: &Path,
        quality: Quality,
    ) -> Result<EncodeResult, EncoderError> {
        let start = Instant::now();

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|source| {
                EncoderError::OutputDirectoryFailed {
                    path: parent.to_path_buf(),
                    source,
                }
            })?;
        }

        let intermediate = self.intermediate_path().await?;

        let decode_args = self.build_decode_args(source, &intermediate);
        self.run_tool(Tool::Flac, &decode_args).await?;

        let encode_args = self.build_encode_args(quality, &intermediate, dest);
        if let Err(e) = self.run_tool(Tool::Lame, &encode_args).await {
            remove_partial_output(dest).await;
            return Err(e);
        }

        if let Err(e) = intermediate.close() {
            warn!(error = %e, "Failed to remove temporary WAV file");
        }

        let output_meta = tokio::fs::metadata(dest)
            .await
            .map_err(|_| EncoderError::OutputMissing {
                path: dest.to_path_buf(),
            })?;

        Ok(EncodeResult {
            output_path: dest.to_path_buf(),
            output_size_bytes: output_meta.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn validate(&self) -> Result<(), EncoderError> {
        self.check_tool(Tool::Flac).await?;
        self.check_tool(Tool::Lame).await?;
        tokio::fs::create_dir_all(&self.config.temp_dir)
            .await
            .map_err(|source| EncoderError::TempFile {
                dir: self.config.temp_dir.clone(),
                source,
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_build_decode_args() {
        let transcoder = FlacLameTranscoder::with_defaults();
        let args = transcoder.build_decode_args(Path::new("/in/01.flac"), Path::new("/tmp/x.wav"));

        assert!(args.contains(&OsString::from("-d")));
        let out = args.iter().position(|a| a == "-o").unwrap();
        assert_eq!(args[out + 1], OsString::from("/tmp/x.wav"));
        assert_eq!(args.last().unwrap(), &OsString::from("/in/01.flac"));
    }

    #[test]
    fn test_build_encode_args_v0() {
        let transcoder = FlacLameTranscoder::with_defaults();
        let args = transcoder.build_encode_args(
            Quality::V0,
            Path::new("/tmp/x.wav"),
            Path::new("/out/01.mp3"),
        );

        let expected: Vec<OsString> = [
            "-V",
            "0",
            "--vbr-new",
            "--quiet",
            "--add-id3v2",
            "--ignore-tag-errors",
            "/tmp/x.wav",
            "/out/01.mp3",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        assert_eq!(args, expected);
    }

    #[test]
    fn test_build_encode_args_320() {
        let transcoder = FlacLameTranscoder::with_defaults();
        let args = transcoder.build_encode_args(
            Quality::Cbr320,
            Path::new("/tmp/x.wav"),
            Path::new("/out/01.mp3"),
        );
        assert_eq!(&args[..3], &["-b", "320", "-h"].map(OsString::from));
    }

    #[tokio::test]
    async fn test_missing_decoder() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = EncoderConfig::with_paths(
            PathBuf::from("/nonexistent/flac"),
            PathBuf::from("/nonexistent/lame"),
        )
        .with_temp_dir(dir.path().join("tmp"));
        let transcoder = FlacLameTranscoder::new(config);

        let err = transcoder
            .transcode(
                Path::new("/in/01.flac"),
                &dir.path().join("out").join("01.mp3"),
                Quality::V0,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, EncoderError::ToolNotFound { tool: Tool::Flac, .. }));
        let leftovers = std::fs::read_dir(dir.path().join("tmp")).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_validate_missing_tools() {
        let config = EncoderConfig::with_paths(
            PathBuf::from("/nonexistent/flac"),
            PathBuf::from("/nonexistent/lame"),
        );
        let err = FlacLameTranscoder::new(config).validate().await.unwrap_err();
        assert!(matches!(err, EncoderError::ToolNotFound { tool: Tool::Flac, .. }));
    }

    #[cfg(unix)]
    mod scripted {
        use super::*;
        use crate::testing::fixtures;
        use tempfile::TempDir;

        fn transcoder(dir: &TempDir, flac_body: &str, lame_body: &str) -> FlacLameTranscoder {
            let flac = fixtures::write_script(dir.path(), "flac", flac_body);
            let lame = fixtures::write_script(dir.path(), "lame", lame_body);
            FlacLameTranscoder::new(
                EncoderConfig::with_paths(flac, lame).with_temp_dir(dir.path().join("tmp")),
            )
        }

        fn temp_files(dir: &TempDir) -> usize {
            std::fs::read_dir(dir.path().join("tmp")).unwrap().count()
        }

        #[tokio::test]
        async fn test_decode_then_encode() {
            let dir = TempDir::new().unwrap();
            let transcoder = transcoder(&dir, fixtures::FAKE_FLAC, fixtures::FAKE_LAME_COPY);
            let source = dir.path().join("01.flac");
            std::fs::write(&source, b"flac").unwrap();
            let dest = dir.path().join("out").join("CD1").join("01.mp3");

            let result = transcoder
                .transcode(&source, &dest, Quality::Cbr320)
                .await
                .unwrap();

            assert_eq!(result.output_path, dest);
            // The fake encoder copies the intermediate written by the fake decoder.
            assert_eq!(std::fs::read(&dest).unwrap(), b"decoded:flac");
            assert_eq!(temp_files(&dir), 0);
        }

        #[tokio::test]
        async fn test_decoder_failure_reports_stderr_and_cleans_up() {
            let dir = TempDir::new().unwrap();
            let transcoder = transcoder(
                &dir,
                "echo 'ERROR: bad sync' >&2\nexit 3",
                fixtures::FAKE_LAME_COPY,
            );
            let source = dir.path().join("01.flac");
            std::fs::write(&source, b"flac").unwrap();
            let dest = dir.path().join("out").join("01.mp3");

            let err = transcoder
                .transcode(&source, &dest, Quality::V0)
                .await
                .unwrap_err();

            match &err {
                EncoderError::ProcessFailed { tool, code, .. } => {
                    assert_eq!(*tool, Tool::Flac);
                    assert_eq!(*code, Some(3));
                }
                other => panic!("unexpected error: {other:?}"),
            }
            assert_eq!(err.diagnostics(), Some("ERROR: bad sync"));
            assert!(!dest.exists());
            assert_eq!(temp_files(&dir), 0);
        }

        #[tokio::test]
        async fn test_encoder_failure_removes_partial_output() {
            let dir = TempDir::new().unwrap();
            let lame = "for arg; do last=\"$arg\"; done\nprintf partial > \"$last\"\necho 'lame: disk full' >&2\nexit 1";
            let transcoder = transcoder(&dir, fixtures::FAKE_FLAC, lame);
            let source = dir.path().join("01.flac");
            std::fs::write(&source, b"flac").unwrap();
            let dest = dir.path().join("01.mp3");

            let err = transcoder
                .transcode(&source, &dest, Quality::V0)
                .await
                .unwrap_err();

            assert_eq!(err.tool(), Some(Tool::Lame));
            assert_eq!(err.diagnostics(), Some("lame: disk full"));
            assert!(!dest.exists());
            assert_eq!(temp_files(&dir), 0);
        }

        #[tokio::test]
        async fn test_timeout_kills_process() {
            let dir = TempDir::new().unwrap();
            let flac = fixtures::write_script(dir.path(), "flac", "sleep 30");
            let lame = fixtures::write_script(dir.path(), "lame", fixtures::FAKE_LAME_COPY);
            let transcoder = FlacLameTranscoder::new(
                EncoderConfig::with_paths(flac, lame)
                    .with_temp_dir(dir.path().join("tmp"))
                    .with_timeout(1),
            );
            let source = dir.path().join("01.flac");
            std::fs::write(&source, b"flac").unwrap();

            let err = transcoder
                .transcode(&source, &dir.path().join("01.mp3"), Quality::V0)
                .await
                .unwrap_err();

            assert!(matches!(err, EncoderError::Timeout { tool: Tool::Flac, timeout_secs: 1 }));
            assert_eq!(temp_files(&dir), 0);
        }

        #[tokio::test]
        async fn test_dropped_transcode_removes_intermediate() {
            let dir = TempDir::new().unwrap();
            let transcoder = transcoder(&dir, "sleep 30", fixtures::FAKE_LAME_COPY);
            let source = dir.path().join("01.flac");
            std::fs::write(&source, b"flac").unwrap();
            let dest = dir.path().join("01.mp3");

            let transcode = transcoder.transcode(&source, &dest, Quality::V0);
            let timed_out = timeout(Duration::from_millis(200), transcode).await;

            assert!(timed_out.is_err());
            assert_eq!(temp_files(&dir), 0);
            assert!(!dest.exists());
        }

        #[tokio::test]
        async fn test_validate_runs_version() {
            let dir = TempDir::new().unwrap();
            let transcoder = transcoder(&dir, fixtures::FAKE_FLAC, fixtures::FAKE_LAME_COPY);
            assert!(transcoder.validate().await.is_ok());
        }
    }
}
