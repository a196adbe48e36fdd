use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use prometheus::{Encoder, Registry, TextEncoder};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transcoder_core::metrics::all_metrics;
use transcoder_core::{
    load_config, load_config_from_env, transcode_description, validate_config, AudioTranscoder,
    Config, FolderTranscoder, Quality,
};

#[derive(Parser, Debug)]
#[command(name = "flactrans")]
#[command(about = "Transcode FLAC release folders to MP3")]
#[command(version)]
struct Args {
    /// Configuration file; TRANSCODER_* environment variables override it
    #[arg(short, long, global = true, env = "TRANSCODER_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Transcode a folder into a sibling folder and print its path
    Transcode {
        /// Source folder containing FLAC files
        dir: PathBuf,

        /// Target preset (V0 or 320)
        #[arg(short, long)]
        quality: Quality,

        /// Source URL; prints the upload description after transcoding
        #[arg(long)]
        url: Option<String>,

        /// Print Prometheus metrics when done
        #[arg(long)]
        metrics: bool,
    },
    /// Print the upload description for a transcode
    Describe {
        /// Source URL
        url: String,

        /// Target preset (V0 or 320)
        #[arg(short, long)]
        quality: Quality,
    },
}

// Must return rather than exit: runtime shutdown drops aborted item tasks.
#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs);

    match args.command {
        Command::Describe { url, quality } => {
            print!("{}", transcode_description(&url, quality));
            Ok(())
        }
        Command::Transcode {
            dir,
            quality,
            url,
            metrics,
        } => {
            let dir = source_dir(&dir)?;
            let config = load(args.config.as_deref())?;
            validate_config(&config).context("Configuration validation failed")?;

            let transcoder = FolderTranscoder::from_config(&config);
            transcoder
                .engine()
                .transcoder()
                .validate()
                .await
                .context("flac and lame must be installed and runnable")?;

            let result = tokio::select! {
                result = transcoder.transcode_folder(&dir, quality) => result,
                () = shutdown_signal() => {
                    warn!(dir = %dir.display(), "Interrupted, abandoning transcode");
                    anyhow::bail!("Interrupted while transcoding {:?}", dir);
                }
            };
            if metrics {
                print!("{}", render_metrics()?);
            }
            let dest = result.with_context(|| format!("Failed to transcode {:?}", dir))?;

            println!("{}", dest.display());
            if let Some(url) = url {
                print!("{}", transcode_description(&url, quality));
            }
            Ok(())
        }
    }
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries the destination path and description
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Resolves the source folder so relative paths like `.` have a name.
fn source_dir(dir: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(dir)
        .with_context(|| format!("Source folder {:?} is not accessible", dir))
}

fn load(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => load_config_from_env().context("Failed to load config from environment")?,
    };
    info!(
        flac = %config.encoder.flac_path.display(),
        lame = %config.encoder.lame_path.display(),
        max_parallel = config.batch.max_parallel,
        "Configuration loaded"
    );
    Ok(config)
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn render_metrics() -> Result<String> {
    let registry = Registry::new();
    for metric in all_metrics() {
        registry
            .register(metric)
            .context("Failed to register metric")?;
    }

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output is not UTF-8")
}
