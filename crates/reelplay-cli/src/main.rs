//! Reelplay CLI - Headless playback driver
//!
//! Features:
//! - Manifest URL resolution
//! - Quality catalog probing (HTTP or local file)
//! - Scripted playback against an in-memory platform

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod headless;
mod output;
mod source;

/// Reelplay CLI - Playback controller driver
#[derive(Parser)]
#[command(name = "reelplay-cli")]
#[command(author = "Reelplay Developers")]
#[command(version)]
#[command(about = "Drive the Reelplay playback controller from the terminal", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the manifest URL of a video
    Url {
        /// Video identifier
        video_id: String,

        /// Video host base URL
        #[arg(long)]
        host: Option<String>,
    },

    /// Read a master playlist and list its quality levels
    Probe {
        /// Video identifier
        video_id: String,

        /// Video host base URL
        #[arg(long)]
        host: Option<String>,

        /// Read the playlist from a file instead of the host
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Run a scripted playback session headlessly
    Play {
        /// Video identifier
        video_id: String,

        /// Video host base URL
        #[arg(long)]
        host: Option<String>,

        /// Read the playlist from a file instead of the host
        #[arg(long)]
        file: Option<PathBuf>,

        /// Start playing once the manifest is parsed
        #[arg(long)]
        autoplay: bool,

        /// Start muted
        #[arg(long)]
        muted: bool,

        /// Media duration reported by the surface, in seconds
        #[arg(short, long, default_value = "125")]
        duration: f64,

        /// Seek to this fraction of the duration
        #[arg(short, long)]
        seek: Option<f64>,

        /// Pin this quality level
        #[arg(short, long)]
        quality: Option<usize>,

        /// Toggle fullscreen
        #[arg(long)]
        fullscreen: bool,

        /// Number of one-second playback ticks to simulate
        #[arg(short, long, default_value = "3")]
        ticks: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();

    reelplay_core::init();

    match cli.command {
        Commands::Url { video_id, host } => {
            commands::url(&video_id, host, &cli.format)?;
        }
        Commands::Probe { video_id, host, file } => {
            commands::probe(&video_id, host, file, &cli.format).await?;
        }
        Commands::Play {
            video_id,
            host,
            file,
            autoplay,
            muted,
            duration,
            seek,
            quality,
            fullscreen,
            ticks,
        } => {
            let script = commands::PlayScript {
                autoplay,
                muted,
                duration,
                seek,
                quality,
                fullscreen,
                ticks,
            };
            commands::play(&video_id, host, file, script, &cli.format).await?;
        }
    }

    Ok(())
}
