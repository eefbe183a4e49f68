//! CLI command implementations

use crate::headless::Headless;
use crate::output::{catalog_lines, to_json, OutputFormat, StepReport};
use crate::source::source_for;
use anyhow::Context;
use reelplay_core::manifest::parse_master_playlist;
use reelplay_core::{
    Callbacks, PlaybackController, PlayerOptions, QualityCatalog, QualitySelection, ReportedLevel,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use url::Url;

/// Options for the environment, then the command line
fn options_for(video_id: &str, host: Option<String>) -> anyhow::Result<PlayerOptions> {
    let mut options = PlayerOptions::new(video_id).with_env_overrides();
    if let Some(host) = host {
        options = options.with_host(host);
    }
    options.validate()?;
    Ok(options)
}

async fn read_levels(manifest_url: &Url, file: Option<PathBuf>) -> anyhow::Result<Vec<ReportedLevel>> {
    let source = source_for(file);
    let bytes = source.fetch(manifest_url).await?;
    let levels = parse_master_playlist(&bytes)
        .with_context(|| format!("invalid master playlist from {}", source.describe(manifest_url)))?;
    info!(levels = levels.len(), origin = %source.describe(manifest_url), "Master playlist read");
    Ok(levels)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UrlReport<'a> {
    video_id: &'a str,
    manifest_url: &'a str,
}

/// Print the manifest URL of a video
pub fn url(video_id: &str, host: Option<String>, format: &str) -> anyhow::Result<()> {
    let options = options_for(video_id, host)?;
    let manifest_url = options.manifest_url()?;

    match OutputFormat::from(format) {
        OutputFormat::Json => println!(
            "{}",
            to_json(&UrlReport {
                video_id: options.video_id.trim(),
                manifest_url: manifest_url.as_str(),
            })
        ),
        OutputFormat::Text => println!("{}", manifest_url),
    }

    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProbeReport<'a> {
    video_id: &'a str,
    manifest_url: &'a str,
    levels: &'a QualityCatalog,
}

/// List the quality levels of a video's master playlist
pub async fn probe(
    video_id: &str,
    host: Option<String>,
    file: Option<PathBuf>,
    format: &str,
) -> anyhow::Result<()> {
    let options = options_for(video_id, host)?;
    let manifest_url = options.manifest_url()?;
    let catalog = QualityCatalog::from_reported(&read_levels(&manifest_url, file).await?);

    match OutputFormat::from(format) {
        OutputFormat::Json => println!(
            "{}",
            to_json(&ProbeReport {
                video_id: options.video_id.trim(),
                manifest_url: manifest_url.as_str(),
                levels: &catalog,
            })
        ),
        OutputFormat::Text => {
            println!("Manifest: {}", manifest_url);
            println!("\nQuality levels ({}):", catalog.len());
            for line in catalog_lines(&catalog) {
                println!("{}", line);
            }
            if let Some(highest) = catalog.highest() {
                println!("\nHighest: {}", highest.label());
            }
        }
    }

    Ok(())
}

/// What `play` does after mounting
#[derive(Debug, Clone)]
pub struct PlayScript {
    pub autoplay: bool,
    pub muted: bool,
    pub duration: f64,
    pub seek: Option<f64>,
    pub quality: Option<usize>,
    pub fullscreen: bool,
    pub ticks: u32,
}

/// Run a scripted session against the headless platform
pub async fn play(
    video_id: &str,
    host: Option<String>,
    file: Option<PathBuf>,
    script: PlayScript,
    format: &str,
) -> anyhow::Result<()> {
    let format = OutputFormat::from(format);
    let options = options_for(video_id, host)?
        .with_auto_play(script.autoplay)
        .with_initial_muted(script.muted);
    let levels = read_levels(&options.manifest_url()?, file).await?;

    let callbacks = Callbacks::new()
        .on_error(|e| warn!(code = e.error_code(), "onError: {}", e))
        .on_quality_changed(|q| info!(quality = %q, "onQualityChanged"));

    let headless = Headless::new(script.duration);
    let mut player = PlaybackController::mount(options, headless.platform(levels), callbacks)?;

    let print = |step: &str, player: &PlaybackController| {
        let controls = player.view();
        let report = StepReport {
            step,
            session: player.session_state(),
            controls: &controls,
        };
        println!("{}", report.render(format));
    };

    print("mounted", &player);
    headless.drain(&mut player);
    print("parsed", &player);

    if script.fullscreen {
        player.toggle_fullscreen();
        headless.drain(&mut player);
        print("fullscreen", &player);
    }

    if let Some(level) = script.quality {
        player.select_quality(QualitySelection::Level(level))?;
        print("quality", &player);
    }

    if let Some(fraction) = script.seek {
        player.seek_to_fraction(fraction);
        headless.drain(&mut player);
        print("seek", &player);
    }

    for tick in 1..=script.ticks {
        headless.tick(&mut player, 1.0);
        print(&format!("tick {}", tick), &player);
    }

    info!(
        paused = headless.is_paused(),
        muted = headless.is_muted(),
        level = %headless.selected_level(),
        "Headless session finished"
    );
    player.unmount();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_for_prefers_command_line_host() {
        let options = options_for("abc123", Some("https://videos.example.com".to_string())).unwrap();
        assert_eq!(
            options.manifest_url().unwrap().as_str(),
            "https://videos.example.com/api/v1/videos/abc123/master.m3u8"
        );
    }

    #[test]
    fn test_options_for_rejects_bad_input() {
        assert!(options_for("", Some("http://localhost:8080".to_string())).is_err());
        assert!(options_for("abc123", Some("ftp://example.com".to_string())).is_err());
    }

    #[tokio::test]
    async fn test_read_levels_from_file() {
        let path = std::env::temp_dir().join(format!("reelplay-{}.m3u8", uuid::Uuid::new_v4()));
        tokio::fs::write(
            &path,
            "#EXTM3U\n\
#EXT-X-STREAM-INF:BANDWIDTH=5000000,RESOLUTION=1920x1080\n\
1080p/playlist.m3u8\n\
#EXT-X-STREAM-INF:BANDWIDTH=800000,RESOLUTION=640x360\n\
360p/playlist.m3u8\n",
        )
        .await
        .unwrap();

        let url = Url::parse("http://127.0.0.1:8080/api/v1/videos/abc123/master.m3u8").unwrap();
        let levels = read_levels(&url, Some(path.clone())).await.unwrap();
        let heights: Vec<u32> = levels.iter().map(|l| l.height).collect();
        assert_eq!(heights, vec![1080, 360]);

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
