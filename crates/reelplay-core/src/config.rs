//! Caller configuration
//!
//! [`PlayerOptions`] is the serialisable part supplied by the embedding page,
//! [`Callbacks`] carries the caller's hooks, and [`EngineConfig`] is the fixed
//! configuration handed to the streaming engine on every attach.

use crate::{
    error::PlaybackError,
    manifest,
    types::QualitySelection,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use url::Url;

/// Environment variable overriding the video host
pub const VIDEO_HOST_ENV: &str = "REELPLAY_VIDEO_HOST";

/// Environment variable enabling the engine's debug logging
pub const ENGINE_DEBUG_ENV: &str = "REELPLAY_ENGINE_DEBUG";

/// Default video host (the backend's default bind address)
pub const DEFAULT_VIDEO_HOST: &str = "http://127.0.0.1:8080";

/// Options supplied when mounting a player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerOptions {
    /// Identifier of the video to play
    pub video_id: String,
    /// Base URL of the video host
    pub video_host: String,
    /// Preferred quality; advisory, defaults to "auto"
    pub quality: String,
    /// Start muted
    pub initial_muted: bool,
    /// Start playing as soon as the manifest is usable
    pub auto_play: bool,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            video_id: String::new(),
            video_host: DEFAULT_VIDEO_HOST.to_string(),
            quality: "auto".to_string(),
            initial_muted: false,
            auto_play: false,
        }
    }
}

impl PlayerOptions {
    /// Create options for a video with everything else defaulted
    pub fn new(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            ..Default::default()
        }
    }

    /// Parse options from a JSON object
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Apply environment overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(host) = std::env::var(VIDEO_HOST_ENV) {
            if !host.trim().is_empty() {
                self.video_host = host.trim().to_string();
            }
        }
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.video_host = host.into();
        self
    }

    pub fn with_auto_play(mut self, auto_play: bool) -> Self {
        self.auto_play = auto_play;
        self
    }

    pub fn with_initial_muted(mut self, muted: bool) -> Self {
        self.initial_muted = muted;
        self
    }

    /// Parsed video host
    pub fn host_url(&self) -> Result<Url> {
        manifest::parse_host(&self.video_host)
    }

    /// Manifest URL of the configured video
    pub fn manifest_url(&self) -> Result<Url> {
        manifest::manifest_url(&self.host_url()?, &self.video_id)
    }

    /// The advisory quality preference, if it parses
    pub fn preferred_quality(&self) -> Option<QualitySelection> {
        self.quality.parse().ok()
    }

    /// Check the options without touching any platform resource
    pub fn validate(&self) -> Result<()> {
        self.manifest_url()?;
        if self.preferred_quality().is_none() {
            return Err(Error::InvalidConfig(format!(
                "quality must be \"auto\" or a level index, got {:?}",
                self.quality
            )));
        }
        Ok(())
    }
}

/// Error callback
pub type ErrorCallback = Box<dyn FnMut(&PlaybackError)>;

/// Quality-changed callback
pub type QualityCallback = Box<dyn FnMut(QualitySelection)>;

/// Caller hooks
#[derive(Default)]
pub struct Callbacks {
    pub on_error: Option<ErrorCallback>,
    pub on_quality_changed: Option<QualityCallback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_error(mut self, callback: impl FnMut(&PlaybackError) + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    pub fn on_quality_changed(mut self, callback: impl FnMut(QualitySelection) + 'static) -> Self {
        self.on_quality_changed = Some(Box::new(callback));
        self
    }

    pub(crate) fn error(&mut self, error: &PlaybackError) {
        if let Some(callback) = self.on_error.as_mut() {
            callback(error);
        }
    }

    pub(crate) fn quality_changed(&mut self, selection: QualitySelection) {
        if let Some(callback) = self.on_quality_changed.as_mut() {
            callback(selection);
        }
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_error", &self.on_error.is_some())
            .field("on_quality_changed", &self.on_quality_changed.is_some())
            .finish()
    }
}

/// Configuration passed to the streaming engine on attach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Demux/transmux in a background worker
    pub enable_worker: bool,
    /// Initial rendition; always automatic
    pub start_level: QualitySelection,
    /// Verbose engine logging
    pub debug: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_worker: true,
            start_level: QualitySelection::Auto,
            debug: env_flag(ENGINE_DEBUG_ENV),
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_options_defaults() {
        let options = PlayerOptions::default();
        assert_eq!(options.video_host, DEFAULT_VIDEO_HOST);
        assert_eq!(options.quality, "auto");
        assert!(!options.initial_muted);
        assert!(!options.auto_play);
        assert_eq!(options.preferred_quality(), Some(QualitySelection::Auto));
    }

    #[test]
    fn test_player_options_from_json() {
        let options = PlayerOptions::from_json(
            r#"{"videoId": "abc123", "autoPlay": true, "initialMuted": true}"#,
        )
        .unwrap();
        assert_eq!(options.video_id, "abc123");
        assert!(options.auto_play);
        assert!(options.initial_muted);
        assert_eq!(options.quality, "auto");
        assert_eq!(
            options.manifest_url().unwrap().as_str(),
            "http://127.0.0.1:8080/api/v1/videos/abc123/master.m3u8"
        );
    }

    #[test]
    fn test_player_options_require_video_id() {
        let err = PlayerOptions::from_json(r#"{"autoPlay": true}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidVideoId(_)));
    }

    #[test]
    fn test_player_options_reject_bad_quality() {
        let err = PlayerOptions::from_json(r#"{"videoId": "a", "quality": "best"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_engine_config_is_fixed() {
        let config = EngineConfig::default();
        assert!(config.enable_worker);
        assert_eq!(config.start_level, QualitySelection::Auto);
    }

    #[test]
    fn test_callbacks_default_to_noop() {
        let mut callbacks = Callbacks::new();
        callbacks.error(&PlaybackError::Fullscreen {
            reason: "denied".to_string(),
        });
        callbacks.quality_changed(QualitySelection::Auto);
    }
}
