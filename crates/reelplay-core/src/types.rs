//! Core types for Reelplay

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for one attachment of a manifest to a media surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the manifest reaches the media surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPath {
    /// A streaming engine parses the manifest and feeds the surface
    Engine,
    /// The surface plays the manifest URL itself; no quality catalog
    Native,
}

impl std::fmt::Display for PlaybackPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackPath::Engine => write!(f, "engine"),
            PlaybackPath::Native => write!(f, "native"),
        }
    }
}

/// Session state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No manifest attached
    Detached,
    /// Attached, waiting for the manifest to be parsed
    Attaching,
    /// Manifest available, playback intent not yet applied
    Ready,
    /// Content is playing
    Playing,
    /// Playback paused
    Paused,
    /// Fatal failure; terminal for the current session handle
    Error,
}

impl SessionState {
    /// Check if transition to target state is valid
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, target),
            // From Detached
            (Detached, Attaching) |
            // From Attaching
            (Attaching, Ready) | (Attaching, Error) | (Attaching, Detached) |
            // From Ready
            (Ready, Playing) | (Ready, Paused) | (Ready, Error) | (Ready, Detached) |
            // From Playing
            (Playing, Paused) | (Playing, Error) | (Playing, Detached) |
            // From Paused
            (Paused, Playing) | (Paused, Error) | (Paused, Detached) |
            // From Error
            (Error, Detached)
        )
    }

    /// True once the manifest is usable for transport controls
    pub fn is_ready(&self) -> bool {
        matches!(self, SessionState::Ready | SessionState::Playing | SessionState::Paused)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Detached => write!(f, "detached"),
            SessionState::Attaching => write!(f, "attaching"),
            SessionState::Ready => write!(f, "ready"),
            SessionState::Playing => write!(f, "playing"),
            SessionState::Paused => write!(f, "paused"),
            SessionState::Error => write!(f, "error"),
        }
    }
}

/// Rendition choice forwarded to the streaming engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualitySelection {
    /// Let the engine pick the rendition
    #[default]
    Auto,
    /// Pin a catalog index
    Level(usize),
}

impl QualitySelection {
    /// Engine-style level index, `-1` meaning automatic
    pub fn level_index(&self) -> i64 {
        match self {
            QualitySelection::Auto => -1,
            QualitySelection::Level(level) => *level as i64,
        }
    }

    /// The pinned catalog index, if any
    pub fn level(&self) -> Option<usize> {
        match self {
            QualitySelection::Auto => None,
            QualitySelection::Level(level) => Some(*level),
        }
    }
}

impl FromStr for QualitySelection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") || s == "-1" {
            return Ok(QualitySelection::Auto);
        }
        s.parse::<usize>()
            .map(QualitySelection::Level)
            .map_err(|_| format!("expected \"auto\" or a level index, got {:?}", s))
    }
}

impl std::fmt::Display for QualitySelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualitySelection::Auto => write!(f, "auto"),
            QualitySelection::Level(level) => write!(f, "{}", level),
        }
    }
}

/// Category of an engine-reported error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamingErrorKind {
    Network,
    Media,
    Other,
}

impl StreamingErrorKind {
    /// Map an engine error type string (`networkError`, `mediaError`, ...)
    pub fn from_engine_type(error_type: &str) -> Self {
        let lower = error_type.to_ascii_lowercase();
        if lower.starts_with("network") {
            StreamingErrorKind::Network
        } else if lower.starts_with("media") {
            StreamingErrorKind::Media
        } else {
            StreamingErrorKind::Other
        }
    }
}

impl std::fmt::Display for StreamingErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamingErrorKind::Network => write!(f, "network"),
            StreamingErrorKind::Media => write!(f, "media"),
            StreamingErrorKind::Other => write!(f, "other"),
        }
    }
}
