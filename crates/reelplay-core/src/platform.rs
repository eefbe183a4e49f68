//! Platform capabilities consumed by the controller
//!
//! The controller never touches a browser, window system or decoder directly.
//! It talks to three narrow interfaces implemented by the host:
//!
//! - [`MediaSurface`]: the playable media primitive (a `<video>` element, a
//!   native player widget, an in-memory double in tests)
//! - [`FullscreenApi`]: the document-level fullscreen state
//! - [`StreamingEngine`]: an adaptive-streaming engine that parses the
//!   manifest and feeds the surface
//!
//! Events flow back through [`crate::PlaybackController::dispatch`]; the
//! `add_*`/`subscribe` methods only register interest so the host knows which
//! callbacks to forward.

use crate::{config::EngineConfig, error::PlatformError, types::QualitySelection};
use serde::{Deserialize, Serialize};
use url::Url;

/// Registration token returned by a capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

/// Opaque handle of one engine attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineHandle(pub u64);

impl std::fmt::Display for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "engine#{}", self.0)
    }
}

/// Native media events the controller listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaEventKind {
    TimeUpdate,
    MetadataLoaded,
    Play,
    Pause,
    Ended,
}

impl MediaEventKind {
    /// Every kind registered at mount
    pub const ALL: [MediaEventKind; 5] = [
        MediaEventKind::TimeUpdate,
        MediaEventKind::MetadataLoaded,
        MediaEventKind::Play,
        MediaEventKind::Pause,
        MediaEventKind::Ended,
    ];
}

/// Streaming engine events the controller listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEventKind {
    ManifestParsed,
    Error,
}

impl SessionEventKind {
    /// Every kind registered per attach
    pub const ALL: [SessionEventKind; 2] = [SessionEventKind::ManifestParsed, SessionEventKind::Error];
}

/// The platform's playable media primitive
pub trait MediaSurface {
    /// Start playback; may be refused (autoplay policy, no source)
    fn play(&mut self) -> Result<(), PlatformError>;

    fn pause(&mut self);

    fn set_muted(&mut self, muted: bool);

    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, seconds: f64);

    /// Media duration in seconds; NaN before metadata, infinite for live
    fn duration(&self) -> f64;

    /// Whether the surface can play a media type without an engine
    fn can_play_type(&self, mime: &str) -> bool;

    /// Play a URL natively
    fn set_source(&mut self, url: &Url);

    /// Drop the native source and its decode resources
    fn clear_source(&mut self);

    fn add_listener(&mut self, kind: MediaEventKind) -> ListenerId;

    fn remove_listener(&mut self, listener: ListenerId);
}

/// Document-scoped fullscreen state
pub trait FullscreenApi {
    /// Identifier of the element currently holding fullscreen, if any
    fn current_target(&self) -> Option<String>;

    /// Ask for the player container to enter fullscreen
    ///
    /// `Ok` only means the request was submitted; the transition is
    /// confirmed by a later change notification.
    fn request_enter(&mut self) -> Result<(), PlatformError>;

    /// Ask the document to leave fullscreen
    fn request_exit(&mut self) -> Result<(), PlatformError>;

    fn add_change_listener(&mut self) -> ListenerId;

    fn remove_change_listener(&mut self, listener: ListenerId);
}

/// Adaptive-streaming engine
pub trait StreamingEngine {
    /// Whether the engine can run on this platform
    fn is_supported(&self) -> bool;

    /// Load `source` and bind the decode pipeline to `surface`
    fn attach(
        &mut self,
        source: &Url,
        surface: &mut dyn MediaSurface,
        config: &EngineConfig,
    ) -> Result<EngineHandle, PlatformError>;

    fn subscribe(&mut self, handle: EngineHandle, kind: SessionEventKind) -> ListenerId;

    fn unsubscribe(&mut self, handle: EngineHandle, listener: ListenerId);

    /// Pin a rendition or return to automatic selection
    fn select_level(&mut self, handle: EngineHandle, selection: QualitySelection);

    /// Stop loading, free buffers and detach from `surface`
    fn release(&mut self, handle: EngineHandle, surface: &mut dyn MediaSurface);
}

/// The capabilities a controller is mounted on
pub struct Platform {
    pub surface: Box<dyn MediaSurface>,
    pub fullscreen: Box<dyn FullscreenApi>,
    /// `None` when no streaming engine is bundled
    pub engine: Option<Box<dyn StreamingEngine>>,
}

impl Platform {
    /// Platform with native playback only
    pub fn new(
        surface: impl MediaSurface + 'static,
        fullscreen: impl FullscreenApi + 'static,
    ) -> Self {
        Self {
            surface: Box::new(surface),
            fullscreen: Box::new(fullscreen),
            engine: None,
        }
    }

    /// Add a streaming engine
    pub fn with_engine(mut self, engine: impl StreamingEngine + 'static) -> Self {
        self.engine = Some(Box::new(engine));
        self
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("engine", &self.engine.is_some())
            .finish_non_exhaustive()
    }
}
