//! Reelplay Core - Playback session controller
//!
//! This crate provides the client-side playback logic of the video host:
//! - Session attach/detach through a streaming engine or native HLS playback
//! - Quality catalog tracking and rendition selection
//! - Reconciliation of media surface events with UI state
//! - Transport controls and error classification
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Reelplay Core                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐    ┌──────────────┐    ┌──────────────┐       │
//! │  │   Controls   │───►│    Media     │───►│  Streaming   │       │
//! │  │   Surface    │    │   Surface    │    │   Engine     │       │
//! │  └──────▲───────┘    └──────┬───────┘    └──────┬───────┘       │
//! │         │                   │     events        │               │
//! │         │                   └─────────┬─────────┘               │
//! │         │                      ┌──────┴──────┐                  │
//! │         │                      │    Event    │                  │
//! │         │                      │    Bridge   │                  │
//! │         │                      └──────┬──────┘                  │
//! │         │                      ┌──────┴──────┐                  │
//! │         └──────────────────────┤    State    │                  │
//! │                                │    Store    │                  │
//! │                                └─────────────┘                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use reelplay_core::{Callbacks, MediaEvent, PlaybackController, Platform, PlayerOptions};
//!
//! let options = PlayerOptions::new("abc123").with_auto_play(true);
//! let callbacks = Callbacks::new().on_error(|e| eprintln!("{}", e));
//! let mut player = PlaybackController::mount(options, Platform::new(video, document), callbacks)?;
//!
//! // forwarded from the platform's callbacks
//! player.dispatch(MediaEvent::MetadataLoaded);
//! player.toggle_mute();
//! ```

pub mod bridge;
pub mod catalog;
pub mod config;
pub mod controls;
pub mod error;
pub mod manifest;
pub mod platform;
pub mod session;
pub mod state;
pub mod types;

pub use bridge::{BridgeEvent, MediaEvent, SessionEvent, Subscriptions};
pub use catalog::{QualityCatalog, QualityLevel, ReportedLevel};
pub use config::{Callbacks, EngineConfig, PlayerOptions};
pub use controls::{format_time, fraction_from_pointer, ControlAction, ControlsView, QualityOption};
pub use error::{Error, PlaybackError, PlatformError, Result};
pub use platform::{
    EngineHandle, FullscreenApi, ListenerId, MediaEventKind, MediaSurface, Platform,
    SessionEventKind, StreamingEngine,
};
pub use session::{PlaybackController, SessionHandle};
pub use state::{PlaybackState, StateStore};
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the player library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "Reelplay Core initialized");
}
