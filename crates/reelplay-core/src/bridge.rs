//! Event bridge
//!
//! Translates media surface, document fullscreen and streaming engine events
//! into state store updates. The host forwards every callback it registered
//! for through [`PlaybackController::dispatch`]; each event is applied to
//! completion before the next one is accepted.
//!
//! Two listener scopes are tracked in [`Subscriptions`]:
//! - media scope: registered at mount, removed at unmount
//! - session scope: registered per attach, removed before the engine releases

use crate::{
    catalog::{QualityCatalog, ReportedLevel},
    error::PlaybackError,
    platform::{
        EngineHandle, FullscreenApi, ListenerId, MediaEventKind, MediaSurface, SessionEventKind,
        StreamingEngine,
    },
    session::PlaybackController,
    state::{progress_pct, sanitize_duration},
    types::{QualitySelection, SessionState, StreamingErrorKind},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Event raised by the media surface or the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MediaEvent {
    /// Playback position moved
    TimeUpdate,
    /// Duration became known
    MetadataLoaded,
    /// Playback actually started
    Play,
    /// Playback actually paused
    Pause,
    /// Playback reached the end
    Ended,
    /// An element entered or left fullscreen
    FullscreenChange,
    /// A submitted fullscreen request was rejected later
    FullscreenError { reason: String },
}

/// Event raised by the streaming engine for one attachment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The manifest was parsed; levels in engine order
    ManifestParsed { levels: Vec<ReportedLevel> },
    /// The engine hit a problem
    Error {
        fatal: bool,
        kind: StreamingErrorKind,
        details: String,
    },
}

impl SessionEvent {
    pub fn kind(&self) -> SessionEventKind {
        match self {
            SessionEvent::ManifestParsed { .. } => SessionEventKind::ManifestParsed,
            SessionEvent::Error { .. } => SessionEventKind::Error,
        }
    }
}

/// Everything the bridge accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeEvent {
    Media(MediaEvent),
    Session {
        handle: EngineHandle,
        event: SessionEvent,
    },
}

impl From<MediaEvent> for BridgeEvent {
    fn from(event: MediaEvent) -> Self {
        BridgeEvent::Media(event)
    }
}

/// Listener registrations held by the controller
#[derive(Debug, Default)]
pub struct Subscriptions {
    media: Vec<(MediaEventKind, ListenerId)>,
    fullscreen: Option<ListenerId>,
    session: Option<(EngineHandle, Vec<(SessionEventKind, ListenerId)>)>,
}

impl Subscriptions {
    /// Register the mount-scoped listeners; idempotent
    pub fn register_media(&mut self, surface: &mut dyn MediaSurface, fullscreen: &mut dyn FullscreenApi) {
        if self.is_media_active() {
            return;
        }
        self.media = MediaEventKind::ALL
            .iter()
            .map(|kind| (*kind, surface.add_listener(*kind)))
            .collect();
        self.fullscreen = Some(fullscreen.add_change_listener());
    }

    /// Remove the mount-scoped listeners
    pub fn teardown_media(&mut self, surface: &mut dyn MediaSurface, fullscreen: &mut dyn FullscreenApi) {
        for (_, listener) in self.media.drain(..) {
            surface.remove_listener(listener);
        }
        if let Some(listener) = self.fullscreen.take() {
            fullscreen.remove_change_listener(listener);
        }
    }

    /// Register the manifest-parsed and error listeners of one attachment
    pub fn register_session(&mut self, engine: &mut dyn StreamingEngine, handle: EngineHandle) {
        let listeners = SessionEventKind::ALL
            .iter()
            .map(|kind| (*kind, engine.subscribe(handle, *kind)))
            .collect();
        self.session = Some((handle, listeners));
    }

    /// Remove the listeners of the current attachment
    pub fn teardown_session(&mut self, engine: &mut dyn StreamingEngine) {
        if let Some((handle, listeners)) = self.session.take() {
            for (_, listener) in listeners {
                engine.unsubscribe(handle, listener);
            }
        }
    }

    pub fn is_media_active(&self) -> bool {
        !self.media.is_empty() || self.fullscreen.is_some()
    }

    pub fn media_listener_count(&self) -> usize {
        self.media.len() + usize::from(self.fullscreen.is_some())
    }

    pub fn session_listener_count(&self) -> usize {
        self.session.as_ref().map(|(_, l)| l.len()).unwrap_or(0)
    }

    /// Whether a media event has a registered listener
    pub fn accepts_media(&self, event: &MediaEvent) -> bool {
        let kind = match event {
            MediaEvent::TimeUpdate => MediaEventKind::TimeUpdate,
            MediaEvent::MetadataLoaded => MediaEventKind::MetadataLoaded,
            MediaEvent::Play => MediaEventKind::Play,
            MediaEvent::Pause => MediaEventKind::Pause,
            MediaEvent::Ended => MediaEventKind::Ended,
            MediaEvent::FullscreenChange => return self.fullscreen.is_some(),
            MediaEvent::FullscreenError { .. } => return self.is_media_active(),
        };
        self.media.iter().any(|(k, _)| *k == kind)
    }

    /// Whether a session event belongs to the live attachment and is listened to
    pub fn accepts_session(&self, handle: EngineHandle, kind: SessionEventKind) -> bool {
        match &self.session {
            Some((live, listeners)) => *live == handle && listeners.iter().any(|(k, _)| *k == kind),
            None => false,
        }
    }
}

impl PlaybackController {
    /// Apply one platform or engine event
    pub fn dispatch(&mut self, event: impl Into<BridgeEvent>) {
        match event.into() {
            BridgeEvent::Media(event) => self.on_media_event(event),
            BridgeEvent::Session { handle, event } => self.on_session_event(handle, event),
        }
    }

    fn on_media_event(&mut self, event: MediaEvent) {
        if !self.subscriptions.accepts_media(&event) {
            debug!(?event, "Dropping media event without listener");
            return;
        }

        match event {
            MediaEvent::TimeUpdate => {
                let current = self.surface.current_time();
                let duration = self.surface.duration();
                self.store.update(|s| {
                    s.current_time_sec = if current.is_finite() { current.max(0.0) } else { 0.0 };
                    s.progress_pct = progress_pct(current, duration);
                });
            }
            MediaEvent::MetadataLoaded => {
                let duration = sanitize_duration(self.surface.duration());
                self.store.update(|s| s.duration_sec = duration);
                debug!(duration, "Metadata loaded");
            }
            MediaEvent::Play | MediaEvent::Pause | MediaEvent::Ended
                if !self.session_state().is_ready() =>
            {
                // the intent is reconciled once the manifest is usable
                debug!(?event, state = %self.session_state(), "Ignoring playback event before ready");
            }
            MediaEvent::Play => {
                self.store.update(|s| s.is_playing = true);
                self.transition(SessionState::Playing);
            }
            MediaEvent::Pause | MediaEvent::Ended => {
                self.store.update(|s| s.is_playing = false);
                self.transition(SessionState::Paused);
            }
            MediaEvent::FullscreenChange => {
                let is_fullscreen = self.fullscreen.current_target().is_some();
                self.store.update(|s| s.is_fullscreen = is_fullscreen);
                debug!(is_fullscreen, "Fullscreen changed");
            }
            MediaEvent::FullscreenError { reason } => {
                self.report(PlaybackError::Fullscreen { reason });
            }
        }
    }

    fn on_session_event(&mut self, handle: EngineHandle, event: SessionEvent) {
        if !self.subscriptions.accepts_session(handle, event.kind()) {
            debug!(%handle, kind = ?event.kind(), "Dropping event from released session");
            return;
        }
        if self.session_state() == SessionState::Error {
            debug!(%handle, kind = ?event.kind(), "Session already failed");
            return;
        }

        match event {
            SessionEvent::ManifestParsed { levels } => self.publish_catalog(&levels),
            SessionEvent::Error {
                fatal: true,
                kind,
                details,
            } => {
                self.fail(PlaybackError::FatalStreaming { kind, details });
            }
            SessionEvent::Error {
                fatal: false,
                kind,
                details,
            } => {
                warn!(%kind, %details, "Non-fatal streaming error");
            }
        }
    }

    /// Replace the catalog and reconcile the surface with the play intent
    fn publish_catalog(&mut self, levels: &[ReportedLevel]) {
        let catalog = QualityCatalog::from_reported(levels);
        info!(
            levels = catalog.len(),
            highest = catalog.highest().map(|q| q.label()).unwrap_or("none"),
            "Quality catalog published"
        );

        self.store.update(|s| {
            s.qualities = catalog;
            s.selected_quality = None;
        });
        self.callbacks.quality_changed(QualitySelection::Auto);

        self.transition(SessionState::Ready);
        self.apply_playback_intent();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_event_kind() {
        let parsed = SessionEvent::ManifestParsed { levels: vec![] };
        assert_eq!(parsed.kind(), SessionEventKind::ManifestParsed);

        let error = SessionEvent::Error {
            fatal: true,
            kind: StreamingErrorKind::Network,
            details: "fragLoadError".to_string(),
        };
        assert_eq!(error.kind(), SessionEventKind::Error);
    }

    #[test]
    fn test_empty_subscriptions_accept_nothing() {
        let subscriptions = Subscriptions::default();
        assert!(!subscriptions.is_media_active());
        assert!(!subscriptions.accepts_media(&MediaEvent::TimeUpdate));
        assert!(!subscriptions.accepts_media(&MediaEvent::FullscreenChange));
        assert!(!subscriptions.accepts_media(&MediaEvent::FullscreenError {
            reason: "denied".to_string()
        }));
        assert!(!subscriptions.accepts_session(EngineHandle(1), SessionEventKind::Error));
        assert_eq!(subscriptions.media_listener_count(), 0);
        assert_eq!(subscriptions.session_listener_count(), 0);
    }

    #[test]
    fn test_bridge_event_json() {
        let event = BridgeEvent::Session {
            handle: EngineHandle(3),
            event: SessionEvent::Error {
                fatal: false,
                kind: StreamingErrorKind::Media,
                details: "bufferStalledError".to_string(),
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: BridgeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);

        let media: BridgeEvent = serde_json::from_str(r#"{"media":{"event":"time_update"}}"#).unwrap();
        assert_eq!(media, BridgeEvent::Media(MediaEvent::TimeUpdate));
    }
}
