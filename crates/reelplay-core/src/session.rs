//! Playback Controller - session lifecycle
//!
//! Coordinates:
//! - Mounting on a platform (media listeners, initial mute)
//! - Attaching a manifest through the streaming engine or natively
//! - Tearing the previous session down before any replacement is attached
//! - State machine transitions and error escalation
//!
//! Event handling lives in [`crate::bridge`], user operations in
//! [`crate::controls`].

use crate::{
    bridge::Subscriptions,
    config::{Callbacks, EngineConfig, PlayerOptions},
    error::PlaybackError,
    manifest::{self, HLS_MIME_TYPE},
    platform::{EngineHandle, FullscreenApi, MediaSurface, Platform, StreamingEngine},
    state::{PlaybackState, StateStore},
    types::*,
    Result,
};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Ownership token for one attachment of a manifest to the media surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    id: SessionId,
    video_id: String,
    manifest_url: Url,
    path: PlaybackPath,
    engine: Option<EngineHandle>,
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn manifest_url(&self) -> &Url {
        &self.manifest_url
    }

    pub fn path(&self) -> PlaybackPath {
        self.path
    }

    /// Engine attachment, `None` on the native path
    pub fn engine_handle(&self) -> Option<EngineHandle> {
        self.engine
    }
}

/// Playback session controller bound to one media surface
pub struct PlaybackController {
    pub(crate) options: PlayerOptions,
    host: Url,
    video_id: String,
    manifest_url: Url,
    pub(crate) surface: Box<dyn MediaSurface>,
    pub(crate) fullscreen: Box<dyn FullscreenApi>,
    pub(crate) engine: Option<Box<dyn StreamingEngine>>,
    pub(crate) callbacks: Callbacks,
    pub(crate) store: StateStore,
    pub(crate) subscriptions: Subscriptions,
    pub(crate) session: Option<SessionHandle>,
}

impl PlaybackController {
    /// Mount a controller on `platform` and attach `options.video_id`
    ///
    /// Fails only when the options are invalid; playback failures are
    /// reported through `callbacks`.
    #[instrument(skip(options, platform, callbacks), fields(video_id = %options.video_id))]
    pub fn mount(options: PlayerOptions, platform: Platform, callbacks: Callbacks) -> Result<Self> {
        options.validate()?;
        let host = options.host_url()?;
        let manifest_url = manifest::manifest_url(&host, &options.video_id)?;

        let Platform {
            surface,
            fullscreen,
            engine,
        } = platform;

        let mut controller = Self {
            store: StateStore::new(PlaybackState::new(options.initial_muted, options.auto_play)),
            video_id: options.video_id.trim().to_string(),
            options,
            host,
            manifest_url: manifest_url.clone(),
            surface,
            fullscreen,
            engine,
            callbacks,
            subscriptions: Subscriptions::default(),
            session: None,
        };

        let muted = controller.options.initial_muted;
        controller.surface.set_muted(muted);
        controller
            .subscriptions
            .register_media(controller.surface.as_mut(), controller.fullscreen.as_mut());

        let is_fullscreen = controller.fullscreen.current_target().is_some();
        controller.store.update(|s| s.is_fullscreen = is_fullscreen);

        debug!(quality = %controller.options.quality, "Quality preference (advisory)");
        info!(host = %controller.host, auto_play = controller.options.auto_play, "Player mounted");

        let video_id = controller.video_id.clone();
        controller.attach(video_id, manifest_url);

        Ok(controller)
    }

    /// Switch to another video, releasing the current session first
    ///
    /// Loading the identifier that is already live is a no-op; use
    /// [`reload`](Self::reload) to force a fresh session.
    #[instrument(skip(self))]
    pub fn load(&mut self, video_id: &str) -> Result<()> {
        let manifest_url = manifest::manifest_url(&self.host, video_id)?;
        let video_id = video_id.trim();

        let state = self.session_state();
        if video_id == self.video_id && !matches!(state, SessionState::Detached | SessionState::Error) {
            debug!(%state, "Video already attached");
            return Ok(());
        }

        self.attach(video_id.to_string(), manifest_url);
        Ok(())
    }

    /// Attach the current video again with a new session handle
    ///
    /// The only way out of [`SessionState::Error`].
    #[instrument(skip(self), fields(video_id = %self.video_id))]
    pub fn reload(&mut self) {
        let manifest_url = self.manifest_url.clone();
        let video_id = self.video_id.clone();
        self.attach(video_id, manifest_url);
    }

    /// Release the session and every listener
    pub fn unmount(self) {
        drop(self);
    }

    /// Copy of the current playback state
    pub fn state(&self) -> PlaybackState {
        self.store.snapshot()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.store.subscribe()
    }

    pub fn session_state(&self) -> SessionState {
        self.store.read(|s| s.session)
    }

    /// The live session, if any
    pub fn session(&self) -> Option<&SessionHandle> {
        self.session.as_ref()
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn manifest_url(&self) -> &Url {
        &self.manifest_url
    }

    pub fn options(&self) -> &PlayerOptions {
        &self.options
    }

    fn attach(&mut self, video_id: String, manifest_url: Url) {
        self.teardown_session();

        self.video_id = video_id;
        self.manifest_url = manifest_url;
        self.store.update(|s| s.reset_media());
        self.transition(SessionState::Attaching);

        let id = SessionId::new();
        let config = EngineConfig::default();

        let attached = match self.engine.as_mut().filter(|engine| engine.is_supported()) {
            Some(engine) => Some(engine.attach(&self.manifest_url, self.surface.as_mut(), &config)),
            None => None,
        };

        match attached {
            Some(Ok(handle)) => {
                if let Some(engine) = self.engine.as_mut() {
                    self.subscriptions.register_session(engine.as_mut(), handle);
                }
                self.session = Some(SessionHandle {
                    id,
                    video_id: self.video_id.clone(),
                    manifest_url: self.manifest_url.clone(),
                    path: PlaybackPath::Engine,
                    engine: Some(handle),
                });
                info!(
                    session_id = %id,
                    video_id = %self.video_id,
                    %handle,
                    worker = config.enable_worker,
                    "Session attached via streaming engine"
                );
            }
            Some(Err(e)) => {
                self.fail(PlaybackError::FatalStreaming {
                    kind: StreamingErrorKind::Other,
                    details: e.message,
                });
            }
            None => {
                let mime = manifest::mime_type_for(&self.manifest_url).unwrap_or(HLS_MIME_TYPE);
                if self.surface.can_play_type(mime) {
                    self.surface.set_source(&self.manifest_url);
                    self.session = Some(SessionHandle {
                        id,
                        video_id: self.video_id.clone(),
                        manifest_url: self.manifest_url.clone(),
                        path: PlaybackPath::Native,
                        engine: None,
                    });
                    info!(session_id = %id, video_id = %self.video_id, "Session attached natively");
                    self.transition(SessionState::Ready);
                    self.apply_playback_intent();
                } else {
                    self.fail(PlaybackError::Unsupported {
                        mime: mime.to_string(),
                    });
                }
            }
        }
    }

    /// Release the live session: listeners first, then decode resources
    pub(crate) fn teardown_session(&mut self) {
        if let Some(session) = self.session.take() {
            match session.engine {
                Some(handle) => {
                    if let Some(engine) = self.engine.as_mut() {
                        self.subscriptions.teardown_session(engine.as_mut());
                        engine.release(handle, self.surface.as_mut());
                    }
                }
                None => self.surface.clear_source(),
            }
            info!(session_id = %session.id, video_id = %session.video_id, path = %session.path, "Session released");
        }
        self.transition(SessionState::Detached);
    }

    /// Make the surface follow the playback intent after the manifest is usable
    ///
    /// Engines and native playback may start on their own; without a play
    /// intent the surface is paused explicitly.
    pub(crate) fn apply_playback_intent(&mut self) {
        if self.store.read(|s| s.is_playing) {
            match self.surface.play() {
                Ok(()) => {
                    self.transition(SessionState::Playing);
                }
                Err(e) => {
                    warn!(error = %e, "Surface refused to start playback");
                    self.surface.pause();
                    self.store.update(|s| s.is_playing = false);
                    self.transition(SessionState::Paused);
                }
            }
        } else {
            self.surface.pause();
            self.transition(SessionState::Paused);
        }
    }

    /// Move the session state machine; invalid transitions are ignored
    pub(crate) fn transition(&self, to: SessionState) -> bool {
        let from = self.session_state();
        if from == to {
            return false;
        }
        if !from.can_transition_to(to) {
            debug!(%from, %to, "Ignoring state transition");
            return false;
        }
        self.store.update(|s| s.session = to);
        info!(%from, %to, "State transition");
        true
    }

    /// Escalate a failure to the caller
    pub(crate) fn report(&mut self, error: PlaybackError) {
        if error.is_fatal() {
            error!(code = error.error_code(), error = %error, "Playback error");
        } else {
            warn!(code = error.error_code(), error = %error, "Playback error");
        }
        self.callbacks.error(&error);
    }

    /// Escalate a fatal failure and park the session in `Error`
    pub(crate) fn fail(&mut self, error: PlaybackError) {
        self.transition(SessionState::Error);
        self.report(error);
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.teardown_session();
        self.subscriptions
            .teardown_media(self.surface.as_mut(), self.fullscreen.as_mut());
        info!(video_id = %self.video_id, "Player unmounted");
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("video_id", &self.video_id)
            .field("manifest_url", &self.manifest_url.as_str())
            .field("session", &self.session)
            .field("state", &self.store.snapshot())
            .finish_non_exhaustive()
    }
}
