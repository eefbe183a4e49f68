//! Playback controls
//!
//! User-invocable operations on [`PlaybackController`] and the render model of
//! the control bar. Operations return immediately; anything the platform
//! confirms asynchronously (fullscreen) is only reflected in state once the
//! matching event arrives through the bridge.

use crate::{
    catalog::QualityLevel,
    error::PlaybackError,
    session::PlaybackController,
    state::PlaybackState,
    types::{QualitySelection, SessionState},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Serialisable control bar action, run through [`PlaybackController::apply`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum ControlAction {
    TogglePlay,
    ToggleMute,
    ToggleFullscreen,
    /// Seek to a fraction of the duration
    Seek(f64),
    SelectQuality(QualitySelection),
}

impl PlaybackController {
    /// Run a control action
    pub fn apply(&mut self, action: ControlAction) -> Result<()> {
        match action {
            ControlAction::TogglePlay => self.toggle_play(),
            ControlAction::ToggleMute => self.toggle_mute(),
            ControlAction::ToggleFullscreen => self.toggle_fullscreen(),
            ControlAction::Seek(fraction) => self.seek_to_fraction(fraction),
            ControlAction::SelectQuality(selection) => return self.select_quality(selection),
        }
        Ok(())
    }

    /// Play if paused, pause if playing
    ///
    /// Updates the intent immediately. Before the manifest is usable only the
    /// intent changes; it is applied once the catalog is published.
    pub fn toggle_play(&mut self) {
        let state = self.session_state();
        if matches!(state, SessionState::Detached | SessionState::Error) {
            debug!(%state, "Ignoring play toggle without a live session");
            return;
        }

        if self.store.read(|s| s.is_playing) {
            self.surface.pause();
            self.store.update(|s| s.is_playing = false);
            self.transition(SessionState::Paused);
            return;
        }

        self.store.update(|s| s.is_playing = true);
        if state == SessionState::Attaching {
            debug!("Play intent recorded until the manifest is parsed");
            return;
        }

        match self.surface.play() {
            Ok(()) => {
                self.transition(SessionState::Playing);
            }
            Err(e) => {
                warn!(error = %e, "Surface refused to start playback");
                self.store.update(|s| s.is_playing = false);
            }
        }
    }

    /// Flip the mute flag on the surface and in state
    pub fn toggle_mute(&mut self) {
        let muted = !self.store.read(|s| s.is_muted);
        self.surface.set_muted(muted);
        self.store.update(|s| s.is_muted = muted);
    }

    /// Ask the document to enter or leave fullscreen
    ///
    /// State is left alone; the change notification confirms the transition.
    pub fn toggle_fullscreen(&mut self) {
        let result = if self.fullscreen.current_target().is_some() {
            self.fullscreen.request_exit()
        } else {
            self.fullscreen.request_enter()
        };

        if let Err(e) = result {
            self.report(PlaybackError::Fullscreen { reason: e.message });
        }
    }

    /// Seek to `fraction` of the known duration
    ///
    /// No-op while the duration is unknown or zero.
    pub fn seek_to_fraction(&mut self, fraction: f64) {
        let state = self.session_state();
        if matches!(state, SessionState::Detached | SessionState::Error) {
            debug!(%state, "Ignoring seek without a live session");
            return;
        }
        if !fraction.is_finite() {
            debug!(fraction, "Ignoring seek to non-finite fraction");
            return;
        }

        let duration = self.store.read(|s| s.duration_sec);
        if !(duration.is_finite() && duration > 0.0) {
            debug!(duration, "Ignoring seek before duration is known");
            return;
        }

        let target = fraction.clamp(0.0, 1.0) * duration;
        self.surface.set_current_time(target);
        debug!(target, "Seek requested");
    }

    /// Seek from a click on the progress bar
    pub fn seek_from_pointer(&mut self, offset_x: f64, width: f64) {
        if let Some(fraction) = fraction_from_pointer(offset_x, width) {
            self.seek_to_fraction(fraction);
        }
    }

    /// Pin a rendition or go back to automatic selection
    ///
    /// No-op with an empty catalog (native playback, manifest not parsed).
    /// An index outside the catalog is rejected.
    pub fn select_quality(&mut self, selection: QualitySelection) -> Result<()> {
        let available = self.store.read(|s| s.qualities.len());
        if available == 0 {
            debug!(%selection, "Ignoring quality selection without a catalog");
            return Ok(());
        }
        if let QualitySelection::Level(index) = selection {
            if index >= available {
                return Err(Error::QualityOutOfRange { index, available });
            }
        }
        if self.session_state() == SessionState::Error {
            debug!(%selection, "Ignoring quality selection on a failed session");
            return Ok(());
        }

        let Some(handle) = self.session.as_ref().and_then(|s| s.engine_handle()) else {
            debug!(%selection, "Quality selection unavailable on native playback");
            return Ok(());
        };
        if let Some(engine) = self.engine.as_mut() {
            engine.select_level(handle, selection);
        }

        if self.store.update(|s| s.selected_quality = selection.level()) {
            info!(%selection, "Quality selected");
            self.callbacks.quality_changed(selection);
        }
        Ok(())
    }

    /// Render model of the current state
    pub fn view(&self) -> ControlsView {
        self.store.read(ControlsView::from_state)
    }
}

/// Entry of the quality menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityOption {
    pub selection: QualitySelection,
    pub label: String,
    pub bitrate_bps: Option<u64>,
    pub selected: bool,
}

impl QualityOption {
    fn auto(selected: bool) -> Self {
        Self {
            selection: QualitySelection::Auto,
            label: "Auto".to_string(),
            bitrate_bps: None,
            selected,
        }
    }

    fn level(level: &QualityLevel, selected: bool) -> Self {
        Self {
            selection: QualitySelection::Level(level.level),
            label: level.label().to_string(),
            bitrate_bps: Some(level.bitrate_bps),
            selected,
        }
    }
}

/// What the control bar shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlsView {
    pub play_label: String,
    pub mute_label: String,
    pub fullscreen_label: String,
    pub progress_pct: f64,
    pub elapsed: String,
    pub duration: String,
    /// Empty when no catalog is available
    pub quality_options: Vec<QualityOption>,
    pub loading: bool,
    pub error: bool,
}

impl ControlsView {
    pub fn from_state(state: &PlaybackState) -> Self {
        let quality_options = if state.qualities.is_empty() {
            Vec::new()
        } else {
            std::iter::once(QualityOption::auto(state.selected_quality.is_none()))
                .chain(
                    state
                        .qualities
                        .iter()
                        .map(|q| QualityOption::level(q, state.selected_quality == Some(q.level))),
                )
                .collect()
        };

        Self {
            play_label: if state.is_playing { "Pause" } else { "Play" }.to_string(),
            mute_label: if state.is_muted { "Unmute" } else { "Mute" }.to_string(),
            fullscreen_label: if state.is_fullscreen { "Exit fullscreen" } else { "Fullscreen" }
                .to_string(),
            progress_pct: state.progress_pct,
            elapsed: format_time(state.current_time_sec),
            duration: format_time(state.duration_sec),
            quality_options,
            loading: state.session == SessionState::Attaching,
            error: state.session == SessionState::Error,
        }
    }

    /// `elapsed / duration`
    pub fn time_display(&self) -> String {
        format!("{} / {}", self.elapsed, self.duration)
    }
}

/// Format seconds as `M:SS`
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Fraction of the progress bar under the pointer
pub fn fraction_from_pointer(offset_x: f64, width: f64) -> Option<f64> {
    if !(width.is_finite() && width > 0.0) || !offset_x.is_finite() {
        return None;
    }
    Some((offset_x / width).clamp(0.0, 1.0))
}
