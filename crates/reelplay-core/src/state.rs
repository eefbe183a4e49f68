//! Playback state store
//!
//! Single source of truth for everything the UI renders. Writers go through
//! [`StateStore::update`], which applies the change in place and notifies
//! subscribers only when a field actually changed.

use crate::{catalog::QualityCatalog, types::SessionState};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// UI-observable playback state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    /// Playback intent, confirmed by surface play/pause events
    pub is_playing: bool,
    pub is_muted: bool,
    /// Mirrors the document fullscreen target
    pub is_fullscreen: bool,
    /// Position as a percentage of duration, always within `0..=100`
    pub progress_pct: f64,
    /// Last reported position in seconds
    pub current_time_sec: f64,
    pub duration_sec: f64,
    /// Index into `qualities`; `None` while selection is automatic
    pub selected_quality: Option<usize>,
    pub qualities: QualityCatalog,
    pub session: SessionState,
}

impl PlaybackState {
    /// Initial state for a fresh mount
    pub fn new(initial_muted: bool, auto_play: bool) -> Self {
        Self {
            is_playing: auto_play,
            is_muted: initial_muted,
            is_fullscreen: false,
            progress_pct: 0.0,
            current_time_sec: 0.0,
            duration_sec: 0.0,
            selected_quality: None,
            qualities: QualityCatalog::empty(),
            session: SessionState::Detached,
        }
    }

    /// Forget everything tied to the previous manifest
    pub(crate) fn reset_media(&mut self) {
        self.progress_pct = 0.0;
        self.current_time_sec = 0.0;
        self.duration_sec = 0.0;
        self.selected_quality = None;
        self.qualities = QualityCatalog::empty();
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(false, false)
    }
}

/// `current / duration * 100`, clamped, 0 when either side is unusable
pub fn progress_pct(current_time: f64, duration: f64) -> f64 {
    if !duration.is_finite() || duration <= 0.0 || !current_time.is_finite() {
        return 0.0;
    }
    (current_time / duration * 100.0).clamp(0.0, 100.0)
}

/// A duration usable for display and seeking: finite and non-negative
pub fn sanitize_duration(duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        0.0
    }
}

/// Change-notifying holder of the playback state
#[derive(Debug)]
pub struct StateStore {
    tx: watch::Sender<PlaybackState>,
}

impl StateStore {
    pub fn new(initial: PlaybackState) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Apply a mutation; returns whether anything changed
    pub fn update(&self, mutate: impl FnOnce(&mut PlaybackState)) -> bool {
        self.tx.send_if_modified(|state| {
            let before = state.clone();
            mutate(state);
            *state != before
        })
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> PlaybackState {
        self.tx.borrow().clone()
    }

    /// Read a field without cloning the whole state
    pub fn read<T>(&self, f: impl FnOnce(&PlaybackState) -> T) -> T {
        f(&self.tx.borrow())
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = PlaybackState::new(true, true);
        assert!(state.is_playing);
        assert!(state.is_muted);
        assert!(!state.is_fullscreen);
        assert_eq!(state.progress_pct, 0.0);
        assert_eq!(state.duration_sec, 0.0);
        assert!(state.qualities.is_empty());
        assert_eq!(state.selected_quality, None);
        assert_eq!(state.session, SessionState::Detached);
    }

    #[test]
    fn test_progress_pct() {
        assert_eq!(progress_pct(30.0, 120.0), 25.0);
        assert_eq!(progress_pct(120.0, 120.0), 100.0);
    }

    #[test]
    fn test_progress_pct_never_nan_or_out_of_range() {
        assert_eq!(progress_pct(10.0, 0.0), 0.0);
        assert_eq!(progress_pct(0.0, 0.0), 0.0);
        assert_eq!(progress_pct(10.0, f64::NAN), 0.0);
        assert_eq!(progress_pct(f64::NAN, 60.0), 0.0);
        assert_eq!(progress_pct(10.0, f64::INFINITY), 0.0);
        assert_eq!(progress_pct(130.0, 120.0), 100.0);
        assert_eq!(progress_pct(-5.0, 120.0), 0.0);
    }

    #[test]
    fn test_sanitize_duration() {
        assert_eq!(sanitize_duration(125.0), 125.0);
        assert_eq!(sanitize_duration(f64::NAN), 0.0);
        assert_eq!(sanitize_duration(f64::INFINITY), 0.0);
        assert_eq!(sanitize_duration(-1.0), 0.0);
    }

    #[test]
    fn test_store_notifies_only_on_change() {
        let store = StateStore::new(PlaybackState::default());
        let mut rx = store.subscribe();
        rx.mark_unchanged();

        assert!(!store.update(|s| s.is_muted = false));
        assert!(!rx.has_changed().unwrap());

        assert!(store.update(|s| s.is_muted = true));
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_muted);
    }

    #[test]
    fn test_store_applies_successive_updates() {
        let store = StateStore::new(PlaybackState::default());
        for i in 1..=100 {
            store.update(|s| s.current_time_sec = i as f64);
        }
        store.update(|s| s.duration_sec = 200.0);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.current_time_sec, 100.0);
        assert_eq!(snapshot.duration_sec, 200.0);
    }
}
