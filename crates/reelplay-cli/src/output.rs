//! Output formatting for CLI

use reelplay_core::{ControlsView, QualityCatalog, SessionState};
use serde::Serialize;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

/// Serialize `data` as pretty JSON
pub fn to_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
}

/// One line per quality level
pub fn catalog_lines(catalog: &QualityCatalog) -> Vec<String> {
    catalog
        .iter()
        .map(|q| {
            format!(
                "  {}. {:<6} {:>5}px {:>6} kbps",
                q.level,
                q.label(),
                q.height_px,
                q.bitrate_bps / 1_000
            )
        })
        .collect()
}

/// Snapshot of the controls after one scripted step
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport<'a> {
    pub step: &'a str,
    pub session: SessionState,
    pub controls: &'a ControlsView,
}

impl StepReport<'_> {
    /// `step  [state]  Pause | Mute | 0:03 / 2:05 (2%) | 720p`
    pub fn text(&self) -> String {
        let quality = self
            .controls
            .quality_options
            .iter()
            .find(|o| o.selected)
            .map(|o| o.label.as_str())
            .unwrap_or("-");
        format!(
            "{:<12} [{:<9}] {} | {} | {} ({:.0}%) | {}",
            self.step,
            self.session.to_string(),
            self.controls.play_label,
            self.controls.mute_label,
            self.controls.time_display(),
            self.controls.progress_pct,
            quality
        )
    }

    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string()),
            OutputFormat::Text => self.text(),
        }
    }
}
