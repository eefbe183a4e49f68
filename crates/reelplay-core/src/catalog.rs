//! Quality catalog
//!
//! The list of selectable renditions published by the streaming engine once
//! the manifest is parsed. A catalog is immutable; a new manifest replaces it
//! wholesale.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A rendition as reported by the streaming engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedLevel {
    /// Frame height in pixels
    pub height: u32,
    /// Frame width in pixels (0 when unknown)
    #[serde(default)]
    pub width: u32,
    /// Declared bandwidth in bits per second
    pub bitrate: u64,
}

impl ReportedLevel {
    pub fn new(height: u32, bitrate: u64) -> Self {
        Self {
            height,
            width: 0,
            bitrate,
        }
    }
}

/// One selectable rendition in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityLevel {
    /// Stable index, equal to the engine's level index
    pub level: usize,
    /// Frame height in pixels
    pub height_px: u32,
    /// Bandwidth in bits per second
    pub bitrate_bps: u64,
}

impl QualityLevel {
    /// Returns quality tier name
    pub fn label(&self) -> &'static str {
        match self.height_px {
            0..=240 => "240p",
            241..=360 => "360p",
            361..=480 => "480p",
            481..=720 => "720p",
            721..=1080 => "1080p",
            1081..=1440 => "1440p",
            _ => "4K",
        }
    }
}

/// Ordered, shared, immutable list of quality levels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualityCatalog(Arc<[QualityLevel]>);

impl QualityCatalog {
    /// Empty catalog (native playback, or manifest not parsed yet)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog keeping the engine's order
    pub fn from_reported(levels: &[ReportedLevel]) -> Self {
        levels
            .iter()
            .enumerate()
            .map(|(level, reported)| QualityLevel {
                level,
                height_px: reported.height,
                bitrate_bps: reported.bitrate,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, level: usize) -> Option<&QualityLevel> {
        self.0.get(level)
    }

    pub fn contains(&self, level: usize) -> bool {
        level < self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QualityLevel> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[QualityLevel] {
        &self.0
    }

    /// Highest rendition by height, ties broken by bitrate
    pub fn highest(&self) -> Option<&QualityLevel> {
        self.0.iter().max_by_key(|q| (q.height_px, q.bitrate_bps))
    }
}

impl FromIterator<QualityLevel> for QualityCatalog {
    fn from_iter<I: IntoIterator<Item = QualityLevel>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_preserves_engine_order() {
        let catalog = QualityCatalog::from_reported(&[
            ReportedLevel::new(1080, 5_000_000),
            ReportedLevel::new(360, 800_000),
            ReportedLevel::new(720, 2_800_000),
        ]);

        let heights: Vec<u32> = catalog.iter().map(|q| q.height_px).collect();
        assert_eq!(heights, vec![1080, 360, 720]);

        let levels: Vec<usize> = catalog.iter().map(|q| q.level).collect();
        assert_eq!(levels, vec![0, 1, 2]);
    }

    #[test]
    fn test_catalog_scenario_two_levels() {
        let catalog = QualityCatalog::from_reported(&[
            ReportedLevel::new(480, 800_000),
            ReportedLevel::new(1080, 3_000_000),
        ]);

        assert_eq!(
            catalog.as_slice(),
            &[
                QualityLevel { level: 0, height_px: 480, bitrate_bps: 800_000 },
                QualityLevel { level: 1, height_px: 1080, bitrate_bps: 3_000_000 },
            ]
        );
        assert!(catalog.contains(1));
        assert!(!catalog.contains(2));
        assert_eq!(catalog.highest().map(|q| q.level), Some(1));
    }

    #[test]
    fn test_quality_labels() {
        let level = |h| QualityLevel { level: 0, height_px: h, bitrate_bps: 0 };
        assert_eq!(level(360).label(), "360p");
        assert_eq!(level(480).label(), "480p");
        assert_eq!(level(720).label(), "720p");
        assert_eq!(level(1080).label(), "1080p");
        assert_eq!(level(2160).label(), "4K");
    }

    #[test]
    fn test_catalog_serializes_as_list() {
        let catalog = QualityCatalog::from_reported(&[ReportedLevel::new(720, 2_800_000)]);
        let json = serde_json::to_string(&catalog).unwrap();
        assert_eq!(json, r#"[{"level":0,"heightPx":720,"bitrateBps":2800000}]"#);
    }
}
