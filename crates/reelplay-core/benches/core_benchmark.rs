//! Benchmark tests for reelplay-core operations
//!
//! Run with: cargo bench -p reelplay-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use url::Url;

use reelplay_core::manifest::parse_master_playlist;
use reelplay_core::state::progress_pct;
use reelplay_core::{
    format_time, BridgeEvent, Callbacks, ControlsView, EngineConfig, EngineHandle, FullscreenApi,
    ListenerId, MediaEvent, MediaEventKind, MediaSurface, PlaybackController, Platform,
    PlatformError, PlayerOptions, QualityCatalog, QualitySelection, ReportedLevel, SessionEvent,
    SessionEventKind, StreamingEngine,
};

// ============================================================================
// Helpers
// ============================================================================

/// Generate a realistic HLS master playlist string with N variants
fn generate_hls_master(variant_count: usize) -> String {
    let mut m3u8 = String::from("#EXTM3U\n#EXT-X-VERSION:3\n");
    let bandwidths = [5_000_000u64, 2_800_000, 1_400_000, 800_000];
    let resolutions = ["1920x1080", "1280x720", "854x480", "640x360"];

    for i in 0..variant_count {
        let idx = i % bandwidths.len();
        m3u8.push_str(&format!(
            "#EXT-X-STREAM-INF:BANDWIDTH={},RESOLUTION={}\n",
            bandwidths[idx], resolutions[idx]
        ));
        m3u8.push_str(&format!("{}/playlist.m3u8\n", resolutions[idx]));
    }

    m3u8
}

fn reported_levels(count: usize) -> Vec<ReportedLevel> {
    let heights = [1080u32, 720, 480, 360];
    (0..count)
        .map(|i| ReportedLevel::new(heights[i % heights.len()], 800_000 * (i as u64 + 1)))
        .collect()
}

/// Surface that reports a fixed position
struct StillSurface {
    next: u64,
}

impl MediaSurface for StillSurface {
    fn play(&mut self) -> Result<(), PlatformError> {
        Ok(())
    }
    fn pause(&mut self) {}
    fn set_muted(&mut self, _muted: bool) {}
    fn current_time(&self) -> f64 {
        42.0
    }
    fn set_current_time(&mut self, _seconds: f64) {}
    fn duration(&self) -> f64 {
        125.0
    }
    fn can_play_type(&self, _mime: &str) -> bool {
        false
    }
    fn set_source(&mut self, _url: &Url) {}
    fn clear_source(&mut self) {}
    fn add_listener(&mut self, _kind: MediaEventKind) -> ListenerId {
        self.next += 1;
        ListenerId(self.next)
    }
    fn remove_listener(&mut self, _listener: ListenerId) {}
}

struct NoFullscreen;

impl FullscreenApi for NoFullscreen {
    fn current_target(&self) -> Option<String> {
        None
    }
    fn request_enter(&mut self) -> Result<(), PlatformError> {
        Ok(())
    }
    fn request_exit(&mut self) -> Result<(), PlatformError> {
        Ok(())
    }
    fn add_change_listener(&mut self) -> ListenerId {
        ListenerId(0)
    }
    fn remove_change_listener(&mut self, _listener: ListenerId) {}
}

struct CountingEngine {
    next: u64,
}

impl StreamingEngine for CountingEngine {
    fn is_supported(&self) -> bool {
        true
    }
    fn attach(
        &mut self,
        _source: &Url,
        _surface: &mut dyn MediaSurface,
        _config: &EngineConfig,
    ) -> Result<EngineHandle, PlatformError> {
        self.next += 1;
        Ok(EngineHandle(self.next))
    }
    fn subscribe(&mut self, _handle: EngineHandle, _kind: SessionEventKind) -> ListenerId {
        self.next += 1;
        ListenerId(self.next)
    }
    fn unsubscribe(&mut self, _handle: EngineHandle, _listener: ListenerId) {}
    fn select_level(&mut self, _handle: EngineHandle, _selection: QualitySelection) {}
    fn release(&mut self, _handle: EngineHandle, _surface: &mut dyn MediaSurface) {}
}

fn mounted_player() -> PlaybackController {
    let platform = Platform::new(StillSurface { next: 0 }, NoFullscreen)
        .with_engine(CountingEngine { next: 1_000 });
    PlaybackController::mount(PlayerOptions::new("bench"), platform, Callbacks::new()).unwrap()
}

fn parse_manifest(player: &mut PlaybackController, levels: usize) {
    let handle = player.session().and_then(|s| s.engine_handle()).unwrap();
    player.dispatch(BridgeEvent::Session {
        handle,
        event: SessionEvent::ManifestParsed {
            levels: reported_levels(levels),
        },
    });
}

// ============================================================================
// Formatting Benchmarks
// ============================================================================

fn bench_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("Formatting");

    group.bench_function("format_time", |b| {
        b.iter(|| format_time(black_box(3_725.4)))
    });

    group.bench_function("format_time_nan", |b| {
        b.iter(|| format_time(black_box(f64::NAN)))
    });

    group.bench_function("progress_pct", |b| {
        b.iter(|| progress_pct(black_box(42.0), black_box(125.0)))
    });

    group.bench_function("progress_pct_zero_duration", |b| {
        b.iter(|| progress_pct(black_box(42.0), black_box(0.0)))
    });

    group.finish();
}

// ============================================================================
// Catalog Benchmarks
// ============================================================================

fn bench_catalog(c: &mut Criterion) {
    let mut group = c.benchmark_group("Quality Catalog");

    for &count in &[2, 4, 8, 16] {
        let levels = reported_levels(count);
        group.bench_with_input(
            BenchmarkId::new("from_reported", format!("{}_levels", count)),
            &levels,
            |b, levels| b.iter(|| QualityCatalog::from_reported(black_box(levels))),
        );
    }

    group.finish();
}

// ============================================================================
// HLS Master Parsing Benchmarks
// ============================================================================

fn bench_hls_master_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("HLS Master Parsing");

    for &variant_count in &[4, 8, 16] {
        let manifest = generate_hls_master(variant_count);

        group.bench_with_input(
            BenchmarkId::new("parse_master", format!("{}_variants", variant_count)),
            &manifest,
            |b, manifest| {
                b.iter(|| black_box(parse_master_playlist(black_box(manifest.as_bytes())).unwrap()))
            },
        );
    }

    group.finish();
}

// ============================================================================
// Controller Benchmarks
// ============================================================================

fn bench_controller(c: &mut Criterion) {
    let mut group = c.benchmark_group("Controller");

    let mut player = mounted_player();
    parse_manifest(&mut player, 4);

    group.bench_function("dispatch_time_update", |b| {
        b.iter(|| player.dispatch(black_box(MediaEvent::TimeUpdate)))
    });

    group.bench_function("view", |b| b.iter(|| black_box(player.view())));

    group.bench_function("controls_view_from_state", |b| {
        let state = player.state();
        b.iter(|| ControlsView::from_state(black_box(&state)))
    });

    group.bench_function("load_and_parse", |b| {
        let mut n = 0u64;
        b.iter(|| {
            n += 1;
            player.load(&format!("video{}", n)).unwrap();
            parse_manifest(&mut player, 4);
        })
    });

    group.finish();
}

criterion_group!(format_benches, bench_formatting);

criterion_group!(catalog_benches, bench_catalog, bench_hls_master_parsing);

criterion_group!(controller_benches, bench_controller);

criterion_main!(format_benches, catalog_benches, controller_benches);
