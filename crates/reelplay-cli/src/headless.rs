//! In-memory platform for driving the controller without a browser
//!
//! Surface, document and engine share one [`Device`]. Calls made by the
//! controller queue the events a real platform would raise; [`Headless::drain`]
//! feeds them back through the bridge in order.

use reelplay_core::{
    BridgeEvent, EngineConfig, EngineHandle, FullscreenApi, ListenerId, MediaEvent, MediaEventKind,
    MediaSurface, PlaybackController, Platform, PlatformError, QualitySelection, ReportedLevel,
    SessionEvent, SessionEventKind, StreamingEngine,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::debug;
use url::Url;

#[derive(Debug, Default)]
struct Device {
    muted: bool,
    paused: bool,
    current_time: f64,
    duration: f64,
    source: Option<Url>,
    fullscreen: Option<String>,
    attached: Option<EngineHandle>,
    level: QualitySelection,
    next_id: u64,
    pending: VecDeque<BridgeEvent>,
}

impl Device {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Handle on the simulated device, kept by the driver after mounting
#[derive(Clone)]
pub struct Headless {
    device: Rc<RefCell<Device>>,
}

impl Headless {
    /// A device whose media reports `duration` seconds once loaded
    pub fn new(duration: f64) -> Self {
        Self {
            device: Rc::new(RefCell::new(Device {
                paused: true,
                duration,
                ..Default::default()
            })),
        }
    }

    /// Platform with the headless engine serving `levels`
    pub fn platform(&self, levels: Vec<ReportedLevel>) -> Platform {
        Platform::new(
            HeadlessSurface(self.device.clone()),
            HeadlessFullscreen(self.device.clone()),
        )
        .with_engine(HeadlessEngine {
            device: self.device.clone(),
            levels,
        })
    }

    /// Dispatch queued events until the device is quiet
    pub fn drain(&self, player: &mut PlaybackController) -> usize {
        let mut count = 0;
        loop {
            let next = self.device.borrow_mut().pending.pop_front();
            let Some(event) = next else {
                return count;
            };
            debug!(?event, "Headless event");
            player.dispatch(event);
            count += 1;
        }
    }

    /// Advance the playhead by `seconds` if playing
    pub fn tick(&self, player: &mut PlaybackController, seconds: f64) {
        {
            let mut device = self.device.borrow_mut();
            if !device.paused && device.source.is_some() {
                let end = device.duration.max(0.0);
                device.current_time = (device.current_time + seconds).min(end);
                device.pending.push_back(MediaEvent::TimeUpdate.into());
                if device.current_time >= end {
                    device.paused = true;
                    device.pending.push_back(MediaEvent::Ended.into());
                }
            }
        }
        self.drain(player);
    }

    pub fn selected_level(&self) -> QualitySelection {
        self.device.borrow().level
    }

    pub fn is_paused(&self) -> bool {
        self.device.borrow().paused
    }

    pub fn is_muted(&self) -> bool {
        self.device.borrow().muted
    }
}

struct HeadlessSurface(Rc<RefCell<Device>>);

impl MediaSurface for HeadlessSurface {
    fn play(&mut self) -> Result<(), PlatformError> {
        let mut device = self.0.borrow_mut();
        if device.source.is_none() {
            return Err(PlatformError::new("NotSupportedError: no source"));
        }
        if device.paused {
            device.paused = false;
            device.pending.push_back(MediaEvent::Play.into());
        }
        Ok(())
    }

    fn pause(&mut self) {
        let mut device = self.0.borrow_mut();
        if !device.paused {
            device.paused = true;
            device.pending.push_back(MediaEvent::Pause.into());
        }
    }

    fn set_muted(&mut self, muted: bool) {
        self.0.borrow_mut().muted = muted;
    }

    fn current_time(&self) -> f64 {
        self.0.borrow().current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut device = self.0.borrow_mut();
        device.current_time = seconds;
        device.pending.push_back(MediaEvent::TimeUpdate.into());
    }

    fn duration(&self) -> f64 {
        let device = self.0.borrow();
        if device.source.is_some() {
            device.duration
        } else {
            f64::NAN
        }
    }

    fn can_play_type(&self, _mime: &str) -> bool {
        false
    }

    fn set_source(&mut self, url: &Url) {
        let mut device = self.0.borrow_mut();
        device.source = Some(url.clone());
        device.current_time = 0.0;
        device.pending.push_back(MediaEvent::MetadataLoaded.into());
    }

    fn clear_source(&mut self) {
        let mut device = self.0.borrow_mut();
        device.source = None;
        device.paused = true;
    }

    fn add_listener(&mut self, _kind: MediaEventKind) -> ListenerId {
        ListenerId(self.0.borrow_mut().next_id())
    }

    fn remove_listener(&mut self, _listener: ListenerId) {}
}

struct HeadlessFullscreen(Rc<RefCell<Device>>);

impl FullscreenApi for HeadlessFullscreen {
    fn current_target(&self) -> Option<String> {
        self.0.borrow().fullscreen.clone()
    }

    fn request_enter(&mut self) -> Result<(), PlatformError> {
        let mut device = self.0.borrow_mut();
        device.fullscreen = Some("player".to_string());
        device.pending.push_back(MediaEvent::FullscreenChange.into());
        Ok(())
    }

    fn request_exit(&mut self) -> Result<(), PlatformError> {
        let mut device = self.0.borrow_mut();
        device.fullscreen = None;
        device.pending.push_back(MediaEvent::FullscreenChange.into());
        Ok(())
    }

    fn add_change_listener(&mut self) -> ListenerId {
        ListenerId(self.0.borrow_mut().next_id())
    }

    fn remove_change_listener(&mut self, _listener: ListenerId) {}
}

/// Engine that "parses" a playlist read ahead of time
struct HeadlessEngine {
    device: Rc<RefCell<Device>>,
    levels: Vec<ReportedLevel>,
}

impl StreamingEngine for HeadlessEngine {
    fn is_supported(&self) -> bool {
        true
    }

    fn attach(
        &mut self,
        source: &Url,
        surface: &mut dyn MediaSurface,
        config: &EngineConfig,
    ) -> Result<EngineHandle, PlatformError> {
        if self.levels.is_empty() {
            return Err(PlatformError::new("master playlist has no variants"));
        }
        surface.set_source(source);

        let mut device = self.device.borrow_mut();
        let handle = EngineHandle(device.next_id());
        device.attached = Some(handle);
        device.level = config.start_level;
        device.pending.push_back(BridgeEvent::Session {
            handle,
            event: SessionEvent::ManifestParsed {
                levels: self.levels.clone(),
            },
        });
        Ok(handle)
    }

    fn subscribe(&mut self, _handle: EngineHandle, _kind: SessionEventKind) -> ListenerId {
        ListenerId(self.device.borrow_mut().next_id())
    }

    fn unsubscribe(&mut self, _handle: EngineHandle, _listener: ListenerId) {}

    fn select_level(&mut self, handle: EngineHandle, selection: QualitySelection) {
        let mut device = self.device.borrow_mut();
        if device.attached == Some(handle) {
            device.level = selection;
        }
    }

    fn release(&mut self, handle: EngineHandle, surface: &mut dyn MediaSurface) {
        surface.clear_source();
        let mut device = self.device.borrow_mut();
        if device.attached == Some(handle) {
            device.attached = None;
        }
    }
}
