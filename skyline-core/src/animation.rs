/// Frame-throttled render loop that orbits the camera between frames
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::camera::Camera;
use crate::paint::{paint_frame, FrameStats, Layer, Surface};
use crate::projection::{ProjectionSettings, ProjectionTransform};

/// Default minimum time between accepted frames, in milliseconds.
pub const DEFAULT_FRAME_INTERVAL_MS: f64 = 1000.0 / 60.0;

/// Default orbit advance per accepted frame, in degrees.
pub const DEFAULT_ORBIT_STEP_DEGREES: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSettings {
    pub frame_interval_ms: f64,
    /// Radians the camera orbits around its target after each frame.
    pub orbit_step: f64,
    pub projection: ProjectionSettings,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            orbit_step: DEFAULT_ORBIT_STEP_DEGREES.to_radians(),
            projection: ProjectionSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Too soon after the previous frame, or the loop is idle.
    Skipped,
    Rendered(FrameStats),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub outcome: TickOutcome,
    /// Whether the host should request another tick.
    pub reschedule: bool,
}

/// Handle that asks a [`RenderLoop`] to stop while it is borrowed, for
/// example from inside the frame being drawn.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    fn take(&self) -> bool {
        self.0.swap(false, Ordering::Relaxed)
    }
}

/// Owns the current camera snapshot and decides which host ticks draw.
///
/// The host calls [`tick`](Self::tick) from its per-frame callback with a
/// monotonically increasing timestamp and requests the next callback only
/// when [`Tick::reschedule`] is set.
#[derive(Debug, Clone)]
pub struct RenderLoop {
    state: LoopState,
    camera: Camera,
    settings: LoopSettings,
    last_frame_ms: Option<f64>,
    frames: u64,
    stop_signal: StopSignal,
}

impl RenderLoop {
    pub fn new(camera: Camera, settings: LoopSettings) -> Self {
        Self {
            state: LoopState::Idle,
            camera,
            settings,
            last_frame_ms: None,
            frames: 0,
            stop_signal: StopSignal::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn settings(&self) -> &LoopSettings {
        &self.settings
    }

    /// Number of frames drawn by [`tick`](Self::tick).
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Idle → Running. Returns `true` when the host must request a tick;
    /// starting an already running loop requests nothing, its tick is
    /// already in flight.
    pub fn start(&mut self) -> bool {
        // a request left over from the previous run does not carry over
        self.stop_signal.take();
        if self.is_running() {
            return false;
        }
        log::debug!("render loop started");
        self.state = LoopState::Running;
        true
    }

    /// Running → Idle. A frame in progress still completes; the next one is
    /// simply not scheduled.
    pub fn stop(&mut self) {
        if self.is_running() {
            log::debug!("render loop stopped after {} frames", self.frames);
        }
        self.state = LoopState::Idle;
    }

    /// Signal that stops the loop at its next check, the end of the frame
    /// in progress included.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop_signal.clone()
    }

    fn apply_stop_request(&mut self) {
        if self.stop_signal.take() {
            self.stop();
        }
    }

    /// Replace the current camera; the next accepted frame uses it.
    pub fn submit_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn transform(&self) -> ProjectionTransform {
        ProjectionTransform::with_settings(&self.camera, self.settings.projection)
    }

    /// Handle one scheduler callback at `now_ms`.
    pub fn tick(&mut self, now_ms: f64, surface: &mut dyn Surface, layers: &[Layer]) -> Tick {
        self.apply_stop_request();
        if !self.is_running() {
            return Tick {
                outcome: TickOutcome::Skipped,
                reschedule: false,
            };
        }

        let due = match self.last_frame_ms {
            Some(last) => now_ms - last >= self.settings.frame_interval_ms,
            None => true,
        };
        if !due {
            return Tick {
                outcome: TickOutcome::Skipped,
                reschedule: true,
            };
        }

        self.last_frame_ms = Some(now_ms);
        let stats = self.redraw(surface, layers);
        self.frames += 1;
        self.camera = self.camera.orbit(self.settings.orbit_step);
        self.apply_stop_request();

        Tick {
            outcome: TickOutcome::Rendered(stats),
            reschedule: self.is_running(),
        }
    }

    /// Draw the current camera without advancing it.
    pub fn redraw(&self, surface: &mut dyn Surface, layers: &[Layer]) -> FrameStats {
        paint_frame(surface, &self.transform(), layers)
    }
}
