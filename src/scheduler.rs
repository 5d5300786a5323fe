//! Frame scheduler
//!
//! Drives one session at a fixed cadence: poll host input, run one
//! simulation tick, hand the resulting events to the host, then wait out the
//! rest of the frame budget. Frames never overlap and are never skipped; an
//! overrunning frame just shortens the following wait to the minimum delay.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::consts::{FPS_WINDOW_MS, MIN_FRAME_WAIT_MS};
use crate::settings::Settings;
use crate::sim::{
    GameEvent, GameState, Hud, SessionConfig, SessionSummary, TickInput, Viewport, tick,
};

/// Shared run/stop switch for the frame loop
///
/// Cloning yields another handle to the same switch, so a host (or another
/// thread) can stop a running scheduler.
#[derive(Debug, Clone)]
pub struct LoopControl {
    running: Arc<AtomicBool>,
}

impl Default for LoopControl {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopControl {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Halt the loop before its next tick
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Frames-per-second sampler over a fixed wall-clock window
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    fps: u32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
            fps: 0,
        }
    }

    /// Count a finished frame; returns the latest full-window sample
    pub fn record(&mut self, now: Instant) -> u32 {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= Duration::from_millis(FPS_WINDOW_MS) {
            self.fps = (self.frames as f32 / elapsed.as_secs_f32()).round() as u32;
            self.frames = 0;
            self.window_start = now;
        }
        self.fps
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

/// Delay before the next frame: whatever is left of the budget, at least 1 ms
pub fn frame_wait(interval: Duration, elapsed: Duration) -> Duration {
    interval
        .saturating_sub(elapsed)
        .max(Duration::from_millis(MIN_FRAME_WAIT_MS))
}

/// What the host wants after a game over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionDecision {
    /// Start a fresh session
    Retry,
    Exit,
}

/// The environment the core runs in: rendering, audio and input live here
pub trait Host {
    /// Current window size
    fn viewport(&self) -> Viewport;

    /// Input state for the coming frame
    fn poll_input(&mut self) -> TickInput;

    /// Execute the effects of one tick
    fn apply(&mut self, events: &[GameEvent], state: &GameState);

    /// Refresh the heads-up display
    fn hud(&mut self, _hud: &Hud) {}

    /// The session ended; decide what happens next
    fn game_over(&mut self, summary: &SessionSummary) -> SessionDecision;
}

/// Fixed-cadence loop driving sessions against a host
pub struct FrameScheduler {
    frame_interval: Duration,
    control: LoopControl,
    fps: FpsCounter,
    throttled: bool,
}

impl FrameScheduler {
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            frame_interval,
            control: LoopControl::new(),
            fps: FpsCounter::new(Instant::now()),
            throttled: true,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.frame_interval())
    }

    /// Skip the inter-frame wait entirely (soak runs, tests)
    pub fn unthrottled(mut self) -> Self {
        self.throttled = false;
        self
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Handle for stopping the loop
    pub fn control(&self) -> LoopControl {
        self.control.clone()
    }

    /// Run sessions until the host exits or the loop is stopped.
    /// Returns the summaries of every finished session.
    pub fn run<H: Host>(&mut self, host: &mut H, config: SessionConfig) -> Vec<SessionSummary> {
        self.run_with(host, config, GameState::new)
    }

    /// Like `run`, with a custom session constructor
    pub fn run_with<H, F>(
        &mut self,
        host: &mut H,
        mut config: SessionConfig,
        mut new_session: F,
    ) -> Vec<SessionSummary>
    where
        H: Host,
        F: FnMut(SessionConfig) -> GameState,
    {
        let mut summaries = Vec::new();

        while self.control.is_running() {
            config.viewport = host.viewport();
            let Some(summary) = self.play(host, new_session(config)) else {
                break;
            };

            let decision = host.game_over(&summary);
            log::info!("Session {} ended with {:?}", summary.seed, decision);
            summaries.push(summary);

            match decision {
                SessionDecision::Retry => config.seed = config.seed.wrapping_add(1),
                SessionDecision::Exit => break,
            }
        }

        summaries
    }

    /// Drive one session to its end. Returns `None` when the loop was
    /// stopped before the session finished.
    pub fn play<H: Host>(&mut self, host: &mut H, mut state: GameState) -> Option<SessionSummary> {
        self.fps = FpsCounter::new(Instant::now());

        loop {
            if !self.control.is_running() {
                log::info!("Frame loop stopped at tick {}", state.time_ticks);
                return None;
            }

            let frame_start = Instant::now();
            let input = host.poll_input();
            let events = tick(&mut state, &input);

            // Stopped mid-frame: the host may already be torn down
            if !self.control.is_running() {
                log::info!("Frame loop stopped at tick {}", state.time_ticks);
                return None;
            }

            host.apply(&events, &state);
            let mut hud = state.hud();
            hud.fps = self.fps.record(Instant::now());
            host.hud(&hud);

            if state.is_over() {
                return Some(state.summary());
            }

            if self.throttled {
                let elapsed = frame_start.elapsed();
                if elapsed > self.frame_interval {
                    log::debug!(
                        "Frame {} overran its budget: {:?} > {:?}",
                        state.time_ticks,
                        elapsed,
                        self.frame_interval
                    );
                }
                thread::sleep(frame_wait(self.frame_interval, elapsed));
            }
        }
    }
}
