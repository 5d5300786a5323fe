//! Astro Odyssey - a vertically-scrolling arcade space shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, collisions, difficulty, power-ups)
//! - `scheduler`: Fixed-cadence frame loop driving the simulation against a host
//! - `settings`: Data-driven configuration loaded from JSON
//!
//! Rendering, audio playback and input capture belong to the host. The core
//! only tells the host what to show, hide and play through `sim::GameEvent`s.

pub mod scheduler;
pub mod settings;
pub mod sim;

pub use scheduler::{FrameScheduler, Host, LoopControl, SessionDecision};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Frame budget in milliseconds (~60 fps)
    pub const FRAME_CAP_MS: f32 = 1000.0 / 60.0;
    /// Minimum delay between frames, even when a frame overruns its budget
    pub const MIN_FRAME_WAIT_MS: u64 = 1;
    /// FPS sampling window
    pub const FPS_WINDOW_MS: u64 = 1000;

    /// Headless viewport defaults
    pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1280.0;
    pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 720.0;

    /// Player ship
    pub const PLAYER_WIDTH: f32 = 100.0;
    pub const PLAYER_HEIGHT: f32 = 150.0;
    pub const PLAYER_HEALTH: i32 = 100;
    pub const PLAYER_HEALTH_SLOT: i32 = 10;
    pub const PLAYER_SPEED: f32 = 15.0;
    /// Gap between the ship and the bottom edge
    pub const PLAYER_BOTTOM_MARGIN: f32 = 20.0;
    /// Opacity while the "damaged" flash is showing
    pub const PLAYER_DAMAGED_OPACITY: f32 = 0.4;
    /// Frames until the damaged flash wears off
    pub const DAMAGE_RECOVERY_FRAMES: u32 = 50;

    /// Hostile ships and meteors share the same footprint
    pub const OBSTACLE_SIZE: f32 = 100.0;
    pub const ENEMY_SPEED_JITTER: f32 = 2.0;
    pub const METEOR_SPEED_JITTER: f32 = 1.5;
    /// Recoil applied on laser hit, as a multiple of the obstacle's speed
    pub const ENEMY_RECOIL: f32 = 1.5;
    pub const METEOR_RECOIL: f32 = 2.0;
    /// Enemy spawns (above the lowest tier) before horizontal drift unlocks
    pub const ENEMY_DRIFT_UNLOCK_SPAWNS: u32 = 10;
    /// Horizontal drift speed as a fraction of vertical speed
    pub const ENEMY_DRIFT_FACTOR: f32 = 0.5;

    /// Score per kill
    pub const ENEMY_KILL_SCORE: f64 = 1.0;
    pub const METEOR_KILL_SCORE: f64 = 0.5;

    /// Half-width of the horizontal band in which a target must sit to fire
    pub const LASER_TARGET_BAND: f32 = 250.0;

    /// Pickups
    pub const PICKUP_SIZE: f32 = 100.0;
    pub const HEAL_MIN: i32 = 5;
    pub const HEAL_MAX: i32 = 10;
    pub const HEALTH_PICKUP_SPAWN_LIMIT: i32 = 1000;
    pub const POWER_UP_PICKUP_SPAWN_LIMIT: i32 = 1500;
    /// Power-up window length in frames
    pub const POWER_UP_DURATION_FRAMES: u32 = 1000;
    /// Extra player speed while powered up
    pub const POWER_UP_SPEED_BOOST: f32 = 5.0;

    /// Background stars
    pub const STAR_SPAWN_LIMIT: i32 = 100;

    /// Initial countdowns before the first obstacle appears
    pub const ENEMY_INITIAL_COUNTER: i32 = 100;
    pub const METEOR_INITIAL_COUNTER: i32 = 100;

    /// Inward margin used by the rectangle intersection test
    pub const HIT_MARGIN: f32 = 5.0;
}

/// Normalize a rotation in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(degrees: f32) -> f32 {
    degrees.rem_euclid(360.0)
}

/// Clamp a left-edge x so that an object of `width` stays inside `[0, viewport_width]`
#[inline]
pub fn clamp_to_viewport(x: f32, width: f32, viewport_width: f32) -> f32 {
    x.clamp(0.0, (viewport_width - width).max(0.0))
}
