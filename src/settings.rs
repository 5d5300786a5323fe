//! Game settings and preferences
//!
//! Stored as JSON. Every field has a default, so partial files are fine.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH, FRAME_CAP_MS};
use crate::sim::{SessionConfig, Viewport};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Run seed; derived from the clock when unset
    pub seed: Option<u64>,
    /// Target frame interval in milliseconds
    pub frame_interval_ms: f32,

    // === Viewport (headless hosts) ===
    pub viewport_width: f32,
    pub viewport_height: f32,

    // === Visual Effects ===
    /// Decorative background star layer
    pub starfield: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,

    // === Accessibility ===
    /// Reduced motion (no scrolling star layer)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            frame_interval_ms: FRAME_CAP_MS,

            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,

            starfield: true,

            show_fps: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective star layer (respects reduced_motion)
    pub fn effective_starfield(&self) -> bool {
        self.starfield && !self.reduced_motion
    }

    /// Frame interval, never below one millisecond. Values that don't fit a
    /// `Duration` fall back to the default cadence.
    pub fn frame_interval(&self) -> Duration {
        Duration::try_from_secs_f32(self.frame_interval_ms.max(1.0) / 1000.0).unwrap_or_else(|err| {
            log::warn!(
                "Invalid frame interval {} ms ({err}), using {} ms",
                self.frame_interval_ms,
                FRAME_CAP_MS
            );
            Duration::from_secs_f32(FRAME_CAP_MS / 1000.0)
        })
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport_width.max(1.0), self.viewport_height.max(1.0))
    }

    /// Playback gain for sound cues, master volume included
    pub fn sfx_gain(&self) -> f32 {
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    /// Playback gain for the background track
    pub fn music_gain(&self) -> f32 {
        (self.master_volume * self.music_volume).clamp(0.0, 1.0)
    }

    /// Session setup for the given seed
    pub fn session_config(&self, seed: u64) -> SessionConfig {
        SessionConfig {
            seed,
            viewport: self.viewport(),
            starfield: self.effective_starfield(),
        }
    }

    /// Load settings strictly: any I/O or parse failure is an error
    pub fn try_load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        let settings = serde_json::from_str(&json)
            .with_context(|| format!("failed to parse settings in {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on a missing or broken file
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        match Self::try_load_from(path) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("Using default settings: {err:#}");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write settings to {}", path.display()))?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("astro_odyssey_{}_{name}.json", std::process::id()))
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.viewport(), Viewport::new(1280.0, 720.0));
        assert!(settings.effective_starfield());
        let interval = settings.frame_interval();
        assert!(interval > Duration::from_millis(16) && interval < Duration::from_millis(17));
    }

    #[test]
    fn test_oversized_frame_interval_falls_back() {
        let default_interval = Settings::default().frame_interval();
        for frame_interval_ms in [1e30, f32::INFINITY] {
            let settings = Settings {
                frame_interval_ms,
                ..Default::default()
            };
            assert_eq!(settings.frame_interval(), default_interval);
        }

        let settings: Settings = serde_json::from_str(r#"{"frame_interval_ms": 1e30}"#).unwrap();
        assert_eq!(settings.frame_interval(), default_interval);

        let settings = Settings {
            frame_interval_ms: 0.0,
            ..Default::default()
        };
        let interval = settings.frame_interval();
        assert!(interval > Duration::from_micros(999) && interval < Duration::from_micros(1001));
    }

    #[test]
    fn test_reduced_motion_disables_stars() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert!(!settings.effective_starfield());
        assert!(!settings.session_config(1).starfield);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"seed": 42, "viewport_width": 800}"#).unwrap();
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.viewport_width, 800.0);
        assert_eq!(settings.viewport_height, DEFAULT_VIEWPORT_HEIGHT);
        assert_eq!(settings.music_volume, 0.7);
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("roundtrip");
        let settings = Settings {
            seed: Some(9),
            show_fps: false,
            ..Default::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::try_load_from(&path).unwrap(), settings);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_falls_back_on_bad_file() {
        let path = temp_path("broken");
        fs::write(&path, "{ not json").unwrap();
        assert!(Settings::try_load_from(&path).is_err());
        assert_eq!(Settings::load_from(&path), Settings::default());
        let _ = fs::remove_file(&path);

        assert_eq!(Settings::load_from(temp_path("missing")), Settings::default());
    }

    #[test]
    fn test_gains_are_clamped() {
        let settings = Settings {
            master_volume: 2.0,
            music_volume: 1.0,
            ..Default::default()
        };
        assert_eq!(settings.music_gain(), 1.0);
        assert_eq!(settings.sfx_gain(), 1.0);
    }
}
