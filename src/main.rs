//! Astro Odyssey headless runner
//!
//! Drives the simulation with a console host: an autopilot steers the ship
//! toward the lowest incoming obstacle, effects are logged instead of drawn
//! or played, and session summaries are printed as JSON.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;

use astro_odyssey::sim::{
    EntityTag, GameEvent, GameState, Hud, SessionSummary, TickInput, Viewport,
};
use astro_odyssey::{FrameScheduler, Host, LoopControl, SessionDecision, Settings};

#[derive(Parser, Debug)]
#[command(name = "astro-odyssey")]
#[command(about = "Headless runner for the Astro Odyssey simulation core")]
struct Cli {
    /// Settings file (JSON); missing or broken files fall back to defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// RNG seed (overrides the settings file)
    #[arg(long)]
    seed: Option<u64>,
    /// Stop after this many frames in total
    #[arg(long)]
    frames: Option<u64>,
    /// Viewport width
    #[arg(long)]
    width: Option<f32>,
    /// Viewport height
    #[arg(long)]
    height: Option<f32>,
    /// How many times to answer "retry" at game over
    #[arg(long, default_value_t = 0)]
    retries: u32,
    /// Run frames back to back without waiting
    #[arg(long, default_value_t = false)]
    unthrottled: bool,
    /// Print the effective settings as JSON and exit
    #[arg(long, default_value_t = false)]
    dump_settings: bool,
}

/// Logs effects and steers with a simple autopilot
struct ConsoleHost {
    viewport: Viewport,
    control: LoopControl,
    frame_limit: Option<u64>,
    frames: u64,
    retries_left: u32,
    pointer_x: Option<f32>,
    show_fps: bool,
    sfx_gain: f32,
    music_gain: f32,
    /// State of a session cut short by the frame limit
    unfinished: Option<SessionSummary>,
}

impl ConsoleHost {
    fn new(settings: &Settings, control: LoopControl, frame_limit: Option<u64>, retries: u32) -> Self {
        Self {
            viewport: settings.viewport(),
            control,
            frame_limit,
            frames: 0,
            retries_left: retries,
            pointer_x: None,
            show_fps: settings.show_fps,
            sfx_gain: settings.sfx_gain(),
            music_gain: settings.music_gain(),
            unfinished: None,
        }
    }

    /// Center x of the obstacle closest to the ship
    fn pick_target(state: &GameState) -> Option<f32> {
        state
            .entities()
            .filter(|(_, e)| e.tag().is_obstacle())
            .max_by(|(_, a), (_, b)| a.pos.y.total_cmp(&b.pos.y))
            .map(|(_, e)| e.rect().center_x())
    }
}

impl Host for ConsoleHost {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn poll_input(&mut self) -> TickInput {
        TickInput {
            pointer_x: self.pointer_x,
            ..Default::default()
        }
    }

    fn apply(&mut self, events: &[GameEvent], state: &GameState) {
        for event in events {
            match event {
                GameEvent::Spawned { id, tag, rect, .. } => {
                    if *tag != EntityTag::Star {
                        log::trace!("+ {:?} #{} at ({:.0}, {:.0})", tag, id.index(), rect.x, rect.y);
                    }
                }
                GameEvent::Despawned { .. } => {}
                GameEvent::Sound(cue) => log::trace!("sound {:?} @ {:.2}", cue, self.sfx_gain),
                GameEvent::StartMusic { track } => {
                    log::info!("Music: track {} @ {:.2}", track, self.music_gain)
                }
                GameEvent::StopMusic => log::info!("Music stopped"),
                GameEvent::PlayerDamaged { health } => log::debug!("Hit! health={health}"),
                GameEvent::PlayerHealed { health } => log::debug!("Healed, health={health}"),
                GameEvent::PlayerRecovered => {}
                GameEvent::TierAdvanced(tier) => log::info!("Level: {}", tier.as_str()),
                GameEvent::PowerUp => log::info!("Power up!"),
                GameEvent::PowerDown => log::info!("Power down"),
                GameEvent::GameOver { score } => log::info!("Game over, score {score}"),
            }
        }

        self.pointer_x = Self::pick_target(state);
        self.frames += 1;
        if self.frame_limit.is_some_and(|limit| self.frames >= limit) && !state.is_over() {
            log::info!("Frame limit reached");
            self.unfinished = Some(state.summary());
            self.control.stop();
        }
    }

    fn hud(&mut self, hud: &Hud) {
        if hud.fps > 0 && self.frames % 60 == 0 {
            let fps = if self.show_fps { hud.fps_text() } else { String::new() };
            log::debug!(
                "{} | {} | {} | {} {}",
                hud.score_text(),
                hud.health_text(),
                hud.tier_text(),
                hud.objects_text(),
                fps
            );
        }
    }

    fn game_over(&mut self, summary: &SessionSummary) -> SessionDecision {
        log::info!(
            "Session {} over after {} frames",
            summary.seed,
            summary.stats.frames
        );
        if self.retries_left > 0 {
            self.retries_left -= 1;
            SessionDecision::Retry
        } else {
            SessionDecision::Exit
        }
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::default(),
    };
    if cli.seed.is_some() {
        settings.seed = cli.seed;
    }
    if let Some(width) = cli.width {
        settings.viewport_width = width;
    }
    if let Some(height) = cli.height {
        settings.viewport_height = height;
    }

    if cli.dump_settings {
        let json = serde_json::to_string_pretty(&settings).context("failed to encode settings")?;
        println!("{json}");
        return Ok(());
    }

    let seed = settings.seed.unwrap_or_else(clock_seed);
    let mut scheduler = FrameScheduler::from_settings(&settings);
    if cli.unthrottled {
        scheduler = scheduler.unthrottled();
    }
    let mut host = ConsoleHost::new(&settings, scheduler.control(), cli.frames, cli.retries);

    log::info!(
        "Starting: seed={seed}, viewport={}x{}, interval={:?}",
        settings.viewport_width,
        settings.viewport_height,
        scheduler.frame_interval()
    );
    let summaries = scheduler.run(&mut host, settings.session_config(seed));

    for summary in summaries.iter().chain(host.unfinished.iter()) {
        let json = serde_json::to_string_pretty(summary).context("failed to encode summary")?;
        println!("{json}");
    }

    Ok(())
}
