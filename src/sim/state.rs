//! Game session state and the events the host consumes
//!
//! All mutable simulation state of one session lives in `GameState`. A new
//! session is always a fresh `GameState`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::{Difficulty, Tier};
use super::entity::{Entity, EntityKind, EntityTag, Layer};
use super::geometry::Rect;
use super::player::PlayerController;
use super::pool::{EntityId, EntityPool};
use super::powerup::{PowerUpTimer, PowerUpTransition};
use super::spawn::Spawner;
use crate::consts::*;

/// Host window size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT)
    }
}

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Player died, session is over
    GameOver,
}

/// Named sound cues; the host maps them to actual audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    LaserFire,
    LaserImpact,
    EnemyDestroyed,
    MeteorDestroyed,
    PlayerDamaged,
    PlayerHealed,
    LevelUp,
    PowerUp,
    PowerDown,
}

/// Number of background tracks the host can choose from
pub const MUSIC_TRACKS: u8 = 3;

/// Side effects produced by a tick, executed by the host
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Show a new entity
    Spawned {
        id: EntityId,
        tag: EntityTag,
        layer: Layer,
        rect: Rect,
    },
    /// Hide an entity; `fade` asks for a fade-out instead of a hard removal
    Despawned { id: EntityId, fade: bool },
    Sound(SoundCue),
    /// Start the looping background track
    StartMusic { track: u8 },
    StopMusic,
    PlayerDamaged { health: i32 },
    PlayerHealed { health: i32 },
    /// The player's "damaged" flash wore off
    PlayerRecovered,
    TierAdvanced(Tier),
    PowerUp,
    PowerDown,
    /// Terminal: the host should offer retry or exit
    GameOver { score: f64 },
}

/// Running counters for one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub frames: u64,
    pub enemies_destroyed: u32,
    pub meteors_destroyed: u32,
    pub lasers_fired: u32,
    pub hits_taken: u32,
    pub health_collected: u32,
    pub power_ups_collected: u32,
}

/// End-of-session report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub seed: u64,
    pub score: f64,
    pub tier: Tier,
    pub stats: SessionStats,
}

/// Values the host shows in its heads-up display
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub score: f64,
    /// Health expressed in whole health slots
    pub hearts: u32,
    pub tier: Tier,
    pub objects: usize,
    pub powered_up: bool,
    pub fps: u32,
}

impl Hud {
    pub fn score_text(&self) -> String {
        format!("Score: {}", self.score)
    }

    pub fn health_text(&self) -> String {
        "❤️".repeat(self.hearts as usize)
    }

    pub fn fps_text(&self) -> String {
        format!("FPS: {}", self.fps)
    }

    pub fn tier_text(&self) -> String {
        format!("Level: {}", self.tier.as_str())
    }

    pub fn objects_text(&self) -> String {
        format!("Objects: {}", self.objects)
    }
}

/// How to set up a new session
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub seed: u64,
    pub viewport: Viewport,
    /// Spawn the decorative star layer
    pub starfield: bool,
}

impl SessionConfig {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            viewport: Viewport::default(),
            starfield: true,
        }
    }
}

/// Complete state of one game session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub viewport: Viewport,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub score: f64,
    pub player: Entity,
    pub controller: PlayerController,
    /// Every active non-player entity
    pub pool: EntityPool,
    pub spawner: Spawner,
    pub difficulty: Difficulty,
    pub power_up: PowerUpTimer,
    /// Tick on which the power-up window was last (re)started
    power_up_started_at: Option<u64>,
    /// Frames left on the player's "damaged" flash
    pub damage_recovery: u32,
    pub starfield: bool,
    pub stats: SessionStats,
}

impl GameState {
    /// Create a new session with the player centered at the bottom
    pub fn new(config: SessionConfig) -> Self {
        let mut player = Entity::player();
        player.pos = Vec2::new((config.viewport.width - player.size.x) / 2.0, 0.0);
        let mut controller = PlayerController::new(player.pos.x);
        controller.anchor(&mut player, config.viewport);

        log::info!(
            "New session: seed={}, viewport={}x{}",
            config.seed,
            config.viewport.width,
            config.viewport.height
        );

        Self {
            seed: config.seed,
            rng: Pcg32::seed_from_u64(config.seed),
            viewport: config.viewport,
            phase: GamePhase::Playing,
            time_ticks: 0,
            score: 0.0,
            player,
            controller,
            pool: EntityPool::new(),
            spawner: Spawner::new(),
            difficulty: Difficulty::new(),
            power_up: PowerUpTimer::default(),
            power_up_started_at: None,
            damage_recovery: 0,
            starfield: config.starfield,
            stats: SessionStats::default(),
        }
    }

    pub fn tier(&self) -> Tier {
        self.difficulty.tier()
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.pool.get(id)
    }

    /// Current rectangle of an active entity
    pub fn rect_of(&self, id: EntityId) -> Option<Rect> {
        self.pool.get(id).map(Entity::rect)
    }

    /// Active non-player entities, in stable order
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.pool.iter()
    }

    /// Apply a new viewport size
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.controller.anchor(&mut self.player, viewport);
    }

    pub fn hud(&self) -> Hud {
        Hud {
            score: self.score,
            hearts: (self.player.health.max(0) / self.player.health_slot.max(1)) as u32,
            tier: self.tier(),
            objects: self.pool.len() + 1,
            powered_up: self.power_up.is_active(),
            fps: 0,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            seed: self.seed,
            score: self.score,
            tier: self.tier(),
            stats: self.stats.clone(),
        }
    }

    /// Start (or refresh) the power-up window
    pub fn apply_power_up(&mut self, events: &mut Vec<GameEvent>) {
        self.power_up_started_at = Some(self.time_ticks);
        match self.power_up.trigger() {
            PowerUpTransition::Activated => {
                log::info!("Power-up activated at tick {}", self.time_ticks);
                self.player.speed += POWER_UP_SPEED_BOOST;
                self.player.kind = EntityKind::Player { powered_up: true };
                events.push(GameEvent::PowerUp);
                events.push(GameEvent::Sound(SoundCue::PowerUp));
            }
            PowerUpTransition::Refreshed => {
                log::debug!("Power-up refreshed at tick {}", self.time_ticks);
            }
            PowerUpTransition::Expired => {}
        }
    }

    /// Count the power-up window down, reverting the boost when it ends.
    /// The frame that started the window counts as its first frame.
    pub fn tick_power_up(&mut self, events: &mut Vec<GameEvent>) {
        if self.power_up_started_at == Some(self.time_ticks) {
            return;
        }
        if self.power_up.tick() == Some(PowerUpTransition::Expired) {
            log::info!("Power-up expired at tick {}", self.time_ticks);
            self.player.speed -= POWER_UP_SPEED_BOOST;
            self.player.kind = EntityKind::Player { powered_up: false };
            events.push(GameEvent::PowerDown);
            events.push(GameEvent::Sound(SoundCue::PowerDown));
        }
    }

    /// Show the "damaged" flash
    pub fn flash_damage(&mut self) {
        self.player.opacity = PLAYER_DAMAGED_OPACITY;
        self.damage_recovery = DAMAGE_RECOVERY_FRAMES;
    }

    /// Count the "damaged" flash down, restoring opacity when it ends
    pub fn tick_damage_recovery(&mut self, events: &mut Vec<GameEvent>) {
        if self.damage_recovery == 0 {
            return;
        }
        self.damage_recovery -= 1;
        if self.damage_recovery == 0 {
            self.player.opacity = 1.0;
            events.push(GameEvent::PlayerRecovered);
        }
    }
}
