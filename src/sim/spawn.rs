//! Countdown-driven spawning
//!
//! Each spawnable kind owns a `SpawnTimer`. Every frame the counter drops by
//! one; once it goes negative an entity is spawned (recycled from the pool
//! when possible) and the counter resets to the kind's spawn limit.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::{Tier, TierParams};
use super::entity::{
    EnemyVariant, EntityKind, EntityTag, MeteorVariant, StarVariant, XDirection, YDirection,
};
use super::pool::EntityId;
use super::state::{GameEvent, GameState, SoundCue};
use crate::consts::*;

/// Per-kind spawn countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnTimer {
    counter: i32,
    limit: i32,
}

impl SpawnTimer {
    pub fn new(initial: i32, limit: i32) -> Self {
        Self {
            counter: initial,
            limit,
        }
    }

    pub fn counter(&self) -> i32 {
        self.counter
    }

    pub fn limit(&self) -> i32 {
        self.limit
    }

    pub fn set_limit(&mut self, limit: i32) {
        self.limit = limit;
    }

    /// Count down one frame; true when a spawn is due
    pub fn tick(&mut self) -> bool {
        self.counter -= 1;
        if self.counter < 0 {
            self.counter = self.limit;
            true
        } else {
            false
        }
    }
}

/// Spawn countdowns and the tier-driven base attributes of new entities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    pub enemy: SpawnTimer,
    pub meteor: SpawnTimer,
    pub laser: SpawnTimer,
    pub health: SpawnTimer,
    pub power_up: SpawnTimer,
    pub star: SpawnTimer,
    params: TierParams,
    /// Enemies spawned while above the lowest tier
    enemy_spawns_above_lowest: u32,
}

impl Default for Spawner {
    fn default() -> Self {
        Self::new()
    }
}

impl Spawner {
    pub fn new() -> Self {
        let params = Tier::Noob.params();
        Self {
            enemy: SpawnTimer::new(ENEMY_INITIAL_COUNTER, params.enemy_spawn_limit),
            meteor: SpawnTimer::new(METEOR_INITIAL_COUNTER, params.meteor_spawn_limit),
            laser: SpawnTimer::new(0, params.laser_spawn_limit),
            health: SpawnTimer::new(HEALTH_PICKUP_SPAWN_LIMIT, HEALTH_PICKUP_SPAWN_LIMIT),
            power_up: SpawnTimer::new(POWER_UP_PICKUP_SPAWN_LIMIT, POWER_UP_PICKUP_SPAWN_LIMIT),
            star: SpawnTimer::new(0, STAR_SPAWN_LIMIT),
            params,
            enemy_spawns_above_lowest: 0,
        }
    }

    /// Pin spawn limits and base speeds to a tier's table
    pub fn apply(&mut self, params: &TierParams) {
        self.enemy.set_limit(params.enemy_spawn_limit);
        self.meteor.set_limit(params.meteor_spawn_limit);
        self.laser.set_limit(params.laser_spawn_limit);
        self.params = *params;
    }

    pub fn params(&self) -> &TierParams {
        &self.params
    }

    /// Whether newly spawned enemies may drift sideways
    pub fn drift_unlocked(&self) -> bool {
        self.enemy_spawns_above_lowest >= ENEMY_DRIFT_UNLOCK_SPAWNS
    }
}

/// Run every spawn countdown for one frame
pub fn spawn_step(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.spawner.enemy.tick() {
        spawn_enemy(state, events);
    }

    // No meteors at all on the lowest tier
    if !state.tier().is_lowest() && state.spawner.meteor.tick() {
        spawn_meteor(state, events);
    }

    if state.spawner.health.tick() {
        spawn_health_pickup(state, events);
    }

    if state.spawner.power_up.tick() {
        spawn_power_up_pickup(state, events);
    }

    if state.starfield && state.spawner.star.tick() {
        spawn_star(state, events);
    }

    if state.spawner.laser.tick() && target_in_range(state) {
        spawn_laser(state, events);
    }
}

/// Random left edge so that an object of `width` fits in the viewport
fn random_x(rng: &mut Pcg32, width: f32, viewport_width: f32) -> f32 {
    let span = viewport_width - width;
    if span > 0.0 {
        rng.random_range(0.0..span)
    } else {
        0.0
    }
}

fn jitter(rng: &mut Pcg32, amount: f32) -> f32 {
    if amount > 0.0 {
        rng.random_range(0.0..amount)
    } else {
        0.0
    }
}

fn announce(state: &GameState, id: EntityId, events: &mut Vec<GameEvent>) {
    if let Some(entity) = state.pool.get(id) {
        let tag = entity.tag();
        log::debug!("Spawned {:?} at ({:.0}, {:.0})", tag, entity.pos.x, entity.pos.y);
        events.push(GameEvent::Spawned {
            id,
            tag,
            layer: tag.layer(),
            rect: entity.rect(),
        });
    }
}

pub fn spawn_enemy(state: &mut GameState, events: &mut Vec<GameEvent>) -> Option<EntityId> {
    let variant = EnemyVariant::ALL[state.rng.random_range(0..EnemyVariant::ALL.len())];
    let speed = state.spawner.params.enemy_speed + jitter(&mut state.rng, ENEMY_SPEED_JITTER);

    let x_dir = if state.tier().is_lowest() {
        None
    } else {
        let drift = if state.spawner.drift_unlocked() {
            match state.rng.random_range(0..3) {
                0 => None,
                1 => Some(XDirection::Left),
                _ => Some(XDirection::Right),
            }
        } else {
            None
        };
        state.spawner.enemy_spawns_above_lowest += 1;
        drift
    };

    let id = state.pool.acquire(EntityTag::Enemy);
    let viewport_width = state.viewport.width;
    let enemy = state.pool.get_mut(id)?;
    enemy.kind = EntityKind::Enemy { variant };
    enemy.health = variant.health();
    enemy.speed = speed;
    enemy.y_dir = YDirection::Down;
    enemy.x_dir = x_dir;
    let x = random_x(&mut state.rng, enemy.size.x, viewport_width);
    enemy.pos = Vec2::new(x, -enemy.size.y);

    announce(state, id, events);
    Some(id)
}

pub fn spawn_meteor(state: &mut GameState, events: &mut Vec<GameEvent>) -> Option<EntityId> {
    let variant = MeteorVariant::ALL[state.rng.random_range(0..MeteorVariant::ALL.len())];
    let speed = state.spawner.params.meteor_speed + jitter(&mut state.rng, METEOR_SPEED_JITTER);
    let rotation: f32 = state.rng.random_range(0.0..360.0);
    let spin: f32 = state.rng.random_range(-3.0..3.0);

    let id = state.pool.acquire(EntityTag::Meteor);
    let viewport_width = state.viewport.width;
    let meteor = state.pool.get_mut(id)?;
    meteor.kind = EntityKind::Meteor {
        variant,
        rotation,
        spin,
    };
    meteor.health = variant.health();
    meteor.speed = speed;
    meteor.y_dir = YDirection::Down;
    let x = random_x(&mut state.rng, meteor.size.x, viewport_width);
    meteor.pos = Vec2::new(x, -meteor.size.y);

    announce(state, id, events);
    Some(id)
}

pub fn spawn_health_pickup(state: &mut GameState, events: &mut Vec<GameEvent>) -> Option<EntityId> {
    let heal = state.rng.random_range(HEAL_MIN..=HEAL_MAX);

    let id = state.pool.acquire(EntityTag::HealthPickup);
    let viewport_width = state.viewport.width;
    let speed = state.spawner.params.pickup_speed;
    let pickup = state.pool.get_mut(id)?;
    pickup.kind = EntityKind::HealthPickup { heal };
    pickup.speed = speed;
    let x = random_x(&mut state.rng, pickup.size.x, viewport_width);
    pickup.pos = Vec2::new(x, -pickup.size.y);

    announce(state, id, events);
    Some(id)
}

pub fn spawn_power_up_pickup(
    state: &mut GameState,
    events: &mut Vec<GameEvent>,
) -> Option<EntityId> {
    let id = state.pool.acquire(EntityTag::PowerUpPickup);
    let viewport_width = state.viewport.width;
    let speed = state.spawner.params.pickup_speed;
    let pickup = state.pool.get_mut(id)?;
    pickup.speed = speed;
    let x = random_x(&mut state.rng, pickup.size.x, viewport_width);
    pickup.pos = Vec2::new(x, -pickup.size.y);

    announce(state, id, events);
    Some(id)
}

pub fn spawn_star(state: &mut GameState, events: &mut Vec<GameEvent>) -> Option<EntityId> {
    let variant = StarVariant::ALL[state.rng.random_range(0..StarVariant::ALL.len())];
    let speed = state.spawner.params.star_speed + jitter(&mut state.rng, 1.0);

    let id = state.pool.acquire(EntityTag::Star);
    let viewport_width = state.viewport.width;
    let star = state.pool.get_mut(id)?;
    star.kind = EntityKind::Star { variant };
    star.size = Vec2::splat(variant.size());
    star.speed = speed;
    let x = random_x(&mut state.rng, star.size.x, viewport_width);
    star.pos = Vec2::new(x, -star.size.y);

    announce(state, id, events);
    Some(id)
}

/// Whether any obstacle's center sits within the firing band measured from
/// the player's left edge: `(x - band, x + band]`
pub fn target_in_range(state: &GameState) -> bool {
    let player_x = state.player.pos.x;
    state.pool.iter().any(|(_, e)| {
        let offset = e.rect().center_x() - player_x;
        e.tag().is_obstacle()
            && e.destructible
            && !e.marked_for_removal
            && offset > -LASER_TARGET_BAND
            && offset <= LASER_TARGET_BAND
    })
}

/// Fire a laser from the ship's nose
pub fn spawn_laser(state: &mut GameState, events: &mut Vec<GameEvent>) -> Option<EntityId> {
    let params = *state.spawner.params();
    let powered_up = state.power_up.is_active();
    let gun_x = state.player.rect().center_x();
    let gun_y = state.player.pos.y;

    let id = state.pool.acquire(EntityTag::Laser);
    let laser = state.pool.get_mut(id)?;
    laser.kind = EntityKind::Laser { powered_up };
    laser.size = Vec2::new(params.laser_width, params.laser_height);
    laser.speed = params.laser_speed;
    laser.y_dir = YDirection::Up;
    laser.pos = Vec2::new(gun_x - laser.size.x / 2.0, gun_y - laser.size.y);

    state.stats.lasers_fired += 1;
    announce(state, id, events);
    events.push(GameEvent::Sound(SoundCue::LaserFire));
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::difficulty::Difficulty;
    use crate::sim::state::{SessionConfig, Viewport};

    fn new_state() -> GameState {
        GameState::new(SessionConfig::new(42))
    }

    #[test]
    fn test_timer_fires_after_counter_goes_negative() {
        let mut timer = SpawnTimer::new(2, 5);
        assert!(!timer.tick()); // 1
        assert!(!timer.tick()); // 0
        assert!(timer.tick()); // -1 -> fire, reset to 5
        assert_eq!(timer.counter(), 5);
        for _ in 0..5 {
            assert!(!timer.tick());
        }
        assert!(timer.tick());
    }

    #[test]
    fn test_enemy_spawns_above_viewport_inside_bounds() {
        let mut state = new_state();
        let mut events = Vec::new();
        for _ in 0..50 {
            let id = spawn_enemy(&mut state, &mut events).unwrap();
            let enemy = state.entity(id).unwrap();
            assert_eq!(enemy.pos.y, -enemy.size.y);
            assert!(enemy.pos.x >= 0.0 && enemy.pos.x + enemy.size.x <= state.viewport.width);
            assert!((1..=3).contains(&enemy.health));
            let EntityKind::Enemy { variant } = enemy.kind else {
                panic!("not an enemy");
            };
            assert_eq!(enemy.health, variant.health());
            assert!(enemy.speed >= Tier::Noob.params().enemy_speed);
            // Lowest tier: never drift
            assert!(enemy.x_dir.is_none());
        }
        assert_eq!(events.len(), 50);
    }

    #[test]
    fn test_no_meteors_on_lowest_tier() {
        let mut state = new_state();
        let mut events = Vec::new();
        for _ in 0..500 {
            spawn_step(&mut state, &mut events);
        }
        assert!(state.entities().all(|(_, e)| e.tag() != EntityTag::Meteor));

        state.difficulty = Difficulty::new();
        state.difficulty.update(30.0);
        for _ in 0..200 {
            spawn_step(&mut state, &mut events);
        }
        assert!(state.entities().any(|(_, e)| e.tag() == EntityTag::Meteor));
    }

    #[test]
    fn test_drift_unlocks_after_ten_spawns_above_lowest() {
        let mut state = new_state();
        state.difficulty.update(30.0);
        let mut events = Vec::new();
        for _ in 0..ENEMY_DRIFT_UNLOCK_SPAWNS {
            let id = spawn_enemy(&mut state, &mut events).unwrap();
            assert!(state.entity(id).unwrap().x_dir.is_none());
        }
        assert!(state.spawner.drift_unlocked());

        let mut drifting = 0;
        for _ in 0..60 {
            let id = spawn_enemy(&mut state, &mut events).unwrap();
            if state.entity(id).unwrap().x_dir.is_some() {
                drifting += 1;
            }
        }
        assert!(drifting > 0);
    }

    #[test]
    fn test_laser_only_fires_with_target_in_band() {
        let mut state = new_state();
        let mut events = Vec::new();
        assert!(!target_in_range(&state));

        let id = spawn_enemy(&mut state, &mut events).unwrap();
        let player_x = state.player.pos.x;
        let center_at = |state: &mut GameState, offset: f32| {
            state.pool.get_mut(id).unwrap().pos.x = player_x + offset - OBSTACLE_SIZE / 2.0;
        };

        // The band is anchored on the player's left edge, not its center
        center_at(&mut state, 280.0);
        assert!(!target_in_range(&state));
        center_at(&mut state, LASER_TARGET_BAND);
        assert!(target_in_range(&state));
        center_at(&mut state, -200.0);
        assert!(target_in_range(&state));
        center_at(&mut state, -LASER_TARGET_BAND);
        assert!(!target_in_range(&state));
    }

    fn lasers(state: &GameState) -> usize {
        state
            .entities()
            .filter(|(_, e)| e.tag() == EntityTag::Laser)
            .count()
    }

    #[test]
    fn test_due_laser_waits_for_a_target() {
        let mut state = new_state();
        let mut events = Vec::new();
        let limit = state.spawner.laser.limit();

        // Laser countdown is due on the first step, but nothing is in range
        spawn_step(&mut state, &mut events);
        assert_eq!(lasers(&state), 0);
        assert_eq!(state.spawner.laser.counter(), limit);
        assert!(!events.contains(&GameEvent::Sound(SoundCue::LaserFire)));
        assert_eq!(state.stats.lasers_fired, 0);

        // Target in the band, countdown due again: exactly one shot
        let id = spawn_enemy(&mut state, &mut events).unwrap();
        state.pool.get_mut(id).unwrap().pos.x = state.player.pos.x + 100.0 - OBSTACLE_SIZE / 2.0;
        state.spawner.laser = SpawnTimer::new(0, limit);
        events.clear();

        spawn_step(&mut state, &mut events);
        assert_eq!(lasers(&state), 1);
        assert_eq!(state.stats.lasers_fired, 1);
        let cues = events
            .iter()
            .filter(|e| **e == GameEvent::Sound(SoundCue::LaserFire))
            .count();
        assert_eq!(cues, 1);
    }

    #[test]
    fn test_laser_spawns_at_gun_with_tier_size() {
        let mut state = new_state();
        let mut events = Vec::new();
        let id = spawn_laser(&mut state, &mut events).unwrap();
        let laser = state.entity(id).unwrap();
        let params = Tier::Noob.params();

        assert_eq!(laser.size, Vec2::new(params.laser_width, params.laser_height));
        assert_eq!(laser.rect().center_x(), state.player.rect().center_x());
        assert_eq!(laser.rect().bottom(), state.player.pos.y);
        assert_eq!(laser.kind, EntityKind::Laser { powered_up: false });
        assert!(events.contains(&GameEvent::Sound(SoundCue::LaserFire)));
        assert_eq!(state.stats.lasers_fired, 1);
    }

    #[test]
    fn test_powered_laser_while_power_up_active() {
        let mut state = new_state();
        let mut events = Vec::new();
        state.apply_power_up(&mut events);
        let id = spawn_laser(&mut state, &mut events).unwrap();
        assert_eq!(
            state.entity(id).unwrap().kind,
            EntityKind::Laser { powered_up: true }
        );
    }

    #[test]
    fn test_stars_respect_starfield_switch() {
        let mut config = SessionConfig::new(3);
        config.starfield = false;
        let mut state = GameState::new(config);
        let mut events = Vec::new();
        for _ in 0..300 {
            spawn_step(&mut state, &mut events);
        }
        assert!(state.entities().all(|(_, e)| e.tag() != EntityTag::Star));
    }

    #[test]
    fn test_narrow_viewport_places_at_left_edge() {
        let mut config = SessionConfig::new(3);
        config.viewport = Viewport::new(80.0, 600.0);
        let mut state = GameState::new(config);
        let mut events = Vec::new();
        let id = spawn_enemy(&mut state, &mut events).unwrap();
        assert_eq!(state.entity(id).unwrap().pos.x, 0.0);
    }

    #[test]
    fn test_apply_pins_limits() {
        let mut spawner = Spawner::new();
        spawner.apply(&Tier::Pro.params());
        assert_eq!(spawner.enemy.limit(), 15);
        assert_eq!(spawner.meteor.limit(), 15);
        assert_eq!(spawner.params().enemy_speed, 35.0);
    }
}
