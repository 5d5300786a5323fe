//! One simulation frame
//!
//! `tick` is synchronous and deterministic for a given seed and input
//! sequence. It never talks to the host directly: everything the host has to
//! do (show/hide sprites, play sounds, show banners) comes back as a list of
//! `GameEvent`s.

use rand::Rng;

use super::collision::resolve_collisions;
use super::spawn::spawn_step;
use super::state::{GameEvent, GamePhase, GameState, MUSIC_TRACKS, SoundCue, Viewport};

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Latest pointer x (ship center target)
    pub pointer_x: Option<f32>,
    /// Left arrow held
    pub move_left: bool,
    /// Right arrow held
    pub move_right: bool,
    /// Pause toggle
    pub pause: bool,
    /// Host window was resized
    pub resize: Option<Viewport>,
}

/// Advance the game by one frame, returning the effects for the host
pub fn tick(state: &mut GameState, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                log::info!("Paused at tick {}", state.time_ticks);
                return events;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                log::info!("Resumed at tick {}", state.time_ticks);
            }
            GamePhase::GameOver => {}
        }
    }

    match state.phase {
        GamePhase::Paused | GamePhase::GameOver => return events,
        GamePhase::Playing => {}
    }

    if let Some(viewport) = input.resize {
        state.resize(viewport);
    }

    if state.time_ticks == 0 {
        let track = state.rng.random_range(0..MUSIC_TRACKS);
        events.push(GameEvent::StartMusic { track });
    }
    state.time_ticks += 1;
    state.stats.frames += 1;

    spawn_step(state, &mut events);

    // Steer the ship
    let viewport = state.viewport;
    if let Some(pointer_x) = input.pointer_x {
        state.controller.point_at(pointer_x, &state.player, viewport);
    }
    state
        .controller
        .nudge(input.move_left, input.move_right, &state.player, viewport);
    state.controller.step(&mut state.player, viewport);

    resolve_collisions(state, &mut events);

    // Difficulty: advance on a threshold crossing, re-pin parameters every frame
    if let Some(tier) = state.difficulty.update(state.score) {
        events.push(GameEvent::TierAdvanced(tier));
        events.push(GameEvent::Sound(SoundCue::LevelUp));
    }
    let params = state.difficulty.params();
    state.spawner.apply(&params);

    state.tick_power_up(&mut events);
    state.tick_damage_recovery(&mut events);

    if state.player.is_dead() {
        state.phase = GamePhase::GameOver;
        log::info!(
            "Game over at tick {}: score={}, tier={:?}",
            state.time_ticks,
            state.score,
            state.tier()
        );
        events.push(GameEvent::StopMusic);
        events.push(GameEvent::GameOver { score: state.score });
    }

    events
}
