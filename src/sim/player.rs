//! Player ship steering
//!
//! Pointer input sets a target x directly, held arrow keys walk the target
//! by one speed unit per frame. The ship then closes in on the target by at
//! most one speed unit per frame.

use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::state::Viewport;
use crate::clamp_to_viewport;
use crate::consts::PLAYER_BOTTOM_MARGIN;

/// Horizontal steering state (target is the ship's desired left edge)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerController {
    target_x: f32,
}

impl PlayerController {
    pub fn new(target_x: f32) -> Self {
        Self { target_x }
    }

    pub fn target_x(&self) -> f32 {
        self.target_x
    }

    /// Aim the ship's center at a pointer position
    pub fn point_at(&mut self, pointer_x: f32, player: &Entity, viewport: Viewport) {
        self.target_x = clamp_to_viewport(pointer_x - player.size.x / 2.0, player.size.x, viewport.width);
    }

    /// Walk the target with held direction keys
    pub fn nudge(&mut self, left: bool, right: bool, player: &Entity, viewport: Viewport) {
        if left {
            self.target_x -= player.speed;
        }
        if right {
            self.target_x += player.speed;
        }
        self.target_x = clamp_to_viewport(self.target_x, player.size.x, viewport.width);
    }

    /// Move the ship toward the target without overshooting
    pub fn step(&self, player: &mut Entity, viewport: Viewport) {
        let delta = (self.target_x - player.pos.x).clamp(-player.speed, player.speed);
        player.pos.x = clamp_to_viewport(player.pos.x + delta, player.size.x, viewport.width);
    }

    /// Pin the ship near the bottom edge and keep it (and the target) inside
    /// the viewport. Called at spawn and on resize.
    pub fn anchor(&mut self, player: &mut Entity, viewport: Viewport) {
        player.pos.y = viewport.height - player.size.y - PLAYER_BOTTOM_MARGIN;
        player.pos.x = clamp_to_viewport(player.pos.x, player.size.x, viewport.width);
        self.target_x = clamp_to_viewport(self.target_x, player.size.x, viewport.width);
    }
}
