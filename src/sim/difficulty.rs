//! Score-driven difficulty tiers
//!
//! The tier is a ratchet: it is recomputed from the cumulative score every
//! frame and only ever moves up. The active tier's parameter table is handed
//! out every frame so values stay pinned to the tier.

use serde::{Deserialize, Serialize};

/// Difficulty tiers, in increasing severity
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Tier {
    #[default]
    Noob,
    StartUp,
    Easy,
    Medium,
    Hard,
    VeryHard,
    Extreme,
    Pro,
}

/// Score a run must strictly exceed to enter each tier above `Noob`
const TIER_THRESHOLDS: [(Tier, f64); 7] = [
    (Tier::StartUp, 25.0),
    (Tier::Easy, 50.0),
    (Tier::Medium, 100.0),
    (Tier::Hard, 200.0),
    (Tier::VeryHard, 400.0),
    (Tier::Extreme, 800.0),
    (Tier::Pro, 1600.0),
];

/// Spawn and speed parameters for one tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierParams {
    /// Frames between enemy spawns
    pub enemy_spawn_limit: i32,
    pub enemy_speed: f32,
    /// Frames between meteor spawns
    pub meteor_spawn_limit: i32,
    pub meteor_speed: f32,
    /// Frames between laser shots
    pub laser_spawn_limit: i32,
    pub laser_speed: f32,
    pub laser_width: f32,
    pub laser_height: f32,
    pub pickup_speed: f32,
    pub star_speed: f32,
}

impl Tier {
    pub const ALL: [Tier; 8] = [
        Tier::Noob,
        Tier::StartUp,
        Tier::Easy,
        Tier::Medium,
        Tier::Hard,
        Tier::VeryHard,
        Tier::Extreme,
        Tier::Pro,
    ];

    /// The tier implied by a cumulative score
    pub fn for_score(score: f64) -> Tier {
        TIER_THRESHOLDS
            .iter()
            .rev()
            .find(|(_, threshold)| score > *threshold)
            .map(|(tier, _)| *tier)
            .unwrap_or(Tier::Noob)
    }

    pub fn is_lowest(self) -> bool {
        self == Tier::Noob
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Noob => "Noob",
            Tier::StartUp => "Start Up",
            Tier::Easy => "Easy",
            Tier::Medium => "Medium",
            Tier::Hard => "Hard",
            Tier::VeryHard => "Very Hard",
            Tier::Extreme => "Extreme",
            Tier::Pro => "Pro",
        }
    }

    pub fn params(self) -> TierParams {
        let step = self as i32;
        let (enemy_spawn_limit, enemy_speed, meteor_spawn_limit, meteor_speed) = match self {
            Tier::Noob => (45, 5.0, 50, 2.0),
            Tier::StartUp => (45, 5.0, 45, 3.0),
            Tier::Easy => (40, 10.0, 40, 4.0),
            Tier::Medium => (35, 15.0, 35, 6.0),
            Tier::Hard => (30, 20.0, 30, 8.0),
            Tier::VeryHard => (25, 25.0, 25, 10.0),
            Tier::Extreme => (20, 30.0, 20, 12.0),
            Tier::Pro => (15, 35.0, 15, 14.0),
        };

        TierParams {
            enemy_spawn_limit,
            enemy_speed,
            meteor_spawn_limit,
            meteor_speed,
            laser_spawn_limit: 15 - step,
            laser_speed: 30.0 + 10.0 * step as f32,
            laser_width: 5.0 + 5.0 * step as f32,
            laser_height: 20.0 + 5.0 * step as f32,
            pickup_speed: 3.0 + (step / 2) as f32,
            star_speed: 1.0 + (step / 2) as f32,
        }
    }
}

/// Tier state machine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Difficulty {
    tier: Tier,
}

impl Difficulty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Re-evaluate the tier from the score. Returns the new tier when it
    /// advanced this call.
    pub fn update(&mut self, score: f64) -> Option<Tier> {
        let implied = Tier::for_score(score);
        if implied > self.tier {
            log::info!("Difficulty advanced: {:?} -> {:?} (score {})", self.tier, implied, score);
            self.tier = implied;
            Some(implied)
        } else {
            None
        }
    }

    /// Parameters of the active tier
    pub fn params(&self) -> TierParams {
        self.tier.params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_score_thresholds() {
        assert_eq!(Tier::for_score(0.0), Tier::Noob);
        assert_eq!(Tier::for_score(25.0), Tier::Noob);
        assert_eq!(Tier::for_score(25.5), Tier::StartUp);
        assert_eq!(Tier::for_score(99.0), Tier::Easy);
        assert_eq!(Tier::for_score(101.0), Tier::Medium);
        assert_eq!(Tier::for_score(10_000.0), Tier::Pro);
    }

    #[test]
    fn test_crossing_boundary_advances_once() {
        let mut difficulty = Difficulty::new();
        difficulty.update(99.0);
        assert_eq!(difficulty.tier(), Tier::Easy);

        assert_eq!(difficulty.update(101.0), Some(Tier::Medium));
        assert_eq!(difficulty.update(101.0), None);
        assert_eq!(difficulty.update(150.0), None);
        assert_eq!(difficulty.params(), Tier::Medium.params());
    }

    #[test]
    fn test_tier_never_regresses() {
        let mut difficulty = Difficulty::new();
        difficulty.update(500.0);
        assert_eq!(difficulty.tier(), Tier::VeryHard);
        assert_eq!(difficulty.update(10.0), None);
        assert_eq!(difficulty.tier(), Tier::VeryHard);
    }

    #[test]
    fn test_params_escalate_monotonically() {
        for pair in Tier::ALL.windows(2) {
            let (lo, hi) = (pair[0].params(), pair[1].params());
            assert!(hi.enemy_spawn_limit <= lo.enemy_spawn_limit);
            assert!(hi.meteor_spawn_limit <= lo.meteor_spawn_limit);
            assert!(hi.laser_spawn_limit <= lo.laser_spawn_limit);
            assert!(hi.enemy_speed >= lo.enemy_speed);
            assert!(hi.meteor_speed >= lo.meteor_speed);
            assert!(hi.laser_speed >= lo.laser_speed);
            assert!(hi.pickup_speed >= lo.pickup_speed);
            assert!(hi.star_speed >= lo.star_speed);
        }
    }

    #[test]
    fn test_laser_speed_table() {
        assert_eq!(Tier::Noob.params().laser_speed, 30.0);
        assert_eq!(Tier::Medium.params().laser_speed, 60.0);
        assert_eq!(Tier::Pro.params().laser_speed, 100.0);
        for tier in Tier::ALL {
            let params = tier.params();
            assert!(params.laser_speed > params.enemy_speed);
        }
    }

    #[test]
    fn test_laser_size_grows_with_tier() {
        assert_eq!(Tier::Noob.params().laser_width, 5.0);
        assert_eq!(Tier::Noob.params().laser_height, 20.0);
        assert_eq!(Tier::Pro.params().laser_width, 40.0);
        assert_eq!(Tier::Pro.params().laser_height, 55.0);
    }
}
