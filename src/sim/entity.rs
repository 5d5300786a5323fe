//! Entity model: one struct for everything that moves, with a tagged kind
//!
//! Kind-specific data lives in `EntityKind` payloads and all per-kind
//! behaviour is dispatched with `match`, so adding a kind forces every
//! collision and spawn path to handle it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::consts::*;
use crate::normalize_degrees;

/// Vertical travel direction (screen space, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum YDirection {
    Up,
    #[default]
    Down,
}

impl YDirection {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            YDirection::Up => -1.0,
            YDirection::Down => 1.0,
        }
    }
}

/// Horizontal drift direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum XDirection {
    Left,
    Right,
}

impl XDirection {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            XDirection::Left => -1.0,
            XDirection::Right => 1.0,
        }
    }
}

/// Hostile ship sprites, each with a fixed health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnemyVariant {
    #[default]
    A,
    B,
    C,
    D,
    E,
}

impl EnemyVariant {
    pub const ALL: [EnemyVariant; 5] = [
        EnemyVariant::A,
        EnemyVariant::B,
        EnemyVariant::C,
        EnemyVariant::D,
        EnemyVariant::E,
    ];

    pub fn health(self) -> i32 {
        match self {
            EnemyVariant::A | EnemyVariant::B => 2,
            EnemyVariant::C => 1,
            EnemyVariant::D | EnemyVariant::E => 3,
        }
    }
}

/// Meteor sprites; bigger rocks take more hits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MeteorVariant {
    DetailedLarge,
    SquareLarge,
    Large,
    SquareDetailedSmall,
    DetailedSmall,
    SquareSmall,
    #[default]
    Small,
}

impl MeteorVariant {
    pub const ALL: [MeteorVariant; 7] = [
        MeteorVariant::DetailedLarge,
        MeteorVariant::SquareLarge,
        MeteorVariant::Large,
        MeteorVariant::SquareDetailedSmall,
        MeteorVariant::DetailedSmall,
        MeteorVariant::SquareSmall,
        MeteorVariant::Small,
    ];

    pub fn health(self) -> i32 {
        match self {
            MeteorVariant::DetailedLarge => 5,
            MeteorVariant::SquareLarge => 4,
            MeteorVariant::Large => 3,
            MeteorVariant::SquareDetailedSmall | MeteorVariant::DetailedSmall => 2,
            MeteorVariant::SquareSmall | MeteorVariant::Small => 1,
        }
    }
}

/// Background star sprites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StarVariant {
    Large,
    Medium,
    Small,
    #[default]
    Tiny,
}

impl StarVariant {
    pub const ALL: [StarVariant; 4] = [
        StarVariant::Large,
        StarVariant::Medium,
        StarVariant::Small,
        StarVariant::Tiny,
    ];

    pub fn size(self) -> f32 {
        match self {
            StarVariant::Large => 20.0,
            StarVariant::Medium => 15.0,
            StarVariant::Small => 10.0,
            StarVariant::Tiny => 5.0,
        }
    }
}

/// Kind of an entity plus its kind-specific payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Player { powered_up: bool },
    Enemy { variant: EnemyVariant },
    Meteor {
        variant: MeteorVariant,
        /// Current spin in degrees (cosmetic)
        rotation: f32,
        /// Degrees per frame
        spin: f32,
    },
    Laser { powered_up: bool },
    HealthPickup { heal: i32 },
    PowerUpPickup,
    Star { variant: StarVariant },
}

/// Payload-free kind discriminant, used to index pools and for host lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityTag {
    Player,
    Enemy,
    Meteor,
    Laser,
    HealthPickup,
    PowerUpPickup,
    Star,
}

/// Draw layer the host should put an entity on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layer {
    Background,
    Foreground,
}

impl EntityTag {
    pub const COUNT: usize = 7;

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Kinds whose retired entities are kept on a free-list for reuse
    pub fn is_poolable(self) -> bool {
        matches!(
            self,
            EntityTag::Enemy | EntityTag::Meteor | EntityTag::HealthPickup | EntityTag::Star
        )
    }

    /// Enemies and meteors: hurt the player, can be shot
    pub fn is_obstacle(self) -> bool {
        matches!(self, EntityTag::Enemy | EntityTag::Meteor)
    }

    pub fn is_pickup(self) -> bool {
        matches!(self, EntityTag::HealthPickup | EntityTag::PowerUpPickup)
    }

    pub fn layer(self) -> Layer {
        match self {
            EntityTag::Star => Layer::Background,
            _ => Layer::Foreground,
        }
    }
}

/// A moving, damageable object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Velocity magnitude, applied along `y_dir` (and `x_dir` when drifting)
    pub speed: f32,
    pub y_dir: YDirection,
    /// Horizontal drift, if any
    pub x_dir: Option<XDirection>,
    pub health: i32,
    /// Damage taken per non-lethal hit
    pub health_slot: i32,
    pub destructible: bool,
    pub marked_for_removal: bool,
    /// Host should fade this entity out instead of removing it outright
    pub fading: bool,
    pub opacity: f32,
}

impl Entity {
    /// A freshly reset entity of the given kind, with a valid default payload
    pub fn blank(tag: EntityTag) -> Self {
        let (kind, size, y_dir, health, destructible) = match tag {
            EntityTag::Player => (
                EntityKind::Player { powered_up: false },
                Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
                YDirection::Up,
                PLAYER_HEALTH,
                false,
            ),
            EntityTag::Enemy => {
                let variant = EnemyVariant::default();
                (
                    EntityKind::Enemy { variant },
                    Vec2::splat(OBSTACLE_SIZE),
                    YDirection::Down,
                    variant.health(),
                    true,
                )
            }
            EntityTag::Meteor => {
                let variant = MeteorVariant::default();
                (
                    EntityKind::Meteor {
                        variant,
                        rotation: 0.0,
                        spin: 0.0,
                    },
                    Vec2::splat(OBSTACLE_SIZE),
                    YDirection::Down,
                    variant.health(),
                    true,
                )
            }
            EntityTag::Laser => (
                EntityKind::Laser { powered_up: false },
                Vec2::new(5.0, 20.0),
                YDirection::Up,
                0,
                false,
            ),
            EntityTag::HealthPickup => (
                EntityKind::HealthPickup { heal: HEAL_MIN },
                Vec2::splat(PICKUP_SIZE),
                YDirection::Down,
                0,
                false,
            ),
            EntityTag::PowerUpPickup => (
                EntityKind::PowerUpPickup,
                Vec2::splat(PICKUP_SIZE),
                YDirection::Down,
                0,
                false,
            ),
            EntityTag::Star => {
                let variant = StarVariant::default();
                (
                    EntityKind::Star { variant },
                    Vec2::splat(variant.size()),
                    YDirection::Down,
                    0,
                    false,
                )
            }
        };

        Self {
            kind,
            pos: Vec2::ZERO,
            size,
            speed: 0.0,
            y_dir,
            x_dir: None,
            health,
            health_slot: if tag == EntityTag::Player {
                PLAYER_HEALTH_SLOT
            } else {
                1
            },
            destructible,
            marked_for_removal: false,
            fading: false,
            opacity: 1.0,
        }
    }

    /// The player's ship, not yet positioned
    pub fn player() -> Self {
        let mut player = Self::blank(EntityTag::Player);
        player.speed = PLAYER_SPEED;
        player
    }

    pub fn tag(&self) -> EntityTag {
        match self.kind {
            EntityKind::Player { .. } => EntityTag::Player,
            EntityKind::Enemy { .. } => EntityTag::Enemy,
            EntityKind::Meteor { .. } => EntityTag::Meteor,
            EntityKind::Laser { .. } => EntityTag::Laser,
            EntityKind::HealthPickup { .. } => EntityTag::HealthPickup,
            EntityKind::PowerUpPickup => EntityTag::PowerUpPickup,
            EntityKind::Star { .. } => EntityTag::Star,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Lose one health slot
    pub fn lose_health(&mut self) {
        self.health -= self.health_slot;
    }

    /// Heal by `amount`
    pub fn gain_health(&mut self, amount: i32) {
        self.health += amount.max(0);
    }

    /// Apply a laser hit: a powered-up laser is lethal regardless of health
    pub fn take_laser_hit(&mut self, powered_up: bool) {
        if powered_up {
            self.health = 0;
        } else {
            self.lose_health();
        }
    }

    /// Advance one frame along the travel directions
    pub fn advance(&mut self) {
        self.pos.y += self.speed * self.y_dir.sign();
        if let Some(x_dir) = self.x_dir {
            self.pos.x += self.speed * ENEMY_DRIFT_FACTOR * x_dir.sign();
        }
        if let EntityKind::Meteor { rotation, spin, .. } = &mut self.kind {
            *rotation = normalize_degrees(*rotation + *spin);
        }
    }

    /// Knock the entity back against its direction of travel
    pub fn recoil(&mut self) {
        let factor = match self.kind {
            EntityKind::Enemy { .. } => ENEMY_RECOIL,
            EntityKind::Meteor { .. } => METEOR_RECOIL,
            _ => 0.0,
        };
        self.pos.y -= self.speed * factor * self.y_dir.sign();
    }

    /// Whether the entity has fully left the viewport (any edge but the top,
    /// which is where things spawn)
    pub fn is_outside(&self, viewport_width: f32, viewport_height: f32) -> bool {
        let rect = self.rect();
        rect.y > viewport_height || rect.right() < 0.0 || rect.x > viewport_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_entities_have_valid_payloads() {
        for tag in [
            EntityTag::Player,
            EntityTag::Enemy,
            EntityTag::Meteor,
            EntityTag::Laser,
            EntityTag::HealthPickup,
            EntityTag::PowerUpPickup,
            EntityTag::Star,
        ] {
            let e = Entity::blank(tag);
            assert_eq!(e.tag(), tag);
            assert!(!e.marked_for_removal);
            assert!(!e.fading);
            assert_eq!(e.opacity, 1.0);
        }
        assert!(Entity::blank(EntityTag::Enemy).health > 0);
        assert!(Entity::blank(EntityTag::Meteor).health > 0);
    }

    #[test]
    fn test_variant_health_ranges() {
        for v in EnemyVariant::ALL {
            assert!((1..=3).contains(&v.health()));
        }
        for v in MeteorVariant::ALL {
            assert!((1..=5).contains(&v.health()));
        }
    }

    #[test]
    fn test_powered_laser_is_lethal() {
        let mut meteor = Entity::blank(EntityTag::Meteor);
        meteor.health = 5;
        meteor.take_laser_hit(true);
        assert_eq!(meteor.health, 0);
        assert!(meteor.is_dead());
    }

    #[test]
    fn test_normal_laser_removes_one_slot() {
        let mut enemy = Entity::blank(EntityTag::Enemy);
        enemy.health = 3;
        enemy.take_laser_hit(false);
        assert_eq!(enemy.health, 2);
    }

    #[test]
    fn test_player_slot_damage_and_heal() {
        let mut player = Entity::player();
        player.lose_health();
        assert_eq!(player.health, PLAYER_HEALTH - PLAYER_HEALTH_SLOT);
        player.gain_health(50);
        assert_eq!(player.health, PLAYER_HEALTH - PLAYER_HEALTH_SLOT + 50);
        player.gain_health(-20);
        assert_eq!(player.health, PLAYER_HEALTH - PLAYER_HEALTH_SLOT + 50);
    }

    #[test]
    fn test_advance_and_recoil() {
        let mut enemy = Entity::blank(EntityTag::Enemy);
        enemy.speed = 10.0;
        enemy.advance();
        assert_eq!(enemy.pos.y, 10.0);
        enemy.recoil();
        assert_eq!(enemy.pos.y, 10.0 - 10.0 * ENEMY_RECOIL);

        enemy.x_dir = Some(XDirection::Left);
        enemy.advance();
        assert_eq!(enemy.pos.x, -10.0 * ENEMY_DRIFT_FACTOR);
    }

    #[test]
    fn test_meteor_spin_wraps() {
        let mut meteor = Entity::blank(EntityTag::Meteor);
        meteor.kind = EntityKind::Meteor {
            variant: MeteorVariant::Large,
            rotation: 355.0,
            spin: 10.0,
        };
        meteor.advance();
        match meteor.kind {
            EntityKind::Meteor { rotation, .. } => assert!((rotation - 5.0).abs() < 1e-4),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_is_outside() {
        let mut e = Entity::blank(EntityTag::Enemy);
        e.pos = Vec2::new(10.0, -100.0);
        assert!(!e.is_outside(800.0, 600.0));
        e.pos.y = 601.0;
        assert!(e.is_outside(800.0, 600.0));
        e.pos = Vec2::new(-101.0, 0.0);
        assert!(e.is_outside(800.0, 600.0));
        e.pos = Vec2::new(801.0, 0.0);
        assert!(e.is_outside(800.0, 600.0));
    }
}
