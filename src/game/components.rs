//! ECS components. Every entity that is drawn also carries a `Shape`.

use glam::Vec2;
use legion::Entity;

use crate::game::weapon::{OnKill, Weapon};

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub health: f32,
    pub damage: f32,
    pub attack_timer: f32,
    pub attack_cooldown: f32,
}

impl Default for Enemy {
    fn default() -> Self {
        Self {
            health: 10.0,
            damage: 1.0,
            attack_timer: 0.0,
            attack_cooldown: 1.0,
        }
    }
}

impl Enemy {
    pub fn with_health(health: f32) -> Self {
        Self {
            health,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub health: f32,
    pub max_health: f32,
    pub level: u32,
    pub experience: f32,
    pub xp_to_next_level: f32,
    /// Experience closer than this is pulled towards the player.
    pub experience_range: f32,
    pub weapons: Vec<Weapon>,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            health: 10.0,
            max_health: 10.0,
            level: 1,
            experience: 0.0,
            xp_to_next_level: 5.0,
            experience_range: 120.0,
            weapons: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub damage: f32,
    /// Enemies the bullet can still hit.
    pub hit_count: i32,
    /// Seconds left before the bullet is culled.
    pub duration: f32,
    pub angular_velocity: f32,
    /// The same enemy is never hit twice in a row.
    pub last_hit: Option<Entity>,
    pub on_kill: OnKill,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Physics {
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub force: Vec2,
    pub mass: f32,
    pub friction: f32,
    pub angular_velocity: f32,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            force: Vec2::ZERO,
            mass: 1.0,
            friction: 0.95,
            angular_velocity: 0.0,
        }
    }
}

impl Physics {
    pub fn with_mass(mass: f32) -> Self {
        Self {
            mass,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub lifespan: f32,
    /// Alpha starts falling once `lifespan` drops below this.
    pub fade_begin: f32,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            lifespan: 1.0,
            fade_begin: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Experience {
    pub value: f32,
    pub age: f32,
}

impl Default for Experience {
    fn default() -> Self {
        Self {
            value: 1.0,
            age: 0.0,
        }
    }
}

/// Marks the three bodies of the Dark Triad. Bullets never destroy these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DarkTriadMember;

/// Tracker entity holding the Dark Triad members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DarkTriad {
    pub members: [Entity; 3],
}

/// Menu background motion from `start` to `end` over `total_time` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drift {
    pub start: Vec2,
    pub end: Vec2,
    pub total_time: f32,
    pub current_time: f32,
    pub spin: f32,
}

impl Drift {
    pub fn progress(&self) -> f32 {
        (self.current_time / self.total_time).clamp(0.0, 1.0)
    }

    pub fn finished(&self) -> bool {
        self.current_time > self.total_time
    }
}
