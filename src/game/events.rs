//! Game events.
//!
//! Systems and event handlers push onto an [`EventQueue`]; the gameplay state
//! drains it once per frame, after the pre-update pass. Anything pushed while
//! draining waits for the next frame.

use glam::Vec2;
use legion::Entity;

use crate::engine::graphics::Color;
use crate::game::shape::ShapeKind;
use crate::game::weapon::{OnKill, WeaponKind};

/// A group of identical enemies to spawn together.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnDescriptor {
    /// Power spent on the whole group.
    pub cost: f32,
    pub health: f32,
    pub mass: f32,
    pub scale: f32,
    pub count: u32,
    pub color: Color,
    pub kind: ShapeKind,
}

impl Default for SpawnDescriptor {
    fn default() -> Self {
        Self {
            cost: 10.0,
            health: 10.0,
            mass: 1.0,
            scale: 1.0,
            count: 0,
            color: Color::YELLOW,
            kind: ShapeKind::Square,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulletSpawn {
    pub position: Vec2,
    pub initial_velocity: Vec2,
    pub hit_count: i32,
    pub damage: f32,
    pub duration: f32,
    pub angular_velocity: f32,
    pub scale: f32,
    pub shape: ShapeKind,
    pub color: Color,
    pub on_kill: OnKill,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Upgrade {
    GainWeapon(WeaponKind),
    ImproveWeapon { slot: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PlayerInput {
        move_direction: Vec2,
        aim_direction: Vec2,
        fire: bool,
    },
    SpawnEnemy {
        position: Vec2,
        color: Color,
    },
    SpawnGroup(SpawnDescriptor),
    EnemyDeath {
        position: Vec2,
        gives_xp: bool,
    },
    SpawnBullet(BulletSpawn),
    SpawnExperience {
        position: Vec2,
        value: f32,
        age: f32,
    },
    LevelUp,
    LevelUpChosen(Upgrade),
    SpawnBoss {
        name: String,
        power: u32,
    },
    BeginBossMain {
        entity: Entity,
    },
    BossKill,
    BossPhaseDone,
    PlayMusic {
        bank: String,
        fade_rate: f32,
    },
    PlayRandomEffect {
        bank: String,
    },
}

#[derive(Debug, Default)]
pub struct EventQueue {
    pending: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        self.pending.push(event);
    }

    /// Take everything queued so far, oldest first.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.pending.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_keeps_order_and_empties() {
        let mut queue = EventQueue::new();
        queue.push(GameEvent::LevelUp);
        queue.push(GameEvent::BossKill);

        let events = queue.drain();
        assert_eq!(events, vec![GameEvent::LevelUp, GameEvent::BossKill]);
        assert!(queue.is_empty());
    }
}
