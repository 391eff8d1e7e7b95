//! Enemy spawning.
//!
//! Power accumulates over time, growing by `power_scale` every `power_time`
//! seconds. Every spawn interval a random factory may spend some of it on a
//! group, and whatever stays above the basic enemy cost is spent on single
//! enemies on the spawn ring.

use log::debug;

use super::{System, SystemContext};
use crate::config::GameplayConfig;
use crate::engine::graphics::Color;
use crate::game::events::{GameEvent, SpawnDescriptor};
use crate::game::shape::ShapeKind;
use crate::game::spawn;

/// Cost of one basic enemy.
pub const BASIC_ENEMY_COST: f32 = 10.0;

pub trait SpawnFactory {
    /// A group affordable with `power`, or `None`.
    fn spawn(&self, power: f32, bosses_defeated: u32) -> Option<SpawnDescriptor>;
}

/// Up to five grey triangles. Extra affordable enemies become bonus health.
#[derive(Debug, Default)]
pub struct StandardFactory;

impl SpawnFactory for StandardFactory {
    fn spawn(&self, power: f32, bosses_defeated: u32) -> Option<SpawnDescriptor> {
        let base = 5.0 + 10.0 * bosses_defeated as f32;
        if power < base {
            return None;
        }

        let could = (power / base).floor();
        let count = could.min(5.0);
        let bonus_health = if could > count {
            (could - count) * base / 5.0
        } else {
            0.0
        };

        Some(SpawnDescriptor {
            cost: could * base,
            health: base + bonus_health,
            mass: 1.0,
            scale: 2.0,
            count: count as u32,
            color: Color::GREY,
            kind: ShapeKind::Triangle,
        })
    }
}

/// A swarm of weak, light squares.
#[derive(Debug, Default)]
pub struct HordeFactory;

impl SpawnFactory for HordeFactory {
    fn spawn(&self, power: f32, bosses_defeated: u32) -> Option<SpawnDescriptor> {
        let base = 30.0 + 10.0 * bosses_defeated as f32;
        if power < base {
            return None;
        }

        Some(SpawnDescriptor {
            cost: base,
            health: 1.0 + bosses_defeated as f32,
            mass: 0.8,
            scale: 1.0,
            count: 6 + bosses_defeated,
            color: Color::DARK_CYAN,
            kind: ShapeKind::Square,
        })
    }
}

/// One pentagon that soaks up all affordable power.
#[derive(Debug, Default)]
pub struct ToughFactory;

impl SpawnFactory for ToughFactory {
    fn spawn(&self, power: f32, bosses_defeated: u32) -> Option<SpawnDescriptor> {
        let base = 10.0 + 10.0 * bosses_defeated as f32;
        if power < base {
            return None;
        }

        let cost = (power / base).floor() * base;
        Some(SpawnDescriptor {
            cost,
            health: (100.0 + cost) * (bosses_defeated as f32 + 1.0),
            mass: cost.sqrt(),
            scale: cost.sqrt(),
            count: 1,
            color: Color::VERY_DARK_BLUE,
            kind: ShapeKind::Pentagon,
        })
    }
}

pub struct EnemySpawnSystem {
    factories: Vec<Box<dyn SpawnFactory + Send>>,
    power_scale: f32,
    power_time: f32,
    spawn_interval: f32,
    power: f32,
    total_time: f32,
    spawn_timer: f32,
}

impl EnemySpawnSystem {
    pub fn new(config: &GameplayConfig) -> Self {
        Self {
            factories: vec![
                Box::new(StandardFactory),
                Box::new(HordeFactory),
                Box::new(ToughFactory),
            ],
            power_scale: config.power_scale,
            power_time: config.power_time,
            spawn_interval: config.spawn_interval,
            power: 0.0,
            total_time: 0.0,
            spawn_timer: 0.0,
        }
    }

    pub fn power(&self) -> f32 {
        self.power
    }
}

impl System for EnemySpawnSystem {
    fn update(&mut self, ctx: &mut SystemContext, dt: f32) {
        self.total_time += dt;
        self.spawn_timer += dt;
        self.power += dt * self.power_scale.powf(self.total_time / self.power_time);

        if self.spawn_timer < self.spawn_interval {
            return;
        }
        self.spawn_timer -= self.spawn_interval;

        let factory = &self.factories[ctx.rng.index(self.factories.len())];
        if let Some(group) = factory.spawn(self.power, ctx.stats.bosses_defeated) {
            debug!("Spawning group of {} {:?} for {}", group.count, group.kind, group.cost);
            self.power -= group.cost;
            ctx.events.push(GameEvent::SpawnGroup(group));
        }

        while self.power > BASIC_ENEMY_COST {
            self.power -= BASIC_ENEMY_COST;
            let angle = ctx.rng.angle();
            ctx.events.push(GameEvent::SpawnEnemy {
                position: spawn::ring_point(ctx.screen, angle),
                color: Color::YELLOW,
            });
        }
    }
}
