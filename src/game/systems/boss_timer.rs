use log::info;

use super::{System, SystemContext};
use crate::game::events::GameEvent;

/// Calls in a boss after every `interval` seconds of normal play.
#[derive(Debug)]
pub struct BossTimerSystem {
    interval: f32,
    elapsed: f32,
    boss_count: u32,
}

impl BossTimerSystem {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            elapsed: 0.0,
            boss_count: 0,
        }
    }
}

impl System for BossTimerSystem {
    fn update(&mut self, ctx: &mut SystemContext, dt: f32) {
        self.elapsed += dt;
        if self.elapsed < self.interval {
            return;
        }
        self.elapsed = 0.0;

        info!("Boss {} incoming", self.boss_count + 1);
        ctx.events.push(GameEvent::SpawnBoss {
            name: format!("Boss {}", self.boss_count + 1),
            power: self.boss_count,
        });
        self.boss_count += 1;
    }
}
