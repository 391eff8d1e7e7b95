//! Big Chungus: one huge, slow star that simply has a lot of health.

use glam::Vec2;
use legion::Entity;

use super::{draw_health, draw_health_readout, BossFactory, KillWatch, LeadIn, LeadOut};
use crate::engine::graphics::Color;
use crate::game::components::{Enemy, Physics};
use crate::game::events::GameEvent;
use crate::game::shape::ShapeKind;
use crate::game::systems::{read_component, System, SystemContext};

pub const MAX_HEALTH: f32 = 50000.0;

pub fn spawn(ctx: &mut SystemContext, _power: u32) -> Entity {
    let position = Vec2::new(ctx.screen.x / 2.0, -ctx.screen.y);
    let mut shape = ctx.prototypes.shape(ShapeKind::Star9_3, Vec2::ZERO);
    shape.scale = 80.0;
    shape.color = Color::GREY;
    shape.move_to(position);

    let enemy = Enemy {
        health: MAX_HEALTH,
        damage: 10.0,
        ..Enemy::default()
    };
    let physics = Physics {
        angular_velocity: 0.3,
        mass: 10.0,
        ..Physics::default()
    };
    ctx.world.push((shape, enemy, physics))
}

#[derive(Debug, Default)]
pub struct BigChungusFight {
    watch: KillWatch,
}

impl System for BigChungusFight {
    fn update(&mut self, ctx: &mut SystemContext, _dt: f32) {
        let health = self
            .watch
            .entity()
            .and_then(|boss| read_component::<Enemy>(ctx.world, boss))
            .map(|enemy| enemy.health);

        self.watch.check(ctx);
        if let Some(health) = health {
            draw_health_readout(ctx.canvas, health);
        }
        let health = health.unwrap_or(0.0);
        draw_health(ctx.canvas, &[health / MAX_HEALTH]);
    }

    fn on_event(&mut self, _ctx: &mut SystemContext, event: &GameEvent) {
        self.watch.on_event(event);
    }
}

#[derive(Debug, Default)]
pub struct BigChungusFactory;

impl BossFactory for BigChungusFactory {
    fn name(&self) -> &'static str {
        "Big Chungus"
    }

    fn lead_in(&self, power: u32) -> Box<dyn System> {
        Box::new(LeadIn::new(power, 1, spawn))
    }

    fn fight(&self, _power: u32) -> Box<dyn System> {
        Box::new(BigChungusFight::default())
    }

    fn lead_out(&self, _power: u32) -> Box<dyn System> {
        Box::new(LeadOut::new(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::shape::Shape;
    use crate::game::systems::testing::Harness;

    #[test]
    fn spawns_above_the_screen() {
        let mut harness = Harness::new();
        let boss = spawn(&mut harness.ctx(), 0);
        let shape = read_component::<Shape>(&mut harness.world, boss).unwrap();
        assert_eq!(shape.position, Vec2::new(640.0, -960.0));
        assert_eq!(shape.kind(), ShapeKind::Star9_3);
        assert_eq!(read_component::<Enemy>(&mut harness.world, boss).unwrap().health, MAX_HEALTH);
    }

    #[test]
    fn fight_ends_when_boss_is_gone() {
        let mut harness = Harness::new();
        let boss = spawn(&mut harness.ctx(), 0);
        let mut fight = BigChungusFactory.fight(0);
        fight.on_event(&mut harness.ctx(), &GameEvent::BeginBossMain { entity: boss });

        fight.update(&mut harness.ctx(), 0.016);
        assert!(harness.events.is_empty());

        harness.world.remove(boss);
        fight.update(&mut harness.ctx(), 0.016);
        assert_eq!(harness.events.drain(), vec![GameEvent::BossKill]);
    }
}
