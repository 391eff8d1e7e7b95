//! The Dark Triad: three triangles that push each other apart and keep
//! evening out their health. They only die together.

use glam::Vec2;
use legion::{Entity, IntoQuery};
use log::debug;

use super::{draw_health, BossFactory, Caption, KillWatch, LeadIn, LeadOut};
use crate::engine::graphics::{Color, Layer};
use crate::game::components::{DarkTriad, DarkTriadMember, Enemy, Physics};
use crate::game::events::GameEvent;
use crate::game::geometry::lerp;
use crate::game::shape::{Shape, ShapeKind};
use crate::game::systems::{read_component, with_component, System, SystemContext};

const NAME: &str = "The Dark Triad";
const REPULSION: f32 = -4500.0;
/// Squared distance beyond which members stop pushing each other.
const REPULSION_RANGE2: f32 = 62000.0;

pub fn member_health(power: u32) -> f32 {
    1000.0 * (power as f32 + 1.0)
}

/// Seconds between heals. Stronger triads heal more often.
pub fn heal_interval(power: u32) -> f32 {
    (5.0 * 0.9f32.powi(power as i32)).max(3.0)
}

/// Spawns the members and returns the tracker entity.
pub fn spawn(ctx: &mut SystemContext, power: u32) -> Entity {
    let (w, h) = (ctx.screen.x, ctx.screen.y);
    let positions = [
        Vec2::new(w / 2.0, -0.4 * h),
        Vec2::new(-0.2 * w, 0.5 * h),
        Vec2::new(1.2 * w, 0.5 * h),
    ];

    let members = positions.map(|position| {
        let mut shape = ctx.prototypes.shape(ShapeKind::Triangle, Vec2::ZERO);
        shape.scale = 10.0;
        shape.color = ctx.rng.random_dark_color();
        shape.move_to(position);

        let enemy = Enemy {
            health: member_health(power),
            damage: 10.0,
            ..Enemy::default()
        };
        let physics = Physics {
            angular_velocity: -1.3,
            mass: 3.0,
            ..Physics::default()
        };
        ctx.world.push((shape, enemy, physics, DarkTriadMember))
    });

    ctx.world.push((DarkTriad { members },))
}

pub struct DarkTriadFight {
    power: u32,
    heal_interval: f32,
    heal_timer: f32,
    watch: KillWatch,
}

impl DarkTriadFight {
    pub fn new(power: u32) -> Self {
        Self {
            power,
            heal_interval: heal_interval(power),
            heal_timer: 0.0,
            watch: KillWatch::default(),
        }
    }

    fn repel(ctx: &mut SystemContext) {
        let mut positions_query = <(Entity, &DarkTriadMember, &Shape)>::query();
        let positions: Vec<(Entity, Vec2)> = positions_query
            .iter(ctx.world)
            .map(|(entity, _, shape)| (*entity, shape.position))
            .collect();

        let mut query = <(Entity, &DarkTriadMember, &Shape, &mut Physics)>::query();
        for (entity, _, shape, physics) in query.iter_mut(ctx.world) {
            for (other, position) in &positions {
                if other == entity {
                    continue;
                }
                let offset = *position - shape.position;
                let strength = lerp(1.0, 0.0, (offset.length_squared() / REPULSION_RANGE2).min(1.0));
                physics.force += offset.normalize_or_zero() * REPULSION * strength;
            }
        }
    }
}

impl System for DarkTriadFight {
    fn update(&mut self, ctx: &mut SystemContext, dt: f32) {
        if self.watch.is_dead() {
            return;
        }
        self.heal_timer += dt;

        let members = self
            .watch
            .entity()
            .and_then(|tracker| read_component::<DarkTriad>(ctx.world, tracker))
            .map(|triad| triad.members);
        let health: [f32; 3] = match members {
            Some(members) => members.map(|m| read_component::<Enemy>(ctx.world, m).map_or(0.0, |e| e.health)),
            None => [0.0; 3],
        };

        Self::repel(ctx);

        if let Some(members) = members {
            if self.heal_timer >= self.heal_interval {
                self.heal_timer -= self.heal_interval;
                let healed = health.iter().copied().fold(f32::MIN, f32::max);
                debug!("Dark Triad evens out at {}", healed);
                for member in members {
                    with_component::<Enemy, _>(ctx.world, member, |e| e.health = healed);
                }
            }

            let mut query = <(&DarkTriadMember, &Enemy, &mut Physics)>::query();
            for (_, enemy, physics) in query.iter_mut(ctx.world) {
                if enemy.health <= 0.0 {
                    physics.force = Vec2::ZERO;
                }
            }

            if health.iter().all(|h| *h <= 0.0) {
                for member in members {
                    ctx.world.remove(member);
                }
                if let Some(tracker) = self.watch.entity() {
                    ctx.world.remove(tracker);
                }
            }
        }

        self.watch.check(ctx);

        let total = member_health(self.power);
        draw_health(ctx.canvas, &health.map(|h| h / total));

        let previous = ctx.canvas.layer();
        ctx.canvas.set_layer(Layer::Ui);
        let scale = Vec2::splat(4.0);
        let size = crate::engine::graphics::Canvas::text_size(NAME) * scale;
        let pos = Vec2::new(ctx.screen.x * 0.5, ctx.screen.y - 60.0) - size * 0.5;
        ctx.canvas.draw_string(pos, NAME, Color::WHITE, scale);
        ctx.canvas.set_layer(previous);
    }

    fn on_event(&mut self, _ctx: &mut SystemContext, event: &GameEvent) {
        self.watch.on_event(event);
    }
}

#[derive(Debug, Default)]
pub struct DarkTriadFactory;

impl BossFactory for DarkTriadFactory {
    fn name(&self) -> &'static str {
        NAME
    }

    fn lead_in(&self, power: u32) -> Box<dyn System> {
        Box::new(LeadIn::new(power, 3, spawn).with_caption(Caption::plain("Dr. Paulhus will see you now")))
    }

    fn fight(&self, power: u32) -> Box<dyn System> {
        Box::new(DarkTriadFight::new(power))
    }

    fn lead_out(&self, _power: u32) -> Box<dyn System> {
        Box::new(LeadOut::new(3).with_caption(Caption {
            text: "Balance Restored",
            color: Color::WHITE,
            back: Some(Color::VERY_DARK_CYAN),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::systems::testing::Harness;

    fn begin(harness: &mut Harness, power: u32) -> (DarkTriadFight, [Entity; 3]) {
        let tracker = spawn(&mut harness.ctx(), power);
        let members = read_component::<DarkTriad>(&mut harness.world, tracker).unwrap().members;
        let mut fight = DarkTriadFight::new(power);
        fight.on_event(&mut harness.ctx(), &GameEvent::BeginBossMain { entity: tracker });
        (fight, members)
    }

    #[test]
    fn heal_interval_has_a_floor() {
        assert_eq!(heal_interval(0), 5.0);
        assert!((heal_interval(2) - 4.05).abs() < 1e-4);
        assert_eq!(heal_interval(20), 3.0);
    }

    #[test]
    fn heal_sets_every_member_to_the_highest() {
        let mut harness = Harness::new();
        let (mut fight, members) = begin(&mut harness, 0);
        with_component::<Enemy, _>(&mut harness.world, members[0], |e| e.health = 200.0);
        with_component::<Enemy, _>(&mut harness.world, members[1], |e| e.health = 700.0);

        fight.update(&mut harness.ctx(), 5.0);

        for member in members {
            assert_eq!(read_component::<Enemy>(&mut harness.world, member).unwrap().health, 1000.0);
        }
    }

    #[test]
    fn close_members_push_apart() {
        let mut harness = Harness::new();
        let (mut fight, members) = begin(&mut harness, 0);
        for (i, member) in members.iter().enumerate() {
            with_component::<Shape, _>(&mut harness.world, *member, |s| s.move_to(Vec2::new(100.0 * i as f32, 0.0)));
        }

        fight.update(&mut harness.ctx(), 0.1);

        let first = read_component::<Physics>(&mut harness.world, members[0]).unwrap();
        assert!(first.force.x < 0.0);
        let last = read_component::<Physics>(&mut harness.world, members[2]).unwrap();
        assert!(last.force.x > 0.0);
    }

    #[test]
    fn dies_only_when_all_members_are_down() {
        let mut harness = Harness::new();
        let (mut fight, members) = begin(&mut harness, 0);
        with_component::<Enemy, _>(&mut harness.world, members[0], |e| e.health = -5.0);
        with_component::<Enemy, _>(&mut harness.world, members[1], |e| e.health = 0.0);

        fight.update(&mut harness.ctx(), 0.1);
        assert!(harness.world.contains(members[0]));
        assert!(harness.events.is_empty());
        let downed = read_component::<Physics>(&mut harness.world, members[0]).unwrap();
        assert_eq!(downed.force, Vec2::ZERO);

        with_component::<Enemy, _>(&mut harness.world, members[2], |e| e.health = -1.0);
        fight.update(&mut harness.ctx(), 0.1);
        assert!(members.iter().all(|m| !harness.world.contains(*m)));
        assert_eq!(harness.events.drain(), vec![GameEvent::BossKill]);
    }
}
