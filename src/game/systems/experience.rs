use legion::{Entity, IntoQuery};

use super::{read_component, with_component, System, SystemContext};
use crate::game::components::{Experience, Physics, Player};
use crate::game::events::GameEvent;
use crate::game::shape::Shape;

/// Pulls nearby experience towards the player and collects what touches it.
#[derive(Debug, Default)]
pub struct ExperienceSystem;

impl System for ExperienceSystem {
    fn update(&mut self, ctx: &mut SystemContext, dt: f32) {
        let Some(player_shape) = ctx.player_shape() else {
            return;
        };
        let Some(player) = read_component::<Player>(ctx.world, ctx.player) else {
            return;
        };
        let range2 = player.experience_range * player.experience_range;

        let mut collected = Vec::new();
        let mut gained = 0.0;

        let mut query = <(Entity, &mut Experience, &Shape, &mut Physics)>::query();
        for (entity, xp, shape, physics) in query.iter_mut(ctx.world) {
            xp.age += dt;

            if shape.intersects(&player_shape) {
                gained += xp.value;
                collected.push(*entity);
                continue;
            }

            let offset = shape.position - player_shape.position;
            let d2 = offset.length_squared();
            if d2 < range2 {
                physics.force += offset.normalize_or_zero() * (d2 - range2) * dt * 100.0;
            }
        }

        if collected.is_empty() {
            return;
        }

        with_component::<Player, _>(ctx.world, ctx.player, |p| p.experience += gained);
        for entity in collected {
            ctx.world.remove(entity);
            ctx.events.push(GameEvent::PlayRandomEffect {
                bank: String::from("experience"),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::spawn;
    use crate::game::systems::testing::Harness;
    use glam::Vec2;

    #[test]
    fn touching_experience_is_collected() {
        let mut harness = Harness::new();
        let centre = harness.player_position();
        let xp = spawn::experience(&mut harness.world, &harness.prototypes, &mut harness.rng, centre, 2.0, 0.0);

        ExperienceSystem.update(&mut harness.ctx(), 0.016);

        assert!(!harness.world.contains(xp));
        let player = read_component::<Player>(&mut harness.world, harness.player).unwrap();
        assert_eq!(player.experience, 2.0);
        assert_eq!(
            harness.events.drain(),
            vec![GameEvent::PlayRandomEffect {
                bank: String::from("experience")
            }]
        );
    }

    #[test]
    fn nearby_experience_is_pulled_in() {
        let mut harness = Harness::new();
        let centre = harness.player_position();
        let near = spawn::experience(&mut harness.world, &harness.prototypes, &mut harness.rng, centre + Vec2::new(100.0, 0.0), 1.0, 0.0);
        let far = spawn::experience(&mut harness.world, &harness.prototypes, &mut harness.rng, centre + Vec2::new(300.0, 0.0), 1.0, 0.0);

        ExperienceSystem.update(&mut harness.ctx(), 0.1);

        let pulled = read_component::<Physics>(&mut harness.world, near).unwrap();
        assert!(pulled.force.x < 0.0);
        let ignored = read_component::<Physics>(&mut harness.world, far).unwrap();
        assert_eq!(ignored.force, Vec2::ZERO);
        assert!((read_component::<Experience>(&mut harness.world, near).unwrap().age - 0.1).abs() < 1e-6);
    }
}
