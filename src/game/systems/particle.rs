use legion::{Entity, IntoQuery};

use super::{System, SystemContext};
use crate::game::components::Particle;
use crate::game::shape::Shape;

/// Ages particles, fading them out over their last `fade_begin` seconds.
#[derive(Debug, Default)]
pub struct ParticleSystem;

impl System for ParticleSystem {
    fn update(&mut self, ctx: &mut SystemContext, dt: f32) {
        let mut dead = Vec::new();

        let mut query = <(Entity, &mut Particle, &mut Shape)>::query();
        for (entity, particle, shape) in query.iter_mut(ctx.world) {
            particle.lifespan -= dt;

            if particle.lifespan <= 0.0 {
                dead.push(*entity);
            } else if particle.lifespan <= particle.fade_begin {
                let alpha = 1.0 - (particle.fade_begin - particle.lifespan) / particle.fade_begin;
                shape.color = shape.color.with_alpha_f32(alpha);
            }
        }

        for entity in dead {
            ctx.world.remove(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::graphics::Color;
    use crate::game::shape::ShapeKind;
    use crate::game::spawn;
    use crate::game::systems::read_component;
    use crate::game::systems::testing::Harness;
    use glam::Vec2;

    #[test]
    fn fades_then_dies() {
        let mut harness = Harness::new();
        let mut rng = crate::game::random::GameRng::seeded(0);
        let particle = spawn::particle(
            &mut harness.world,
            &harness.prototypes,
            &mut rng,
            Vec2::ZERO,
            Vec2::X,
            Color::RED,
            ShapeKind::Square,
        );

        ParticleSystem.update(&mut harness.ctx(), 0.5);
        let shape = read_component::<Shape>(&mut harness.world, particle).unwrap();
        assert!((shape.color.a as i32 - 127).abs() <= 1);

        ParticleSystem.update(&mut harness.ctx(), 0.5);
        assert!(!harness.world.contains(particle));
    }
}
