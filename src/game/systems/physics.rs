use legion::IntoQuery;

use super::{System, SystemContext};
use crate::game::components::Physics;
use crate::game::shape::Shape;

/// Fixed simulation step in seconds.
pub const STEP: f32 = 1.0 / 60.0;

/// Integrates forces in fixed steps. Leftover time carries into the next call.
#[derive(Debug, Default)]
pub struct PhysicsSystem {
    accumulator: f32,
}

impl PhysicsSystem {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn step(physics: &mut Physics, shape: &mut Shape, dt: f32) {
    if physics.force.length_squared() > 0.0 {
        physics.acceleration *= 0.8;
        physics.velocity *= physics.friction;
    } else {
        physics.acceleration *= 0.4;
        physics.velocity *= physics.friction * physics.friction;
    }

    physics.acceleration += physics.force / physics.mass * dt;
    physics.velocity += physics.acceleration * dt;

    shape.theta += physics.angular_velocity * dt;
    shape.move_to(shape.position + physics.velocity * dt);
    physics.force = glam::Vec2::ZERO;
}

impl System for PhysicsSystem {
    fn update(&mut self, ctx: &mut SystemContext, dt: f32) {
        self.accumulator += dt;

        let mut query = <(&mut Physics, &mut Shape)>::query();
        while self.accumulator > STEP {
            self.accumulator -= STEP;
            for (physics, shape) in query.iter_mut(ctx.world) {
                step(physics, shape, STEP);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::shape::{PrototypeLibrary, ShapeKind};
    use crate::game::systems::testing::Harness;
    use glam::Vec2;

    #[test]
    fn force_accelerates_then_clears() {
        let library = PrototypeLibrary::new();
        let mut shape = library.shape(ShapeKind::Square, Vec2::ZERO);
        let mut physics = Physics {
            force: Vec2::new(600.0, 0.0),
            ..Physics::default()
        };

        step(&mut physics, &mut shape, STEP);
        assert_eq!(physics.force, Vec2::ZERO);
        assert!((physics.acceleration.x - 10.0).abs() < 1e-4);
        assert!(shape.position.x > 0.0);
    }

    #[test]
    fn spin_advances_theta() {
        let library = PrototypeLibrary::new();
        let mut shape = library.shape(ShapeKind::Square, Vec2::ZERO);
        let mut physics = Physics {
            angular_velocity: 6.0,
            ..Physics::default()
        };
        step(&mut physics, &mut shape, 0.5);
        assert!((shape.theta - 3.0).abs() < 1e-5);
    }

    #[test]
    fn short_frames_accumulate() {
        let mut harness = Harness::new();
        crate::game::systems::with_component::<Physics, _>(&mut harness.world, harness.player, |p| {
            p.velocity = Vec2::new(60.0, 0.0);
        });
        let start = harness.player_position();

        let mut physics = PhysicsSystem::new();
        physics.update(&mut harness.ctx(), STEP / 2.0);
        assert_eq!(harness.player_position(), start);

        physics.update(&mut harness.ctx(), STEP);
        assert!(harness.player_position().x > start.x);
    }
}
