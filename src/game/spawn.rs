//! Entity constructors shared by the gameplay state and the boss scripts.

use glam::Vec2;
use legion::{Entity, World};

use crate::engine::graphics::Color;
use crate::game::components::{Enemy, Experience, Particle, Physics, Player, Bullet};
use crate::game::events::{BulletSpawn, SpawnDescriptor};
use crate::game::geometry;
use crate::game::random::GameRng;
use crate::game::shape::{PrototypeLibrary, ShapeKind};
use crate::game::weapon::{Weapon, WeaponKind};

/// Point on the spawn ring just outside the visible screen.
pub fn ring_point(screen: Vec2, angle: f32) -> Vec2 {
    geometry::from_polar(screen.x / 1.7, angle) + screen / 2.0
}

/// A scale-4 triangle at the centre of the screen carrying one Pierce weapon.
pub fn player(world: &mut World, prototypes: &PrototypeLibrary, screen: Vec2) -> Entity {
    let mut shape = prototypes.shape(ShapeKind::Triangle, screen / 2.0);
    shape.scale = 4.0;
    shape.color = Color::WHITE;
    shape.refresh();

    let player = Player {
        weapons: vec![Weapon::new(WeaponKind::Pierce, prototypes)],
        ..Player::default()
    };
    world.push((player, shape, Physics::default()))
}

pub fn enemy(world: &mut World, prototypes: &PrototypeLibrary, position: Vec2, color: Color) -> Entity {
    let mut shape = prototypes.shape(ShapeKind::Square, position);
    shape.color = color;
    world.push((shape, Enemy::default(), Physics::default()))
}

/// Every enemy of a group appears near one random ring point.
pub fn group(
    world: &mut World,
    prototypes: &PrototypeLibrary,
    rng: &mut GameRng,
    screen: Vec2,
    spawn: &SpawnDescriptor,
) -> Vec<Entity> {
    let centre = ring_point(screen, rng.angle());
    (0..spawn.count)
        .map(|_| {
            let jitter = Vec2::new(rng.range(0.0, 50.0), rng.range(0.0, 50.0));
            let mut shape = prototypes.shape(spawn.kind, Vec2::ZERO);
            shape.color = spawn.color;
            shape.scale = spawn.scale;
            shape.move_to(centre + jitter);
            world.push((
                shape,
                Enemy::with_health(spawn.health),
                Physics::with_mass(spawn.mass),
            ))
        })
        .collect()
}

/// Bullets face their direction of travel.
pub fn bullet(world: &mut World, prototypes: &PrototypeLibrary, spawn: &BulletSpawn) -> Entity {
    let mut shape = prototypes.shape(spawn.shape, Vec2::ZERO);
    shape.scale = spawn.scale;
    shape.color = spawn.color;
    shape.theta = spawn.initial_velocity.y.atan2(spawn.initial_velocity.x);
    shape.move_to(spawn.position);

    let bullet = Bullet {
        damage: spawn.damage,
        hit_count: spawn.hit_count,
        duration: spawn.duration,
        angular_velocity: spawn.angular_velocity,
        last_hit: None,
        on_kill: spawn.on_kill,
    };
    let physics = Physics {
        velocity: spawn.initial_velocity,
        angular_velocity: spawn.angular_velocity,
        friction: 1.0,
        ..Physics::default()
    };
    world.push((shape, bullet, physics))
}

/// Green shard that drifts towards the player and fades after 10 s.
pub fn experience(
    world: &mut World,
    prototypes: &PrototypeLibrary,
    rng: &mut GameRng,
    position: Vec2,
    value: f32,
    age: f32,
) -> Entity {
    let mut shape = prototypes.shape(ShapeKind::Triangle, Vec2::ZERO);
    shape.theta = position.y;
    shape.scale = 0.4 * (1.0 + 0.1 * value);
    shape.color = Color::rgb(rng.byte(0, 127), rng.byte(192, 255), rng.byte(0, 127));
    shape.move_to(position);

    world.push((
        shape,
        Physics::default(),
        Particle {
            lifespan: 30.0,
            fade_begin: 20.0,
        },
        Experience { value, age },
    ))
}

/// Debris thrown out along `direction`.
pub fn particle(
    world: &mut World,
    prototypes: &PrototypeLibrary,
    rng: &mut GameRng,
    position: Vec2,
    direction: Vec2,
    color: Color,
    kind: ShapeKind,
) -> Entity {
    let mut shape = prototypes.shape(kind, Vec2::ZERO);
    shape.color = color;
    shape.theta = rng.angle();
    shape.move_to(position);

    let physics = Physics {
        force: direction.normalize_or_zero() * 600000.0,
        ..Physics::default()
    };
    world.push((shape, Particle::default(), physics))
}

/// Four random particles where an enemy died.
pub fn death_burst(world: &mut World, prototypes: &PrototypeLibrary, rng: &mut GameRng, position: Vec2) {
    for _ in 0..4 {
        let direction = geometry::from_polar(1.0, rng.angle());
        let color = rng.random_color();
        let kind = ShapeKind::ALL[rng.index(ShapeKind::ALL.len())];
        particle(world, prototypes, rng, position, direction, color, kind);
    }
}
