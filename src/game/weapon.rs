//! Player weapons.
//!
//! A weapon sits on one of the player's weapon points, turns to face the aim
//! direction and turns accumulated time into bullets.

use std::f32::consts::PI;

use glam::Vec2;

use crate::engine::graphics::{Canvas, Color};
use crate::game::events::{BulletSpawn, EventQueue, GameEvent};
use crate::game::geometry;
use crate::game::random::GameRng;
use crate::game::shape::{PrototypeLibrary, Shape, ShapeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponKind {
    Standard,
    Pierce,
    Burst,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 3] = [WeaponKind::Standard, WeaponKind::Pierce, WeaponKind::Burst];

    pub fn name(self) -> &'static str {
        match self {
            WeaponKind::Standard => "Standard",
            WeaponKind::Pierce => "Pierce",
            WeaponKind::Burst => "Burst",
        }
    }
}

/// What happens where a bullet kills an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnKill {
    #[default]
    None,
    Burst,
}

const BURST_SHARDS: usize = 32;

impl OnKill {
    pub fn spawns(self, position: Vec2, rng: &mut GameRng) -> Vec<BulletSpawn> {
        match self {
            OnKill::None => Vec::new(),
            OnKill::Burst => burst_shards(position, rng),
        }
    }
}

/// Shards thrown out by a Burst kill.
pub fn burst_shards(position: Vec2, rng: &mut GameRng) -> Vec<BulletSpawn> {
    (0..BURST_SHARDS)
        .map(|_| {
            let r1 = rng.range(PI, -PI);
            let r2 = rng.range(PI, -PI);
            BulletSpawn {
                position,
                initial_velocity: geometry::from_polar(200.0 + r1, r2),
                hit_count: 1,
                damage: 10.0,
                duration: 3.0,
                angular_velocity: r1 + r2,
                scale: 0.4,
                shape: ShapeKind::Square,
                color: rng.random_red_color(),
                on_kill: OnKill::None,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeaponStats {
    pub projectile_count: u32,
    pub hit_count: i32,
    pub aim_variance: f32,
    pub damage: f32,
    /// Seconds of charge per volley.
    pub fire_cost: f32,
    pub angular_velocity: f32,
    pub duration: f32,
    pub initial_velocity: f32,
    pub scale: f32,
    pub color: Color,
    pub bullet_shape: ShapeKind,
    pub on_kill: OnKill,
}

impl Default for WeaponStats {
    fn default() -> Self {
        Self {
            projectile_count: 1,
            hit_count: 1,
            aim_variance: 0.2,
            damage: 10.0,
            fire_cost: 0.35,
            angular_velocity: 0.0,
            duration: 10.0,
            initial_velocity: 250.0,
            scale: 0.4,
            color: Color::WHITE,
            bullet_shape: ShapeKind::Triangle,
            on_kill: OnKill::None,
        }
    }
}

impl WeaponStats {
    pub fn for_kind(kind: WeaponKind) -> Self {
        match kind {
            WeaponKind::Standard => Self::default(),
            WeaponKind::Pierce => Self {
                hit_count: 3,
                aim_variance: 0.1,
                damage: 30.0,
                fire_cost: 1.0,
                initial_velocity: 600.0,
                bullet_shape: ShapeKind::Cursor,
                ..Self::default()
            },
            WeaponKind::Burst => Self {
                aim_variance: 0.05,
                damage: 100.0,
                fire_cost: 3.0,
                initial_velocity: 150.0,
                bullet_shape: ShapeKind::Pentagon,
                on_kill: OnKill::Burst,
                ..Self::default()
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Weapon {
    kind: WeaponKind,
    stats: WeaponStats,
    level: u32,
    /// Charge towards the next volley.
    power: f32,
    aim: Vec2,
    position: Vec2,
    shape: Shape,
}

impl Weapon {
    pub fn new(kind: WeaponKind, prototypes: &PrototypeLibrary) -> Self {
        let stats = WeaponStats::for_kind(kind);
        let mut shape = Shape::new(prototypes.get(stats.bullet_shape));
        shape.color = stats.color;
        Self {
            kind,
            stats,
            level: 1,
            power: 0.0,
            aim: Vec2::X,
            position: Vec2::ZERO,
            shape,
        }
    }

    pub fn kind(&self) -> WeaponKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn stats(&self) -> &WeaponStats {
        &self.stats
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn aim(&mut self, direction: Vec2) {
        self.aim = direction;
        self.shape.theta = direction.y.atan2(direction.x) + PI / 2.0;
        self.shape.refresh();
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.shape.move_to(position);
    }

    pub fn update(&mut self, dt: f32, rng: &mut GameRng, events: &mut EventQueue) {
        self.power += dt;

        let heading = self.aim.y.atan2(self.aim.x);
        while self.power > self.stats.fire_cost {
            for _ in 0..self.stats.projectile_count {
                let variance = self.stats.aim_variance;
                let angle = heading + rng.range(-variance, variance);
                events.push(GameEvent::SpawnBullet(BulletSpawn {
                    position: self.position,
                    initial_velocity: geometry::from_polar(self.stats.initial_velocity, angle),
                    hit_count: self.stats.hit_count,
                    damage: self.stats.damage,
                    duration: self.stats.duration,
                    angular_velocity: self.stats.angular_velocity,
                    scale: self.stats.scale,
                    shape: self.stats.bullet_shape,
                    color: self.stats.color,
                    on_kill: self.stats.on_kill,
                }));
            }
            self.power -= self.stats.fire_cost;
        }
    }

    /// Improve the weapon `count` times.
    pub fn level_up(&mut self, count: u32) {
        let n = count as i32;
        let stats = &mut self.stats;
        self.level += count;
        match self.kind {
            WeaponKind::Standard => {
                stats.fire_cost *= 0.95f32.powi(n);
                stats.damage *= 1.1f32.powi(n);
                stats.aim_variance *= 0.99f32.powi(n);
            }
            WeaponKind::Pierce => {
                stats.damage *= 1.2f32.powi(n);
                stats.aim_variance *= 0.99f32.powi(n);
                stats.hit_count = 3 + (self.level / 2) as i32;
            }
            WeaponKind::Burst => {
                stats.damage *= 1.3f32.powi(n);
                stats.initial_velocity += 25.0 * count as f32;
                stats.fire_cost = (stats.fire_cost * 0.95f32.powi(n)).max(1.5);
            }
        }
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        self.shape.draw(canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weapon(kind: WeaponKind) -> Weapon {
        Weapon::new(kind, &PrototypeLibrary::new())
    }

    fn bullets(events: &mut EventQueue) -> Vec<BulletSpawn> {
        events
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::SpawnBullet(spawn) => Some(spawn),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn fires_once_per_fire_cost() {
        let mut rng = GameRng::seeded(1);
        let mut events = EventQueue::new();
        let mut standard = weapon(WeaponKind::Standard);
        standard.set_position(Vec2::new(10.0, 20.0));

        standard.update(0.3, &mut rng, &mut events);
        assert!(events.is_empty());

        standard.update(0.5, &mut rng, &mut events);
        let fired = bullets(&mut events);
        assert_eq!(fired.len(), 2);
        assert!(fired.iter().all(|b| b.position == Vec2::new(10.0, 20.0)));
        assert!(fired.iter().all(|b| (b.initial_velocity.length() - 250.0).abs() < 1e-3));
    }

    #[test]
    fn bullets_follow_aim_within_variance() {
        let mut rng = GameRng::seeded(2);
        let mut events = EventQueue::new();
        let mut pierce = weapon(WeaponKind::Pierce);
        pierce.aim(Vec2::new(0.0, -1.0));

        pierce.update(10.5, &mut rng, &mut events);
        let fired = bullets(&mut events);
        assert_eq!(fired.len(), 10);
        for bullet in fired {
            let angle = bullet.initial_velocity.y.atan2(bullet.initial_velocity.x);
            assert!((angle + PI / 2.0).abs() <= 0.1 + 1e-4);
            assert_eq!(bullet.hit_count, 3);
            assert_eq!(bullet.shape, ShapeKind::Cursor);
        }
    }

    #[test]
    fn pierce_gains_hits_every_other_level() {
        let mut pierce = weapon(WeaponKind::Pierce);
        pierce.level_up(1);
        assert_eq!(pierce.level(), 2);
        assert_eq!(pierce.stats().hit_count, 4);
        pierce.level_up(3);
        assert_eq!(pierce.stats().hit_count, 5);
        assert!((pierce.stats().damage - 30.0 * 1.2f32.powi(4)).abs() < 1e-2);
    }

    #[test]
    fn burst_fire_cost_has_a_floor() {
        let mut burst = weapon(WeaponKind::Burst);
        burst.level_up(40);
        assert_eq!(burst.stats().fire_cost, 1.5);
        assert_eq!(burst.stats().initial_velocity, 150.0 + 25.0 * 40.0);
    }

    #[test]
    fn burst_kill_throws_red_shards() {
        let mut rng = GameRng::seeded(3);
        let shards = OnKill::Burst.spawns(Vec2::new(5.0, 5.0), &mut rng);
        assert_eq!(shards.len(), 32);
        for shard in &shards {
            let speed = shard.initial_velocity.length();
            assert!(speed >= 200.0 - PI - 1e-3 && speed <= 200.0 + PI + 1e-3);
            assert!(shard.color.r >= 128);
            assert_eq!(shard.on_kill, OnKill::None);
        }
        assert!(OnKill::None.spawns(Vec2::ZERO, &mut rng).is_empty());
    }

    #[test]
    fn aim_turns_the_weapon_shape() {
        let mut standard = weapon(WeaponKind::Standard);
        standard.aim(Vec2::X);
        assert!((standard.shape.theta - PI / 2.0).abs() < 1e-5);
    }
}
