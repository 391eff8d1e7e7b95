use std::collections::{HashMap, HashSet};

use legion::{Entity, IntoQuery};
use log::debug;

use super::{System, SystemContext};
use crate::game::components::{Bullet, DarkTriadMember, Enemy};
use crate::game::events::GameEvent;
use crate::game::shape::Shape;

/// Bullets this far outside the screen are culled.
const CULL_MARGIN: f32 = 10.0;

/// Moves bullet lifetimes along and resolves bullet hits on enemies.
#[derive(Debug, Default)]
pub struct BulletSystem;

impl System for BulletSystem {
    fn pre_update(&mut self, ctx: &mut SystemContext) {
        let screen = ctx.screen;
        let mut query = <(Entity, &Bullet, &Shape)>::query();
        let expired: Vec<Entity> = query
            .iter(ctx.world)
            .filter(|(_, bullet, shape)| {
                let p = shape.position;
                p.x < -CULL_MARGIN
                    || p.y < -CULL_MARGIN
                    || p.x > screen.x + CULL_MARGIN
                    || p.y > screen.y + CULL_MARGIN
                    || bullet.duration < 0.0
            })
            .map(|(entity, _, _)| *entity)
            .collect();

        for entity in expired {
            ctx.world.remove(entity);
        }
    }

    fn update(&mut self, ctx: &mut SystemContext, dt: f32) {
        let mut enemy_query = <(Entity, &Enemy, &Shape)>::query();
        let enemies: Vec<(Entity, Shape)> = enemy_query
            .iter(ctx.world)
            .map(|(entity, _, shape)| (*entity, shape.clone()))
            .collect();
        let mut health: HashMap<Entity, f32> = enemy_query
            .iter(ctx.world)
            .map(|(entity, enemy, _)| (*entity, enemy.health))
            .collect();

        let mut member_query = <(Entity, &DarkTriadMember)>::query();
        let triad: HashSet<Entity> = member_query.iter(ctx.world).map(|(entity, _)| *entity).collect();

        let mut bullet_query = <(Entity, &Bullet, &Shape)>::query();
        let bullets: Vec<(Entity, Bullet, Shape)> = bullet_query
            .iter(ctx.world)
            .map(|(entity, bullet, shape)| (*entity, bullet.clone(), shape.clone()))
            .collect();

        let mut killed: HashSet<Entity> = HashSet::new();
        let mut spent: Vec<Entity> = Vec::new();
        let mut survivors: Vec<(Entity, Bullet)> = Vec::new();

        for (bullet_entity, mut bullet, bullet_shape) in bullets {
            bullet.duration -= dt;
            let mut destroyed = false;

            for (enemy_entity, enemy_shape) in &enemies {
                if killed.contains(enemy_entity) || bullet.last_hit == Some(*enemy_entity) {
                    continue;
                }

                let reach = enemy_shape.scale * enemy_shape.scale * 64.0;
                if (bullet_shape.position - enemy_shape.position).length_squared() > reach {
                    continue;
                }

                if !bullet_shape.intersects(enemy_shape) {
                    continue;
                }

                bullet.last_hit = Some(*enemy_entity);
                bullet.hit_count -= 1;
                let Some(enemy_health) = health.get_mut(enemy_entity) else {
                    continue;
                };
                *enemy_health -= bullet.damage;

                if *enemy_health <= 0.0 && !triad.contains(enemy_entity) {
                    for shard in bullet.on_kill.spawns(enemy_shape.position, ctx.rng) {
                        ctx.events.push(GameEvent::SpawnBullet(shard));
                    }
                    ctx.events.push(GameEvent::EnemyDeath {
                        position: enemy_shape.position,
                        gives_xp: true,
                    });
                    killed.insert(*enemy_entity);
                }

                if bullet.hit_count <= 0 {
                    destroyed = true;
                    break;
                }
            }

            if destroyed {
                spent.push(bullet_entity);
            } else {
                survivors.push((bullet_entity, bullet));
            }
        }

        let mut enemy_write = <(Entity, &mut Enemy)>::query();
        for (entity, enemy) in enemy_write.iter_mut(ctx.world) {
            if let Some(h) = health.get(entity) {
                enemy.health = *h;
            }
        }

        let survivors: HashMap<Entity, Bullet> = survivors.into_iter().collect();
        let mut bullet_write = <(Entity, &mut Bullet)>::query();
        for (entity, bullet) in bullet_write.iter_mut(ctx.world) {
            if let Some(updated) = survivors.get(entity) {
                *bullet = updated.clone();
            }
        }

        if !killed.is_empty() {
            debug!("Bullets killed {} enemies", killed.len());
        }
        for entity in killed.into_iter().chain(spent) {
            ctx.world.remove(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::graphics::Color;
    use crate::game::events::BulletSpawn;
    use crate::game::shape::ShapeKind;
    use crate::game::spawn;
    use crate::game::systems::read_component;
    use crate::game::systems::testing::Harness;
    use crate::game::weapon::OnKill;
    use glam::Vec2;

    fn shot(position: Vec2, damage: f32, hit_count: i32) -> BulletSpawn {
        BulletSpawn {
            position,
            initial_velocity: Vec2::new(1.0, 0.0),
            hit_count,
            damage,
            duration: 5.0,
            angular_velocity: 0.0,
            scale: 1.0,
            shape: ShapeKind::Square,
            color: Color::WHITE,
            on_kill: OnKill::None,
        }
    }

    #[test]
    fn kill_emits_death_and_removes_both() {
        let mut harness = Harness::new();
        let at = Vec2::new(100.0, 100.0);
        let enemy = spawn::enemy(&mut harness.world, &harness.prototypes, at, Color::YELLOW);
        let bullet = spawn::bullet(&mut harness.world, &harness.prototypes, &shot(at, 10.0, 1));

        BulletSystem.update(&mut harness.ctx(), 0.01);

        assert!(!harness.world.contains(enemy));
        assert!(!harness.world.contains(bullet));
        assert_eq!(
            harness.events.drain(),
            vec![GameEvent::EnemyDeath {
                position: at,
                gives_xp: true
            }]
        );
    }

    #[test]
    fn piercing_bullet_survives_and_remembers_target() {
        let mut harness = Harness::new();
        let at = Vec2::new(100.0, 100.0);
        let enemy = spawn::enemy(&mut harness.world, &harness.prototypes, at, Color::YELLOW);
        let bullet = spawn::bullet(&mut harness.world, &harness.prototypes, &shot(at, 3.0, 3));

        let mut system = BulletSystem;
        system.update(&mut harness.ctx(), 0.01);
        system.update(&mut harness.ctx(), 0.01);

        let state = read_component::<Bullet>(&mut harness.world, bullet).unwrap();
        assert_eq!(state.hit_count, 2);
        assert_eq!(state.last_hit, Some(enemy));
        assert!((state.duration - 4.98).abs() < 1e-4);
        assert_eq!(read_component::<Enemy>(&mut harness.world, enemy).unwrap().health, 7.0);
    }

    #[test]
    fn dark_triad_members_are_not_destroyed() {
        let mut harness = Harness::new();
        let at = Vec2::new(100.0, 100.0);
        let enemy = spawn::enemy(&mut harness.world, &harness.prototypes, at, Color::YELLOW);
        harness.world.entry(enemy).unwrap().add_component(DarkTriadMember);
        spawn::bullet(&mut harness.world, &harness.prototypes, &shot(at, 50.0, 1));

        BulletSystem.update(&mut harness.ctx(), 0.01);

        assert!(harness.world.contains(enemy));
        assert_eq!(read_component::<Enemy>(&mut harness.world, enemy).unwrap().health, -40.0);
        assert!(harness.events.is_empty());
    }

    #[test]
    fn burst_kill_throws_shards() {
        let mut harness = Harness::new();
        let at = Vec2::new(100.0, 100.0);
        spawn::enemy(&mut harness.world, &harness.prototypes, at, Color::YELLOW);
        let mut burst = shot(at, 100.0, 1);
        burst.on_kill = OnKill::Burst;
        spawn::bullet(&mut harness.world, &harness.prototypes, &burst);

        BulletSystem.update(&mut harness.ctx(), 0.01);

        let shards = harness
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::SpawnBullet(_)))
            .count();
        assert_eq!(shards, 32);
    }

    #[test]
    fn offscreen_and_expired_bullets_are_culled() {
        let mut harness = Harness::new();
        let outside = spawn::bullet(&mut harness.world, &harness.prototypes, &shot(Vec2::new(-20.0, 5.0), 1.0, 1));
        let mut old = shot(Vec2::new(50.0, 50.0), 1.0, 1);
        old.duration = -1.0;
        let expired = spawn::bullet(&mut harness.world, &harness.prototypes, &old);
        let live = spawn::bullet(&mut harness.world, &harness.prototypes, &shot(Vec2::new(50.0, 50.0), 1.0, 1));

        BulletSystem.pre_update(&mut harness.ctx());

        assert!(!harness.world.contains(outside));
        assert!(!harness.world.contains(expired));
        assert!(harness.world.contains(live));
    }
}
