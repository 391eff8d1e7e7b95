use legion::IntoQuery;

use super::{with_component, System, SystemContext};
use crate::game::components::{Enemy, Physics, Player};
use crate::game::shape::Shape;

const CHASE_FORCE: f32 = 4500.0;
const RECOIL_FORCE: f32 = -450000.0;

/// Pushes every enemy towards the player.
#[derive(Debug, Default)]
pub struct EnemyMovementSystem;

impl System for EnemyMovementSystem {
    fn update(&mut self, ctx: &mut SystemContext, _dt: f32) {
        let Some(player) = ctx.player_shape() else {
            return;
        };

        let mut query = <(&Enemy, &Shape, &mut Physics)>::query();
        for (_, shape, physics) in query.iter_mut(ctx.world) {
            let direction = (player.position - shape.position).normalize_or_zero();
            physics.force += direction * CHASE_FORCE;
        }
    }
}

/// Enemies touching the player hurt it and bounce off, then wait out their
/// cooldown.
#[derive(Debug, Default)]
pub struct EnemyAttackSystem;

impl System for EnemyAttackSystem {
    fn update(&mut self, ctx: &mut SystemContext, dt: f32) {
        let Some(player) = ctx.player_shape() else {
            return;
        };

        let mut damage = 0.0;
        let mut query = <(&mut Enemy, &Shape, &mut Physics)>::query();
        for (enemy, shape, physics) in query.iter_mut(ctx.world) {
            enemy.attack_timer += dt;

            if enemy.attack_timer > enemy.attack_cooldown && shape.intersects(&player) {
                let direction = (player.position - shape.position).normalize_or_zero();
                physics.force += direction * RECOIL_FORCE;
                damage += enemy.damage;
                enemy.attack_timer = 0.0;
            }
        }

        if damage > 0.0 {
            with_component::<Player, _>(ctx.world, ctx.player, |p| p.health -= damage);
        }
    }
}
