use glam::Vec2;
use log::info;
use winit::keyboard::KeyCode;

use super::{read_component, System, SystemContext};
use crate::game::components::Player;
use crate::game::events::GameEvent;
use crate::game::shape::Shape;

/// Turns held keys and the mouse into a `PlayerInput` event every frame.
#[derive(Debug, Default)]
pub struct KeyboardInputSystem;

impl System for KeyboardInputSystem {
    fn pre_update(&mut self, ctx: &mut SystemContext) {
        let mut direction = Vec2::ZERO;
        if ctx.input.key_held(KeyCode::KeyW) {
            direction.y -= 1.0;
        }
        if ctx.input.key_held(KeyCode::KeyS) {
            direction.y += 1.0;
        }
        if ctx.input.key_held(KeyCode::KeyA) {
            direction.x -= 1.0;
        }
        if ctx.input.key_held(KeyCode::KeyD) {
            direction.x += 1.0;
        }

        let Some(shape) = ctx.player_shape() else {
            return;
        };
        let aim = (ctx.input.mouse_position() - shape.position).normalize_or_zero();

        ctx.events.push(GameEvent::PlayerInput {
            move_direction: direction.normalize_or_zero(),
            aim_direction: aim,
            fire: ctx.input.left_pressed(),
        });
    }

    fn update(&mut self, _ctx: &mut SystemContext, _dt: f32) {}
}

/// Keeps weapons on their mount points and lets them fire.
#[derive(Debug, Default)]
pub struct PlayerWeaponSystem;

impl System for PlayerWeaponSystem {
    fn update(&mut self, ctx: &mut SystemContext, dt: f32) {
        let Some(shape) = read_component::<Shape>(ctx.world, ctx.player) else {
            return;
        };
        let points = shape.weapon_points();

        let Some(mut entry) = ctx.world.entry(ctx.player) else {
            return;
        };
        let Ok(player) = entry.get_component_mut::<Player>() else {
            return;
        };

        for (weapon, point) in player.weapons.iter_mut().zip(points) {
            weapon.set_position(point);
            weapon.update(dt, ctx.rng, ctx.events);
        }
    }
}

/// Converts banked experience into levels.
#[derive(Debug, Default)]
pub struct PlayerStateSystem;

impl System for PlayerStateSystem {
    fn update(&mut self, ctx: &mut SystemContext, _dt: f32) {
        let Some(mut entry) = ctx.world.entry(ctx.player) else {
            return;
        };
        let Ok(player) = entry.get_component_mut::<Player>() else {
            return;
        };

        if player.experience >= player.xp_to_next_level {
            player.experience -= player.xp_to_next_level;
            player.xp_to_next_level *= 1.1;
            player.level += 1;
            info!("Player reached level {}", player.level);
            ctx.events.push(GameEvent::LevelUp);
        }
    }
}
