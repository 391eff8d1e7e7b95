use glam::Vec2;
use log::debug;
use winit::keyboard::KeyCode;

use super::{read_component, System, SystemContext};
use crate::engine::graphics::{Color, Layer};
use crate::game::components::Player;
use crate::game::events::{GameEvent, Upgrade};
use crate::game::shape::Shape;
use crate::game::weapon::WeaponKind;

const CHOICE_COUNT: usize = 3;
const CHOICE_KEYS: [KeyCode; CHOICE_COUNT] = [KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3];

#[derive(Debug, Clone, PartialEq)]
pub struct LevelUpOption {
    pub description: String,
    pub upgrade: Upgrade,
}

/// Offers three upgrades on level-up and reports the one picked.
#[derive(Debug, Default)]
pub struct LevelUpPickSystem {
    options: Vec<LevelUpOption>,
}

impl LevelUpPickSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(&self) -> &[LevelUpOption] {
        &self.options
    }

    fn roll_options(&mut self, ctx: &mut SystemContext) {
        self.options.clear();

        let (Some(player), Some(shape)) = (
            read_component::<Player>(ctx.world, ctx.player),
            read_component::<Shape>(ctx.world, ctx.player),
        ) else {
            return;
        };

        if player.weapons.len() < shape.weapon_point_count() {
            for _ in 0..CHOICE_COUNT {
                let kind = WeaponKind::ALL[ctx.rng.index(WeaponKind::ALL.len())];
                self.options.push(LevelUpOption {
                    description: format!("Gain a {} weapon", kind.name()),
                    upgrade: Upgrade::GainWeapon(kind),
                });
            }
            return;
        }

        if player.weapons.is_empty() {
            return;
        }
        for _ in 0..CHOICE_COUNT {
            let slot = ctx.rng.index(player.weapons.len());
            let weapon = &player.weapons[slot];
            self.options.push(LevelUpOption {
                description: format!(
                    "Improve {} weapon from level {} to {}",
                    weapon.name(),
                    weapon.level(),
                    weapon.level() + 1
                ),
                upgrade: Upgrade::ImproveWeapon { slot },
            });
        }
    }
}

impl System for LevelUpPickSystem {
    fn update(&mut self, ctx: &mut SystemContext, _dt: f32) {
        let previous = ctx.canvas.layer();
        ctx.canvas.set_layer(Layer::Ui);
        let mut pos = Vec2::new(100.0, 300.0);
        for option in &self.options {
            ctx.canvas.draw_string(pos, &option.description, Color::WHITE, Vec2::splat(3.0));
            pos.y += 30.0;
        }
        ctx.canvas.set_layer(previous);

        let picked = CHOICE_KEYS
            .iter()
            .zip(&self.options)
            .find(|(key, _)| ctx.input.key_pressed(**key))
            .map(|(_, option)| option.upgrade);

        if let Some(upgrade) = picked {
            debug!("Picked upgrade {:?}", upgrade);
            ctx.events.push(GameEvent::LevelUpChosen(upgrade));
            self.options.clear();
        }
    }

    fn on_event(&mut self, ctx: &mut SystemContext, event: &GameEvent) {
        match event {
            GameEvent::LevelUp => self.roll_options(ctx),
            GameEvent::LevelUpChosen(_) => self.options.clear(),
            _ => {}
        }
    }
}
