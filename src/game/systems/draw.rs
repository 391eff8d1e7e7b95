use legion::IntoQuery;

use super::{read_component, System, SystemContext};
use crate::game::components::Player;
use crate::game::shape::Shape;

/// Draws every shape, then the player's weapons on top.
#[derive(Debug, Default)]
pub struct DrawSystem;

impl System for DrawSystem {
    fn update(&mut self, ctx: &mut SystemContext, _dt: f32) {
        let mut query = <&Shape>::query();
        for shape in query.iter(ctx.world) {
            shape.draw(ctx.canvas);
        }

        if let Some(player) = read_component::<Player>(ctx.world, ctx.player) {
            for weapon in &player.weapons {
                weapon.draw(ctx.canvas);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::graphics::Color;
    use crate::game::spawn;
    use crate::game::systems::testing::Harness;
    use glam::Vec2;

    #[test]
    fn draws_shapes_and_weapons() {
        let mut harness = Harness::new();
        spawn::enemy(&mut harness.world, &harness.prototypes, Vec2::new(50.0, 50.0), Color::YELLOW);

        DrawSystem.update(&mut harness.ctx(), 0.016);

        // Player triangle, enemy square and the Pierce weapon's cursor.
        assert_eq!(harness.canvas.game_vertices().len(), 3 + 6 + 6);
    }
}
