use std::f32::consts::{PI, TAU};

use glam::Vec2;
use legion::{Entity, IntoQuery, World};

use super::{Frame, GameStateKind, State};
use crate::engine::graphics::{Canvas, Color, Layer};
use crate::game::components::Drift;
use crate::game::geometry::{self, lerp};
use crate::game::random::GameRng;
use crate::game::shape::{PrototypeLibrary, Shape, ShapeKind};

const MAX_DRIFTERS: usize = 15;
const SPAWN_INTERVAL: f32 = 1.0;
const FADE_IN_TIME: f32 = 2.0;
/// Title glow layers, darkest first.
const GLOW_STEP: usize = 16;

/// Title screen: shapes float across behind a pulsing title until the
/// player clicks.
pub struct MenuState {
    world: World,
    rng: GameRng,
    prototypes: PrototypeLibrary,
    total_time: f32,
    spawn_timer: f32,
}

impl MenuState {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            world: World::default(),
            rng: GameRng::from_seed_option(seed),
            prototypes: PrototypeLibrary::new(),
            total_time: 0.0,
            spawn_timer: 0.0,
        }
    }

    pub fn drifter_count(&self) -> usize {
        <&Drift>::query().iter(&self.world).count()
    }

    fn background() -> Color {
        Color::VERY_DARK_GREY.scaled(0.8)
    }

    fn spawn_drifter(&mut self, screen: Vec2) {
        let start_angle = self.rng.angle();
        let end_angle = start_angle + PI + (self.rng.angle() - PI) / 4.0;
        let start = geometry::from_polar(screen.x, start_angle) + screen / 2.0;
        let end = geometry::from_polar(screen.x, end_angle) + screen / 2.0;

        let kind = ShapeKind::ALL[self.rng.index(ShapeKind::ALL.len())];
        let mut shape = self.prototypes.shape(kind, Vec2::ZERO);
        shape.scale = 20.0 + 3.0 * self.rng.range(0.0, TAU);
        shape.color = self.rng.random_color().with_alpha(128);
        shape.move_to(start);

        let sign = if self.rng.chance(0.5) { -1.0 } else { 1.0 };
        let drift = Drift {
            start,
            end,
            total_time: 10.0 + self.rng.range(0.0, TAU),
            current_time: 0.0,
            spin: shape.scale / 40.0 * sign,
        };
        self.world.push((shape, drift));
    }

    fn move_drifters(&mut self, dt: f32) {
        let mut finished = Vec::new();
        let mut query = <(Entity, &mut Drift, &mut Shape)>::query();
        for (entity, drift, shape) in query.iter_mut(&mut self.world) {
            drift.current_time += dt;
            if drift.finished() {
                finished.push(*entity);
                continue;
            }
            shape.theta += dt * drift.spin;
            shape.move_to(lerp(drift.start, drift.end, drift.progress()));
        }
        for entity in finished {
            self.world.remove(entity);
        }
    }

    fn draw_title(&self, canvas: &mut Canvas) {
        let t = self.total_time;
        let screen = canvas.size();
        let mut draw = |text: &str, s: f32, color: Color, offset: Vec2| {
            let scale = Vec2::new(s + t.sin(), s + t.cos());
            let size = Canvas::text_size(text) * scale;
            canvas.draw_string((screen - size) / 2.0 + offset, text, color, scale);
        };

        for i in (0..256).step_by(GLOW_STEP) {
            let grey = Color::rgb(i as u8, i as u8, i as u8);
            draw("SHAPES", 20.0 + i as f32 * 0.01, grey, Vec2::ZERO);
            draw("Click to Start", 5.0 + i as f32 * 0.001, grey, Vec2::new(0.0, 200.0));
        }
    }
}

impl State for MenuState {
    fn update(&mut self, frame: &mut Frame, dt: f32) -> GameStateKind {
        self.total_time += dt;
        self.spawn_timer += dt;
        let screen = frame.canvas.size();
        frame.canvas.clear(Self::background());

        if self.spawn_timer > SPAWN_INTERVAL {
            self.spawn_timer -= SPAWN_INTERVAL;
            if self.drifter_count() < MAX_DRIFTERS {
                self.spawn_drifter(screen);
            }
        }
        self.move_drifters(dt);

        frame.canvas.set_layer(Layer::Game);
        for shape in <&Shape>::query().iter(&self.world) {
            shape.draw(frame.canvas);
        }

        frame.canvas.set_layer(Layer::Ui);
        self.draw_title(frame.canvas);
        let fade = lerp(1.0, 0.0, (self.total_time / FADE_IN_TIME).min(1.0));
        frame
            .canvas
            .fill_rect(Vec2::ZERO, screen, Self::background().with_alpha_f32(fade));
        frame.canvas.set_layer(Layer::Game);

        if frame.input.left_pressed() {
            GameStateKind::Gameplay
        } else {
            GameStateKind::Menu
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::audio::Audio;
    use crate::engine::input::InputState;

    fn run(menu: &mut MenuState, seconds: f32, input: &InputState) -> GameStateKind {
        let mut canvas = Canvas::new(Vec2::new(1280.0, 960.0));
        let mut audio = Audio::silent();
        let mut frame = Frame {
            input,
            canvas: &mut canvas,
            audio: &mut audio,
        };
        let mut next = GameStateKind::Menu;
        let mut elapsed = 0.0;
        while elapsed < seconds {
            next = menu.update(&mut frame, 0.1);
            elapsed += 0.1;
        }
        next
    }

    #[test]
    fn drifters_are_capped() {
        let mut menu = MenuState::new(Some(11));
        run(&mut menu, 5.05, &InputState::default());
        assert!(menu.drifter_count() >= 4);
        run(&mut menu, 60.0, &InputState::default());
        assert!(menu.drifter_count() <= MAX_DRIFTERS);
    }

    #[test]
    fn drifters_leave_after_crossing() {
        let mut menu = MenuState::new(Some(5));
        menu.spawn_drifter(Vec2::new(1280.0, 960.0));
        menu.move_drifters(20.0);
        assert_eq!(menu.drifter_count(), 0);
    }

    #[test]
    fn click_starts_the_game() {
        let mut menu = MenuState::new(Some(1));
        assert_eq!(run(&mut menu, 0.1, &InputState::default()), GameStateKind::Menu);
        let click = InputState::default().with_left_click();
        assert_eq!(run(&mut menu, 0.1, &click), GameStateKind::Gameplay);
    }
}
