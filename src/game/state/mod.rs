//! Top-level game states and the machine that switches between them.

pub mod gameplay;
pub mod menu;

use glam::Vec2;
use log::info;

use crate::config::GameplayConfig;
use crate::engine::audio::Audio;
use crate::engine::graphics::Canvas;
use crate::engine::input::InputState;

pub use gameplay::{GameplayState, SubState};
pub use menu::MenuState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStateKind {
    Menu,
    Gameplay,
}

/// What a state gets to work with for one frame.
pub struct Frame<'a> {
    pub input: &'a InputState,
    pub canvas: &'a mut Canvas,
    pub audio: &'a mut Audio,
}

pub trait State {
    fn enter(&mut self, _frame: &mut Frame) {}
    /// Runs one frame and names the state to run next.
    fn update(&mut self, frame: &mut Frame, dt: f32) -> GameStateKind;
    fn exit(&mut self, _frame: &mut Frame) {}
}

/// Owns the running state. A state is built fresh every time it is entered.
pub struct StateMachine {
    kind: GameStateKind,
    state: Box<dyn State>,
    entered: bool,
    gameplay: GameplayConfig,
    /// Logical screen size handed to new states.
    screen: Vec2,
}

impl StateMachine {
    pub fn new(gameplay: GameplayConfig, screen: Vec2) -> Self {
        Self {
            kind: GameStateKind::Menu,
            state: build(GameStateKind::Menu, &gameplay, screen),
            entered: false,
            gameplay,
            screen,
        }
    }

    pub fn kind(&self) -> GameStateKind {
        self.kind
    }

    pub fn update(&mut self, frame: &mut Frame, dt: f32) {
        if !self.entered {
            self.state.enter(frame);
            self.entered = true;
        }

        let next = self.state.update(frame, dt);
        if next != self.kind {
            info!("Switching state {:?} -> {:?}", self.kind, next);
            self.state.exit(frame);
            self.kind = next;
            self.state = build(next, &self.gameplay, self.screen);
            self.entered = false;
        }
    }
}

fn build(kind: GameStateKind, config: &GameplayConfig, screen: Vec2) -> Box<dyn State> {
    match kind {
        GameStateKind::Menu => Box::new(MenuState::new(config.seed)),
        GameStateKind::Gameplay => Box::new(GameplayState::new(config, screen)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_moves_menu_to_gameplay() {
        let config = GameplayConfig {
            seed: Some(3),
            ..GameplayConfig::default()
        };
        let mut machine = StateMachine::new(config, Vec2::new(1280.0, 960.0));
        let mut canvas = Canvas::new(Vec2::new(1280.0, 960.0));
        let mut audio = Audio::silent();

        let idle = InputState::default();
        let mut frame = Frame {
            input: &idle,
            canvas: &mut canvas,
            audio: &mut audio,
        };
        machine.update(&mut frame, 0.016);
        assert_eq!(machine.kind(), GameStateKind::Menu);

        let click = InputState::default().with_left_click();
        let mut frame = Frame {
            input: &click,
            canvas: &mut canvas,
            audio: &mut audio,
        };
        machine.update(&mut frame, 0.016);
        assert_eq!(machine.kind(), GameStateKind::Gameplay);

        let mut frame = Frame {
            input: &idle,
            canvas: &mut canvas,
            audio: &mut audio,
        };
        machine.update(&mut frame, 0.016);
        assert_eq!(machine.kind(), GameStateKind::Gameplay);
    }
}
