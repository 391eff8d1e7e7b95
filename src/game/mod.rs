//! Game-specific logic and features.

pub mod app;
pub mod boss;
pub mod components;
pub mod events;
pub mod geometry;
pub mod random;
pub mod shape;
pub mod spawn;
pub mod state;
pub mod systems;
pub mod weapon;

// Re-export commonly used types
pub use app::App;
pub use events::{EventQueue, GameEvent};
pub use random::GameRng;
pub use shape::{PrototypeLibrary, Shape, ShapeKind};
pub use state::{GameStateKind, GameplayState, MenuState, StateMachine};
