//! Library entry point for Shapes, a top-down arena shooter.

pub mod config;
pub mod engine;
pub mod error;
pub mod game;

// Re-export main types for convenience
pub use config::GameConfig;
pub use error::{GameError, Result};
pub use game::App;
