//! Input handling module
//! Collects keyboard and mouse events into per-frame snapshots.

pub mod handler;

pub use handler::{InputHandler, InputState};
