//! Engine module containing graphics, input, window management and audio.

pub mod audio;
pub mod graphics;
pub mod input;
pub mod window;

// Re-export commonly used types
pub use audio::{Audio, AudioBackend, RodioBackend, SilentBackend};
pub use graphics::{Canvas, Color, Renderer, Vertex};
pub use input::{InputHandler, InputState};
pub use window::WindowManager;
