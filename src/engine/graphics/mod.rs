pub mod canvas;
pub mod color;
pub mod font;
pub mod renderer;
pub mod vertex;

pub use canvas::{Canvas, Layer};
pub use color::Color;
pub use renderer::{Letterbox, Renderer};
pub use vertex::Vertex;
