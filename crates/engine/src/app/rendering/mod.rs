mod canvas;
mod renderer;
mod surface;
mod text;
mod transform;

pub use canvas::FrameCanvas;
pub(crate) use renderer::Renderer;
pub use surface::{CommandRecorder, DrawCommand, DrawSurface, Rgba, TextStyle};
pub use text::{GLYPH_ADVANCE_CELLS, LINE_ADVANCE_CELLS};
pub use transform::{AffineTransform, PixelRect, Rect, Vec2, Viewport};
