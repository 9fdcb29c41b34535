mod assets;
mod clock;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use assets::{AssetBatch, AssetError, AssetHandle, AssetLoader, AssetStatus, Sprite};
pub use clock::{Clock, FrameTiming};
pub use input::{InputSignal, InputState};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::{
    AffineTransform, CommandRecorder, DrawCommand, DrawSurface, FrameCanvas, PixelRect, Rect,
    Rgba, TextStyle, Vec2, Viewport, GLYPH_ADVANCE_CELLS, LINE_ADVANCE_CELLS,
};
pub use scene::{FrameContext, Scene};
