use std::time::Instant;

use super::{AssetLoader, DrawSurface, InputState, Viewport};

/// Everything the host knows at the start of one display refresh.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    /// Milliseconds since the loop started; monotonically increasing.
    pub timestamp_ms: f64,
    /// Wall-clock instant matching `timestamp_ms`, for polling asset
    /// timeouts.
    pub now: Instant,
    pub input: &'a InputState,
    pub viewport: Viewport,
}

/// The simulation the host drives: one `frame` call per refresh, on the
/// loop thread, forever.
pub trait Scene {
    /// Requests assets. Called once before the first frame.
    fn load(&mut self, loader: &AssetLoader);

    fn frame(&mut self, context: FrameContext<'_>, surface: &mut dyn DrawSurface);

    fn shutdown(&mut self) {}
}
