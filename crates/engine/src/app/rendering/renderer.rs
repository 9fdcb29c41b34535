use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use super::canvas::FrameCanvas;
use super::transform::Viewport;

/// Owns the window's pixel surface. The frame buffer is sized to the
/// window's physical (device) pixels and rebuilt on every resize.
pub(crate) struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub(crate) fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    pub(crate) fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Zero-sized requests (minimised windows) keep the previous surface.
    pub(crate) fn resize(&mut self, width: u32, height: u32) -> Result<bool, Error> {
        if width == 0 || height == 0 {
            return Ok(false);
        }
        if self.viewport.width == width && self.viewport.height == height {
            return Ok(false);
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(true)
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width.max(1), height.max(1), surface)
    }

    /// Hands a canvas over the back buffer to `draw`, then presents it.
    pub(crate) fn render_with<F>(&mut self, draw: F) -> Result<(), Error>
    where
        F: FnOnce(&mut FrameCanvas<'_>),
    {
        if self.viewport.is_empty() {
            return Ok(());
        }
        let Viewport { width, height } = self.viewport;
        let mut canvas = FrameCanvas::new(self.pixels.frame_mut(), width, height);
        draw(&mut canvas);
        self.pixels.render()
    }
}
