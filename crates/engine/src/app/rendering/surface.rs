use crate::app::Sprite;

use super::transform::{AffineTransform, PixelRect, Rect, Vec2, Viewport};

pub type Rgba = [u8; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub color: Rgba,
    /// Device pixels per font cell; the bitmap font is 3x5 cells.
    pub scale: u32,
}

/// Primitive draw operations, as issued in order against a surface.
///
/// Every primitive carries its full placement: there is no persistent
/// transform stack to save and restore.
pub trait DrawSurface {
    fn viewport(&self) -> Viewport;

    fn fill_rect(&mut self, rect: Rect, color: Rgba);

    /// Copies `source` (in image pixels) scaled into `dest` (in device
    /// pixels).
    fn blit_region(&mut self, image: &Sprite, source: PixelRect, dest: Rect);

    /// Draws the whole image stretched over `dest`, where `dest` is expressed
    /// in the local space of `transform`.
    fn blit_transformed(&mut self, image: &Sprite, transform: AffineTransform, dest: Rect);

    /// `origin` is the top-left corner of the first glyph.
    fn draw_text(&mut self, text: &str, origin: Vec2, style: TextStyle);

    fn clear(&mut self, color: Rgba) {
        let viewport = self.viewport();
        self.fill_rect(
            Rect::new(0.0, 0.0, viewport.width as f32, viewport.height as f32),
            color,
        );
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: Rgba,
    },
    BlitRegion {
        image_size: (u32, u32),
        source: PixelRect,
        dest: Rect,
    },
    BlitTransformed {
        image_size: (u32, u32),
        transform: AffineTransform,
        dest: Rect,
    },
    Text {
        text: String,
        origin: Vec2,
        style: TextStyle,
    },
}

/// A surface that only remembers what was asked of it.
#[derive(Debug, Clone, Default)]
pub struct CommandRecorder {
    viewport: Viewport,
    commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl DrawSurface for CommandRecorder {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn blit_region(&mut self, image: &Sprite, source: PixelRect, dest: Rect) {
        self.commands.push(DrawCommand::BlitRegion {
            image_size: (image.width(), image.height()),
            source,
            dest,
        });
    }

    fn blit_transformed(&mut self, image: &Sprite, transform: AffineTransform, dest: Rect) {
        self.commands.push(DrawCommand::BlitTransformed {
            image_size: (image.width(), image.height()),
            transform,
            dest,
        });
    }

    fn draw_text(&mut self, text: &str, origin: Vec2, style: TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            origin,
            style,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_fills_the_whole_viewport() {
        let mut recorder = CommandRecorder::new(Viewport {
            width: 640,
            height: 480,
        });
        recorder.clear([1, 2, 3, 255]);

        assert_eq!(
            recorder.commands(),
            &[DrawCommand::FillRect {
                rect: Rect::new(0.0, 0.0, 640.0, 480.0),
                color: [1, 2, 3, 255],
            }]
        );
    }

    #[test]
    fn recorder_keeps_issue_order_and_take_drains() {
        let mut recorder = CommandRecorder::new(Viewport {
            width: 10,
            height: 10,
        });
        let sprite = Sprite::solid(4, 2, [0, 0, 0, 255]);
        recorder.blit_transformed(
            &sprite,
            AffineTransform::IDENTITY,
            Rect::new(0.0, 0.0, 4.0, 2.0),
        );
        recorder.draw_text(
            "FPS",
            Vec2::new(1.0, 1.0),
            TextStyle {
                color: [255; 4],
                scale: 1,
            },
        );

        let commands = recorder.take_commands();
        assert!(matches!(
            commands[0],
            DrawCommand::BlitTransformed {
                image_size: (4, 2),
                ..
            }
        ));
        assert!(matches!(&commands[1], DrawCommand::Text { text, .. } if text == "FPS"));
        assert!(recorder.commands().is_empty());
    }
}
