use crate::app::Sprite;

use super::surface::{DrawSurface, Rgba, TextStyle};
use super::text::{glyph_cell_is_set, glyph_rows, GLYPH_ADVANCE_CELLS, GLYPH_HEIGHT, GLYPH_WIDTH};
use super::transform::{AffineTransform, PixelRect, Rect, Vec2, Viewport};

/// Software rasterizer over an RGBA8 frame buffer.
///
/// Sampling is nearest-neighbour at pixel centres. Writes outside the frame
/// are clipped; source pixels outside the image are transparent.
pub struct FrameCanvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelSpan {
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
}

impl<'a> FrameCanvas<'a> {
    /// A frame shorter than `width * height * 4` is treated as empty.
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        let required = width as usize * height as usize * 4;
        let (width, height) = if frame.len() < required {
            (0, 0)
        } else {
            (width, height)
        };
        Self {
            frame,
            width,
            height,
        }
    }

    /// Clips a float rectangle to whole frame pixels whose centres it covers.
    fn clip_span(&self, min: Vec2, max: Vec2) -> Option<PixelSpan> {
        if !(min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite()) {
            return None;
        }
        let span = PixelSpan {
            left: ((min.x - 0.5).ceil() as i64).max(0),
            top: ((min.y - 0.5).ceil() as i64).max(0),
            right: ((max.x - 0.5).ceil() as i64).min(self.width as i64),
            bottom: ((max.y - 0.5).ceil() as i64).min(self.height as i64),
        };
        (span.left < span.right && span.top < span.bottom).then_some(span)
    }

    fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba) {
        let alpha = color[3];
        if alpha == 0 || x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let Some(dst) = self.frame.get_mut(offset..offset + 4) else {
            return;
        };
        if alpha == u8::MAX {
            dst.copy_from_slice(&color);
            return;
        }
        let src_weight = alpha as u32;
        let dst_weight = 255 - src_weight;
        for channel in 0..3 {
            let mixed = (color[channel] as u32 * src_weight + dst[channel] as u32 * dst_weight) / 255;
            dst[channel] = mixed as u8;
        }
        dst[3] = u8::MAX;
    }
}

fn sample_region(image: &Sprite, source: PixelRect, u: f32, v: f32) -> Rgba {
    let sx = (u * source.width as f32).floor();
    let sy = (v * source.height as f32).floor();
    if sx < 0.0 || sy < 0.0 || sx >= source.width as f32 || sy >= source.height as f32 {
        return [0, 0, 0, 0];
    }
    let x = source.x as u64 + sx as u64;
    let y = source.y as u64 + sy as u64;
    if x >= image.width() as u64 || y >= image.height() as u64 {
        return [0, 0, 0, 0];
    }
    image.rgba_at(x as u32, y as u32)
}

fn full_region(image: &Sprite) -> PixelRect {
    PixelRect {
        x: 0,
        y: 0,
        width: image.width(),
        height: image.height(),
    }
}

impl DrawSurface for FrameCanvas<'_> {
    fn viewport(&self) -> Viewport {
        Viewport {
            width: self.width,
            height: self.height,
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let Some(span) = self.clip_span(
            Vec2::new(rect.x, rect.y),
            Vec2::new(rect.x + rect.width, rect.y + rect.height),
        ) else {
            return;
        };
        for y in span.top..span.bottom {
            for x in span.left..span.right {
                self.blend_pixel(x, y, color);
            }
        }
    }

    fn blit_region(&mut self, image: &Sprite, source: PixelRect, dest: Rect) {
        if image.is_empty() || source.width == 0 || source.height == 0 {
            return;
        }
        if dest.width <= 0.0 || dest.height <= 0.0 {
            return;
        }
        let Some(span) = self.clip_span(
            Vec2::new(dest.x, dest.y),
            Vec2::new(dest.x + dest.width, dest.y + dest.height),
        ) else {
            return;
        };
        for y in span.top..span.bottom {
            let v = (y as f32 + 0.5 - dest.y) / dest.height;
            for x in span.left..span.right {
                let u = (x as f32 + 0.5 - dest.x) / dest.width;
                let color = sample_region(image, source, u, v);
                self.blend_pixel(x, y, color);
            }
        }
    }

    fn blit_transformed(&mut self, image: &Sprite, transform: AffineTransform, dest: Rect) {
        if image.is_empty() || dest.width <= 0.0 || dest.height <= 0.0 {
            return;
        }
        let Some(inverse) = transform.inverse() else {
            return;
        };
        let corners = dest.corners().map(|corner| transform.apply(corner));
        let min = corners.iter().fold(Vec2::new(f32::MAX, f32::MAX), |acc, p| {
            Vec2::new(acc.x.min(p.x), acc.y.min(p.y))
        });
        let max = corners.iter().fold(Vec2::new(f32::MIN, f32::MIN), |acc, p| {
            Vec2::new(acc.x.max(p.x), acc.y.max(p.y))
        });
        let Some(span) = self.clip_span(min, max) else {
            return;
        };
        let region = full_region(image);
        for y in span.top..span.bottom {
            for x in span.left..span.right {
                let local = inverse.apply(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                if !dest.contains(local) {
                    continue;
                }
                let u = (local.x - dest.x) / dest.width;
                let v = (local.y - dest.y) / dest.height;
                let color = sample_region(image, region, u, v);
                self.blend_pixel(x, y, color);
            }
        }
    }

    fn draw_text(&mut self, text: &str, origin: Vec2, style: TextStyle) {
        if style.scale == 0 {
            return;
        }
        let scale = style.scale as i64;
        let origin_x = origin.x.round() as i64;
        let origin_y = origin.y.round() as i64;
        for (index, ch) in text.chars().enumerate() {
            let Some(rows) = glyph_rows(ch) else {
                continue;
            };
            let glyph_x = origin_x + index as i64 * GLYPH_ADVANCE_CELLS as i64 * scale;
            for row in 0..GLYPH_HEIGHT {
                for col in 0..GLYPH_WIDTH {
                    if !glyph_cell_is_set(&rows, col, row) {
                        continue;
                    }
                    let cell_x = glyph_x + col as i64 * scale;
                    let cell_y = origin_y + row as i64 * scale;
                    for sy in 0..scale {
                        for sx in 0..scale {
                            self.blend_pixel(cell_x + sx, cell_y + sy, style.color);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const RED: Rgba = [255, 0, 0, 255];
    const BLUE: Rgba = [0, 0, 255, 255];

    fn pixel(frame: &[u8], width: u32, x: u32, y: u32) -> Rgba {
        let offset = ((y * width + x) * 4) as usize;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    fn count_color(frame: &[u8], color: Rgba) -> usize {
        frame
            .chunks_exact(4)
            .filter(|chunk| *chunk == color)
            .count()
    }

    /// Left column red, right column blue.
    fn two_column_sprite(height: u32) -> Sprite {
        let mut rgba = Vec::new();
        for _ in 0..height {
            rgba.extend_from_slice(&RED);
            rgba.extend_from_slice(&BLUE);
        }
        Sprite::from_rgba(2, height, rgba).expect("sprite")
    }

    #[test]
    fn fill_rect_clips_to_frame() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut canvas = FrameCanvas::new(&mut frame, 4, 4);
        canvas.fill_rect(Rect::new(-2.0, -2.0, 4.0, 4.0), RED);

        assert_eq!(count_color(&frame, RED), 4);
        assert_eq!(pixel(&frame, 4, 1, 1), RED);
        assert_eq!(pixel(&frame, 4, 2, 2), [0, 0, 0, 0]);
    }

    #[test]
    fn clear_covers_every_pixel() {
        let mut frame = vec![0u8; 3 * 2 * 4];
        FrameCanvas::new(&mut frame, 3, 2).clear(BLUE);
        assert_eq!(count_color(&frame, BLUE), 6);
    }

    #[test]
    fn short_frame_is_treated_as_empty() {
        let mut frame = vec![0u8; 7];
        let mut canvas = FrameCanvas::new(&mut frame, 4, 4);
        assert!(canvas.viewport().is_empty());
        canvas.clear(RED);
        assert!(frame.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn blit_region_scales_source_into_dest() {
        let sprite = two_column_sprite(1);
        let mut frame = vec![0u8; 4 * 2 * 4];
        let mut canvas = FrameCanvas::new(&mut frame, 4, 2);
        canvas.blit_region(
            &sprite,
            PixelRect {
                x: 0,
                y: 0,
                width: 2,
                height: 1,
            },
            Rect::new(0.0, 0.0, 4.0, 2.0),
        );

        assert_eq!(pixel(&frame, 4, 0, 0), RED);
        assert_eq!(pixel(&frame, 4, 1, 1), RED);
        assert_eq!(pixel(&frame, 4, 2, 0), BLUE);
        assert_eq!(pixel(&frame, 4, 3, 1), BLUE);
    }

    #[test]
    fn blit_region_honours_source_offset_and_negative_dest() {
        let sprite = two_column_sprite(2);
        let mut frame = vec![0u8; 2 * 2 * 4];
        let mut canvas = FrameCanvas::new(&mut frame, 2, 2);
        canvas.blit_region(
            &sprite,
            PixelRect {
                x: 1,
                y: 0,
                width: 1,
                height: 2,
            },
            Rect::new(-1.0, 0.0, 2.0, 2.0),
        );

        assert_eq!(pixel(&frame, 2, 0, 0), BLUE);
        assert_eq!(pixel(&frame, 2, 1, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn source_outside_image_is_transparent() {
        let sprite = Sprite::solid(2, 2, RED);
        let mut frame = vec![0u8; 4 * 1 * 4];
        let mut canvas = FrameCanvas::new(&mut frame, 4, 1);
        canvas.blit_region(
            &sprite,
            PixelRect {
                x: 0,
                y: 0,
                width: 4,
                height: 1,
            },
            Rect::new(0.0, 0.0, 4.0, 1.0),
        );
        assert_eq!(count_color(&frame, RED), 2);
    }

    #[test]
    fn quarter_turn_puts_left_column_on_top() {
        let sprite = two_column_sprite(2);
        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut canvas = FrameCanvas::new(&mut frame, 4, 4);
        let transform = AffineTransform::IDENTITY
            .translate(2.0, 2.0)
            .rotate(FRAC_PI_2);
        canvas.blit_transformed(&sprite, transform, Rect::new(-1.0, -1.0, 2.0, 2.0));

        // A clockwise quarter turn (y down) carries local -x to screen -y.
        assert_eq!(pixel(&frame, 4, 1, 1), RED);
        assert_eq!(pixel(&frame, 4, 2, 1), RED);
        assert_eq!(pixel(&frame, 4, 1, 2), BLUE);
        assert_eq!(pixel(&frame, 4, 2, 2), BLUE);
        assert_eq!(count_color(&frame, RED) + count_color(&frame, BLUE), 4);
    }

    #[test]
    fn singular_transform_draws_nothing() {
        let sprite = Sprite::solid(2, 2, RED);
        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut canvas = FrameCanvas::new(&mut frame, 4, 4);
        canvas.blit_transformed(
            &sprite,
            AffineTransform::IDENTITY.scale(0.0, 0.0),
            Rect::new(0.0, 0.0, 2.0, 2.0),
        );
        assert!(frame.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn transparent_pixels_leave_background() {
        let sprite = Sprite::solid(2, 2, [255, 255, 255, 0]);
        let mut frame = vec![0u8; 2 * 2 * 4];
        let mut canvas = FrameCanvas::new(&mut frame, 2, 2);
        canvas.clear(BLUE);
        canvas.blit_transformed(
            &sprite,
            AffineTransform::IDENTITY,
            Rect::new(0.0, 0.0, 2.0, 2.0),
        );
        assert_eq!(count_color(&frame, BLUE), 4);
    }

    #[test]
    fn half_alpha_blends_over_background() {
        let mut frame = vec![0u8; 4];
        let mut canvas = FrameCanvas::new(&mut frame, 1, 1);
        canvas.clear([0, 0, 0, 255]);
        canvas.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), [255, 255, 255, 128]);
        assert_eq!(pixel(&frame, 1, 0, 0), [128, 128, 128, 255]);
    }

    #[test]
    fn text_draws_scaled_glyph_cells() {
        let mut frame = vec![0u8; 8 * 10 * 4];
        let mut canvas = FrameCanvas::new(&mut frame, 8, 10);
        canvas.draw_text(
            "1",
            Vec2::new(0.0, 0.0),
            TextStyle {
                color: RED,
                scale: 2,
            },
        );
        // Glyph '1' has 8 set cells, each 2x2 pixels.
        assert_eq!(count_color(&frame, RED), 32);
        assert_eq!(pixel(&frame, 8, 2, 0), RED);
        assert_eq!(pixel(&frame, 8, 0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn text_outside_frame_is_clipped_safely() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut canvas = FrameCanvas::new(&mut frame, 4, 4);
        let style = TextStyle {
            color: RED,
            scale: 3,
        };
        canvas.draw_text("FPS: 60", Vec2::new(-20.0, -20.0), style);
        canvas.draw_text("FPS: 60", Vec2::new(64.0, 64.0), style);
        assert_eq!(count_color(&frame, RED), 0);
    }
}
