use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Screen-space rectangle in device pixels; may extend past the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }

    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.x, self.y),
            Vec2::new(self.x + self.width, self.y),
            Vec2::new(self.x, self.y + self.height),
            Vec2::new(self.x + self.width, self.y + self.height),
        ]
    }
}

/// Rectangle in source-image pixel space, e.g. one track inside the atlas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }
}

const SINGULAR_DETERMINANT: f32 = 1e-12;

/// 2D affine map in canvas order:
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
///
/// `translate`, `rotate` and `scale` post-multiply, so a chain reads in the
/// same order as the equivalent canvas calls: the last call applies to the
/// drawn geometry first. Angles are radians; with y pointing down a positive
/// angle turns clockwise on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AffineTransform {
    pub const IDENTITY: AffineTransform = AffineTransform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self {
            e: self.a * dx + self.c * dy + self.e,
            f: self.b * dx + self.d * dy + self.f,
            ..self
        }
    }

    pub fn rotate(self, radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            a: self.a * cos + self.c * sin,
            b: self.b * cos + self.d * sin,
            c: self.c * cos - self.a * sin,
            d: self.d * cos - self.b * sin,
            ..self
        }
    }

    pub fn scale(self, sx: f32, sy: f32) -> Self {
        Self {
            a: self.a * sx,
            b: self.b * sx,
            c: self.c * sy,
            d: self.d * sy,
            ..self
        }
    }

    pub fn apply(&self, point: Vec2) -> Vec2 {
        Vec2 {
            x: self.a * point.x + self.c * point.y + self.e,
            y: self.b * point.x + self.d * point.y + self.f,
        }
    }

    pub fn inverse(&self) -> Option<Self> {
        let det = self.a * self.d - self.b * self.c;
        if !det.is_finite() || det.abs() < SINGULAR_DETERMINANT {
            return None;
        }
        let inv = det.recip();
        Some(Self {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn approx_eq_vec2(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn viewport_center_is_half_extent() {
        let viewport = Viewport {
            width: 801,
            height: 600,
        };
        assert_eq!(viewport.center(), Vec2::new(400.5, 300.0));
    }

    #[test]
    fn quarter_turn_maps_x_axis_onto_y_axis() {
        let rotated = AffineTransform::IDENTITY
            .rotate(FRAC_PI_2)
            .apply(Vec2::new(1.0, 0.0));
        assert!(approx_eq_vec2(rotated, Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn translate_then_rotate_rotates_about_translated_origin() {
        let transform = AffineTransform::IDENTITY
            .translate(10.0, 0.0)
            .rotate(FRAC_PI_2);
        assert!(approx_eq_vec2(
            transform.apply(Vec2::ZERO),
            Vec2::new(10.0, 0.0)
        ));
        assert!(approx_eq_vec2(
            transform.apply(Vec2::new(1.0, 0.0)),
            Vec2::new(10.0, 1.0)
        ));
    }

    #[test]
    fn call_order_matters() {
        let rotate_first = AffineTransform::IDENTITY
            .rotate(FRAC_PI_2)
            .translate(10.0, 0.0);
        assert!(approx_eq_vec2(
            rotate_first.apply(Vec2::new(1.0, 0.0)),
            Vec2::new(0.0, 11.0)
        ));
    }

    #[test]
    fn inverse_round_trips_points() {
        let transform = AffineTransform::IDENTITY
            .translate(320.0, 240.0)
            .rotate(PI / 3.0)
            .scale(0.5, 0.5);
        let inverse = transform.inverse().expect("invertible");
        let point = Vec2::new(-17.0, 42.0);
        assert!(approx_eq_vec2(inverse.apply(transform.apply(point)), point));
    }

    #[test]
    fn zero_scale_is_not_invertible() {
        assert!(AffineTransform::IDENTITY.scale(0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn rect_contains_is_half_open() {
        let rect = Rect::new(0.0, 0.0, 2.0, 2.0);
        assert!(rect.contains(Vec2::new(0.0, 0.0)));
        assert!(rect.contains(Vec2::new(1.99, 1.99)));
        assert!(!rect.contains(Vec2::new(2.0, 1.0)));
    }
}
