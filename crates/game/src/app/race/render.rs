use std::f32::consts::FRAC_PI_2;

use racecar_engine::{
    AffineTransform, AssetStatus, DrawSurface, Rect, Rgba, Sprite, TextStyle, Vec2, Viewport,
    LINE_ADVANCE_CELLS,
};

use super::track::TrackDefinition;

pub(crate) const BACKGROUND_COLOR: Rgba = [165, 42, 42, 255];
const OVERLAY_COLOR: Rgba = [255, 255, 255, 255];
const OVERLAY_STYLE: TextStyle = TextStyle {
    color: OVERLAY_COLOR,
    scale: 3,
};
const FPS_ORIGIN: Vec2 = Vec2::new(10.0, 10.0);
const SIGNALS_ORIGIN: Vec2 = Vec2::new(100.0, 10.0);

const BRACKET_LENGTH: f32 = 25.0;
const BRACKET_PADDING: f32 = 5.0;
const BRACKET_THICKNESS: f32 = 3.0;

/// Size and pivot of the vehicle sprite. The pivot sits
/// `rear_axle_from_center_px` below the sprite's vertical midpoint, scaled
/// with the sprite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct VehicleGeometry {
    pub(crate) size_percent: f32,
    pub(crate) rear_axle_from_center_px: f32,
}

impl Default for VehicleGeometry {
    fn default() -> Self {
        Self {
            size_percent: 100.0,
            rear_axle_from_center_px: 46.0,
        }
    }
}

impl VehicleGeometry {
    /// Where the skin lands in the vehicle's local frame, origin at the rear
    /// axle.
    pub(crate) fn anchor_rect(&self, skin: &Sprite) -> Rect {
        let scale = self.size_percent / 100.0;
        let width = skin.width() as f32 * scale;
        let height = skin.height() as f32 * scale;
        let axle = self.rear_axle_from_center_px * scale;
        let half_width = (width / 2.0).floor();
        let half_height = (height / 2.0).floor();
        Rect::new(-half_width, -(height - half_height - axle), width, height)
    }
}

/// The skin is authored facing down the screen, so heading 0 (screen +x)
/// needs a quarter turn back.
pub(crate) fn vehicle_transform(viewport: Viewport, heading: f32) -> AffineTransform {
    let center = viewport.center();
    AffineTransform::IDENTITY
        .translate(center.x, center.y)
        .rotate(heading - FRAC_PI_2)
}

pub(crate) fn track_dest(track: &TrackDefinition, camera_offset: Vec2) -> Rect {
    Rect::new(
        -camera_offset.x,
        -camera_offset.y,
        track.atlas_region.width as f32 * track.zoom,
        track.atlas_region.height as f32 * track.zoom,
    )
}

/// Two arms per viewport corner, in upper-left, upper-right, lower-left,
/// lower-right order.
pub(crate) fn corner_bracket_rects(viewport: Viewport) -> [Rect; 8] {
    let near = BRACKET_PADDING;
    let far_x = viewport.width as f32 - BRACKET_PADDING;
    let far_y = viewport.height as f32 - BRACKET_PADDING;
    let mut rects = [Rect::default(); 8];
    let corners = [
        (Vec2::new(near, near), 1.0, 1.0),
        (Vec2::new(far_x, near), -1.0, 1.0),
        (Vec2::new(near, far_y), 1.0, -1.0),
        (Vec2::new(far_x, far_y), -1.0, -1.0),
    ];
    for (slot, (vertex, dir_x, dir_y)) in corners.into_iter().enumerate() {
        let horizontal_end = Vec2::new(vertex.x + dir_x * BRACKET_LENGTH, vertex.y);
        let vertical_end = Vec2::new(vertex.x, vertex.y + dir_y * BRACKET_LENGTH);
        rects[slot * 2] = stroke_rect(vertex, horizontal_end);
        rects[slot * 2 + 1] = stroke_rect(vertex, vertical_end);
    }
    rects
}

fn stroke_rect(from: Vec2, to: Vec2) -> Rect {
    let half = BRACKET_THICKNESS / 2.0;
    Rect::new(
        from.x.min(to.x) - half,
        from.y.min(to.y) - half,
        (from.x - to.x).abs() + BRACKET_THICKNESS,
        (from.y - to.y).abs() + BRACKET_THICKNESS,
    )
}

/// `None` while nothing has gone wrong; otherwise e.g. `TRACK: TIMED OUT`.
pub(crate) fn asset_status_line(track: AssetStatus, cars: AssetStatus) -> Option<String> {
    let failures: Vec<String> = [("TRACK", track), ("CARS", cars)]
        .into_iter()
        .filter(|(_, status)| matches!(status, AssetStatus::Failed | AssetStatus::TimedOut))
        .map(|(name, status)| format!("{name}: {}", status.label().to_ascii_uppercase()))
        .collect();
    (!failures.is_empty()).then(|| failures.join("  "))
}

/// Everything one frame needs to draw, already resolved by the loop.
#[derive(Debug, Clone)]
pub(crate) struct FrameView<'a> {
    pub(crate) camera_offset: Vec2,
    pub(crate) track: Option<(&'a Sprite, &'a TrackDefinition)>,
    pub(crate) vehicle: Option<(&'a Sprite, f32)>,
    pub(crate) geometry: VehicleGeometry,
    pub(crate) fps: u32,
    pub(crate) signals: String,
    pub(crate) status_line: Option<String>,
}

/// Clear, track, vehicle, frame corners, overlay text. Later draws cover
/// earlier ones.
pub(crate) fn draw_frame(surface: &mut dyn DrawSurface, view: &FrameView<'_>) {
    let viewport = surface.viewport();
    surface.clear(BACKGROUND_COLOR);

    if let Some((atlas, track)) = view.track {
        surface.blit_region(
            atlas,
            track.atlas_region,
            track_dest(track, view.camera_offset),
        );
    }

    if let Some((skin, heading)) = view.vehicle {
        surface.blit_transformed(
            skin,
            vehicle_transform(viewport, heading),
            view.geometry.anchor_rect(skin),
        );
    }

    for rect in corner_bracket_rects(viewport) {
        surface.fill_rect(rect, OVERLAY_COLOR);
    }

    surface.draw_text(&format!("FPS: {}", view.fps), FPS_ORIGIN, OVERLAY_STYLE);
    surface.draw_text(&view.signals, SIGNALS_ORIGIN, OVERLAY_STYLE);
    if let Some(status) = &view.status_line {
        let origin = Vec2::new(
            FPS_ORIGIN.x,
            FPS_ORIGIN.y + (LINE_ADVANCE_CELLS * OVERLAY_STYLE.scale) as f32,
        );
        surface.draw_text(status, origin, OVERLAY_STYLE);
    }
}
