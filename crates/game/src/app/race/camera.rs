use racecar_engine::{Vec2, Viewport};

use super::vehicle::Pose;

/// Offset that puts `pose` at the viewport centre. The track is drawn at the
/// negated offset; there is no smoothing.
pub(crate) fn compute_offset(pose: &Pose, viewport: Viewport) -> Vec2 {
    let center = viewport.center();
    Vec2::new(pose.x - center.x, pose.y - center.y)
}
