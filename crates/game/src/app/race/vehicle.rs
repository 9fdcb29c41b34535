use std::f32::consts::PI;

use racecar_engine::{InputSignal, InputState};
use serde::{Deserialize, Serialize};

/// World position in track pixels plus heading in radians. Heading is never
/// wrapped; trig takes care of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct Pose {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) heading: f32,
}

impl Pose {
    pub(crate) const fn new(x: f32, y: f32, heading: f32) -> Self {
        Self { x, y, heading }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum TurnScaling {
    /// Fixed step per frame, whatever the refresh rate.
    FrameCoupled,
    /// Steps scaled by `delta_ms / reference_frame_ms`.
    DeltaScaled { reference_frame_ms: f32 },
}

impl TurnScaling {
    fn frame_factor(self, delta_ms: f64) -> f32 {
        match self {
            TurnScaling::FrameCoupled => 1.0,
            TurnScaling::DeltaScaled { reference_frame_ms } => {
                let factor = delta_ms as f32 / reference_frame_ms;
                if factor.is_finite() && factor > 0.0 {
                    factor
                } else {
                    0.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DriveTuning {
    pub(crate) turn_step: f32,
    pub(crate) reverse_drag: f32,
    pub(crate) turn_scaling: TurnScaling,
}

impl Default for DriveTuning {
    fn default() -> Self {
        Self {
            turn_step: 3.5_f32.to_radians(),
            reverse_drag: 0.5,
            turn_scaling: TurnScaling::FrameCoupled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct VehicleState {
    pub(crate) pose: Pose,
    pub(crate) velocity: f32,
    pub(crate) selected_skin: Option<usize>,
}

impl VehicleState {
    pub(crate) fn new(pose: Pose, velocity: f32) -> Self {
        Self {
            pose,
            velocity,
            selected_skin: None,
        }
    }

    /// Teleports to `pose`; nothing about the previous motion survives.
    pub(crate) fn reset_to(&mut self, pose: Pose) {
        self.pose = pose;
    }

    /// One frame of kinematics. Every step reads the heading and velocity
    /// from before this call, so a turn only bends the next frame's path.
    pub(crate) fn update(&mut self, input: &InputState, tuning: &DriveTuning, delta_ms: f64) {
        let factor = tuning.turn_scaling.frame_factor(delta_ms);
        let heading = self.pose.heading;
        let velocity = self.velocity * factor;

        if input.is_active(InputSignal::Accelerate) {
            self.pose.x += velocity * heading.cos();
            self.pose.y += velocity * heading.sin();
        }
        if input.is_active(InputSignal::Brake) {
            let reverse_velocity = velocity * tuning.reverse_drag;
            let reverse_heading = heading + PI;
            self.pose.x += reverse_velocity * reverse_heading.cos();
            self.pose.y += reverse_velocity * reverse_heading.sin();
        }
        if input.is_active(InputSignal::TurnLeft) {
            self.pose.heading -= tuning.turn_step * factor;
        }
        if input.is_active(InputSignal::TurnRight) {
            self.pose.heading += tuning.turn_step * factor;
        }
    }
}
