const MS_PER_SECOND: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    pub delta_ms: f64,
    /// `floor(1000 / delta_ms)`, saturated into `u32`. A zero delta reads as
    /// `u32::MAX`.
    pub instantaneous_fps: u32,
}

/// Turns the host's monotonic frame timestamps into per-frame deltas.
///
/// The previous timestamp starts at zero, so the first reading is the
/// whole time since the timestamp origin and its FPS value is garbage.
/// Callers display it anyway; the next frame is correct.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clock {
    previous_timestamp_ms: f64,
}

impl Clock {
    pub fn tick(&mut self, timestamp_ms: f64) -> FrameTiming {
        let delta_ms = timestamp_ms - self.previous_timestamp_ms;
        self.previous_timestamp_ms = timestamp_ms;
        FrameTiming {
            delta_ms,
            instantaneous_fps: instantaneous_fps(delta_ms),
        }
    }
}

fn instantaneous_fps(delta_ms: f64) -> u32 {
    // Float-to-int `as` saturates: +inf -> u32::MAX, NaN and negatives -> 0.
    (MS_PER_SECOND / delta_ms).floor() as u32
}
