use std::time::{Duration, Instant};

/// Loop rate averaged over one logging window. The on-screen FPS is the
/// per-frame reading from [`super::Clock`]; this one is for logs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct FrameWindowStats {
    pub frames: u32,
    pub fps: f64,
    pub mean_frame_ms: f64,
    pub worst_frame_ms: f64,
}

/// Collects frame durations and hands back a summary once per window.
#[derive(Debug)]
pub(crate) struct FrameWindow {
    window: Duration,
    opened_at: Instant,
    frames: u32,
    total_ms: f64,
    worst_ms: f64,
}

impl FrameWindow {
    pub(crate) fn new(window: Duration, now: Instant) -> Self {
        Self {
            window,
            opened_at: now,
            frames: 0,
            total_ms: 0.0,
            worst_ms: 0.0,
        }
    }

    pub(crate) fn push(&mut self, frame_time: Duration) {
        let ms = frame_time.as_secs_f64() * 1000.0;
        self.frames = self.frames.saturating_add(1);
        self.total_ms += ms;
        self.worst_ms = self.worst_ms.max(ms);
    }

    /// Summarises and restarts the window once it has been open long enough.
    pub(crate) fn close_if_elapsed(&mut self, now: Instant) -> Option<FrameWindowStats> {
        let open_for = now.saturating_duration_since(self.opened_at);
        if open_for < self.window {
            return None;
        }

        let stats = FrameWindowStats {
            frames: self.frames,
            fps: f64::from(self.frames) / open_for.as_secs_f64().max(f64::EPSILON),
            mean_frame_ms: if self.frames == 0 {
                0.0
            } else {
                self.total_ms / f64::from(self.frames)
            },
            worst_frame_ms: self.worst_ms,
        };
        *self = Self::new(self.window, now);
        Some(stats)
    }
}
