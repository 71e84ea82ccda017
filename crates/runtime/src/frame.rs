use foundation::time::Time;

/// Deterministic frame metadata.
///
/// The widget clock: renderer animations, tick hooks and the viewport sampling
/// timer all advance on frames, so a session can be replayed exactly.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Fixed delta time (seconds).
    pub dt_s: f64,
    /// Widget time at the start of the frame (seconds).
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    /// First frame of a clock ticking at `hz` frames per second.
    pub fn first_at_rate(hz: f64) -> Self {
        Self::new(0, 1.0 / hz.max(f64::MIN_POSITIVE))
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1, self.dt_s)
    }
}
