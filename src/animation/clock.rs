use std::time::Instant;

use super::frame_loop::FrameState;

/// Measures wall time between redraws
#[derive(Debug, Default)]
pub struct FrameClock {
    start: Option<Instant>,
    last: Option<Instant>,
    frame: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self) -> FrameState {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`
    ///
    /// The first tick reports a zero delta. Deltas are not clamped, so a long
    /// stall shows up as one large step.
    pub fn tick_at(&mut self, now: Instant) -> FrameState {
        let start = *self.start.get_or_insert(now);
        let delta = self
            .last
            .map(|last| now.saturating_duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last = Some(now);

        let state = FrameState {
            delta,
            elapsed: now.saturating_duration_since(start).as_secs_f32(),
            frame: self.frame,
        };
        self.frame += 1;
        state
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }
}
