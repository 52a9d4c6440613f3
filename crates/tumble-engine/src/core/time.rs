/// Maximum fixed steps run for a single frame, to avoid a spiral of death after a stall.
pub const MAX_STEPS_PER_FRAME: u32 = 10;

/// Fixed timestep accumulator.
/// Turns variable display-frame deltas into a whole number of fixed simulation ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// The fixed delta time per tick.
    dt: f64,
    /// Accumulated time from variable frame deltas.
    accumulator: f64,
}

impl FixedTimestep {
    pub fn new(dt: f64) -> Self {
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f64) -> u32 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }
        self.accumulator += frame_dt;
        self.accumulator = self.accumulator.min(self.dt * MAX_STEPS_PER_FRAME as f64);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f64 * self.dt;
        steps
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f64 {
        self.dt
    }

}
