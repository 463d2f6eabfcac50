use bodytypes::{
    prelude::{Epoch, UtcTimestamp},
    time,
};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct SimulationInfo {
    pub timestamp: UtcTimestamp,
    pub epoch: Epoch,
    pub step_iteration: u64,
    /// Number of environment updates, one per integrator stage
    pub environment_updates: u64,
    /// Simulated time since the start epoch [s]
    pub relative_time: f64,
    pub real_time_start: Instant,
    pub real_time: Duration,
}

impl Default for SimulationInfo {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl SimulationInfo {
    pub fn new(start_epoch: Epoch) -> Self {
        SimulationInfo {
            timestamp: time::from_seconds_since_j2000(start_epoch),
            epoch: start_epoch,
            step_iteration: 0,
            environment_updates: 0,
            relative_time: 0.0,
            real_time_start: Instant::now(),
            real_time: Duration::ZERO,
        }
    }

    pub fn step(&mut self, dt: f64, environment_updates: u64) {
        self.step_iteration += 1;
        self.environment_updates += environment_updates;
        self.relative_time += dt;
        self.epoch += dt;
        self.timestamp = time::from_seconds_since_j2000(self.epoch);
        self.real_time = Instant::now().duration_since(self.real_time_start);
    }
}
