//! Tick pacing.
//!
//! Converts wall-clock time into a whole number of fixed simulation steps so
//! the world always advances by the same `dt`, no matter how uneven the host
//! loop is.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Longest wall-clock gap fed into the accumulator in one call.
const MAX_FRAME_DT: f32 = 0.25;

/// Most steps handed out by one [`FixedStep::accumulate`] call.
const MAX_STEPS_PER_FRAME: u32 = 10;

/// Fixed-timestep accumulator with optional wall-clock pacing.
#[derive(Debug)]
pub struct FixedStep {
    /// Seconds per simulation step
    step_dt: f32,
    /// Wall-clock budget per step
    step_budget: Duration,
    /// Time of last `delta_time` call
    last_frame: Instant,
    /// Unconsumed time
    accumulator: f32,
    /// Recent step durations for averaging
    step_times: VecDeque<f32>,
    /// Maximum samples for averaging
    max_samples: usize,
}

impl FixedStep {
    /// Creates a pacer running `tick_rate` steps per second.
    #[must_use]
    pub fn new(tick_rate: u32) -> Self {
        let tick_rate = tick_rate.max(1);
        Self {
            step_dt: 1.0 / tick_rate as f32,
            step_budget: Duration::from_secs_f64(1.0 / f64::from(tick_rate)),
            last_frame: Instant::now(),
            accumulator: 0.0,
            step_times: VecDeque::with_capacity(120),
            max_samples: 120,
        }
    }

    /// Seconds per simulation step.
    #[must_use]
    pub fn step_dt(&self) -> f32 {
        self.step_dt
    }

    /// Wall-clock seconds since the last call, clamped.
    pub fn delta_time(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        dt.min(MAX_FRAME_DT)
    }

    /// Adds `dt` seconds and returns how many fixed steps are due.
    ///
    /// At most [`MAX_STEPS_PER_FRAME`] are handed out at once; if the host is
    /// still behind after that the backlog is dropped.
    pub fn accumulate(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.max(0.0);
        let mut count = 0;

        while self.accumulator >= self.step_dt && count < MAX_STEPS_PER_FRAME {
            self.accumulator -= self.step_dt;
            count += 1;
        }

        if self.accumulator > self.step_dt * 2.0 {
            self.accumulator = 0.0;
        }

        count
    }

    /// Records how long one step took to simulate.
    pub fn record_step(&mut self, elapsed: Duration) {
        self.step_times.push_back(elapsed.as_secs_f32());
        if self.step_times.len() > self.max_samples {
            self.step_times.pop_front();
        }
    }

    /// Average simulation cost per step in milliseconds.
    #[must_use]
    pub fn average_step_ms(&self) -> f32 {
        if self.step_times.is_empty() {
            return 0.0;
        }

        (self.step_times.iter().sum::<f32>() / self.step_times.len() as f32) * 1000.0
    }

    /// Sleeps until one step's worth of wall-clock time has passed since the
    /// last `delta_time` call.
    pub fn sleep_remainder(&self) {
        let elapsed = self.last_frame.elapsed();
        if elapsed < self.step_budget {
            std::thread::sleep(self.step_budget - elapsed);
        }
    }

    /// Reset timing (call after a pause).
    pub fn reset(&mut self) {
        self.last_frame = Instant::now();
        self.accumulator = 0.0;
        self.step_times.clear();
    }
}
