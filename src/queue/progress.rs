// Progress and failure sources for the task queue simulation
//
// Both are injected so tests can drive the queue deterministically.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

use super::task::Task;

pub trait ProgressSource {
    /// Percentage points to add to one processing task this tick
    fn next_increment(&mut self) -> u8;
}

/// Uniform increments in `[min, max)`. A zero `min` is raised to 1 so
/// processing tasks always move.
#[derive(Debug)]
pub struct RandomProgress {
    rng: StdRng,
    min: u8,
    max: u8,
}

impl RandomProgress {
    pub fn new(min: u8, max: u8) -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            min: min.max(1),
            max,
        }
    }

    pub fn seeded(min: u8, max: u8, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            min: min.max(1),
            max,
        }
    }
}

impl ProgressSource for RandomProgress {
    fn next_increment(&mut self) -> u8 {
        if self.max <= self.min {
            return self.min;
        }
        self.rng.random_range(self.min..self.max)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedProgress(pub u8);

impl ProgressSource for FixedProgress {
    fn next_increment(&mut self) -> u8 {
        self.0
    }
}

pub trait FailureInjector {
    /// Reason to fail this processing task on this tick, if any
    fn should_fail(&mut self, task: &Task) -> Option<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NeverFail;

impl FailureInjector for NeverFail {
    fn should_fail(&mut self, _task: &Task) -> Option<String> {
        None
    }
}

/// Fails each processing tick with the given probability
#[derive(Debug)]
pub struct RandomFailure {
    rng: StdRng,
    rate: f64,
}

impl RandomFailure {
    pub fn new(rate: f64) -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            rate: rate.clamp(0.0, 1.0),
        }
    }

    pub fn seeded(rate: f64, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            rate: rate.clamp(0.0, 1.0),
        }
    }
}

impl FailureInjector for RandomFailure {
    fn should_fail(&mut self, task: &Task) -> Option<String> {
        if self.rate > 0.0 && self.rng.random_bool(self.rate) {
            Some(format!("Simulated failure on {}", task.spec().episodes))
        } else {
            None
        }
    }
}

/// Fails the first attempt of tasks starting at the listed episodes
#[derive(Debug, Clone, Default)]
pub struct FailFirstAttempt {
    episodes: HashSet<u32>,
}

impl FailFirstAttempt {
    pub fn episodes(episodes: impl IntoIterator<Item = u32>) -> Self {
        Self {
            episodes: episodes.into_iter().collect(),
        }
    }
}

impl FailureInjector for FailFirstAttempt {
    fn should_fail(&mut self, task: &Task) -> Option<String> {
        (task.attempts() == 1 && self.episodes.contains(&task.spec().episodes.start))
            .then(|| format!("Injected failure on {}", task.spec().episodes))
    }
}
