// Task queue - task lifecycle, the tick simulator, its async runner and
// the bounded executor

pub mod executor;
pub mod progress;
pub mod runner;
pub mod simulator;
pub mod task;

use std::time::Duration;

pub use executor::{BoundedExecutor, ExecutionError, ProgressReporter, ProgressUpdate, TaskExecutor, TaskRun};
pub use progress::{FailFirstAttempt, FailureInjector, FixedProgress, NeverFail, ProgressSource, RandomFailure, RandomProgress};
pub use runner::{QueueOutcome, QueueRunner};
pub use simulator::{QueueCounts, TaskQueueSimulator, TickReport};
pub use task::{EpisodeRange, Task, TaskError, TaskEvent, TaskSpec, TaskStage, TaskStatus};

pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct QueueSettings {
    pub max_concurrency: usize,
    pub tick_interval: Duration,
    pub min_increment: u8,
    pub max_increment: u8,
    pub completion_delay: Duration,
    /// Per processing task, per tick
    pub failure_rate: f64,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            tick_interval: Duration::from_millis(500),
            min_increment: 5,
            max_increment: 20,
            completion_delay: Duration::from_millis(1000),
            failure_rate: 0.0,
        }
    }
}
