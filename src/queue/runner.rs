//! Async driver for the queue simulator.
//!
//! Ticks the simulator on a fixed interval until it drains or the run is
//! cancelled. A clean drain waits out the completion delay and then fires
//! the completion callback, which is where callers apply the stage
//! transition the queue was standing in for.

use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use super::simulator::{TaskQueueSimulator, TickReport};
use super::task::TaskStatus;
use super::QueueSettings;
use crate::telemetry::{create_queue_span, generate_correlation_id};

/// Floor for the tick interval; tokio intervals cannot have a zero period
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueOutcome {
    /// Every task completed and the completion callback fired
    Completed { ticks: u64 },
    /// Nothing left to run but some tasks failed; the callback did not fire
    Drained { ticks: u64, failed: Vec<Uuid> },
    /// Aborted; in-flight tasks are left where they were
    Cancelled { ticks: u64 },
}

pub struct QueueRunner {
    label: String,
    simulator: TaskQueueSimulator,
    tick_interval: Duration,
    completion_delay: Duration,
    cancel: CancellationToken,
}

impl QueueRunner {
    /// The run stops as soon as `cancel` is cancelled
    pub fn new(
        label: impl Into<String>,
        simulator: TaskQueueSimulator,
        settings: &QueueSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            label: label.into(),
            simulator,
            tick_interval: settings.tick_interval.max(MIN_TICK_INTERVAL),
            completion_delay: settings.completion_delay,
            cancel,
        }
    }

    pub fn simulator(&self) -> &TaskQueueSimulator {
        &self.simulator
    }

    pub async fn run<F>(&mut self, on_complete: F) -> QueueOutcome
    where
        F: FnOnce(),
    {
        self.run_observed(on_complete, |_| {}).await
    }

    /// Run, handing every tick report to `observer`
    pub async fn run_observed<F, O>(&mut self, on_complete: F, observer: O) -> QueueOutcome
    where
        F: FnOnce(),
        O: FnMut(&TickReport),
    {
        let correlation_id = generate_correlation_id();
        let span = create_queue_span(&self.label, self.simulator.len(), &correlation_id);
        self.drive(on_complete, observer).instrument(span).await
    }

    async fn drive<F, O>(&mut self, on_complete: F, mut observer: O) -> QueueOutcome
    where
        F: FnOnce(),
        O: FnMut(&TickReport),
    {
        tracing::info!(
            tasks = self.simulator.len(),
            max_concurrency = self.simulator.max_concurrency(),
            "Queue run started"
        );

        let cancel = self.cancel.clone();
        let mut interval = time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of a tokio interval fires immediately
        interval.tick().await;

        while !self.simulator.is_drained() {
            tokio::select! {
                _ = cancel.cancelled() => {
                    return self.cancelled();
                }
                _ = interval.tick() => {}
            }
            let report = self.simulator.tick();
            observer(&report);
        }

        let ticks = self.simulator.ticks();
        let failed: Vec<Uuid> = self
            .simulator
            .tasks_with_status(TaskStatus::Failed)
            .iter()
            .map(|task| task.id())
            .collect();
        if !failed.is_empty() {
            tracing::warn!(ticks, failed = failed.len(), "Queue drained with failed tasks");
            return QueueOutcome::Drained { ticks, failed };
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                return self.cancelled();
            }
            _ = time::sleep(self.completion_delay) => {}
        }

        tracing::info!(ticks, "Queue drained, firing completion");
        on_complete();
        QueueOutcome::Completed { ticks }
    }

    fn cancelled(&self) -> QueueOutcome {
        let counts = self.simulator.counts();
        tracing::info!(
            ticks = self.simulator.ticks(),
            processing = counts.processing,
            waiting = counts.waiting,
            "Queue run cancelled"
        );
        QueueOutcome::Cancelled {
            ticks: self.simulator.ticks(),
        }
    }
}
