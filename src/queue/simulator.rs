use serde::{Deserialize, Serialize};
use statig::prelude::*;
use std::fmt;
use uuid::Uuid;

use super::progress::{FailureInjector, NeverFail, ProgressSource, RandomFailure, RandomProgress};
use super::task::{Task, TaskError, TaskEvent, TaskSpec, TaskStatus};
use super::QueueSettings;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCounts {
    pub waiting: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

impl QueueCounts {
    pub fn total(&self) -> usize {
        self.waiting + self.processing + self.completed + self.failed
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub promoted: Option<Uuid>,
    pub completed: Vec<Uuid>,
    pub failed: Vec<Uuid>,
    pub counts: QueueCounts,
}

/// Discrete-time simulation of a bounded-concurrency work queue.
///
/// Each tick promotes at most one waiting task when a processing slot is
/// free, then advances every processing task. Task order is insertion order.
pub struct TaskQueueSimulator {
    tasks: Vec<StateMachine<Task>>,
    max_concurrency: usize,
    progress: Box<dyn ProgressSource + Send>,
    failures: Box<dyn FailureInjector + Send>,
    ticks: u64,
}

impl TaskQueueSimulator {
    pub fn new(specs: Vec<TaskSpec>, settings: &QueueSettings) -> Self {
        let failures: Box<dyn FailureInjector + Send> = if settings.failure_rate > 0.0 {
            Box::new(RandomFailure::new(settings.failure_rate))
        } else {
            Box::new(NeverFail)
        };
        Self::with_sources(
            specs,
            settings.max_concurrency,
            Box::new(RandomProgress::new(settings.min_increment, settings.max_increment)),
            failures,
        )
    }

    pub fn with_sources(
        specs: Vec<TaskSpec>,
        max_concurrency: usize,
        progress: Box<dyn ProgressSource + Send>,
        failures: Box<dyn FailureInjector + Send>,
    ) -> Self {
        let tasks = specs
            .into_iter()
            .map(|spec| Task::new(spec).state_machine())
            .collect();
        Self {
            tasks,
            max_concurrency: max_concurrency.max(1),
            progress,
            failures,
            ticks: 0,
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().map(|sm| sm.inner())
    }

    pub fn task(&self, id: Uuid) -> Option<&Task> {
        self.tasks().find(|task| task.id() == id)
    }

    pub fn tasks_with_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks().filter(|task| task.status() == status).collect()
    }

    pub fn counts(&self) -> QueueCounts {
        let mut counts = QueueCounts::default();
        for task in self.tasks() {
            match task.status() {
                TaskStatus::Waiting => counts.waiting += 1,
                TaskStatus::Processing => counts.processing += 1,
                TaskStatus::Completed => counts.completed += 1,
                TaskStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// Nothing waiting or processing
    pub fn is_drained(&self) -> bool {
        self.tasks().all(|task| task.status().is_terminal())
    }

    pub fn all_completed(&self) -> bool {
        self.tasks().all(|task| task.status() == TaskStatus::Completed)
    }

    pub fn tick(&mut self) -> TickReport {
        self.ticks += 1;
        let mut report = TickReport {
            tick: self.ticks,
            ..TickReport::default()
        };

        let processing = self
            .tasks()
            .filter(|task| task.status() == TaskStatus::Processing)
            .count();
        if processing < self.max_concurrency {
            if let Some(sm) = self
                .tasks
                .iter_mut()
                .find(|sm| sm.inner().status() == TaskStatus::Waiting)
            {
                sm.handle(&TaskEvent::Start);
                report.promoted = Some(sm.inner().id());
            }
        }

        for sm in self.tasks.iter_mut() {
            if sm.inner().status() != TaskStatus::Processing {
                continue;
            }
            let event = match self.failures.should_fail(sm.inner()) {
                Some(reason) => TaskEvent::Fail { reason },
                None => TaskEvent::Advance {
                    increment: self.progress.next_increment(),
                },
            };
            sm.handle(&event);
            match sm.inner().status() {
                TaskStatus::Completed => report.completed.push(sm.inner().id()),
                TaskStatus::Failed => report.failed.push(sm.inner().id()),
                _ => {}
            }
        }

        report.counts = self.counts();
        tracing::debug!(
            tick = report.tick,
            waiting = report.counts.waiting,
            processing = report.counts.processing,
            completed = report.counts.completed,
            failed = report.counts.failed,
            "Queue tick"
        );
        report
    }

    /// Send a failed task back to waiting as a new attempt
    pub fn retry(&mut self, id: Uuid) -> Result<(), TaskError> {
        let sm = self
            .tasks
            .iter_mut()
            .find(|sm| sm.inner().id() == id)
            .ok_or(TaskError::NotFound(id))?;
        let status = sm.inner().status();
        if status != TaskStatus::Failed {
            return Err(TaskError::NotRetryable { id, status });
        }
        sm.handle(&TaskEvent::Retry);
        Ok(())
    }

    /// Retry every failed task, returning how many were requeued
    pub fn retry_failed(&mut self) -> usize {
        let failed: Vec<Uuid> = self
            .tasks_with_status(TaskStatus::Failed)
            .iter()
            .map(|task| task.id())
            .collect();
        failed.iter().filter(|id| self.retry(**id).is_ok()).count()
    }
}

impl fmt::Debug for TaskQueueSimulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueueSimulator")
            .field("max_concurrency", &self.max_concurrency)
            .field("ticks", &self.ticks)
            .field("counts", &self.counts())
            .finish()
    }
}
