use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::task::TaskSpec;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("Task {task_id} failed: {reason}")]
    Failed { task_id: Uuid, reason: String },
    #[error("Task {task_id} was cancelled")]
    Cancelled { task_id: Uuid },
    #[error("Task {task_id} panicked")]
    Panicked { task_id: Uuid },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub task_id: Uuid,
    pub percent: u8,
}

/// Handed to each execution; forwards progress that only ever goes up
#[derive(Debug)]
pub struct ProgressReporter {
    task_id: Uuid,
    last: AtomicU8,
    tx: mpsc::UnboundedSender<ProgressUpdate>,
}

impl ProgressReporter {
    fn new(task_id: Uuid, tx: mpsc::UnboundedSender<ProgressUpdate>) -> Self {
        Self {
            task_id,
            last: AtomicU8::new(0),
            tx,
        }
    }

    pub fn task_id(&self) -> Uuid {
        self.task_id
    }

    /// Report progress; values above 100 clamp, regressions are dropped
    pub fn report(&self, percent: u8) {
        let percent = percent.min(100);
        let previous = self.last.fetch_max(percent, Ordering::Relaxed);
        if percent > previous {
            // Receiver gone just means nobody is watching
            let _ = self.tx.send(ProgressUpdate {
                task_id: self.task_id,
                percent,
            });
        }
    }

    pub fn current(&self) -> u8 {
        self.last.load(Ordering::Relaxed)
    }
}

#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Perform the work described by `spec`. Failures are reported as
    /// `ExecutionError::Failed`.
    async fn execute(&self, task_id: Uuid, spec: &TaskSpec, progress: &ProgressReporter) -> Result<(), ExecutionError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRun {
    pub task_id: Uuid,
    pub spec: TaskSpec,
    pub result: Result<(), ExecutionError>,
}

/// Runs task specs on a pluggable executor with at most `max_concurrency`
/// in flight at once.
pub struct BoundedExecutor {
    executor: Arc<dyn TaskExecutor>,
    max_concurrency: usize,
}

impl BoundedExecutor {
    pub fn new(executor: Arc<dyn TaskExecutor>, max_concurrency: usize) -> Self {
        Self {
            executor,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Run every spec, returning one result per spec in completion order.
    ///
    /// Cancelling `cancel` stops waiting tasks from starting and aborts
    /// running ones; both report `ExecutionError::Cancelled`. The run only
    /// listens on a child of `cancel` and never cancels it itself.
    pub async fn run_all(
        &self,
        specs: Vec<TaskSpec>,
        updates: mpsc::UnboundedSender<ProgressUpdate>,
        cancel: &CancellationToken,
    ) -> Vec<TaskRun> {
        let cancel = cancel.child_token();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut join_set = JoinSet::new();
        let mut pending: Vec<(Uuid, TaskSpec)> = Vec::with_capacity(specs.len());

        tracing::info!(
            tasks = specs.len(),
            max_concurrency = self.max_concurrency,
            "Bounded execution started"
        );

        for spec in specs {
            let task_id = Uuid::new_v4();
            pending.push((task_id, spec.clone()));

            let executor = Arc::clone(&self.executor);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let reporter = ProgressReporter::new(task_id, updates.clone());

            join_set.spawn(async move {
                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(ExecutionError::Cancelled { task_id }),
                    outcome = async {
                        let _permit = semaphore
                            .acquire_owned()
                            .await
                            .map_err(|_| ExecutionError::Cancelled { task_id })?;
                        let outcome = executor.execute(task_id, &spec, &reporter).await;
                        if outcome.is_ok() {
                            reporter.report(100);
                        }
                        outcome
                    } => outcome,
                };
                (task_id, result)
            });
        }

        let mut runs = Vec::with_capacity(pending.len());
        let mut finished = HashSet::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((task_id, result)) => {
                    if let Err(error) = &result {
                        tracing::warn!(%task_id, error = %error, "Task execution did not succeed");
                    }
                    finished.insert(task_id);
                    if let Some((_, spec)) = pending.iter().find(|(id, _)| *id == task_id) {
                        runs.push(TaskRun {
                            task_id,
                            spec: spec.clone(),
                            result,
                        });
                    }
                }
                Err(error) => {
                    tracing::error!(error = %error, "Task execution panicked");
                }
            }
        }

        // Anything that never reported back panicked inside its task
        for (task_id, spec) in pending {
            if !finished.contains(&task_id) {
                runs.push(TaskRun {
                    task_id,
                    spec,
                    result: Err(ExecutionError::Panicked { task_id }),
                });
            }
        }

        tracing::info!(
            succeeded = runs.iter().filter(|run| run.result.is_ok()).count(),
            total = runs.len(),
            "Bounded execution finished"
        );
        runs
    }
}
