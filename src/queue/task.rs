use serde::{Deserialize, Serialize};
use statig::prelude::*;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Kind of work a task performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStage {
    Extraction,
    AiTranslation,
    ManualTranslation,
    QualityCheck,
    VideoErase,
    VideoCompress,
}

impl TaskStage {
    /// Only human translation and its review are ever reworked
    pub fn supports_rework(self) -> bool {
        matches!(self, TaskStage::ManualTranslation | TaskStage::QualityCheck)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStage::Extraction => "extraction",
            TaskStage::AiTranslation => "ai_translation",
            TaskStage::ManualTranslation => "manual_translation",
            TaskStage::QualityCheck => "quality_check",
            TaskStage::VideoErase => "video_erase",
            TaskStage::VideoCompress => "video_compress",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Waiting,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskStatus::Waiting => "waiting",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("Task not found: {0}")]
    NotFound(Uuid),
    #[error("Task {id} is {status}, only failed tasks can be retried")]
    NotRetryable { id: Uuid, status: TaskStatus },
    #[error("Invalid task: {0}")]
    Invalid(String),
}

/// Inclusive range of episode ordinals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRange {
    pub start: u32,
    pub end: u32,
}

impl EpisodeRange {
    pub fn new(start: u32, end: u32) -> Result<Self, TaskError> {
        if start == 0 || start > end {
            return Err(TaskError::Invalid(format!(
                "Episode range {start}..={end} is empty or starts before episode 1"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn single(episode: u32) -> Result<Self, TaskError> {
        Self::new(episode, episode)
    }

    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, episode: u32) -> bool {
        (self.start..=self.end).contains(&episode)
    }
}

impl fmt::Display for EpisodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "EP{}", self.start)
        } else {
            write!(f, "EP{}-EP{}", self.start, self.end)
        }
    }
}

/// What to run: one unit of work for one variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub variant_id: String,
    pub stage: TaskStage,
    pub round: u32,
    pub episodes: EpisodeRange,
    pub assignee: Option<String>,
}

impl TaskSpec {
    /// Build a spec; the round is pinned to 1 for stages without rework
    pub fn new(
        variant_id: impl Into<String>,
        stage: TaskStage,
        round: u32,
        episodes: EpisodeRange,
        assignee: Option<String>,
    ) -> Self {
        let round = if stage.supports_rework() { round.max(1) } else { 1 };
        Self {
            variant_id: variant_id.into(),
            stage,
            round,
            episodes,
            assignee,
        }
    }

    /// One spec per episode, as the AI stages queue their work
    pub fn per_episode(variant_id: &str, stage: TaskStage, total_episodes: u32) -> Vec<TaskSpec> {
        (1..=total_episodes)
            .map(|episode| {
                TaskSpec::new(
                    variant_id,
                    stage,
                    1,
                    EpisodeRange {
                        start: episode,
                        end: episode,
                    },
                    None,
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskEvent {
    Start,
    Advance { increment: u8 },
    Fail { reason: String },
    Retry,
}

/// Task lifecycle context: waiting -> processing -> completed | failed.
///
/// Completed is final. A failed task can be retried, which restarts it
/// from zero progress as a new attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    id: Uuid,
    spec: TaskSpec,
    status: TaskStatus,
    progress: u8,
    attempts: u32,
    failure: Option<String>,
}

impl Task {
    pub fn new(spec: TaskSpec) -> Self {
        Self {
            id: Uuid::new_v4(),
            spec,
            status: TaskStatus::Waiting,
            progress: 0,
            attempts: 0,
            failure: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn spec(&self) -> &TaskSpec {
        &self.spec
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }
}

#[state_machine(initial = "State::waiting()")]
impl Task {
    #[state]
    fn waiting(&mut self, event: &TaskEvent) -> Outcome<State> {
        match event {
            TaskEvent::Start => {
                self.status = TaskStatus::Processing;
                self.attempts += 1;
                tracing::debug!(
                    task_id = %self.id,
                    stage = self.spec.stage.as_str(),
                    episodes = %self.spec.episodes,
                    attempt = self.attempts,
                    "Task started"
                );
                Transition(State::processing())
            }
            _ => Handled,
        }
    }

    #[state]
    fn processing(&mut self, event: &TaskEvent) -> Outcome<State> {
        match event {
            TaskEvent::Advance { increment } => {
                self.progress = self.progress.saturating_add(*increment).min(100);
                if self.progress >= 100 {
                    self.status = TaskStatus::Completed;
                    tracing::debug!(task_id = %self.id, episodes = %self.spec.episodes, "Task completed");
                    Transition(State::completed())
                } else {
                    Handled
                }
            }
            TaskEvent::Fail { reason } => {
                self.status = TaskStatus::Failed;
                self.failure = Some(reason.clone());
                tracing::warn!(
                    task_id = %self.id,
                    episodes = %self.spec.episodes,
                    progress = self.progress,
                    reason = %reason,
                    "Task failed"
                );
                Transition(State::failed())
            }
            _ => Handled,
        }
    }

    #[state]
    fn completed(&mut self, event: &TaskEvent) -> Outcome<State> {
        tracing::debug!(task_id = %self.id, event = ?event, "Completed task ignores event");
        Handled
    }

    #[state]
    fn failed(&mut self, event: &TaskEvent) -> Outcome<State> {
        match event {
            TaskEvent::Retry => {
                self.progress = 0;
                self.failure = None;
                self.status = TaskStatus::Waiting;
                tracing::info!(task_id = %self.id, attempts = self.attempts, "Task queued for retry");
                Transition(State::waiting())
            }
            _ => Handled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(stage: TaskStage, round: u32) -> TaskSpec {
        TaskSpec::new("v-en", stage, round, EpisodeRange::new(1, 3).unwrap(), Some("tr01".into()))
    }

    #[test]
    fn test_task_lifecycle_to_completion() {
        let mut sm = Task::new(spec(TaskStage::Extraction, 1)).state_machine();
        assert_eq!(sm.inner().status(), TaskStatus::Waiting);

        // Progress before start is ignored
        sm.handle(&TaskEvent::Advance { increment: 50 });
        assert_eq!(sm.inner().progress(), 0);

        sm.handle(&TaskEvent::Start);
        assert_eq!(sm.inner().status(), TaskStatus::Processing);

        sm.handle(&TaskEvent::Advance { increment: 60 });
        sm.handle(&TaskEvent::Advance { increment: 60 });
        assert_eq!(sm.inner().status(), TaskStatus::Completed);
        assert_eq!(sm.inner().progress(), 100);
    }

    #[test]
    fn test_completed_task_is_never_mutated() {
        let mut sm = Task::new(spec(TaskStage::Extraction, 1)).state_machine();
        sm.handle(&TaskEvent::Start);
        sm.handle(&TaskEvent::Advance { increment: 100 });

        sm.handle(&TaskEvent::Fail { reason: "late failure".into() });
        sm.handle(&TaskEvent::Retry);
        sm.handle(&TaskEvent::Start);
        assert_eq!(sm.inner().status(), TaskStatus::Completed);
        assert_eq!(sm.inner().attempts(), 1);
        assert_eq!(sm.inner().failure(), None);
    }

    #[test]
    fn test_failed_task_retry_resets_progress() {
        let mut sm = Task::new(spec(TaskStage::AiTranslation, 1)).state_machine();
        sm.handle(&TaskEvent::Start);
        sm.handle(&TaskEvent::Advance { increment: 40 });
        sm.handle(&TaskEvent::Fail { reason: "model timeout".into() });
        assert_eq!(sm.inner().status(), TaskStatus::Failed);
        assert_eq!(sm.inner().failure(), Some("model timeout"));

        sm.handle(&TaskEvent::Retry);
        assert_eq!(sm.inner().status(), TaskStatus::Waiting);
        assert_eq!(sm.inner().progress(), 0);

        sm.handle(&TaskEvent::Start);
        assert_eq!(sm.inner().attempts(), 2);
    }

    #[test]
    fn test_round_pinned_for_stages_without_rework() {
        assert_eq!(spec(TaskStage::Extraction, 3).round, 1);
        assert_eq!(spec(TaskStage::VideoCompress, 2).round, 1);
        assert_eq!(spec(TaskStage::ManualTranslation, 3).round, 3);
        assert_eq!(spec(TaskStage::QualityCheck, 2).round, 2);
    }

    #[test]
    fn test_episode_range_validation() {
        assert!(EpisodeRange::new(0, 3).is_err());
        assert!(EpisodeRange::new(4, 3).is_err());
        let range = EpisodeRange::new(2, 5).unwrap();
        assert_eq!(range.len(), 4);
        assert!(range.contains(5));
        assert!(!range.contains(6));
        assert_eq!(range.to_string(), "EP2-EP5");
        assert_eq!(EpisodeRange::single(7).unwrap().to_string(), "EP7");
    }

    #[test]
    fn test_per_episode_specs() {
        let specs = TaskSpec::per_episode("v-zh", TaskStage::Extraction, 4);
        assert_eq!(specs.len(), 4);
        assert_eq!(specs[3].episodes, EpisodeRange { start: 4, end: 4 });
        assert!(specs.iter().all(|s| s.assignee.is_none() && s.round == 1));
    }
}
