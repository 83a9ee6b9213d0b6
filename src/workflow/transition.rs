// Pure transition tables for both pipelines.
// Nothing here mutates a variant; callers apply the returned stage.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::WorkflowError;
use super::review::{validate_rejection_reason, ReviewDecision, MIN_REJECTION_REASON_CHARS};
use super::stage::{ExtractionStage, TranslationStage, VideoEraseStatus};

/// Events of the source-language pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionEvent {
    StartExtraction,
    /// Every per-episode extraction task reached completed
    QueueDrained,
    /// Confirm the whole variant at review
    ConfirmAll,
    StartTranslation,
    TranslationDrained,
    TasksAssigned,
}

impl ExtractionEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionEvent::StartExtraction => "start_extraction",
            ExtractionEvent::QueueDrained => "queue_drained",
            ExtractionEvent::ConfirmAll => "confirm_all",
            ExtractionEvent::StartTranslation => "start_translation",
            ExtractionEvent::TranslationDrained => "translation_drained",
            ExtractionEvent::TasksAssigned => "tasks_assigned",
        }
    }
}

/// Events of the human translation pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TranslationEvent {
    SubmitTranslation,
    ClaimReview,
    Review { decision: ReviewDecision },
    StartCompression,
    CompressionFinished,
}

impl TranslationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TranslationEvent::SubmitTranslation => "submit_translation",
            TranslationEvent::ClaimReview => "claim_review",
            TranslationEvent::Review {
                decision: ReviewDecision::Approve,
            } => "approve",
            TranslationEvent::Review {
                decision: ReviewDecision::Reject { .. },
            } => "reject",
            TranslationEvent::StartCompression => "start_compression",
            TranslationEvent::CompressionFinished => "compression_finished",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoEraseEvent {
    Start,
    Finish,
}

impl fmt::Display for ExtractionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TranslationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for VideoEraseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoEraseEvent::Start => f.write_str("start_video_erase"),
            VideoEraseEvent::Finish => f.write_str("video_erase_finished"),
        }
    }
}

/// Facts about the variant that gates depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateContext {
    pub completed_episodes: u32,
    pub total_episodes: u32,
    pub min_rejection_reason_chars: usize,
    /// Also require every episode before handing translation to review
    pub strict_episode_gates: bool,
}

impl GateContext {
    pub fn new(completed_episodes: u32, total_episodes: u32) -> Self {
        Self {
            completed_episodes,
            total_episodes,
            min_rejection_reason_chars: MIN_REJECTION_REASON_CHARS,
            strict_episode_gates: false,
        }
    }

    pub fn all_episodes_completed(&self) -> bool {
        self.completed_episodes == self.total_episodes
    }

    fn require_all_episodes(&self) -> Result<(), WorkflowError> {
        if self.all_episodes_completed() {
            Ok(())
        } else {
            Err(WorkflowError::CompletionGate {
                completed: self.completed_episodes,
                total: self.total_episodes,
            })
        }
    }
}

/// Next stage of the source-language pipeline
pub fn next_extraction_stage(
    stage: ExtractionStage,
    event: ExtractionEvent,
    gate: &GateContext,
) -> Result<ExtractionStage, WorkflowError> {
    use ExtractionEvent as E;
    use ExtractionStage as S;

    match (stage, event) {
        (S::Pending, E::StartExtraction) => Ok(S::ExtractInProgress),
        (S::ExtractInProgress, E::QueueDrained) => Ok(S::ExtractReview),
        (S::ExtractReview, E::ConfirmAll) => {
            gate.require_all_episodes()?;
            Ok(S::ExtractCompleted)
        }
        (S::ExtractCompleted, E::StartTranslation) => Ok(S::TranslateInProgress),
        (S::TranslateInProgress, E::TranslationDrained) => Ok(S::TranslateCompleted),
        (S::TranslateCompleted | S::TaskAssigned, E::TasksAssigned) => Ok(S::TaskAssigned),
        (stage, event) => Err(WorkflowError::invalid_transition(stage, event)),
    }
}

/// Next stage of the translation pipeline.
///
/// Rejections are validated here; the round bookkeeping and audit record are
/// the caller's job once this returns `Ok`.
pub fn next_translation_stage(
    stage: TranslationStage,
    event: &TranslationEvent,
    gate: &GateContext,
) -> Result<TranslationStage, WorkflowError> {
    use TranslationEvent as E;
    use TranslationStage as S;

    match (stage, event) {
        (S::ManualTranslate, E::SubmitTranslation) => {
            if gate.strict_episode_gates {
                gate.require_all_episodes()?;
            }
            Ok(S::PendingQualityCheck)
        }
        (S::PendingQualityCheck, E::ClaimReview) => Ok(S::QualityCheck),
        (S::QualityCheck, E::Review { decision }) => match decision {
            ReviewDecision::Approve => Ok(S::PendingVideoCompress),
            ReviewDecision::Reject { reason, .. } => {
                validate_rejection_reason(reason, gate.min_rejection_reason_chars)?;
                Ok(S::ManualTranslate)
            }
        },
        (S::PendingVideoCompress, E::StartCompression) => Ok(S::VideoCompress),
        (S::VideoCompress, E::CompressionFinished) => Ok(S::Completed),
        (stage, event) => Err(WorkflowError::invalid_transition(stage, event)),
    }
}

/// Next video erase status; erasure can only start once extraction is done
pub fn next_video_erase_status(
    stage: ExtractionStage,
    status: VideoEraseStatus,
    event: VideoEraseEvent,
) -> Result<VideoEraseStatus, WorkflowError> {
    match (status, event) {
        (VideoEraseStatus::NotStarted, VideoEraseEvent::Start) if stage.extraction_finished() => {
            Ok(VideoEraseStatus::InProgress)
        }
        (VideoEraseStatus::InProgress, VideoEraseEvent::Finish) => Ok(VideoEraseStatus::Completed),
        (status, event) => Err(WorkflowError::invalid_transition(
            format!("{stage}/video_erase:{}", status.as_str()),
            event,
        )),
    }
}
