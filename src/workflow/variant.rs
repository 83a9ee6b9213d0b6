use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, warn};

use super::errors::WorkflowError;
use super::review::{validate_rejection_reason, RejectionRecord, ReviewDecision, RoundCounter};
use super::stage::{ExtractionStage, PipelineStage, TranslationStage, VideoEraseStatus};
use super::transition::{
    next_extraction_stage, next_translation_stage, next_video_erase_status, ExtractionEvent,
    GateContext, TranslationEvent, VideoEraseEvent,
};
use super::WorkflowSettings;

/// Pipeline state of a variant. Source variants only ever hold extraction
/// stages and translation variants only translation stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pipeline {
    Source {
        stage: ExtractionStage,
        video_erase: VideoEraseStatus,
    },
    Translation {
        stage: TranslationStage,
        rounds: RoundCounter,
        rejections: Vec<RejectionRecord>,
    },
}

impl Pipeline {
    pub fn stage(&self) -> PipelineStage {
        match self {
            Pipeline::Source { stage, .. } => PipelineStage::Extraction(*stage),
            Pipeline::Translation { stage, .. } => PipelineStage::Translation(*stage),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTransitionRecord {
    pub from: PipelineStage,
    pub to: PipelineStage,
    pub event: String,
    pub at: DateTime<Utc>,
}

/// One (project, language) pairing tracked through its pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageVariant {
    id: String,
    language: String,
    total_episodes: u32,
    completed: BTreeSet<u32>,
    rejected: BTreeSet<u32>,
    pipeline: Pipeline,
    history: Vec<StageTransitionRecord>,
}

/// Snapshot of a variant for dashboards and logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantStatusReport {
    pub variant_id: String,
    pub language: String,
    pub is_source_language: bool,
    pub stage: PipelineStage,
    pub stage_label: String,
    pub completed_episodes: u32,
    pub total_episodes: u32,
    pub progress_percent: u8,
    pub round: Option<u32>,
    pub rejections: usize,
    pub video_erase: Option<VideoEraseStatus>,
    pub transitions_count: usize,
    pub last_transition: Option<DateTime<Utc>>,
}

impl LanguageVariant {
    pub fn new_source(id: impl Into<String>, language: impl Into<String>, total_episodes: u32) -> Self {
        Self::with_pipeline(
            id.into(),
            language.into(),
            total_episodes,
            Pipeline::Source {
                stage: ExtractionStage::Pending,
                video_erase: VideoEraseStatus::NotStarted,
            },
        )
    }

    pub fn new_translation(
        id: impl Into<String>,
        language: impl Into<String>,
        total_episodes: u32,
    ) -> Self {
        Self::with_pipeline(
            id.into(),
            language.into(),
            total_episodes,
            Pipeline::Translation {
                stage: TranslationStage::ManualTranslate,
                rounds: RoundCounter::new(),
                rejections: Vec::new(),
            },
        )
    }

    fn with_pipeline(id: String, language: String, total_episodes: u32, pipeline: Pipeline) -> Self {
        Self {
            id,
            language,
            total_episodes,
            completed: BTreeSet::new(),
            rejected: BTreeSet::new(),
            pipeline,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn is_source_language(&self) -> bool {
        matches!(self.pipeline, Pipeline::Source { .. })
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn stage(&self) -> PipelineStage {
        self.pipeline.stage()
    }

    pub fn total_episodes(&self) -> u32 {
        self.total_episodes
    }

    pub fn completed_episodes(&self) -> u32 {
        self.completed.len() as u32
    }

    pub fn is_episode_completed(&self, episode: u32) -> bool {
        self.completed.contains(&episode)
    }

    pub fn is_episode_rejected(&self, episode: u32) -> bool {
        self.rejected.contains(&episode)
    }

    /// Whole-number completion percentage, floored
    pub fn progress_percent(&self) -> u8 {
        if self.total_episodes == 0 {
            return 0;
        }
        (self.completed_episodes() * 100 / self.total_episodes) as u8
    }

    /// Current rework round, for translation variants
    pub fn round(&self) -> Option<u32> {
        match &self.pipeline {
            Pipeline::Translation { rounds, .. } => Some(rounds.current()),
            Pipeline::Source { .. } => None,
        }
    }

    pub fn rounds(&self) -> Option<&RoundCounter> {
        match &self.pipeline {
            Pipeline::Translation { rounds, .. } => Some(rounds),
            Pipeline::Source { .. } => None,
        }
    }

    pub fn rejections(&self) -> &[RejectionRecord] {
        match &self.pipeline {
            Pipeline::Translation { rejections, .. } => rejections,
            Pipeline::Source { .. } => &[],
        }
    }

    pub fn video_erase(&self) -> Option<VideoEraseStatus> {
        match &self.pipeline {
            Pipeline::Source { video_erase, .. } => Some(*video_erase),
            Pipeline::Translation { .. } => None,
        }
    }

    pub fn history(&self) -> &[StageTransitionRecord] {
        &self.history
    }

    pub fn gate_context(&self, settings: &WorkflowSettings) -> GateContext {
        GateContext {
            completed_episodes: self.completed_episodes(),
            total_episodes: self.total_episodes,
            min_rejection_reason_chars: settings.min_rejection_reason_chars,
            strict_episode_gates: settings.strict_episode_gates,
        }
    }

    pub(crate) fn validate_episode(&self, episode: u32) -> Result<(), WorkflowError> {
        if episode == 0 || episode > self.total_episodes {
            return Err(WorkflowError::Validation(format!(
                "Episode {episode} is outside 1..={}",
                self.total_episodes
            )));
        }
        Ok(())
    }

    /// Mark an episode complete. Returns false if it already was.
    pub fn mark_episode_complete(&mut self, episode: u32) -> Result<bool, WorkflowError> {
        self.validate_episode(episode)?;
        self.rejected.remove(&episode);
        let inserted = self.completed.insert(episode);
        if inserted {
            info!(
                variant_id = %self.id,
                episode = episode,
                completed = self.completed.len(),
                total = self.total_episodes,
                "Episode completed"
            );
        }
        Ok(inserted)
    }

    /// Confirm one episode's extraction output during review.
    ///
    /// Returns the next episode still awaiting confirmation, searching
    /// forward first and then from the start.
    pub fn confirm_episode(&mut self, episode: u32) -> Result<Option<u32>, WorkflowError> {
        if self.stage() != PipelineStage::Extraction(ExtractionStage::ExtractReview) {
            return Err(WorkflowError::invalid_transition(self.stage(), "confirm_episode"));
        }
        self.mark_episode_complete(episode)?;

        let next = (episode + 1..=self.total_episodes)
            .chain(1..episode)
            .find(|candidate| !self.completed.contains(candidate));
        Ok(next)
    }

    pub fn apply_extraction(
        &mut self,
        event: ExtractionEvent,
        settings: &WorkflowSettings,
    ) -> Result<ExtractionStage, WorkflowError> {
        let gate = self.gate_context(settings);
        let Pipeline::Source { stage, .. } = &mut self.pipeline else {
            return Err(WorkflowError::PipelineMismatch {
                variant_id: self.id.clone(),
            });
        };

        let from = *stage;
        let to = match next_extraction_stage(from, event, &gate) {
            Ok(to) => to,
            Err(e) => {
                warn!(variant_id = %self.id, stage = %from, event = %event, error = %e, "Extraction transition refused");
                return Err(e);
            }
        };
        *stage = to;
        self.record_transition(from.into(), to.into(), event.to_string());
        Ok(to)
    }

    pub fn apply_translation(
        &mut self,
        event: TranslationEvent,
        settings: &WorkflowSettings,
    ) -> Result<TranslationStage, WorkflowError> {
        let gate = self.gate_context(settings);
        let from = match &self.pipeline {
            Pipeline::Translation { stage, .. } => *stage,
            Pipeline::Source { .. } => {
                return Err(WorkflowError::PipelineMismatch {
                    variant_id: self.id.clone(),
                })
            }
        };

        let to = match next_translation_stage(from, &event, &gate) {
            Ok(to) => to,
            Err(e) => {
                warn!(variant_id = %self.id, stage = %from, event = %event, error = %e, "Translation transition refused");
                return Err(e);
            }
        };

        // Everything that can fail is checked before the variant is touched
        let rollback = match &event {
            TranslationEvent::Review {
                decision:
                    ReviewDecision::Reject {
                        reason,
                        rejected_by,
                        episodes,
                    },
            } => Some(self.prepare_rejection(reason, rejected_by, episodes, settings)?),
            _ => None,
        };

        let Pipeline::Translation {
            stage,
            rounds,
            rejections,
        } = &mut self.pipeline
        else {
            return Err(WorkflowError::PipelineMismatch {
                variant_id: self.id.clone(),
            });
        };

        match rollback {
            Some(rejection) => {
                let rejected_round = rounds.current();
                // A frozen counter never reaches quality check again, so this always opens a round
                let new_round = rounds.open_next_round().unwrap_or(rejected_round);
                rejections.push(RejectionRecord::new(
                    rejected_round,
                    rejection.reason,
                    rejection.rejected_by.clone(),
                    Utc::now(),
                ));
                for episode in &rejection.episodes {
                    self.completed.remove(episode);
                    self.rejected.insert(*episode);
                }
                warn!(
                    variant_id = %self.id,
                    rejected_round = rejected_round,
                    round = new_round,
                    rejected_by = %rejection.rejected_by,
                    episodes = ?rejection.episodes,
                    "Quality check rejected translation"
                );
            }
            None => {
                if matches!(
                    event,
                    TranslationEvent::Review {
                        decision: ReviewDecision::Approve
                    }
                ) {
                    rounds.freeze();
                    info!(variant_id = %self.id, round = rounds.current(), "Quality check approved translation");
                }
            }
        }

        *stage = to;
        self.record_transition(from.into(), to.into(), event.to_string());
        Ok(to)
    }

    pub fn apply_video_erase(&mut self, event: VideoEraseEvent) -> Result<VideoEraseStatus, WorkflowError> {
        let Pipeline::Source { stage, video_erase } = &mut self.pipeline else {
            return Err(WorkflowError::PipelineMismatch {
                variant_id: self.id.clone(),
            });
        };

        let next = next_video_erase_status(*stage, *video_erase, event)?;
        info!(
            variant_id = %self.id,
            from = video_erase.as_str(),
            to = next.as_str(),
            "Video erase status changed"
        );
        *video_erase = next;
        Ok(next)
    }

    fn prepare_rejection(
        &self,
        reason: &str,
        rejected_by: &str,
        episodes: &[u32],
        settings: &WorkflowSettings,
    ) -> Result<PreparedRejection, WorkflowError> {
        let reason = validate_rejection_reason(reason, settings.min_rejection_reason_chars)?;
        if rejected_by.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "Rejection must name the reviewer".to_string(),
            ));
        }
        for episode in episodes {
            self.validate_episode(*episode)?;
        }

        let episodes: BTreeSet<u32> = if episodes.is_empty() {
            (1..=self.total_episodes).collect()
        } else {
            episodes.iter().copied().collect()
        };

        Ok(PreparedRejection {
            reason,
            rejected_by: rejected_by.trim().to_string(),
            episodes,
        })
    }

    fn record_transition(&mut self, from: PipelineStage, to: PipelineStage, event: String) {
        let record = StageTransitionRecord {
            from,
            to,
            event,
            at: Utc::now(),
        };

        info!(
            variant_id = %self.id,
            language = %self.language,
            from = %record.from,
            to = %record.to,
            event = %record.event,
            "Variant stage transition"
        );

        self.history.push(record);
    }

    pub fn status_report(&self) -> VariantStatusReport {
        let stage = self.stage();
        VariantStatusReport {
            variant_id: self.id.clone(),
            language: self.language.clone(),
            is_source_language: self.is_source_language(),
            stage,
            stage_label: stage.display_name().to_string(),
            completed_episodes: self.completed_episodes(),
            total_episodes: self.total_episodes,
            progress_percent: self.progress_percent(),
            round: self.round(),
            rejections: self.rejections().len(),
            video_erase: self.video_erase(),
            transitions_count: self.history.len(),
            last_transition: self.history.last().map(|t| t.at),
        }
    }
}

struct PreparedRejection {
    reason: String,
    rejected_by: String,
    episodes: BTreeSet<u32>,
}
