// Localization workflow - stage machines for source and translation variants
//
// Stage transitions are pure functions; LanguageVariant is the only place a
// stage is ever written.

pub mod errors;
pub mod review;
pub mod stage;
pub mod transition;
pub mod variant;

#[cfg(test)]
pub mod tests;

use serde::{Deserialize, Serialize};

pub use errors::WorkflowError;
pub use review::{
    validate_rejection_reason, RejectionRecord, ReviewDecision, RoundCounter,
    MIN_REJECTION_REASON_CHARS,
};
pub use stage::{ExtractionStage, PipelineStage, TranslationStage, VideoEraseStatus};
pub use transition::{
    next_extraction_stage, next_translation_stage, next_video_erase_status, ExtractionEvent,
    GateContext, TranslationEvent, VideoEraseEvent,
};
pub use variant::{LanguageVariant, Pipeline, StageTransitionRecord, VariantStatusReport};

/// Rules that tune gates and review validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSettings {
    pub min_rejection_reason_chars: usize,
    pub strict_episode_gates: bool,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            min_rejection_reason_chars: MIN_REJECTION_REASON_CHARS,
            strict_episode_gates: false,
        }
    }
}
