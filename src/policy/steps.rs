// Pipeline step view: which steps are done, active, enabled or blocked

use serde::{Deserialize, Serialize};

use super::traits::PermissionProvider;
use crate::workflow::{
    next_extraction_stage, next_translation_stage, ExtractionEvent, ExtractionStage,
    LanguageVariant, Pipeline, PipelineStage, ReviewDecision, TranslationEvent, TranslationStage,
    WorkflowSettings,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Completed,
    Active,
    /// The next step, and its gate is open
    Enabled,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepView {
    pub stage: PipelineStage,
    pub label: String,
    pub state: StepState,
}

/// Forward event that leaves each extraction stage
fn extraction_forward_event(stage: ExtractionStage) -> Option<ExtractionEvent> {
    match stage {
        ExtractionStage::Pending => Some(ExtractionEvent::StartExtraction),
        ExtractionStage::ExtractInProgress => Some(ExtractionEvent::QueueDrained),
        ExtractionStage::ExtractReview => Some(ExtractionEvent::ConfirmAll),
        ExtractionStage::ExtractCompleted => Some(ExtractionEvent::StartTranslation),
        ExtractionStage::TranslateInProgress => Some(ExtractionEvent::TranslationDrained),
        ExtractionStage::TranslateCompleted => Some(ExtractionEvent::TasksAssigned),
        ExtractionStage::TaskAssigned => None,
    }
}

fn translation_forward_event(stage: TranslationStage) -> Option<TranslationEvent> {
    match stage {
        TranslationStage::ManualTranslate => Some(TranslationEvent::SubmitTranslation),
        TranslationStage::PendingQualityCheck => Some(TranslationEvent::ClaimReview),
        TranslationStage::QualityCheck => Some(TranslationEvent::Review {
            decision: ReviewDecision::Approve,
        }),
        TranslationStage::PendingVideoCompress => Some(TranslationEvent::StartCompression),
        TranslationStage::VideoCompress => Some(TranslationEvent::CompressionFinished),
        TranslationStage::Completed => None,
    }
}

/// Every visible step of the variant's pipeline with its state.
///
/// Steps the provider hides through `has_workflow` are left out.
pub fn pipeline_steps(
    variant: &LanguageVariant,
    settings: &WorkflowSettings,
    permissions: &dyn PermissionProvider,
) -> Vec<StepView> {
    let gate = variant.gate_context(settings);

    let (stages, current, next_open): (Vec<PipelineStage>, usize, bool) = match variant.pipeline() {
        Pipeline::Source { stage, .. } => {
            let current = ExtractionStage::ALL.iter().position(|s| s == stage).unwrap_or(0);
            let next_open = extraction_forward_event(*stage)
                .map(|event| next_extraction_stage(*stage, event, &gate).is_ok())
                .unwrap_or(false);
            (
                ExtractionStage::ALL.iter().map(|s| PipelineStage::from(*s)).collect(),
                current,
                next_open,
            )
        }
        Pipeline::Translation { stage, .. } => {
            let current = TranslationStage::ALL.iter().position(|s| s == stage).unwrap_or(0);
            let next_open = translation_forward_event(*stage)
                .map(|event| next_translation_stage(*stage, &event, &gate).is_ok())
                .unwrap_or(false);
            (
                TranslationStage::ALL.iter().map(|s| PipelineStage::from(*s)).collect(),
                current,
                next_open,
            )
        }
    };
    let last = stages.len() - 1;

    stages
        .into_iter()
        .enumerate()
        .filter(|(_, stage)| permissions.has_workflow(stage.as_str()))
        .map(|(index, stage)| {
            let state = if index < current || (index == current && current == last) {
                StepState::Completed
            } else if index == current {
                StepState::Active
            } else if index == current + 1 && next_open {
                StepState::Enabled
            } else {
                StepState::Blocked
            };
            StepView {
                stage,
                label: stage.display_name().to_string(),
                state,
            }
        })
        .collect()
}
