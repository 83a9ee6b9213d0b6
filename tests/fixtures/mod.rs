//! Shared fixtures for the integration tests

#![allow(dead_code)]

use dramaflow::queue::{FixedProgress, NeverFail, TaskQueueSimulator, TaskSpec, TaskStage};
use dramaflow::workflow::{ExtractionEvent, TranslationEvent};
use dramaflow::{Project, ProjectStore, ReviewDecision, WorkflowSettings};

pub const PROJECT_ID: &str = "p-ceo";
pub const SOURCE: &str = "p-ceo-zh";
pub const ENGLISH: &str = "p-ceo-en";
pub const SPANISH: &str = "p-ceo-es";

/// A three-episode project with English and Spanish variants
pub fn store_with_project(settings: WorkflowSettings) -> ProjectStore {
    let mut store = ProjectStore::new(settings);
    let project = Project::new(PROJECT_ID, "霸道总裁爱上我", "zh", 3, &["en", "es"])
        .expect("valid project");
    store.add_project(project).expect("fresh store");
    store
}

pub fn extraction_queue(episodes: u32, increment: u8) -> TaskQueueSimulator {
    TaskQueueSimulator::with_sources(
        TaskSpec::per_episode(SOURCE, TaskStage::Extraction, episodes),
        5,
        Box::new(FixedProgress(increment)),
        Box::new(NeverFail),
    )
}

/// Complete every episode of a translation variant and bring it to quality check
pub fn bring_to_quality_check(store: &mut ProjectStore, variant_id: &str) {
    let total = store
        .variant(PROJECT_ID, variant_id)
        .expect("variant exists")
        .total_episodes();
    for episode in 1..=total {
        store
            .mark_episode_complete(PROJECT_ID, variant_id, episode)
            .expect("episode in range");
    }
    store
        .apply_translation(PROJECT_ID, variant_id, TranslationEvent::SubmitTranslation)
        .expect("submit");
    store
        .apply_translation(PROJECT_ID, variant_id, TranslationEvent::ClaimReview)
        .expect("claim");
}

pub fn reject(reason: &str) -> TranslationEvent {
    TranslationEvent::Review {
        decision: ReviewDecision::reject(reason, "qc01"),
    }
}

pub fn approve() -> TranslationEvent {
    TranslationEvent::Review {
        decision: ReviewDecision::Approve,
    }
}

pub fn start_extraction(store: &mut ProjectStore) {
    store
        .apply_extraction(PROJECT_ID, SOURCE, ExtractionEvent::StartExtraction)
        .expect("pending source variant");
}
