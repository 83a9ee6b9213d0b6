use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Invalid transition: {event} not allowed at stage {stage}")]
    InvalidTransition { stage: String, event: String },

    #[error("Completion gate: {completed} of {total} episodes completed")]
    CompletionGate { completed: u32, total: u32 },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Variant {variant_id} does not run that pipeline")]
    PipelineMismatch { variant_id: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Access denied to {language} variant of project {project_id}")]
    AccessDenied { project_id: String, language: String },
}

impl WorkflowError {
    pub fn invalid_transition(stage: impl ToString, event: impl ToString) -> Self {
        WorkflowError::InvalidTransition {
            stage: stage.to_string(),
            event: event.to_string(),
        }
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        WorkflowError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Errors a user can fix by changing their input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WorkflowError::Validation(_) | WorkflowError::CompletionGate { .. }
        )
    }
}
