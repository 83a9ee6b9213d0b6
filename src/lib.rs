// Dramaflow Library - short-drama localization workflow engine
// This exposes the core components for testing and integration

pub mod config;
pub mod policy;
pub mod queue;
pub mod store;
pub mod subtitles;
pub mod telemetry;
pub mod upload;
pub mod workflow;

// Re-export key types for easy access
pub use config::{config, DramaflowConfig};
pub use policy::{derive_policy, EditorPolicy, PermissionProvider, Role, RolePermissions};
pub use queue::{
    BoundedExecutor, QueueOutcome, QueueRunner, QueueSettings, Task, TaskExecutor, TaskQueueSimulator, TaskSpec,
    TaskStage, TaskStatus,
};
pub use store::{Project, ProjectStore, VariantView};
pub use subtitles::{ModificationComment, SubtitleEntry, SubtitleLine};
pub use telemetry::{create_queue_span, create_workflow_span, generate_correlation_id, init_telemetry, shutdown_telemetry};
pub use upload::{commit_upload, parse_upload_filename, plan_upload, UploadError, UploadPlan, UploadTarget};
pub use workflow::{
    ExtractionEvent, ExtractionStage, LanguageVariant, PipelineStage, ReviewDecision, TranslationEvent,
    TranslationStage, WorkflowError, WorkflowSettings,
};
