//! Project store.
//!
//! Owns every project, its language variants and the tasks assigned
//! against them. All workflow mutation goes through here so the access
//! checks and logging happen in one place.

use serde::{Deserialize, Serialize};
use statig::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::info;
use uuid::Uuid;

use crate::policy::{pipeline_steps, policy_for_variant, EditorPolicy, PermissionProvider, StepView};
use crate::queue::{EpisodeRange, Task, TaskError, TaskEvent, TaskSpec, TaskStage, TaskStatus};
use crate::telemetry::create_workflow_span;
use crate::workflow::{
    ExtractionEvent, ExtractionStage, LanguageVariant, Pipeline, TranslationEvent, TranslationStage,
    VariantStatusReport, VideoEraseEvent, VideoEraseStatus, WorkflowError, WorkflowSettings,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    id: String,
    title: String,
    source_language: String,
    total_episodes: u32,
    variants: Vec<LanguageVariant>,
}

impl Project {
    /// A project with its source variant and one translation variant per
    /// target language. Variant ids are `<project id>-<language>`.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        source_language: impl Into<String>,
        total_episodes: u32,
        target_languages: &[&str],
    ) -> Result<Self, WorkflowError> {
        let id = id.into();
        let title = title.into();
        let source_language = source_language.into();

        if id.trim().is_empty() {
            return Err(WorkflowError::Validation("Project id must not be empty".into()));
        }
        if title.trim().is_empty() {
            return Err(WorkflowError::Validation("Project title must not be empty".into()));
        }

        let mut seen = HashSet::from([source_language.as_str()]);
        for language in target_languages {
            if !seen.insert(*language) {
                return Err(WorkflowError::Validation(format!(
                    "Language {language} appears more than once in project {id}"
                )));
            }
        }

        let mut variants = vec![LanguageVariant::new_source(
            format!("{id}-{source_language}"),
            source_language.clone(),
            total_episodes,
        )];
        variants.extend(target_languages.iter().map(|language| {
            LanguageVariant::new_translation(format!("{id}-{language}"), *language, total_episodes)
        }));

        Ok(Self {
            id,
            title,
            source_language,
            total_episodes,
            variants,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn total_episodes(&self) -> u32 {
        self.total_episodes
    }

    pub fn variants(&self) -> &[LanguageVariant] {
        &self.variants
    }

    pub fn source_variant(&self) -> Result<&LanguageVariant, WorkflowError> {
        self.variants
            .iter()
            .find(|v| v.is_source_language())
            .ok_or_else(|| WorkflowError::not_found("Source variant", self.id.as_str()))
    }

    pub fn variant(&self, variant_id: &str) -> Option<&LanguageVariant> {
        self.variants.iter().find(|v| v.id() == variant_id)
    }

    pub fn variant_for_language(&self, language: &str) -> Option<&LanguageVariant> {
        self.variants.iter().find(|v| v.language() == language)
    }
}

/// Everything the editor needs about one variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantView {
    pub report: VariantStatusReport,
    pub policy: EditorPolicy,
    pub steps: Vec<StepView>,
}

pub struct ProjectStore {
    projects: HashMap<String, Project>,
    tasks: Vec<StateMachine<Task>>,
    settings: WorkflowSettings,
}

impl ProjectStore {
    pub fn new(settings: WorkflowSettings) -> Self {
        Self {
            projects: HashMap::new(),
            tasks: Vec::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    pub fn add_project(&mut self, project: Project) -> Result<(), WorkflowError> {
        if self.projects.contains_key(project.id()) {
            return Err(WorkflowError::Validation(format!(
                "Project {} already exists",
                project.id()
            )));
        }
        info!(
            project_id = %project.id(),
            title = %project.title(),
            variants = project.variants().len(),
            "Project added"
        );
        self.projects.insert(project.id.clone(), project);
        Ok(())
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    pub fn project(&self, project_id: &str) -> Result<&Project, WorkflowError> {
        self.projects
            .get(project_id)
            .ok_or_else(|| WorkflowError::not_found("Project", project_id))
    }

    pub fn variant(&self, project_id: &str, variant_id: &str) -> Result<&LanguageVariant, WorkflowError> {
        self.project(project_id)?
            .variant(variant_id)
            .ok_or_else(|| WorkflowError::not_found("Variant", variant_id))
    }

    fn variant_mut(&mut self, project_id: &str, variant_id: &str) -> Result<&mut LanguageVariant, WorkflowError> {
        self.projects
            .get_mut(project_id)
            .ok_or_else(|| WorkflowError::not_found("Project", project_id))?
            .variants
            .iter_mut()
            .find(|v| v.id() == variant_id)
            .ok_or_else(|| WorkflowError::not_found("Variant", variant_id))
    }

    pub fn apply_extraction(
        &mut self,
        project_id: &str,
        variant_id: &str,
        event: ExtractionEvent,
    ) -> Result<ExtractionStage, WorkflowError> {
        let _span = create_workflow_span(event.as_str(), project_id, variant_id).entered();
        let settings = self.settings;
        self.variant_mut(project_id, variant_id)?
            .apply_extraction(event, &settings)
    }

    pub fn apply_translation(
        &mut self,
        project_id: &str,
        variant_id: &str,
        event: TranslationEvent,
    ) -> Result<TranslationStage, WorkflowError> {
        let _span = create_workflow_span(event.name(), project_id, variant_id).entered();
        let settings = self.settings;
        self.variant_mut(project_id, variant_id)?
            .apply_translation(event, &settings)
    }

    pub fn apply_video_erase(
        &mut self,
        project_id: &str,
        variant_id: &str,
        event: VideoEraseEvent,
    ) -> Result<VideoEraseStatus, WorkflowError> {
        self.variant_mut(project_id, variant_id)?.apply_video_erase(event)
    }

    pub fn mark_episode_complete(
        &mut self,
        project_id: &str,
        variant_id: &str,
        episode: u32,
    ) -> Result<bool, WorkflowError> {
        self.variant_mut(project_id, variant_id)?
            .mark_episode_complete(episode)
    }

    /// Confirm one extracted episode, returning the next one still unconfirmed
    pub fn confirm_episode(
        &mut self,
        project_id: &str,
        variant_id: &str,
        episode: u32,
    ) -> Result<Option<u32>, WorkflowError> {
        self.variant_mut(project_id, variant_id)?.confirm_episode(episode)
    }

    /// Editor view of a variant for the provider's role
    pub fn variant_view(
        &self,
        project_id: &str,
        variant_id: &str,
        permissions: &dyn PermissionProvider,
    ) -> Result<VariantView, WorkflowError> {
        let variant = self.variant(project_id, variant_id)?;
        if !permissions.can_access_variant(project_id, variant.language()) {
            tracing::warn!(
                project_id,
                language = variant.language(),
                role = %permissions.role(),
                "Variant access denied"
            );
            return Err(WorkflowError::AccessDenied {
                project_id: project_id.to_string(),
                language: variant.language().to_string(),
            });
        }

        Ok(VariantView {
            report: variant.status_report(),
            policy: policy_for_variant(variant, permissions),
            steps: pipeline_steps(variant, &self.settings, permissions),
        })
    }

    /// Assign work on a variant to a person.
    ///
    /// Manual translation tasks take the variant's translate round, quality
    /// check tasks its review round and everything else round 1. The first
    /// assignment after the source variant finishes AI translation moves
    /// it to task_assigned.
    pub fn assign_task(
        &mut self,
        project_id: &str,
        variant_id: &str,
        stage: TaskStage,
        episodes: EpisodeRange,
        assignee: &str,
    ) -> Result<Uuid, WorkflowError> {
        let assignee = assignee.trim();
        if assignee.is_empty() {
            return Err(WorkflowError::Validation("Task assignee must not be empty".into()));
        }

        let project = self.project(project_id)?;
        let variant = project
            .variant(variant_id)
            .ok_or_else(|| WorkflowError::not_found("Variant", variant_id))?;
        if episodes.end > variant.total_episodes() {
            return Err(WorkflowError::Validation(format!(
                "Episodes {episodes} exceed the {} episodes of variant {variant_id}",
                variant.total_episodes()
            )));
        }
        let fits_pipeline = match variant.pipeline() {
            Pipeline::Source { .. } => matches!(
                stage,
                TaskStage::Extraction | TaskStage::AiTranslation | TaskStage::VideoErase
            ),
            Pipeline::Translation { .. } => matches!(
                stage,
                TaskStage::ManualTranslation | TaskStage::QualityCheck | TaskStage::VideoCompress
            ),
        };
        if !fits_pipeline {
            return Err(WorkflowError::Validation(format!(
                "{} tasks cannot be assigned on variant {variant_id}",
                stage.as_str()
            )));
        }

        let round = match (stage, variant.rounds()) {
            (TaskStage::ManualTranslation, Some(rounds)) => rounds.translate_round(),
            (_, Some(rounds)) => rounds.review_round(),
            (_, None) => 1,
        };
        let spec = TaskSpec::new(
            variant_id,
            stage,
            round,
            episodes,
            Some(assignee.to_string()),
        );
        let source = project.source_variant()?;
        let source_id = source.id().to_string();
        let source_ready = matches!(
            source.pipeline(),
            Pipeline::Source {
                stage: ExtractionStage::TranslateCompleted,
                ..
            }
        );

        if source_ready {
            self.apply_extraction(project_id, &source_id, ExtractionEvent::TasksAssigned)?;
        }

        let task = Task::new(spec);
        let task_id = task.id();
        info!(
            %task_id,
            project_id,
            variant_id,
            stage = stage.as_str(),
            round = task.spec().round,
            episodes = %task.spec().episodes,
            assignee,
            "Task assigned"
        );
        self.tasks.push(task.state_machine());
        Ok(task_id)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().map(|sm| sm.inner())
    }

    pub fn task(&self, task_id: Uuid) -> Result<&Task, TaskError> {
        self.tasks()
            .find(|task| task.id() == task_id)
            .ok_or(TaskError::NotFound(task_id))
    }

    pub fn tasks_for_variant<'a>(&'a self, variant_id: &'a str) -> impl Iterator<Item = &'a Task> + 'a {
        self.tasks().filter(move |task| task.spec().variant_id == variant_id)
    }

    /// Drive an assigned task through its lifecycle
    pub fn update_task(&mut self, task_id: Uuid, event: &TaskEvent) -> Result<TaskStatus, TaskError> {
        let sm = self
            .tasks
            .iter_mut()
            .find(|sm| sm.inner().id() == task_id)
            .ok_or(TaskError::NotFound(task_id))?;
        if matches!(event, TaskEvent::Retry) && sm.inner().status() != TaskStatus::Failed {
            return Err(TaskError::NotRetryable {
                id: task_id,
                status: sm.inner().status(),
            });
        }
        sm.handle(event);
        Ok(sm.inner().status())
    }
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new(WorkflowSettings::default())
    }
}

impl fmt::Debug for ProjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectStore")
            .field("projects", &self.projects.len())
            .field("tasks", &self.tasks.len())
            .field("settings", &self.settings)
            .finish()
    }
}
