// Role names and the role/stage edit matrix

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::workflow::{ExtractionStage, PipelineStage, TranslationStage};

pub const BUTTON_SAVE: &str = "save";
pub const BUTTON_COMPLETE_EPISODE: &str = "complete_episode";
pub const BUTTON_VIEW_MODIFICATIONS: &str = "view_modifications";
pub const BUTTON_APPROVE: &str = "approve";
pub const BUTTON_REJECT: &str = "reject";
pub const BUTTON_ASSIGN_TASK: &str = "assign_task";
pub const BUTTON_UPLOAD: &str = "upload";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    ProjectManager,
    MaterialHandler,
    Translator,
    QualityChecker,
    VideoEncoder,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::ProjectManager,
        Role::MaterialHandler,
        Role::Translator,
        Role::QualityChecker,
        Role::VideoEncoder,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::ProjectManager => "project_manager",
            Role::MaterialHandler => "material_handler",
            Role::Translator => "translator",
            Role::QualityChecker => "quality_checker",
            Role::VideoEncoder => "video_encoder",
        }
    }

    /// Admins and project managers act on every stage
    pub fn is_manager(self) -> bool {
        matches!(self, Role::Admin | Role::ProjectManager)
    }

    /// Whether this role may change subtitle text at the given stage
    pub fn can_edit_at(self, stage: PipelineStage) -> bool {
        match self {
            Role::Admin | Role::ProjectManager => true,
            Role::MaterialHandler => stage == PipelineStage::Extraction(ExtractionStage::ExtractReview),
            Role::Translator => stage == PipelineStage::Translation(TranslationStage::ManualTranslate),
            Role::QualityChecker => stage == PipelineStage::Translation(TranslationStage::QualityCheck),
            Role::VideoEncoder => false,
        }
    }

    /// Buttons a role gets when no finer-grained permission source is wired in
    pub fn default_buttons(self) -> &'static [&'static str] {
        match self {
            Role::Admin | Role::ProjectManager => &[
                BUTTON_SAVE,
                BUTTON_COMPLETE_EPISODE,
                BUTTON_VIEW_MODIFICATIONS,
                BUTTON_APPROVE,
                BUTTON_REJECT,
                BUTTON_ASSIGN_TASK,
                BUTTON_UPLOAD,
            ],
            Role::MaterialHandler => &[BUTTON_SAVE, BUTTON_COMPLETE_EPISODE, BUTTON_UPLOAD],
            Role::Translator => &[BUTTON_SAVE, BUTTON_COMPLETE_EPISODE, BUTTON_VIEW_MODIFICATIONS],
            Role::QualityChecker => &[
                BUTTON_SAVE,
                BUTTON_COMPLETE_EPISODE,
                BUTTON_VIEW_MODIFICATIONS,
                BUTTON_APPROVE,
                BUTTON_REJECT,
            ],
            Role::VideoEncoder => &[BUTTON_UPLOAD],
        }
    }

    /// Pipeline stages a role sees on its dashboard
    pub fn sees_stage(self, stage: PipelineStage) -> bool {
        use PipelineStage::{Extraction, Translation};
        match self {
            Role::Admin | Role::ProjectManager => true,
            Role::MaterialHandler => matches!(stage, Extraction(_)),
            Role::Translator | Role::QualityChecker => matches!(
                stage,
                Translation(
                    TranslationStage::ManualTranslate
                        | TranslationStage::PendingQualityCheck
                        | TranslationStage::QualityCheck
                )
            ),
            Role::VideoEncoder => matches!(
                stage,
                Translation(
                    TranslationStage::PendingVideoCompress
                        | TranslationStage::VideoCompress
                        | TranslationStage::Completed
                )
            ),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Role::ALL.iter().map(|r| r.as_str()).collect();
                format!("Invalid role '{s}'. Must be one of: {}", valid.join(", "))
            })
    }
}
