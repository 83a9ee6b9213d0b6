// Closed stage enums for the two localization pipelines

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stages of the source-language pipeline (AI extraction, then AI translation).
///
/// Declared in pipeline order, so `PartialOrd` compares pipeline position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStage {
    Pending,
    ExtractInProgress,
    ExtractReview,
    ExtractCompleted,
    TranslateInProgress,
    TranslateCompleted,
    TaskAssigned,
}

impl ExtractionStage {
    pub const ALL: [ExtractionStage; 7] = [
        ExtractionStage::Pending,
        ExtractionStage::ExtractInProgress,
        ExtractionStage::ExtractReview,
        ExtractionStage::ExtractCompleted,
        ExtractionStage::TranslateInProgress,
        ExtractionStage::TranslateCompleted,
        ExtractionStage::TaskAssigned,
    ];

    /// Stable identifier, also used for `has_workflow` permission lookups
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionStage::Pending => "pending",
            ExtractionStage::ExtractInProgress => "extract_in_progress",
            ExtractionStage::ExtractReview => "extract_review",
            ExtractionStage::ExtractCompleted => "extract_completed",
            ExtractionStage::TranslateInProgress => "translate_in_progress",
            ExtractionStage::TranslateCompleted => "translate_completed",
            ExtractionStage::TaskAssigned => "task_assigned",
        }
    }

    /// Label shown on the production dashboard
    pub fn display_name(self) -> &'static str {
        match self {
            ExtractionStage::Pending => "待处理",
            ExtractionStage::ExtractInProgress => "AI提取-进行中",
            ExtractionStage::ExtractReview => "AI提取-待确认",
            ExtractionStage::ExtractCompleted => "AI提取-已完成",
            ExtractionStage::TranslateInProgress => "AI翻译-进行中",
            ExtractionStage::TranslateCompleted => "AI翻译-已完成",
            ExtractionStage::TaskAssigned => "已分配任务",
        }
    }

    /// Extraction output is final from here on
    pub fn extraction_finished(self) -> bool {
        self >= ExtractionStage::ExtractCompleted
    }
}

/// Stages of a translation variant's human pipeline.
///
/// The two `Pending*` stages are the waits between a hand-off and the next
/// role picking the work up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationStage {
    ManualTranslate,
    PendingQualityCheck,
    QualityCheck,
    PendingVideoCompress,
    VideoCompress,
    Completed,
}

impl TranslationStage {
    pub const ALL: [TranslationStage; 6] = [
        TranslationStage::ManualTranslate,
        TranslationStage::PendingQualityCheck,
        TranslationStage::QualityCheck,
        TranslationStage::PendingVideoCompress,
        TranslationStage::VideoCompress,
        TranslationStage::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TranslationStage::ManualTranslate => "manual_translate",
            TranslationStage::PendingQualityCheck => "pending_quality_check",
            TranslationStage::QualityCheck => "quality_check",
            TranslationStage::PendingVideoCompress => "pending_video_compress",
            TranslationStage::VideoCompress => "video_compress",
            TranslationStage::Completed => "completed",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TranslationStage::ManualTranslate => "人工翻译",
            TranslationStage::PendingQualityCheck => "待质检",
            TranslationStage::QualityCheck => "质检",
            TranslationStage::PendingVideoCompress => "待压制",
            TranslationStage::VideoCompress => "视频压制",
            TranslationStage::Completed => "已完成",
        }
    }
}

/// Video erasure runs beside the extraction pipeline once extraction is done
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoEraseStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl VideoEraseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VideoEraseStatus::NotStarted => "not_started",
            VideoEraseStatus::InProgress => "in_progress",
            VideoEraseStatus::Completed => "completed",
        }
    }
}

/// A stage from either pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "pipeline", content = "stage", rename_all = "snake_case")]
pub enum PipelineStage {
    Extraction(ExtractionStage),
    Translation(TranslationStage),
}

impl PipelineStage {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::Extraction(stage) => stage.as_str(),
            PipelineStage::Translation(stage) => stage.as_str(),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PipelineStage::Extraction(stage) => stage.display_name(),
            PipelineStage::Translation(stage) => stage.display_name(),
        }
    }

    /// Parse a stable stage identifier from either pipeline
    pub fn parse(id: &str) -> Option<Self> {
        ExtractionStage::ALL
            .iter()
            .find(|stage| stage.as_str() == id)
            .map(|stage| PipelineStage::Extraction(*stage))
            .or_else(|| {
                TranslationStage::ALL
                    .iter()
                    .find(|stage| stage.as_str() == id)
                    .map(|stage| PipelineStage::Translation(*stage))
            })
    }

    /// Stages where an editor can change subtitle text
    pub fn is_editing_stage(self) -> bool {
        matches!(
            self,
            PipelineStage::Extraction(ExtractionStage::ExtractReview)
                | PipelineStage::Translation(TranslationStage::ManualTranslate)
                | PipelineStage::Translation(TranslationStage::QualityCheck)
        )
    }
}

impl From<ExtractionStage> for PipelineStage {
    fn from(stage: ExtractionStage) -> Self {
        PipelineStage::Extraction(stage)
    }
}

impl From<TranslationStage> for PipelineStage {
    fn from(stage: TranslationStage) -> Self {
        PipelineStage::Translation(stage)
    }
}

impl fmt::Display for ExtractionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TranslationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
