//! Editor policy derivation.
//!
//! Everything the subtitle editor shows or hides is a pure function of the
//! variant's stage, the acting role and whether the variant is the source
//! language. Button visibility additionally asks the permission provider.

use serde::{Deserialize, Serialize};

use super::roles::{Role, BUTTON_COMPLETE_EPISODE, BUTTON_SAVE, BUTTON_VIEW_MODIFICATIONS};
use super::traits::PermissionProvider;
use crate::workflow::{ExtractionStage, LanguageVariant, PipelineStage, TranslationStage, WorkflowError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorPolicy {
    pub is_read_only: bool,
    pub show_translation_column: bool,
    pub show_dual_subtitle: bool,
    pub show_complete_button: bool,
    pub show_submit_button: bool,
    pub show_modification_marks: bool,
}

pub fn derive_policy(
    stage: PipelineStage,
    role: Role,
    is_source_language: bool,
    permissions: &dyn PermissionProvider,
) -> EditorPolicy {
    use ExtractionStage as X;

    let is_read_only =
        stage == PipelineStage::Extraction(X::ExtractCompleted) || !role.can_edit_at(stage);

    let past_extraction_review = match stage {
        PipelineStage::Extraction(s) => s > X::ExtractReview && s != X::ExtractCompleted,
        PipelineStage::Translation(_) => true,
    };
    let show_translation_column = !is_source_language && past_extraction_review;

    let show_dual_subtitle = matches!(
        stage,
        PipelineStage::Extraction(X::ExtractReview | X::ExtractCompleted)
    );

    let can_act = !is_read_only && stage.is_editing_stage();

    let show_modification_marks = matches!(
        stage,
        PipelineStage::Translation(TranslationStage::ManualTranslate | TranslationStage::QualityCheck)
    ) && permissions.has_button(BUTTON_VIEW_MODIFICATIONS);

    EditorPolicy {
        is_read_only,
        show_translation_column,
        show_dual_subtitle,
        show_complete_button: can_act && permissions.has_button(BUTTON_COMPLETE_EPISODE),
        show_submit_button: can_act && permissions.has_button(BUTTON_SAVE),
        show_modification_marks,
    }
}

/// Policy for a variant as seen by the provider's own role
pub fn policy_for_variant(variant: &LanguageVariant, permissions: &dyn PermissionProvider) -> EditorPolicy {
    derive_policy(
        variant.stage(),
        permissions.role(),
        variant.is_source_language(),
        permissions,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeWorkStatus {
    Completed,
    /// Sent back by quality check and not completed since
    Rejected,
    Editable,
    Locked,
}

pub fn episode_work_status(
    variant: &LanguageVariant,
    episode: u32,
    permissions: &dyn PermissionProvider,
) -> Result<EpisodeWorkStatus, WorkflowError> {
    variant.validate_episode(episode)?;

    if variant.is_episode_completed(episode) {
        return Ok(EpisodeWorkStatus::Completed);
    }
    if variant.is_episode_rejected(episode) {
        return Ok(EpisodeWorkStatus::Rejected);
    }

    let policy = policy_for_variant(variant, permissions);
    if !policy.is_read_only && variant.stage().is_editing_stage() {
        Ok(EpisodeWorkStatus::Editable)
    } else {
        Ok(EpisodeWorkStatus::Locked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::mocks::MockPermissions;
    use crate::policy::permissions::RolePermissions;

    fn all_stages() -> Vec<PipelineStage> {
        ExtractionStage::ALL
            .iter()
            .map(|s| PipelineStage::from(*s))
            .chain(TranslationStage::ALL.iter().map(|s| PipelineStage::from(*s)))
            .collect()
    }

    #[test]
    fn test_extract_completed_is_read_only_even_for_admin() {
        let perms = RolePermissions::new(Role::Admin);
        let policy = derive_policy(ExtractionStage::ExtractCompleted.into(), Role::Admin, true, &perms);
        assert!(policy.is_read_only);
        assert!(!policy.show_complete_button);
        assert!(!policy.show_submit_button);
    }

    #[test]
    fn test_read_only_follows_edit_matrix() {
        let perms = MockPermissions::allow_all(Role::Translator);
        let translate = PipelineStage::from(TranslationStage::ManualTranslate);
        let qc = PipelineStage::from(TranslationStage::QualityCheck);

        assert!(!derive_policy(translate, Role::Translator, false, &perms).is_read_only);
        assert!(derive_policy(qc, Role::Translator, false, &perms).is_read_only);
        assert!(!derive_policy(qc, Role::QualityChecker, false, &perms).is_read_only);
        for stage in all_stages() {
            assert!(derive_policy(stage, Role::VideoEncoder, false, &perms).is_read_only);
        }
    }

    #[test]
    fn test_translation_column_hidden_during_extraction_window() {
        let perms = MockPermissions::allow_all(Role::Admin);
        for stage in [
            ExtractionStage::Pending,
            ExtractionStage::ExtractInProgress,
            ExtractionStage::ExtractReview,
            ExtractionStage::ExtractCompleted,
        ] {
            let policy = derive_policy(stage.into(), Role::Admin, false, &perms);
            assert!(!policy.show_translation_column, "visible at {stage}");
        }
        for stage in [
            ExtractionStage::TranslateInProgress,
            ExtractionStage::TranslateCompleted,
            ExtractionStage::TaskAssigned,
        ] {
            assert!(derive_policy(stage.into(), Role::Admin, false, &perms).show_translation_column);
            assert!(!derive_policy(stage.into(), Role::Admin, true, &perms).show_translation_column);
        }
        for stage in TranslationStage::ALL {
            assert!(derive_policy(stage.into(), Role::Admin, false, &perms).show_translation_column);
        }
    }

    #[test]
    fn test_dual_subtitle_only_around_extraction_review() {
        let perms = MockPermissions::allow_all(Role::Admin);
        for stage in all_stages() {
            let expected = matches!(
                stage,
                PipelineStage::Extraction(ExtractionStage::ExtractReview | ExtractionStage::ExtractCompleted)
            );
            assert_eq!(derive_policy(stage, Role::Admin, true, &perms).show_dual_subtitle, expected);
        }
    }

    #[test]
    fn test_buttons_require_permission() {
        let stage = PipelineStage::from(TranslationStage::ManualTranslate);
        let granted = MockPermissions::allow_all(Role::Translator);
        let policy = derive_policy(stage, Role::Translator, false, &granted);
        assert!(policy.show_complete_button);
        assert!(policy.show_submit_button);
        assert!(policy.show_modification_marks);

        let denied = MockPermissions::deny_all(Role::Translator);
        let policy = derive_policy(stage, Role::Translator, false, &denied);
        assert!(!policy.show_complete_button);
        assert!(!policy.show_submit_button);
        assert!(!policy.show_modification_marks);
        assert!(!policy.is_read_only);

        denied.grant_button("save");
        let policy = derive_policy(stage, Role::Translator, false, &denied);
        assert!(policy.show_submit_button);
        assert!(!policy.show_complete_button);
        assert!(denied.get_asked().contains(&"button:save".to_string()));
    }

    #[test]
    fn test_derive_policy_is_pure() {
        let perms = RolePermissions::new(Role::QualityChecker);
        for stage in all_stages() {
            for role in Role::ALL {
                for is_source in [true, false] {
                    let first = derive_policy(stage, role, is_source, &perms);
                    let second = derive_policy(stage, role, is_source, &perms);
                    assert_eq!(first, second);
                }
            }
        }
    }

    #[test]
    fn test_episode_work_status() {
        let mut variant = LanguageVariant::new_translation("v-en", "English", 3);
        variant.mark_episode_complete(1).unwrap();

        let translator = RolePermissions::new(Role::Translator);
        let encoder = RolePermissions::new(Role::VideoEncoder);

        assert_eq!(episode_work_status(&variant, 1, &translator), Ok(EpisodeWorkStatus::Completed));
        assert_eq!(episode_work_status(&variant, 2, &translator), Ok(EpisodeWorkStatus::Editable));
        assert_eq!(episode_work_status(&variant, 2, &encoder), Ok(EpisodeWorkStatus::Locked));
        assert!(episode_work_status(&variant, 4, &translator).is_err());
    }
}
