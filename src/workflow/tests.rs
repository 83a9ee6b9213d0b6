// Tests for variant bookkeeping across both pipelines

#[cfg(test)]
mod tests {
    use super::super::*;

    fn settings() -> WorkflowSettings {
        WorkflowSettings::default()
    }

    fn translation_at_quality_check(total: u32) -> LanguageVariant {
        let mut variant = LanguageVariant::new_translation("v-en", "English", total);
        for episode in 1..=total {
            variant.mark_episode_complete(episode).unwrap();
        }
        variant
            .apply_translation(TranslationEvent::SubmitTranslation, &settings())
            .unwrap();
        variant
            .apply_translation(TranslationEvent::ClaimReview, &settings())
            .unwrap();
        variant
    }

    fn reject(reason: &str) -> TranslationEvent {
        TranslationEvent::Review {
            decision: ReviewDecision::reject(reason, "qc01"),
        }
    }

    #[test]
    fn test_extraction_scenario_pending_to_completed() {
        let mut variant = LanguageVariant::new_source("v-zh", "中文", 3);
        assert!(variant.is_source_language());
        assert_eq!(variant.stage(), PipelineStage::from(ExtractionStage::Pending));

        variant
            .apply_extraction(ExtractionEvent::StartExtraction, &settings())
            .unwrap();
        variant
            .apply_extraction(ExtractionEvent::QueueDrained, &settings())
            .unwrap();
        assert_eq!(variant.stage(), PipelineStage::from(ExtractionStage::ExtractReview));

        assert_eq!(variant.confirm_episode(1).unwrap(), Some(2));
        assert_eq!(variant.confirm_episode(3).unwrap(), Some(2));

        let err = variant
            .apply_extraction(ExtractionEvent::ConfirmAll, &settings())
            .unwrap_err();
        assert_eq!(err, WorkflowError::CompletionGate { completed: 2, total: 3 });
        assert_eq!(variant.stage(), PipelineStage::from(ExtractionStage::ExtractReview));

        assert_eq!(variant.confirm_episode(2).unwrap(), None);
        variant
            .apply_extraction(ExtractionEvent::ConfirmAll, &settings())
            .unwrap();
        assert_eq!(variant.stage(), PipelineStage::from(ExtractionStage::ExtractCompleted));
        assert_eq!(variant.progress_percent(), 100);
        assert_eq!(variant.history().len(), 3);
    }

    #[test]
    fn test_confirm_episode_outside_review_is_refused() {
        let mut variant = LanguageVariant::new_source("v-zh", "中文", 3);
        assert!(variant.confirm_episode(1).is_err());
        assert_eq!(variant.completed_episodes(), 0);
    }

    #[test]
    fn test_episode_bounds_are_validated() {
        let mut variant = LanguageVariant::new_translation("v-en", "English", 5);
        assert!(variant.mark_episode_complete(0).is_err());
        assert!(variant.mark_episode_complete(6).is_err());
        assert_eq!(variant.mark_episode_complete(5), Ok(true));
        assert_eq!(variant.mark_episode_complete(5), Ok(false));
    }

    #[test]
    fn test_pipeline_mismatch() {
        let mut source = LanguageVariant::new_source("v-zh", "中文", 3);
        let err = source
            .apply_translation(TranslationEvent::SubmitTranslation, &settings())
            .unwrap_err();
        assert!(matches!(err, WorkflowError::PipelineMismatch { .. }));

        let mut translation = LanguageVariant::new_translation("v-en", "English", 3);
        assert!(translation
            .apply_extraction(ExtractionEvent::StartExtraction, &settings())
            .is_err());
        assert!(translation.apply_video_erase(VideoEraseEvent::Start).is_err());
    }

    #[test]
    fn test_short_reason_leaves_round_and_stage_untouched() {
        let mut variant = translation_at_quality_check(4);

        let err = variant.apply_translation(reject("too short"), &settings()).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(variant.stage(), PipelineStage::from(TranslationStage::QualityCheck));
        assert_eq!(variant.round(), Some(1));
        assert!(variant.rejections().is_empty());
        assert_eq!(variant.completed_episodes(), 4);

        variant.apply_translation(reject("too short!"), &settings()).unwrap();
        assert_eq!(variant.stage(), PipelineStage::from(TranslationStage::ManualTranslate));
        assert_eq!(variant.round(), Some(2));
    }

    #[test]
    fn test_each_rejection_opens_exactly_one_round() {
        let mut variant = translation_at_quality_check(2);

        for expected_round in 2..=5 {
            let previous = variant.round().unwrap();
            variant
                .apply_translation(reject("subtitles drift after 01:20"), &settings())
                .unwrap();
            assert_eq!(variant.round(), Some(previous + 1));
            assert_eq!(variant.round(), Some(expected_round));
            assert_eq!(variant.stage(), PipelineStage::from(TranslationStage::ManualTranslate));

            for episode in 1..=2 {
                variant.mark_episode_complete(episode).unwrap();
            }
            variant
                .apply_translation(TranslationEvent::SubmitTranslation, &settings())
                .unwrap();
            variant
                .apply_translation(TranslationEvent::ClaimReview, &settings())
                .unwrap();
        }

        let rounds: Vec<u32> = variant.rejections().iter().map(|r| r.round()).collect();
        assert_eq!(rounds, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_rejection_rolls_back_named_episodes_only() {
        let mut variant = translation_at_quality_check(4);
        let event = TranslationEvent::Review {
            decision: ReviewDecision::Reject {
                reason: "episode 2 names are inconsistent".to_string(),
                rejected_by: "qc01".to_string(),
                episodes: vec![2],
            },
        };
        variant.apply_translation(event, &settings()).unwrap();

        assert_eq!(variant.completed_episodes(), 3);
        assert!(variant.is_episode_rejected(2));
        assert!(!variant.is_episode_rejected(1));

        variant.mark_episode_complete(2).unwrap();
        assert!(!variant.is_episode_rejected(2));
    }

    #[test]
    fn test_rejection_without_episodes_rolls_back_everything() {
        let mut variant = translation_at_quality_check(3);
        variant
            .apply_translation(reject("whole season uses the wrong glossary"), &settings())
            .unwrap();
        assert_eq!(variant.completed_episodes(), 0);
        assert!((1..=3).all(|ep| variant.is_episode_rejected(ep)));
        assert_eq!(variant.progress_percent(), 0);
    }

    #[test]
    fn test_rejection_with_bad_episode_changes_nothing() {
        let mut variant = translation_at_quality_check(3);
        let event = TranslationEvent::Review {
            decision: ReviewDecision::Reject {
                reason: "episode 9 does not exist here".to_string(),
                rejected_by: "qc01".to_string(),
                episodes: vec![9],
            },
        };
        assert!(variant.apply_translation(event, &settings()).is_err());
        assert_eq!(variant.round(), Some(1));
        assert_eq!(variant.completed_episodes(), 3);
    }

    #[test]
    fn test_rejection_record_keeps_trimmed_reason() {
        let mut variant = translation_at_quality_check(1);
        variant
            .apply_translation(reject("   wrong speaker labels   "), &settings())
            .unwrap();
        let record = &variant.rejections()[0];
        assert_eq!(record.reason(), "wrong speaker labels");
        assert_eq!(record.rejected_by(), "qc01");
        assert_eq!(record.round(), 1);
    }

    #[test]
    fn test_approval_freezes_rounds_and_finishes_pipeline() {
        let mut variant = translation_at_quality_check(1);
        variant
            .apply_translation(
                TranslationEvent::Review {
                    decision: ReviewDecision::Approve,
                },
                &settings(),
            )
            .unwrap();
        assert!(variant.rounds().unwrap().is_frozen());
        assert_eq!(variant.stage(), PipelineStage::from(TranslationStage::PendingVideoCompress));

        variant
            .apply_translation(TranslationEvent::StartCompression, &settings())
            .unwrap();
        variant
            .apply_translation(TranslationEvent::CompressionFinished, &settings())
            .unwrap();
        assert_eq!(variant.stage(), PipelineStage::from(TranslationStage::Completed));
        assert_eq!(variant.round(), Some(1));
    }

    #[test]
    fn test_video_erase_runs_beside_translation() {
        let mut variant = LanguageVariant::new_source("v-zh", "中文", 1);
        for event in [ExtractionEvent::StartExtraction, ExtractionEvent::QueueDrained] {
            variant.apply_extraction(event, &settings()).unwrap();
        }
        variant.confirm_episode(1).unwrap();
        variant.apply_extraction(ExtractionEvent::ConfirmAll, &settings()).unwrap();

        variant.apply_video_erase(VideoEraseEvent::Start).unwrap();
        variant
            .apply_extraction(ExtractionEvent::StartTranslation, &settings())
            .unwrap();
        variant.apply_video_erase(VideoEraseEvent::Finish).unwrap();

        assert_eq!(variant.video_erase(), Some(VideoEraseStatus::Completed));
        assert_eq!(variant.stage(), PipelineStage::from(ExtractionStage::TranslateInProgress));
    }

    #[test]
    fn test_status_report() {
        let mut variant = translation_at_quality_check(4);
        variant.apply_translation(reject("please redo the intro"), &settings()).unwrap();
        variant.mark_episode_complete(1).unwrap();

        let report = variant.status_report();
        assert_eq!(report.variant_id, "v-en");
        assert!(!report.is_source_language);
        assert_eq!(report.stage_label, "人工翻译");
        assert_eq!(report.progress_percent, 25);
        assert_eq!(report.round, Some(2));
        assert_eq!(report.rejections, 1);
        assert_eq!(report.video_erase, None);
        assert_eq!(report.transitions_count, 3);
        assert!(report.last_transition.is_some());
    }
}
