//! Upload filename convention.
//!
//! Uploaded episode files are named
//! `<DramaTitle>-<TypeSuffix>-<Language>-<EpisodeNumber>.<ext>`. The title
//! may itself contain dashes; the last three dash-separated fields never do.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;
use thiserror::Error;

static UPLOAD_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<title>.+)-(?P<kind>[^-]+)-(?P<lang>[^-]+)-(?P<ep>\d+)\.(?P<ext>[A-Za-z0-9]+)$")
        .expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("No file selected")]
    NoFileSelected,
    #[error("File name '{0}' does not follow <title>-<type>-<language>-<episode>.<ext>")]
    InvalidName(String),
    #[error("Episode number in '{0}' must be a positive integer")]
    InvalidEpisode(String),
    #[error("Episode {episode} already has a {language} file; confirm the overwrite first")]
    OverwriteNotConfirmed { language: String, episode: u32 },
}

/// What a well-formed upload name says about its content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTarget {
    pub title: String,
    pub type_suffix: String,
    pub language: String,
    pub episode: u32,
    pub extension: String,
}

impl UploadTarget {
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}-{}-{}.{}",
            self.title, self.type_suffix, self.language, self.episode, self.extension
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UploadPlan {
    New(UploadTarget),
    /// The episode already has a file in this language
    Overwrite(UploadTarget),
}

impl UploadPlan {
    pub fn target(&self) -> &UploadTarget {
        match self {
            UploadPlan::New(target) | UploadPlan::Overwrite(target) => target,
        }
    }

    pub fn needs_confirmation(&self) -> bool {
        matches!(self, UploadPlan::Overwrite(_))
    }
}

pub fn parse_upload_filename(filename: &str) -> Result<UploadTarget, UploadError> {
    let name = filename.trim();
    let caps = UPLOAD_NAME_RE
        .captures(name)
        .ok_or_else(|| UploadError::InvalidName(name.to_string()))?;

    let episode: u32 = caps["ep"]
        .parse()
        .map_err(|_| UploadError::InvalidEpisode(name.to_string()))?;
    if episode == 0 {
        return Err(UploadError::InvalidEpisode(name.to_string()));
    }

    Ok(UploadTarget {
        title: caps["title"].to_string(),
        type_suffix: caps["kind"].to_string(),
        language: caps["lang"].to_string(),
        episode,
        extension: caps["ext"].to_ascii_lowercase(),
    })
}

/// Decide whether an upload adds a file or replaces one.
///
/// `existing` holds the (language, episode) pairs that already have a file.
pub fn plan_upload(filename: &str, existing: &HashSet<(String, u32)>) -> Result<UploadPlan, UploadError> {
    let target = parse_upload_filename(filename)?;
    if existing.contains(&(target.language.clone(), target.episode)) {
        Ok(UploadPlan::Overwrite(target))
    } else {
        Ok(UploadPlan::New(target))
    }
}

/// Plan every selected file; an empty selection is an error
pub fn plan_uploads(
    filenames: &[&str],
    existing: &HashSet<(String, u32)>,
) -> Result<Vec<UploadPlan>, UploadError> {
    if filenames.is_empty() {
        return Err(UploadError::NoFileSelected);
    }
    filenames.iter().map(|name| plan_upload(name, existing)).collect()
}

/// Commit a plan; overwrites need explicit confirmation
pub fn commit_upload(plan: UploadPlan, overwrite_confirmed: bool) -> Result<UploadTarget, UploadError> {
    match plan {
        UploadPlan::New(target) => {
            tracing::info!(file = %target.file_name(), "Upload committed");
            Ok(target)
        }
        UploadPlan::Overwrite(target) if overwrite_confirmed => {
            tracing::info!(file = %target.file_name(), "Upload committed over existing file");
            Ok(target)
        }
        UploadPlan::Overwrite(target) => {
            tracing::warn!(
                language = %target.language,
                episode = target.episode,
                "Overwrite refused without confirmation"
            );
            Err(UploadError::OverwriteNotConfirmed {
                language: target.language,
                episode: target.episode,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing(pairs: &[(&str, u32)]) -> HashSet<(String, u32)> {
        pairs.iter().map(|(l, e)| (l.to_string(), *e)).collect()
    }

    #[test]
    fn test_parse_basic_name() {
        let target = parse_upload_filename("霸道总裁-字幕-英语-12.SRT").unwrap();
        assert_eq!(target.title, "霸道总裁");
        assert_eq!(target.type_suffix, "字幕");
        assert_eq!(target.language, "英语");
        assert_eq!(target.episode, 12);
        assert_eq!(target.extension, "srt");
    }

    #[test]
    fn test_title_may_contain_dashes() {
        let target = parse_upload_filename("Love-in-Shanghai-video-en-3.mp4").unwrap();
        assert_eq!(target.title, "Love-in-Shanghai");
        assert_eq!(target.type_suffix, "video");
        assert_eq!(target.language, "en");
        assert_eq!(target.episode, 3);
        assert_eq!(target.file_name(), "Love-in-Shanghai-video-en-3.mp4");
    }

    #[test]
    fn test_malformed_names() {
        assert!(matches!(
            parse_upload_filename("drama-video-en.mp4"),
            Err(UploadError::InvalidName(_))
        ));
        assert!(matches!(
            parse_upload_filename("drama-video-en-ep3.mp4"),
            Err(UploadError::InvalidName(_))
        ));
        assert!(matches!(
            parse_upload_filename("drama-video-en-0.mp4"),
            Err(UploadError::InvalidEpisode(_))
        ));
        assert!(matches!(
            parse_upload_filename("drama-video-en-99999999999.mp4"),
            Err(UploadError::InvalidEpisode(_))
        ));
    }

    #[test]
    fn test_plan_detects_conflicts() {
        let taken = existing(&[("en", 3)]);
        assert!(matches!(
            plan_upload("drama-video-en-4.mp4", &taken),
            Ok(UploadPlan::New(_))
        ));
        let plan = plan_upload("drama-video-en-3.mp4", &taken).unwrap();
        assert!(plan.needs_confirmation());
        assert!(matches!(
            plan_upload("drama-video-es-3.mp4", &taken),
            Ok(UploadPlan::New(_))
        ));
    }

    #[test]
    fn test_overwrite_requires_confirmation() {
        let taken = existing(&[("en", 3)]);
        let plan = plan_upload("drama-video-en-3.mp4", &taken).unwrap();

        assert_eq!(
            commit_upload(plan.clone(), false),
            Err(UploadError::OverwriteNotConfirmed {
                language: "en".into(),
                episode: 3,
            })
        );
        assert_eq!(commit_upload(plan, true).unwrap().episode, 3);
    }

    #[test]
    fn test_empty_selection() {
        assert_eq!(plan_uploads(&[], &HashSet::new()), Err(UploadError::NoFileSelected));
        let plans = plan_uploads(&["d-v-en-1.mp4", "d-v-en-2.mp4"], &HashSet::new()).unwrap();
        assert_eq!(plans.len(), 2);
    }
}
