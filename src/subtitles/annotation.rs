//! Review annotations on subtitle lines.
//!
//! A line keeps every version it ever had; the newest one is its text.
//! Reviewers attach modification comments that the translator resolves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entry::SubtitleEntry;
use crate::workflow::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionKind {
    Ai,
    Manual,
    Review,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub kind: VersionKind,
    pub text: String,
    pub author: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    Pending,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationComment {
    id: Uuid,
    author: String,
    text: String,
    status: CommentStatus,
    created_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
}

impl ModificationComment {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Result<Self, WorkflowError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(WorkflowError::Validation("Comment text must not be empty".into()));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            author: author.into(),
            text,
            status: CommentStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn status(&self) -> CommentStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    /// Returns false if it was already resolved
    pub fn resolve(&mut self) -> bool {
        if self.status == CommentStatus::Resolved {
            return false;
        }
        self.status = CommentStatus::Resolved;
        self.resolved_at = Some(Utc::now());
        true
    }
}

/// A subtitle with its version history and review comments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleLine {
    entry: SubtitleEntry,
    versions: Vec<VersionRecord>,
    comments: Vec<ModificationComment>,
}

impl SubtitleLine {
    pub fn new(entry: SubtitleEntry) -> Self {
        Self {
            entry,
            versions: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn entry(&self) -> &SubtitleEntry {
        &self.entry
    }

    pub fn versions(&self) -> &[VersionRecord] {
        &self.versions
    }

    pub fn comments(&self) -> &[ModificationComment] {
        &self.comments
    }

    /// Latest version's text, falling back to the delivered translation
    pub fn current_text(&self) -> Option<&str> {
        self.versions
            .last()
            .map(|v| v.text.as_str())
            .or(self.entry.translated_text.as_deref())
    }

    pub fn record_version(&mut self, kind: VersionKind, text: impl Into<String>, author: impl Into<String>) {
        let record = VersionRecord {
            kind,
            text: text.into(),
            author: author.into(),
            at: Utc::now(),
        };
        tracing::debug!(line = self.entry.id, kind = ?record.kind, author = %record.author, "Subtitle version recorded");
        self.versions.push(record);
    }

    /// Whether any human edit was made on top of the AI draft
    pub fn is_modified(&self) -> bool {
        self.versions.iter().any(|v| v.kind != VersionKind::Ai)
    }

    pub fn add_comment(&mut self, author: impl Into<String>, text: impl Into<String>) -> Result<Uuid, WorkflowError> {
        let comment = ModificationComment::new(author, text)?;
        let id = comment.id();
        self.comments.push(comment);
        Ok(id)
    }

    pub fn resolve_comment(&mut self, comment_id: Uuid) -> Result<bool, WorkflowError> {
        self.comments
            .iter_mut()
            .find(|c| c.id() == comment_id)
            .map(ModificationComment::resolve)
            .ok_or_else(|| WorkflowError::not_found("Comment", comment_id.to_string()))
    }

    pub fn pending_comments(&self) -> usize {
        self.comments
            .iter()
            .filter(|c| c.status() == CommentStatus::Pending)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> SubtitleLine {
        SubtitleLine::new(
            SubtitleEntry::new(7, 1_000, 2_400, "你到底想怎样")
                .unwrap()
                .with_translation("What do you want"),
        )
    }

    #[test]
    fn test_versions_are_append_only_and_latest_wins() {
        let mut line = line();
        assert_eq!(line.current_text(), Some("What do you want"));
        assert!(!line.is_modified());

        line.record_version(VersionKind::Ai, "What do you want?", "ai");
        assert!(!line.is_modified());
        line.record_version(VersionKind::Manual, "What do you want from me?", "tr01");
        line.record_version(VersionKind::Review, "What exactly do you want?", "qc01");

        assert_eq!(line.versions().len(), 3);
        assert_eq!(line.versions()[0].text, "What do you want?");
        assert_eq!(line.current_text(), Some("What exactly do you want?"));
        assert!(line.is_modified());
    }

    #[test]
    fn test_comment_resolution() {
        let mut line = line();
        assert!(line.add_comment("qc01", "   ").unwrap_err().is_validation());

        let id = line.add_comment("qc01", "Tone is too soft here").unwrap();
        assert_eq!(line.pending_comments(), 1);

        assert_eq!(line.resolve_comment(id), Ok(true));
        assert_eq!(line.resolve_comment(id), Ok(false));
        assert_eq!(line.pending_comments(), 0);
        assert!(line.comments()[0].resolved_at().is_some());

        assert!(matches!(
            line.resolve_comment(Uuid::new_v4()),
            Err(WorkflowError::NotFound { kind: "Comment", .. })
        ));
    }
}
