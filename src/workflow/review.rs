//! Review/reject sub-protocol used at quality check.
//!
//! A reviewer either approves the variant, which moves it on and freezes its
//! rework rounds, or rejects it with a reason, which sends it back to manual
//! translation and opens a new round. Every rejection leaves an immutable
//! [`RejectionRecord`] behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::WorkflowError;

/// Minimum number of characters a trimmed rejection reason must have.
pub const MIN_REJECTION_REASON_CHARS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject {
        reason: String,
        rejected_by: String,
        /// Episodes sent back for rework; empty means the whole variant
        #[serde(default)]
        episodes: Vec<u32>,
    },
}

impl ReviewDecision {
    pub fn reject(reason: impl Into<String>, rejected_by: impl Into<String>) -> Self {
        ReviewDecision::Reject {
            reason: reason.into(),
            rejected_by: rejected_by.into(),
            episodes: Vec::new(),
        }
    }
}

impl fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewDecision::Approve => f.write_str("approve"),
            ReviewDecision::Reject { .. } => f.write_str("reject"),
        }
    }
}

/// Validate a rejection reason, returning the trimmed text.
///
/// Length is counted in characters so CJK reasons are measured the way
/// reviewers type them.
pub fn validate_rejection_reason(reason: &str, min_chars: usize) -> Result<String, WorkflowError> {
    let trimmed = reason.trim();
    let length = trimmed.chars().count();
    if length < min_chars {
        return Err(WorkflowError::Validation(format!(
            "Rejection reason must be at least {min_chars} characters, got {length}"
        )));
    }
    Ok(trimmed.to_string())
}

/// Rework rounds, tracked per stage pair.
///
/// Both counters move together on rejection today, but translation and
/// review are counted separately so a future flow can diverge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundCounter {
    translate_round: u32,
    review_round: u32,
    frozen: bool,
}

impl Default for RoundCounter {
    fn default() -> Self {
        Self {
            translate_round: 1,
            review_round: 1,
            frozen: false,
        }
    }
}

impl RoundCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The round under review
    pub fn current(&self) -> u32 {
        self.review_round
    }

    pub fn translate_round(&self) -> u32 {
        self.translate_round
    }

    pub fn review_round(&self) -> u32 {
        self.review_round
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Open the next rework round. Returns the new round, or `None` once frozen.
    pub fn open_next_round(&mut self) -> Option<u32> {
        if self.frozen {
            return None;
        }
        self.translate_round += 1;
        self.review_round += 1;
        Some(self.review_round)
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }
}

/// Audit entry for one rejection. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionRecord {
    round: u32,
    reason: String,
    rejected_by: String,
    rejected_at: DateTime<Utc>,
}

impl RejectionRecord {
    pub fn new(round: u32, reason: String, rejected_by: String, rejected_at: DateTime<Utc>) -> Self {
        Self {
            round,
            reason,
            rejected_by,
            rejected_at,
        }
    }

    /// The round that was rejected
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn rejected_by(&self) -> &str {
        &self.rejected_by
    }

    pub fn rejected_at(&self) -> DateTime<Utc> {
        self.rejected_at
    }
}
