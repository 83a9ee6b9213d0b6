use serde::{Deserialize, Serialize};

use crate::workflow::WorkflowError;

/// One timed subtitle as delivered by the subtitle store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleEntry {
    pub id: u32,
    pub start_ms: u64,
    pub end_ms: u64,
    pub original_text: String,
    pub translated_text: Option<String>,
}

impl SubtitleEntry {
    pub fn new(
        id: u32,
        start_ms: u64,
        end_ms: u64,
        original_text: impl Into<String>,
    ) -> Result<Self, WorkflowError> {
        if start_ms >= end_ms {
            return Err(WorkflowError::Validation(format!(
                "Subtitle {id} ends at {end_ms}ms, not after its start at {start_ms}ms"
            )));
        }
        Ok(Self {
            id,
            start_ms,
            end_ms,
            original_text: original_text.into(),
            translated_text: None,
        })
    }

    pub fn with_translation(mut self, text: impl Into<String>) -> Self {
        self.translated_text = Some(text.into());
        self
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }

    pub fn overlaps(&self, other: &SubtitleEntry) -> bool {
        self.start_ms < other.end_ms && other.start_ms < self.end_ms
    }
}

/// `HH:MM:SS,mmm`, the SRT timestamp layout
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}
