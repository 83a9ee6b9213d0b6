// Subtitle lines with version history and reviewer comments

pub mod annotation;
pub mod entry;

pub use annotation::{CommentStatus, ModificationComment, SubtitleLine, VersionKind, VersionRecord};
pub use entry::{format_timestamp, SubtitleEntry};
