//! Staged diff synthesis and prompt construction for commit messages.

pub mod diff;
pub mod message;
pub mod prompt;

pub use diff::{
    ChangeKind, DiffText, FileChangeEntry, MAX_DIFF_LENGTH, TRUNCATION_SUFFIX, has_staged_changes,
    scan_staged, synthesize, truncate_diff,
};
pub use message::GeneratedMessage;
pub use prompt::build_prompt;
