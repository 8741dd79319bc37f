//! Git operations using git2-rs.

pub mod repository;
pub mod state;

pub use repository::{RepoSession, find_repo_root, open_repository};
pub use state::{GitState, GitStateKind, detect, detect_in_git_dir, strip_comment_lines};
