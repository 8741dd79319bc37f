//! Detection of in-progress git operations from control files.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StateError;
use crate::git::repository::GIT_DIR_NAME;

/// Which operation is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitStateKind {
    Normal,
    Merge,
    Rebase,
    CherryPick,
}

impl GitStateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GitStateKind::Normal => "normal",
            GitStateKind::Merge => "merge",
            GitStateKind::Rebase => "rebase",
            GitStateKind::CherryPick => "cherry-pick",
        }
    }
}

impl fmt::Display for GitStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current operational state of the repository.
///
/// Non-normal states carry the original message git left behind, with
/// comment and blank lines removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitState {
    Normal,
    Merge { original_message: Option<String> },
    Rebase { original_message: Option<String> },
    CherryPick { original_message: Option<String> },
}

impl GitState {
    pub fn kind(&self) -> GitStateKind {
        match self {
            GitState::Normal => GitStateKind::Normal,
            GitState::Merge { .. } => GitStateKind::Merge,
            GitState::Rebase { .. } => GitStateKind::Rebase,
            GitState::CherryPick { .. } => GitStateKind::CherryPick,
        }
    }

    pub fn original_message(&self) -> Option<&str> {
        match self {
            GitState::Normal => None,
            GitState::Merge { original_message }
            | GitState::Rebase { original_message }
            | GitState::CherryPick { original_message } => original_message.as_deref(),
        }
    }

    /// True for every state except `Normal`.
    pub fn conflict_mode(&self) -> bool {
        !matches!(self, GitState::Normal)
    }
}

/// Detect the git state of the repository rooted at `repo_root`.
///
/// Resolves `<repo_root>/.git`, following a `gitdir:` pointer file when `.git`
/// is a file rather than a directory.
pub fn detect(repo_root: &Path) -> Result<GitState, StateError> {
    let git_dir = resolve_git_dir(repo_root).ok_or_else(|| StateError::NotARepository {
        path: repo_root.to_path_buf(),
    })?;
    Ok(detect_in_git_dir(&git_dir))
}

/// Detect the git state from an already-resolved metadata directory.
///
/// Precedence is merge, then cherry-pick, then rebase.
pub fn detect_in_git_dir(git_dir: &Path) -> GitState {
    if git_dir.join("MERGE_HEAD").exists() {
        return GitState::Merge {
            original_message: read_message(&git_dir.join("MERGE_MSG")),
        };
    }

    if git_dir.join("CHERRY_PICK_HEAD").exists() {
        return GitState::CherryPick {
            original_message: read_message(&git_dir.join("COMMIT_EDITMSG")),
        };
    }

    for rebase_dir in ["rebase-merge", "rebase-apply"] {
        let dir = git_dir.join(rebase_dir);
        if dir.is_dir() {
            return GitState::Rebase {
                original_message: read_rebase_head_name(&dir),
            };
        }
    }

    GitState::Normal
}

/// Remove blank lines and `#` comment lines from a git message.
pub fn strip_comment_lines(message: &str) -> String {
    message
        .trim()
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn resolve_git_dir(repo_root: &Path) -> Option<PathBuf> {
    let dot_git = repo_root.join(GIT_DIR_NAME);
    if dot_git.is_dir() {
        return Some(dot_git);
    }

    // Linked worktrees and submodules use a file pointing at the real directory.
    let content = fs::read_to_string(&dot_git).ok()?;
    let target = content.trim().strip_prefix("gitdir:")?.trim();
    let target = Path::new(target);
    let git_dir = if target.is_absolute() {
        target.to_path_buf()
    } else {
        repo_root.join(target)
    };
    git_dir.is_dir().then_some(git_dir)
}

fn read_message(path: &Path) -> Option<String> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!("Could not read {}: {}", path.display(), e);
            return None;
        }
    };
    let message = strip_comment_lines(&content);
    (!message.is_empty()).then_some(message)
}

fn read_rebase_head_name(rebase_dir: &Path) -> Option<String> {
    let content = fs::read_to_string(rebase_dir.join("head-name")).ok()?;
    Some(format!("Rebase branch: {}", content.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(GIT_DIR_NAME)).unwrap();
        dir
    }

    fn write_git_file(root: &Path, name: &str, content: &str) {
        let path = root.join(GIT_DIR_NAME).join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_detect_normal_state() {
        let repo = fake_repo();
        let state = detect(repo.path()).unwrap();
        assert_eq!(state, GitState::Normal);
        assert!(!state.conflict_mode());
        assert_eq!(state.original_message(), None);
    }

    #[test]
    fn test_detect_merge_state_with_message() {
        let repo = fake_repo();
        write_git_file(repo.path(), "MERGE_HEAD", "abc123\n");
        write_git_file(repo.path(), "MERGE_MSG", "Merge branch 'feature-x' into main\n");

        let state = detect(repo.path()).unwrap();
        assert_eq!(state.kind(), GitStateKind::Merge);
        assert!(state.conflict_mode());
        assert_eq!(
            state.original_message(),
            Some("Merge branch 'feature-x' into main")
        );
    }

    #[test]
    fn test_detect_merge_strips_conflict_comments() {
        let repo = fake_repo();
        write_git_file(repo.path(), "MERGE_HEAD", "abc123\n");
        write_git_file(
            repo.path(),
            "MERGE_MSG",
            "Merge branch 'feature-x'\n\n# Conflicts:\n#\tsrc/main.rs\n",
        );

        let state = detect(repo.path()).unwrap();
        assert_eq!(state.original_message(), Some("Merge branch 'feature-x'"));
    }

    #[test]
    fn test_detect_merge_without_message_file() {
        let repo = fake_repo();
        write_git_file(repo.path(), "MERGE_HEAD", "abc123\n");

        let state = detect(repo.path()).unwrap();
        assert_eq!(state, GitState::Merge { original_message: None });
        assert!(state.conflict_mode());
    }

    #[test]
    fn test_detect_cherry_pick_state() {
        let repo = fake_repo();
        write_git_file(repo.path(), "CHERRY_PICK_HEAD", "def456\n");
        write_git_file(repo.path(), "COMMIT_EDITMSG", "feat(api): added new endpoint\n# comment\n");

        let state = detect(repo.path()).unwrap();
        assert_eq!(state.kind(), GitStateKind::CherryPick);
        assert!(state.conflict_mode());
        assert_eq!(state.original_message(), Some("feat(api): added new endpoint"));
    }

    #[test]
    fn test_detect_rebase_merge_state() {
        let repo = fake_repo();
        write_git_file(repo.path(), "rebase-merge/head-name", "refs/heads/feature-y\n");

        let state = detect(repo.path()).unwrap();
        assert_eq!(state.kind(), GitStateKind::Rebase);
        assert!(state.conflict_mode());
        assert_eq!(
            state.original_message(),
            Some("Rebase branch: refs/heads/feature-y")
        );
    }

    #[test]
    fn test_detect_rebase_apply_state() {
        let repo = fake_repo();
        write_git_file(repo.path(), "rebase-apply/head-name", "  refs/heads/topic  \n");

        let state = detect(repo.path()).unwrap();
        assert_eq!(state.kind(), GitStateKind::Rebase);
        assert_eq!(state.original_message(), Some("Rebase branch: refs/heads/topic"));
    }

    #[test]
    fn test_detect_rebase_without_head_name() {
        let repo = fake_repo();
        fs::create_dir_all(repo.path().join(GIT_DIR_NAME).join("rebase-merge")).unwrap();

        let state = detect(repo.path()).unwrap();
        assert_eq!(state, GitState::Rebase { original_message: None });
    }

    #[test]
    fn test_merge_takes_precedence_over_rebase() {
        let repo = fake_repo();
        write_git_file(repo.path(), "MERGE_HEAD", "abc123\n");
        write_git_file(repo.path(), "rebase-merge/head-name", "refs/heads/feature\n");

        let state = detect(repo.path()).unwrap();
        assert_eq!(state.kind(), GitStateKind::Merge);
    }

    #[test]
    fn test_merge_takes_precedence_over_cherry_pick() {
        let repo = fake_repo();
        write_git_file(repo.path(), "MERGE_HEAD", "abc123\n");
        write_git_file(repo.path(), "CHERRY_PICK_HEAD", "def456\n");

        let state = detect(repo.path()).unwrap();
        assert_eq!(state.kind(), GitStateKind::Merge);
        assert_eq!(state, GitState::Merge { original_message: None });
    }

    #[test]
    fn test_cherry_pick_takes_precedence_over_rebase() {
        let repo = fake_repo();
        write_git_file(repo.path(), "CHERRY_PICK_HEAD", "def456\n");
        write_git_file(repo.path(), "rebase-apply/head-name", "refs/heads/feature\n");

        let state = detect(repo.path()).unwrap();
        assert_eq!(state.kind(), GitStateKind::CherryPick);
    }

    #[test]
    fn test_detect_missing_git_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = detect(dir.path());
        assert!(matches!(result, Err(StateError::NotARepository { .. })));
    }

    #[test]
    fn test_detect_follows_gitdir_file() {
        let real = tempfile::tempdir().unwrap();
        fs::write(real.path().join("MERGE_HEAD"), "abc\n").unwrap();

        let worktree = tempfile::tempdir().unwrap();
        fs::write(
            worktree.path().join(GIT_DIR_NAME),
            format!("gitdir: {}\n", real.path().display()),
        )
        .unwrap();

        let state = detect(worktree.path()).unwrap();
        assert_eq!(state.kind(), GitStateKind::Merge);
    }

    #[test]
    fn test_strip_comment_lines() {
        assert_eq!(strip_comment_lines("feat: x\n# comment\n\nbody"), "feat: x\nbody");
    }

    #[test]
    fn test_strip_comment_lines_indented_comment() {
        assert_eq!(strip_comment_lines("  # indented\nkeep\n   \n"), "keep");
    }

    #[test]
    fn test_state_kind_display() {
        assert_eq!(GitStateKind::Normal.to_string(), "normal");
        assert_eq!(GitStateKind::Merge.to_string(), "merge");
        assert_eq!(GitStateKind::Rebase.to_string(), "rebase");
        assert_eq!(GitStateKind::CherryPick.to_string(), "cherry-pick");
    }
}
