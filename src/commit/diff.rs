//! Unified diff synthesis for staged changes using git2 object lookups.

use std::fmt;
use std::path::Path;

use git2::{Delta, DiffDelta, ErrorCode, Oid, Repository, Status, StatusOptions, Tree};
use tracing::{debug, warn};

use crate::error::DiffError;

/// Maximum characters of diff text before truncation.
pub const MAX_DIFF_LENGTH: usize = 10_000;

/// Appended after the kept prefix when the diff is truncated.
pub const TRUNCATION_SUFFIX: &str = "\n...[TRUNCATED]";

/// Placeholder identity for the missing side of an add or delete.
const NULL_IDENTITY: &str = "0000000";

const IDENTITY_LEN: usize = 7;

/// Kind of staged change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Deleted,
    Modified,
    Renamed,
    Copied,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "Added"),
            ChangeKind::Deleted => write!(f, "Deleted"),
            ChangeKind::Modified => write!(f, "Modified"),
            ChangeKind::Renamed => write!(f, "Renamed"),
            ChangeKind::Copied => write!(f, "Copied"),
        }
    }
}

/// A file with staged changes, as reported by the status scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChangeEntry {
    pub path: String,
    /// Source path for renames and copies.
    pub old_path: Option<String>,
    pub kind: ChangeKind,
    /// Abbreviated blob id used to label the `index` header line.
    pub identity: String,
}

/// Synthesized diff of the staged changes.
#[derive(Debug, Clone)]
pub struct DiffText {
    pub text: String,
    pub files: Vec<FileChangeEntry>,
    pub truncated: bool,
}

impl DiffText {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl fmt::Display for DiffText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found).
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, DiffError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e)
            if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound =>
        {
            return Ok(None);
        }
        Err(e) => return Err(DiffError::HeadFailure(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(DiffError::HeadFailure)?;
    Ok(Some(tree))
}

/// Scan the index for staged changes, in status order.
///
/// Untracked and index-unmodified entries are skipped.
pub fn scan_staged(repo: &Repository) -> Result<Vec<FileChangeEntry>, DiffError> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(false)
        .include_ignored(false)
        .renames_head_to_index(true);

    let statuses = repo
        .statuses(Some(&mut opts))
        .map_err(DiffError::StatusFailure)?;

    let mut entries = Vec::new();
    for entry in statuses.iter() {
        let Some(kind) = staged_kind(entry.status()) else {
            continue;
        };

        let fallback_path = String::from_utf8_lossy(entry.path_bytes()).to_string();
        let delta = entry.head_to_index();
        let (kind, path, old_path, identity) = match &delta {
            Some(delta) => describe_delta(delta, kind, fallback_path),
            None => (kind, fallback_path, None, NULL_IDENTITY.to_string()),
        };

        entries.push(FileChangeEntry {
            path,
            old_path,
            kind,
            identity,
        });
    }

    Ok(entries)
}

/// Whether anything is staged for commit.
pub fn has_staged_changes(repo: &Repository) -> Result<bool, DiffError> {
    Ok(!scan_staged(repo)?.is_empty())
}

/// Build unified diff text for all staged changes.
///
/// Modified files use a naive body: every committed line removed, then every
/// working-tree line added. File contents that cannot be read are omitted
/// without failing the whole diff.
pub fn synthesize(repo: &Repository) -> Result<DiffText, DiffError> {
    let files = scan_staged(repo)?;
    let head_tree = resolve_head_tree(repo)?;

    let mut text = String::new();
    let mut chars = 0;
    for entry in &files {
        // Blocks past the cap would be cut anyway.
        if chars > MAX_DIFF_LENGTH {
            debug!("Diff exceeds {} chars, skipping remaining files", MAX_DIFF_LENGTH);
            break;
        }
        let mut block = String::new();
        write_block(&mut block, repo, head_tree.as_ref(), entry);
        chars += block.chars().count();
        text.push_str(&block);
    }

    let (text, truncated) = truncate_diff(text);
    debug!(
        "Synthesized diff for {} files ({} chars, truncated={})",
        files.len(),
        text.chars().count(),
        truncated
    );

    Ok(DiffText {
        text,
        files,
        truncated,
    })
}

/// Cap diff text at [`MAX_DIFF_LENGTH`] characters.
///
/// Longer text keeps exactly its first `MAX_DIFF_LENGTH` characters followed
/// by [`TRUNCATION_SUFFIX`].
pub fn truncate_diff(mut text: String) -> (String, bool) {
    match text.char_indices().nth(MAX_DIFF_LENGTH) {
        Some((cut, _)) => {
            text.truncate(cut);
            text.push_str(TRUNCATION_SUFFIX);
            (text, true)
        }
        None => (text, false),
    }
}

fn staged_kind(status: Status) -> Option<ChangeKind> {
    if status.contains(Status::INDEX_RENAMED) {
        Some(ChangeKind::Renamed)
    } else if status.contains(Status::INDEX_NEW) {
        Some(ChangeKind::Added)
    } else if status.contains(Status::INDEX_DELETED) {
        Some(ChangeKind::Deleted)
    } else if status.intersects(Status::INDEX_MODIFIED | Status::INDEX_TYPECHANGE) {
        Some(ChangeKind::Modified)
    } else {
        None
    }
}

fn describe_delta(
    delta: &DiffDelta<'_>,
    kind: ChangeKind,
    fallback_path: String,
) -> (ChangeKind, String, Option<String>, String) {
    let to_string = |p: &Path| p.to_string_lossy().to_string();
    let new_path = delta.new_file().path().map(to_string);
    let old_path = delta.old_file().path().map(to_string);

    // Status scans detect renames only. Copies are recognised for deltas
    // that carry them but the status scan does not produce them today.
    let kind = if delta.status() == Delta::Copied {
        ChangeKind::Copied
    } else {
        kind
    };

    match kind {
        ChangeKind::Deleted => (
            kind,
            old_path.unwrap_or(fallback_path),
            None,
            abbreviate(delta.old_file().id()),
        ),
        ChangeKind::Renamed | ChangeKind::Copied => (
            kind,
            new_path.unwrap_or(fallback_path),
            old_path,
            abbreviate(delta.new_file().id()),
        ),
        ChangeKind::Added | ChangeKind::Modified => (
            kind,
            new_path.unwrap_or(fallback_path),
            None,
            abbreviate(delta.new_file().id()),
        ),
    }
}

fn abbreviate(id: Oid) -> String {
    if id.is_zero() {
        return NULL_IDENTITY.to_string();
    }
    let hex = id.to_string();
    hex[..IDENTITY_LEN.min(hex.len())].to_string()
}

fn write_block(out: &mut String, repo: &Repository, head_tree: Option<&Tree<'_>>, entry: &FileChangeEntry) {
    let path = entry.path.as_str();
    let id = entry.identity.as_str();

    match entry.kind {
        ChangeKind::Added => {
            out.push_str(&format!("diff --git a/{path} b/{path}\n"));
            out.push_str("new file mode 100644\n");
            out.push_str(&format!("index {NULL_IDENTITY}..{id}\n"));
            out.push_str("--- /dev/null\n");
            out.push_str(&format!("+++ b/{path}\n"));
            if let Some(content) = read_workdir_file(repo, path) {
                push_prefixed(out, '+', &content);
            }
        }
        ChangeKind::Deleted => {
            out.push_str(&format!("diff --git a/{path} b/{path}\n"));
            out.push_str("deleted file mode 100644\n");
            out.push_str(&format!("index {id}..{NULL_IDENTITY}\n"));
            out.push_str(&format!("--- a/{path}\n"));
            out.push_str("+++ /dev/null\n");
            if let Some(content) = read_head_blob(repo, head_tree, path) {
                push_prefixed(out, '-', &content);
            }
        }
        ChangeKind::Modified => {
            out.push_str(&format!("diff --git a/{path} b/{path}\n"));
            out.push_str(&format!("index {id}..{id} 100644\n"));
            out.push_str(&format!("--- a/{path}\n"));
            out.push_str(&format!("+++ b/{path}\n"));
            if let Some(old) = read_head_blob(repo, head_tree, path) {
                push_prefixed(out, '-', &old);
            }
            if let Some(new) = read_workdir_file(repo, path) {
                push_prefixed(out, '+', &new);
            }
        }
        ChangeKind::Renamed | ChangeKind::Copied => {
            let old = entry.old_path.as_deref().unwrap_or(path);
            let verb = if entry.kind == ChangeKind::Renamed { "rename" } else { "copy" };
            out.push_str(&format!("diff --git a/{old} b/{path}\n"));
            out.push_str(&format!("{verb} from {old}\n"));
            out.push_str(&format!("{verb} to {path}\n"));
        }
    }
}

/// Prefix every line of `content`. Splits on `\n` only, so `\r` is kept.
fn push_prefixed(out: &mut String, prefix: char, content: &str) {
    if content.is_empty() {
        return;
    }
    let body = content.strip_suffix('\n').unwrap_or(content);
    for line in body.split('\n') {
        out.push(prefix);
        out.push_str(line);
        out.push('\n');
    }
}

fn read_workdir_file(repo: &Repository, path: &str) -> Option<String> {
    let full_path = repo.workdir()?.join(path);
    match std::fs::read(&full_path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            warn!("Skipping content of {}: {}", full_path.display(), e);
            None
        }
    }
}

fn read_head_blob(repo: &Repository, head_tree: Option<&Tree<'_>>, path: &str) -> Option<String> {
    let tree = head_tree?;
    let blob = tree
        .get_path(Path::new(path))
        .and_then(|entry| repo.find_blob(entry.id()));
    match blob {
        Ok(blob) => Some(String::from_utf8_lossy(blob.content()).into_owned()),
        Err(e) => {
            warn!("Skipping committed content of {path}: {e}");
            None
        }
    }
}
