//! Repository discovery with a per-session cached handle.

use std::env;
use std::path::{Path, PathBuf};

use git2::{ErrorCode, Repository};
use tracing::debug;

use crate::error::RepoError;

/// Name of the repository metadata directory.
pub const GIT_DIR_NAME: &str = ".git";

struct CachedRepo {
    dir: PathBuf,
    repo: Repository,
}

/// Lazily opened repository, reused while the working directory stays the same.
///
/// The session owns the cache; callers pass it explicitly. A session is meant
/// for a single caller and does no locking of its own.
#[derive(Default)]
pub struct RepoSession {
    cached: Option<CachedRepo>,
}

impl RepoSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the repository containing the process's current working directory.
    pub fn open(&mut self) -> Result<&Repository, RepoError> {
        let cwd = env::current_dir().map_err(RepoError::Io)?;
        self.open_in(cwd)
    }

    /// Open the repository containing `dir`.
    ///
    /// Returns the cached handle when it was opened from the same directory,
    /// otherwise discovers the repository again and replaces the cache.
    pub fn open_in(&mut self, dir: PathBuf) -> Result<&Repository, RepoError> {
        let cached = match self.cached.take() {
            Some(cached) if cached.dir == dir => self.cached.insert(cached),
            stale => {
                if let Some(stale) = stale {
                    debug!(
                        "Working directory changed from {} to {}, reopening repository",
                        stale.dir.display(),
                        dir.display()
                    );
                }
                let repo = open_repository(&dir)?;
                self.cached.insert(CachedRepo { dir, repo })
            }
        };
        Ok(&cached.repo)
    }

    /// Directory the cached handle was opened from, if any.
    pub fn cached_dir(&self) -> Option<&Path> {
        self.cached.as_ref().map(|c| c.dir.as_path())
    }

    /// Drop the cached handle so the next `open` rediscovers the repository.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Whether the current working directory is inside a repository.
    pub fn is_inside_repo(&mut self) -> Result<bool, RepoError> {
        match self.open() {
            Ok(_) => Ok(true),
            Err(RepoError::NotARepository { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Working directory root of the current repository.
    pub fn repo_root(&mut self) -> Result<PathBuf, RepoError> {
        let repo = self.open()?;
        repo.workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| RepoError::Bare {
                path: repo.path().to_path_buf(),
            })
    }
}

/// Discover and open the repository containing `dir`, searching ancestors.
pub fn open_repository(dir: &Path) -> Result<Repository, RepoError> {
    Repository::discover(dir).map_err(|e| {
        if e.code() == ErrorCode::NotFound {
            RepoError::NotARepository {
                path: dir.to_path_buf(),
            }
        } else {
            RepoError::Open(e)
        }
    })
}

/// Walk `start` and its ancestors looking for a `.git` entry.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(GIT_DIR_NAME).exists())
        .map(Path::to_path_buf)
}
