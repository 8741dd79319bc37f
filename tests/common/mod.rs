//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use git2::{Oid, Repository, Signature};

use generate_commit::llm::Sleeper;

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn git_dir(&self) -> PathBuf {
        self.dir.path().join(".git")
    }

    /// Get the test signature for commits.
    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Write a file in the working tree, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&path, content).expect("Failed to write file");
    }

    /// Write a file and add it to the index.
    pub fn stage(&self, rel: &str, content: &str) {
        self.write(rel, content);
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(rel)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Delete a file from the working tree and the index.
    pub fn stage_removal(&self, rel: &str) {
        let _ = std::fs::remove_file(self.dir.path().join(rel));
        let mut index = self.repo.index().expect("Failed to get index");
        index.remove_path(Path::new(rel)).expect("Failed to remove file");
        index.write().expect("Failed to write index");
    }

    /// Commit whatever is currently in the index. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        let sig = self.signature();

        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Write a control file inside `.git`, e.g. `MERGE_HEAD`.
    pub fn write_git_file(&self, rel: &str, content: &str) {
        let path = self.git_dir().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&path, content).expect("Failed to write git control file");
    }
}

/// Records requested delays instead of waiting.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        self.delays.lock().expect("sleeper lock poisoned").clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays
            .lock()
            .expect("sleeper lock poisoned")
            .push(duration);
    }
}
