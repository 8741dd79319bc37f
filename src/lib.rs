//! generate-commit - writes Conventional Commits messages for staged changes with an LLM.
//!
//! # Overview
//!
//! The staged changes are rendered as a compact unified diff, combined with
//! the team's rules and any in-progress merge, rebase or cherry-pick, and sent
//! to an Ollama-compatible `/api/generate` endpoint. Rate-limited requests are
//! retried with exponential backoff.

pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod hook;
pub mod init;
pub mod llm;

// Re-export commonly used types
pub use commit::{DiffText, GeneratedMessage, build_prompt, synthesize};
pub use config::Settings;
pub use error::{ConfigError, DiffError, GenerateError, InitError, RepoError, StateError};
pub use git::{GitState, GitStateKind, RepoSession};
pub use llm::{ClientConfig, CommitMessageGenerator, GenerationClient, generate_commit_message};
