//! Error types for generate-commit modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from opening the repository.
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Not a git repository (or any of the parent directories): {}", path.display())]
    NotARepository { path: PathBuf },

    #[error("Failed to open repository: {0}")]
    Open(#[source] git2::Error),

    #[error("Repository at {} has no working directory", path.display())]
    Bare { path: PathBuf },

    #[error("Failed to resolve the current working directory: {0}")]
    Io(#[source] std::io::Error),
}

/// Errors from git state detection.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Not a git repository: {}", path.display())]
    NotARepository { path: PathBuf },
}

/// Errors from staged diff synthesis.
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("Failed to get status: {0}")]
    StatusFailure(#[source] git2::Error),

    #[error("Failed to resolve HEAD tree: {0}")]
    HeadFailure(#[source] git2::Error),
}

/// Errors from the generation endpoint.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("API rate limit exceeded after {retries} retries: {body}")]
    RateLimitExceeded { retries: u32, body: String },

    #[error("API returned error: {status} (body: {body})")]
    RemoteError {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to decode response: {0}")]
    DecodeError(#[source] reqwest::Error),

    #[error("Empty response from model")]
    EmptyResponse,

    #[error("API call failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

/// Errors from loading or writing configuration and rules.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for '{key}' in {}: expected {expected}", path.display())]
    InvalidValue {
        path: PathBuf,
        key: String,
        expected: &'static str,
    },

    #[error(
        "No API key configured. Set OLLAMA_API_KEY or add api_key to .commit-generator-config"
    )]
    MissingApiKey,
}

/// Errors from the init command.
#[derive(Error, Debug)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to create {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
