//! Generation endpoint client and its retry policy.

pub mod client;
pub mod retry;

pub use client::{
    ClientConfig, CommitMessageGenerator, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
    GenerationClient, generate_commit_message,
};
pub use retry::{MAX_RETRIES, Sleeper, TokioSleeper, rate_limit_backoff, retry_with_backoff};
