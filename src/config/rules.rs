//! Team rules for commit messages, read from `.git-commit-rules-for-ai`.

use std::env;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::git::find_repo_root;

pub const RULES_FILE_NAME: &str = ".git-commit-rules-for-ai";

pub(crate) const DEFAULT_RULES: &str = "\
# Git Commit Rules for AI Generator
# Customize these rules to match your team's conventions

# Example rules:
# - Always start with a verb (Add, Fix, Update)
# - If the change affects the UI, mention it
# - Max 50 characters for the subject line
# - Include Jira ticket ID if applicable
";

/// Load the rules file of the repository containing the current directory.
pub fn load_rules() -> Result<String, ConfigError> {
    match env::current_dir() {
        Ok(cwd) => load_rules_from(&cwd),
        Err(e) => {
            warn!("Cannot resolve current directory, skipping rules: {}", e);
            Ok(String::new())
        }
    }
}

/// Load the rules file of the repository containing `start`.
///
/// The file is optional: outside a repository, or when the file is absent,
/// the result is an empty string.
pub fn load_rules_from(start: &Path) -> Result<String, ConfigError> {
    let Some(root) = find_repo_root(start) else {
        debug!("No repository root above {}, skipping rules", start.display());
        return Ok(String::new());
    };

    let path = root.join(RULES_FILE_NAME);
    match std::fs::read_to_string(&path) {
        Ok(content) => {
            debug!("Loaded {} bytes of rules from {}", content.len(), path.display());
            Ok(content)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(ConfigError::Read { path, source: e }),
    }
}
