//! Repository setup: default config, rules file and pre-commit hook.

use std::env;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::rules::DEFAULT_RULES;
use crate::config::{RULES_FILE_NAME, config_exists, save_default};
use crate::error::InitError;
use crate::git::repository::GIT_DIR_NAME;
use crate::hook::{Platform, pre_commit_script};

const FALLBACK_EXE: &str = "generate-commit";

/// What `run_init` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitReport {
    /// A config file already exists and `force` was not set.
    AlreadyInitialized,
    Initialized(InitSummary),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitSummary {
    pub config_path: PathBuf,
    pub rules_path: PathBuf,
    /// False when an existing rules file was kept.
    pub rules_created: bool,
    pub hook_path: PathBuf,
}

/// Initialize the repository at `repo_root` for the running executable.
pub fn run_init(repo_root: &Path, force: bool) -> Result<InitReport, InitError> {
    run_init_with(repo_root, force, &current_exe(), Platform::current())
}

/// Initialize with an explicit generator path and hook flavour.
pub fn run_init_with(
    repo_root: &Path,
    force: bool,
    exe_path: &Path,
    platform: Platform,
) -> Result<InitReport, InitError> {
    if !force && config_exists(repo_root) {
        debug!("Config already present in {}", repo_root.display());
        return Ok(InitReport::AlreadyInitialized);
    }

    let config_path = save_default(repo_root)?;

    let rules_path = repo_root.join(RULES_FILE_NAME);
    let rules_created = !rules_path.exists();
    if rules_created {
        write_file(&rules_path, DEFAULT_RULES)?;
    }

    let hooks_dir = repo_root.join(GIT_DIR_NAME).join("hooks");
    std::fs::create_dir_all(&hooks_dir).map_err(|e| InitError::WriteFailed {
        path: hooks_dir.clone(),
        source: e,
    })?;
    let hook_path = hooks_dir.join(platform.hook_file_name());
    write_file(&hook_path, &pre_commit_script(exe_path, platform))?;
    make_executable(&hook_path)?;

    info!("Initialized {} ({} hook)", repo_root.display(), platform);
    Ok(InitReport::Initialized(InitSummary {
        config_path,
        rules_path,
        rules_created,
        hook_path,
    }))
}

fn current_exe() -> PathBuf {
    env::current_exe()
        .and_then(|p| p.canonicalize())
        .unwrap_or_else(|_| PathBuf::from(FALLBACK_EXE))
}

fn write_file(path: &Path, content: &str) -> Result<(), InitError> {
    std::fs::write(path, content).map_err(|e| InitError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), InitError> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).map_err(|e| {
        InitError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), InitError> {
    Ok(())
}
