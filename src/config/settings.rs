//! Connection settings stored in `.commit-generator-config`.
//!
//! The file is TOML at the repository root. Every key is optional:
//!
//! ```toml
//! api_key = "..."
//! base_url = "http://localhost:11434/api/generate"
//! model = "gpt-oss:120b"
//! timeout_secs = 60
//! ```
//!
//! `OLLAMA_API_KEY` and `GENERATE_COMMIT_TIMEOUT` take precedence over the file.

use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::NamedTempFile;
use toml_edit::DocumentMut;
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::llm::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};

pub const CONFIG_FILE_NAME: &str = ".commit-generator-config";
pub const API_KEY_ENV_VAR: &str = "OLLAMA_API_KEY";
pub const TIMEOUT_ENV_VAR: &str = "GENERATE_COMMIT_TIMEOUT";

const DEFAULT_CONFIG: &str = r#"# Configuration for generate-commit
# OLLAMA_API_KEY and GENERATE_COMMIT_TIMEOUT override the values below.

# api_key = "your-api-key"
base_url = "http://localhost:11434/api/generate"
model = "gpt-oss:120b"
timeout_secs = 60
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Load settings for the repository at `repo_root`.
    ///
    /// A missing config file yields the defaults. Environment overrides are
    /// applied last.
    pub fn load(repo_root: &Path) -> Result<Self, ConfigError> {
        let path = config_path(repo_root);
        let mut settings = if path.exists() {
            debug!("Loading settings from {}", path.display());
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Read {
                path: path.clone(),
                source: e,
            })?;
            Self::from_toml(&path, &content)?
        } else {
            Self::default()
        };

        settings.apply_env_overrides();
        Ok(settings)
    }

    fn from_toml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let doc = content
            .parse::<DocumentMut>()
            .map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let defaults = Self::default();
        Ok(Self {
            api_key: read_string(&doc, path, "api_key")?.filter(|k| !k.is_empty()),
            base_url: read_string(&doc, path, "base_url")?.unwrap_or(defaults.base_url),
            model: read_string(&doc, path, "model")?.unwrap_or(defaults.model),
            timeout_secs: read_timeout(&doc, path)?.unwrap_or(defaults.timeout_secs),
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = env::var(API_KEY_ENV_VAR) {
            if !key.is_empty() {
                self.api_key = Some(key);
            }
        }

        match env::var(TIMEOUT_ENV_VAR) {
            Ok(v) if !v.is_empty() => match v.parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout_secs = secs,
                _ => warn!(
                    "Invalid {} value '{}', using {}s",
                    TIMEOUT_ENV_VAR, v, self.timeout_secs
                ),
            },
            _ => {}
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connection settings for the generation client.
    ///
    /// Fails when no API key was found in either the file or the environment.
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let api_key = self.api_key.clone().ok_or(ConfigError::MissingApiKey)?;
        Ok(ClientConfig {
            api_key,
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            timeout: self.timeout(),
        })
    }
}

pub fn config_path(repo_root: &Path) -> PathBuf {
    repo_root.join(CONFIG_FILE_NAME)
}

pub fn config_exists(repo_root: &Path) -> bool {
    config_path(repo_root).is_file()
}

/// Write the commented default config, replacing any existing file.
pub fn save_default(repo_root: &Path) -> Result<PathBuf, ConfigError> {
    let path = config_path(repo_root);
    write_atomic(&path, DEFAULT_CONFIG)?;
    Ok(path)
}

/// Write through a temp file in the same directory, then rename over `path`.
pub(crate) fn write_atomic(path: &Path, content: &str) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut file = NamedTempFile::new_in(dir).map_err(write_err)?;
    file.write_all(content.as_bytes()).map_err(write_err)?;
    file.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

fn read_string(doc: &DocumentMut, path: &Path, key: &str) -> Result<Option<String>, ConfigError> {
    match doc.get(key) {
        None => Ok(None),
        Some(item) => item
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| ConfigError::InvalidValue {
                path: path.to_path_buf(),
                key: key.to_string(),
                expected: "a string",
            }),
    }
}

fn read_timeout(doc: &DocumentMut, path: &Path) -> Result<Option<u64>, ConfigError> {
    match doc.get("timeout_secs") {
        None => Ok(None),
        Some(item) => item
            .as_integer()
            .filter(|secs| *secs > 0)
            .map(|secs| Some(secs as u64))
            .ok_or_else(|| ConfigError::InvalidValue {
                path: path.to_path_buf(),
                key: "timeout_secs".to_string(),
                expected: "a positive integer",
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn without_env<R>(f: impl FnOnce() -> R) -> R {
        temp_env::with_vars_unset([API_KEY_ENV_VAR, TIMEOUT_ENV_VAR], f)
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let settings = without_env(|| Settings::load(dir.path())).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_load_reads_all_keys() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            config_path(dir.path()),
            "api_key = \"file-key\"\nbase_url = \"http://example.test/api/generate\"\nmodel = \"llama3\"\ntimeout_secs = 15\nunknown = true\n",
        )
        .unwrap();

        let settings = without_env(|| Settings::load(dir.path())).unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("file-key"));
        assert_eq!(settings.base_url, "http://example.test/api/generate");
        assert_eq!(settings.model, "llama3");
        assert_eq!(settings.timeout_secs, 15);
    }

    #[test]
    fn test_load_rejects_wrong_types() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(config_path(dir.path()), "model = 42\n").unwrap();

        let err = without_env(|| Settings::load(dir.path())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "model"));

        fs::write(config_path(dir.path()), "timeout_secs = 0\n").unwrap();
        let err = without_env(|| Settings::load(dir.path())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "timeout_secs"));
    }

    #[test]
    fn test_load_reports_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(config_path(dir.path()), "model = \n").unwrap();

        let err = without_env(|| Settings::load(dir.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            config_path(dir.path()),
            "api_key = \"file-key\"\ntimeout_secs = 15\n",
        )
        .unwrap();

        let settings = temp_env::with_vars(
            [
                (API_KEY_ENV_VAR, Some("env-key")),
                (TIMEOUT_ENV_VAR, Some("90")),
            ],
            || Settings::load(dir.path()),
        )
        .unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("env-key"));
        assert_eq!(settings.timeout_secs, 90);
    }

    #[test]
    fn test_invalid_timeout_env_keeps_configured_value() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(config_path(dir.path()), "timeout_secs = 15\n").unwrap();

        for bad in ["not_a_number", "0", ""] {
            let settings = temp_env::with_vars(
                [(API_KEY_ENV_VAR, None), (TIMEOUT_ENV_VAR, Some(bad))],
                || Settings::load(dir.path()),
            )
            .unwrap();
            assert_eq!(settings.timeout_secs, 15, "value: {:?}", bad);
        }
    }

    #[test]
    fn test_save_default_round_trips_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!config_exists(dir.path()));

        let path = save_default(dir.path()).unwrap();
        assert_eq!(path, dir.path().join(".commit-generator-config"));
        assert!(config_exists(dir.path()));

        let settings = without_env(|| Settings::load(dir.path())).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_default_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(config_path(dir.path()), "model = \"old\"\n").unwrap();

        save_default(dir.path()).unwrap();
        let content = fs::read_to_string(config_path(dir.path())).unwrap();
        assert_eq!(content, DEFAULT_CONFIG);
    }

    #[test]
    fn test_client_config_requires_api_key() {
        let settings = Settings::default();
        assert!(matches!(
            settings.client_config(),
            Err(ConfigError::MissingApiKey)
        ));

        let dir = tempfile::tempdir().unwrap();
        fs::write(config_path(dir.path()), "api_key = \"\"\n").unwrap();
        let settings = without_env(|| Settings::load(dir.path())).unwrap();
        assert!(settings.api_key.is_none());
    }

    #[test]
    fn test_client_config_carries_settings() {
        let settings = Settings {
            api_key: Some("key".to_string()),
            base_url: "http://example.test".to_string(),
            model: "m".to_string(),
            timeout_secs: 5,
        };

        let config = settings.client_config().unwrap();
        assert_eq!(config.api_key, "key");
        assert_eq!(config.base_url, "http://example.test");
        assert_eq!(config.model, "m");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
