//! Repository-local configuration: connection settings and team rules.

pub mod rules;
pub mod settings;

pub use rules::{RULES_FILE_NAME, load_rules, load_rules_from};
pub use settings::{
    API_KEY_ENV_VAR, CONFIG_FILE_NAME, Settings, TIMEOUT_ENV_VAR, config_exists, config_path,
    save_default,
};
