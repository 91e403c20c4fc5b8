//! Application-level configuration loading: admin passphrase, roster seed, and
//! target-score options.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TALLY_BACK_CONFIG_PATH";
/// Passphrase used when the configuration does not provide one.
const DEFAULT_PASSPHRASE: &str = "1234";
/// Target score applied to fresh sessions unless configured otherwise.
const DEFAULT_TARGET_SCORE: i32 = 10;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    admin_passphrase: String,
    default_roster: Vec<String>,
    target_score_options: Vec<i32>,
    default_target_score: i32,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        roster_seed = app_config.default_roster.len(),
                        targets = ?app_config.target_score_options,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Shared passphrase gating admin mutations. An application-level
    /// convention for a trusted co-located group, not a security boundary.
    pub fn admin_passphrase(&self) -> &str {
        &self.admin_passphrase
    }

    /// Names written to the roster the first time it is observed empty.
    pub fn default_roster(&self) -> &[String] {
        &self.default_roster
    }

    /// Target scores an admin may select for a session.
    pub fn target_score_options(&self) -> &[i32] {
        &self.target_score_options
    }

    /// Target score applied to a freshly opened lobby.
    pub fn default_target_score(&self) -> i32 {
        self.default_target_score
    }

    /// Whether `value` is one of the configured target options.
    pub fn is_allowed_target(&self, value: i32) -> bool {
        self.target_score_options.contains(&value)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            admin_passphrase: DEFAULT_PASSPHRASE.to_owned(),
            default_roster: Vec::new(),
            target_score_options: vec![10, 11],
            default_target_score: DEFAULT_TARGET_SCORE,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    admin_passphrase: Option<String>,
    #[serde(default)]
    default_roster: Vec<String>,
    #[serde(default)]
    target_score_options: Option<Vec<i32>>,
    #[serde(default)]
    default_target_score: Option<i32>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();

        let target_score_options = value
            .target_score_options
            .filter(|options| !options.is_empty())
            .unwrap_or(defaults.target_score_options);

        let mut default_target_score = value
            .default_target_score
            .unwrap_or(defaults.default_target_score);
        if !target_score_options.contains(&default_target_score) {
            warn!(
                configured = default_target_score,
                options = ?target_score_options,
                "default target score is not among the options; using the first option"
            );
            default_target_score = target_score_options[0];
        }

        Self {
            admin_passphrase: value
                .admin_passphrase
                .unwrap_or(defaults.admin_passphrase),
            default_roster: value.default_roster,
            target_score_options,
            default_target_score,
        }
    }
}

fn resolve_config_path() -> PathBuf {
    env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_consistent() {
        let config = AppConfig::default();
        assert!(config.is_allowed_target(config.default_target_score()));
        assert!(config.default_roster().is_empty());
    }

    #[test]
    fn raw_config_falls_back_per_field() {
        let raw: RawConfig = serde_json::from_str(r#"{"admin_passphrase": "7777"}"#).unwrap();
        let config: AppConfig = raw.into();

        assert_eq!(config.admin_passphrase(), "7777");
        assert_eq!(config.target_score_options(), &[10, 11]);
        assert_eq!(config.default_target_score(), 10);
    }

    #[test]
    fn stray_default_target_snaps_to_first_option() {
        let raw: RawConfig =
            serde_json::from_str(r#"{"target_score_options": [15], "default_target_score": 10}"#)
                .unwrap();
        let config: AppConfig = raw.into();

        assert_eq!(config.default_target_score(), 15);
    }
}
