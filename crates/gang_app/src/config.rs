//! RON configuration for the `gang` binary.
//!
//! Lookup order for the backend URL: `--backend-url`, then `GANG_BACKEND_URL`,
//! then the config file, then the built-in default.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use gang_core::{TranscriptParser, DEFAULT_SPEAKER};
use gang_engine::{ActorSettings, EngineConfig, UploadSettings};
use gang_logging::{gang_info, LogDestination, LogSettings};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BACKEND_URL_ENV: &str = "GANG_BACKEND_URL";
const CONFIG_DIR: &str = "gang_voice";
const CONFIG_FILENAME: &str = "config.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the user config directory")]
    NoConfigDir,
    #[error("failed to read config {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("invalid {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub archive_dir: PathBuf,
    pub default_speaker: String,
    pub tick_millis: u64,
    pub log_destination: String,
    pub log_level: String,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let actor = ActorSettings::default();
        Self {
            backend_url: actor.base_url,
            connect_timeout_secs: actor.connect_timeout.as_secs(),
            request_timeout_secs: actor.request_timeout.as_secs(),
            archive_dir: PathBuf::from("."),
            default_speaker: DEFAULT_SPEAKER.to_string(),
            tick_millis: 500,
            log_destination: "file".to_string(),
            log_level: "info".to_string(),
            log_file: PathBuf::from("./gang.log"),
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join(CONFIG_DIR).join(CONFIG_FILENAME))
    }

    /// Loads `explicit` (which must exist) or the default config file (which may not).
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        gang_info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        ron::from_str(content).map_err(|err| err.to_string())
    }

    pub fn to_ron(&self) -> Result<String, String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new()).map_err(|e| e.to_string())
    }

    /// Applies the environment and command-line backend URL overrides.
    pub fn with_overrides(mut self, env_url: Option<String>, cli_url: Option<String>) -> Self {
        let chosen = cli_url
            .into_iter()
            .chain(env_url)
            .map(|url| url.trim().to_string())
            .find(|url| !url.is_empty());
        if let Some(url) = chosen {
            self.backend_url = url;
        }
        self
    }

    pub fn log_settings(&self, verbose: bool) -> Result<LogSettings, ConfigError> {
        let destination: LogDestination =
            self.log_destination
                .parse()
                .map_err(|message| ConfigError::Invalid {
                    field: "log_destination",
                    message,
                })?;
        let level = if verbose {
            LevelFilter::Debug
        } else {
            self.log_level
                .trim()
                .parse::<LevelFilter>()
                .map_err(|err| ConfigError::Invalid {
                    field: "log_level",
                    message: err.to_string(),
                })?
        };
        // Verbose output is only useful if it reaches the terminal.
        let destination = match destination {
            LogDestination::File if verbose => LogDestination::Both,
            LogDestination::Off if verbose => LogDestination::Terminal,
            other => other,
        };
        Ok(LogSettings {
            destination,
            level,
            file: self.log_file.clone(),
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            actor: ActorSettings {
                base_url: self.backend_url.clone(),
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                request_timeout: Duration::from_secs(self.request_timeout_secs),
            },
            upload: UploadSettings::default(),
            archive_dir: self.archive_dir.clone(),
        }
    }

    pub fn parser(&self) -> TranscriptParser {
        match self.default_speaker.trim() {
            "" => TranscriptParser::default(),
            speaker => TranscriptParser::new(speaker),
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis.max(50))
    }

    /// How long a one-shot command waits for the engine before giving up.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs + self.connect_timeout_secs + 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = AppConfig::parse(r#"(backend_url: "http://gang.local:8080")"#).unwrap();
        assert_eq!(config.backend_url, "http://gang.local:8080");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.default_speaker, "SYSTEM");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = AppConfig::load(Some(&temp.path().join("missing.ron"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn file_round_trips_through_ron() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ron");
        let config = AppConfig {
            default_speaker: "System".into(),
            ..AppConfig::default()
        };
        fs::write(&path, config.to_ron().unwrap()).unwrap();
        assert_eq!(AppConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn garbage_reports_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ron");
        fs::write(&path, "not ron at all {").unwrap();
        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn cli_url_beats_environment() {
        let config = AppConfig::default().with_overrides(
            Some("http://env:1".into()),
            Some("http://cli:2".into()),
        );
        assert_eq!(config.backend_url, "http://cli:2");

        let config = AppConfig::default().with_overrides(Some("http://env:1".into()), None);
        assert_eq!(config.backend_url, "http://env:1");

        let config = AppConfig::default().with_overrides(Some("  ".into()), None);
        assert_eq!(config.backend_url, AppConfig::default().backend_url);
    }

    #[test]
    fn verbose_forces_debug_on_terminal() {
        let settings = AppConfig::default().log_settings(true).unwrap();
        assert_eq!(settings.level, LevelFilter::Debug);
        assert_eq!(settings.destination, LogDestination::Both);
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let config = AppConfig {
            log_level: "loud".into(),
            ..AppConfig::default()
        };
        assert!(matches!(
            config.log_settings(false),
            Err(ConfigError::Invalid {
                field: "log_level",
                ..
            })
        ));
    }

    #[test]
    fn blank_speaker_falls_back_to_default() {
        let config = AppConfig {
            default_speaker: " ".into(),
            ..AppConfig::default()
        };
        assert_eq!(config.parser().default_speaker(), DEFAULT_SPEAKER);
    }
}
