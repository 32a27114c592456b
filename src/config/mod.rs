//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use chrono::{DateTime, Utc};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Sheet endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Results sheet JSON endpoint
    #[serde(default)]
    pub url: String,

    /// Named sheet holding the pre-aggregated matchup matrix
    #[serde(default)]
    pub matrix_sheet: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            matrix_sheet: None,
            timeout_seconds: default_timeout(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Scheduled reminder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Deadline the countdown runs toward (RFC 3339)
    pub deadline: String,

    /// Delivery interval (e.g. "7d")
    #[serde(default = "default_reminder_interval")]
    pub interval: String,

    /// Message title
    #[serde(default = "default_reminder_title")]
    pub title: String,
}

fn default_reminder_interval() -> String {
    "7d".to_string()
}

fn default_reminder_title() -> String {
    "League countdown".to_string()
}

impl ReminderConfig {
    pub fn deadline_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.deadline)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn interval_duration(&self) -> Option<std::time::Duration> {
        crate::parse_duration(&self.interval)
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub sheet: SheetConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub reminder: Option<ReminderConfig>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            sheet: SheetConfig::default(),
            server: ServerConfig::default(),
            reminder: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sheet.url.is_empty() && url::Url::parse(&self.sheet.url).is_err() {
            return Err(ConfigError::ValidationError(format!(
                "sheet.url is not a valid URL: {}",
                self.sheet.url
            )));
        }

        if self.sheet.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "sheet timeout must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if let Some(reminder) = &self.reminder {
            if reminder.deadline_utc().is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "reminder deadline is not RFC 3339: {}",
                    reminder.deadline
                )));
            }
            match reminder.interval_duration() {
                Some(d) if !d.is_zero() => {}
                _ => {
                    return Err(ConfigError::ValidationError(format!(
                        "reminder interval is not a positive duration: {}",
                        reminder.interval
                    )))
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.sheet.timeout_seconds, 30);
        assert!(config.reminder.is_none());
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_sheet_url() {
        let mut config = AppConfig::default();
        config.sheet.url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_timeout() {
        let mut config = AppConfig::default();
        config.sheet.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_parse_full_file() {
        let toml_str = r#"
            log_level = "debug"

            [sheet]
            url = "https://sheetdb.io/api/v1/abc123"
            matrix_sheet = "Deck_Matchup_Matrix"

            [server]
            host = "0.0.0.0"
            port = 9090

            [reminder]
            deadline = "2025-12-31T23:59:59+02:00"
            interval = "7d"
            title = "League lock-in"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 9090);
        assert_eq!(
            config.sheet.matrix_sheet.as_deref(),
            Some("Deck_Matchup_Matrix")
        );

        let reminder = config.reminder.unwrap();
        assert!(reminder.deadline_utc().is_some());
        assert_eq!(
            reminder.interval_duration(),
            Some(std::time::Duration::from_secs(604800))
        );
    }

    #[test]
    fn test_config_validation_bad_deadline() {
        let mut config = AppConfig::default();
        config.reminder = Some(ReminderConfig {
            deadline: "next year".to_string(),
            interval: "7d".to_string(),
            title: "x".to_string(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_interval() {
        let mut config = AppConfig::default();
        config.reminder = Some(ReminderConfig {
            deadline: "2025-12-31T23:59:59Z".to_string(),
            interval: "whenever".to_string(),
            title: "x".to_string(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_interval() {
        let mut config = AppConfig::default();
        config.reminder = Some(ReminderConfig {
            deadline: "2025-12-31T23:59:59Z".to_string(),
            interval: "0s".to_string(),
            title: "x".to_string(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        // Should be parseable
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.server.host, parsed.server.host);
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[sheet]\nurl = \"https://sheetdb.io/api/v1/x\"\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.sheet.url, "https://sheetdb.io/api/v1/x");
    }

    #[test]
    fn test_config_from_missing_file() {
        assert!(AppConfig::from_file(Path::new("/nonexistent/config.toml")).is_err());
    }
}
