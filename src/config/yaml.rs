//! YAML job file parsing.
//!
//! Parses job definitions from YAML files and validates them before any
//! agent generation happens.

use std::path::Path;
use thiserror::Error;

use super::types::{JobConfig, Schedule, Trigger};

/// Errors that can occur when loading a job file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the job file.
    #[error("failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse YAML.
    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Missing required field.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// No trigger configured.
    #[error("job must define a schedule, cron, or interval trigger")]
    MissingTrigger,
}

/// YAML job file loader.
pub struct YamlLoader;

impl YamlLoader {
    /// Load a job configuration from a file.
    pub fn load_job_config(path: impl AsRef<Path>) -> Result<JobConfig, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_job_config(&content)
    }

    /// Parse a job configuration from a YAML string.
    pub fn parse_job_config(yaml: &str) -> Result<JobConfig, ConfigError> {
        let config: JobConfig = serde_yaml::from_str(yaml)?;
        Self::validate_job_config(&config)?;
        Ok(config)
    }

    /// Validate a job configuration.
    fn validate_job_config(config: &JobConfig) -> Result<(), ConfigError> {
        if config.name.is_empty() {
            return Err(ConfigError::MissingField("name".into()));
        }
        if config.job.bin_path.is_empty() {
            return Err(ConfigError::MissingField("job.binpath".into()));
        }
        if config.job.file.is_empty() {
            return Err(ConfigError::MissingField("job.file".into()));
        }

        // Only the trigger that will actually drive the job is validated;
        // anything behind it in precedence is ignored wholesale. Cron syntax
        // is checked when the expression is expanded at generation time.
        match config.trigger() {
            None => return Err(ConfigError::MissingTrigger),
            Some(Trigger::Calendar(schedule)) => Self::validate_schedule(schedule)?,
            Some(Trigger::Cron(_)) => {}
            Some(Trigger::Interval(interval)) => {
                if interval.total_seconds() == 0 {
                    return Err(ConfigError::InvalidConfig(
                        "interval must be longer than zero seconds".into(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Validate a direct schedule's field ranges.
    fn validate_schedule(schedule: &Schedule) -> Result<(), ConfigError> {
        let limits = [
            ("minute", schedule.minute, 0, 59),
            ("hour", schedule.hour, 0, 23),
            ("day", schedule.day, 1, 31),
            ("month", schedule.month, 1, 12),
            ("weekday", schedule.weekday, 0, 7),
        ];
        for (field, value, min, max) in limits {
            if let Some(v) = value
                && (v < min || v > max)
            {
                return Err(ConfigError::InvalidConfig(format!(
                    "schedule {} must be between {} and {}, got {}",
                    field, min, max, v
                )));
            }
        }
        Ok(())
    }
}
