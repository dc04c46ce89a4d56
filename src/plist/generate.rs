//! Agent document assembly.
//!
//! Maps a validated job configuration onto a complete launchd agent
//! document: identity, program arguments, environment, exactly one
//! trigger entry, and the log/working paths.

use thiserror::Error;

use crate::config::{FullJobName, JobConfig, Trigger};
use crate::cron::{self, CronParseError};
use crate::launchd::{stderr_log_path, stdout_log_path};

use super::document::Document;
use super::value::Value;

/// Errors that can occur while assembling an agent document.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The job has no trigger; validated configs cannot reach this.
    #[error("job '{0}' has no schedule, cron, or interval trigger")]
    MissingTrigger(String),

    /// The selected cron expression failed to parse.
    #[error("invalid cron expression: {0}")]
    InvalidCron(#[from] CronParseError),
}

/// Assembles launchd agent documents from job configurations.
pub struct PlistGenerator;

impl PlistGenerator {
    /// Assemble the agent document for one job.
    ///
    /// Entry order is fixed: Label, ProgramArguments, EnvironmentVariables
    /// (only when the job sets variables), one trigger entry, ExitTimeOut,
    /// WorkingDirectory, StandardOutPath, StandardErrorPath.
    pub fn generate(config: &JobConfig, name: &FullJobName) -> Result<Document, GenerateError> {
        let mut document = Document::new();

        document.push("Label", name.label());
        document.push(
            "ProgramArguments",
            Value::StringArray(Self::program_arguments(config)),
        );

        if !config.job.env.is_empty() {
            let env: Vec<(String, String)> = config
                .job
                .env
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            document.push("EnvironmentVariables", Value::StringMap(env));
        }

        Self::push_trigger(&mut document, config)?;

        document.push("ExitTimeOut", i64::from(config.exit_timeout));
        document.push("WorkingDirectory", expand_tilde(&config.working_dir));
        document.push(
            "StandardOutPath",
            stdout_log_path(name).display().to_string(),
        );
        document.push(
            "StandardErrorPath",
            stderr_log_path(name).display().to_string(),
        );

        Ok(document)
    }

    /// The exact argv launchd will spawn: interpreter, job file, then any
    /// extra arguments, with tildes expanded.
    fn program_arguments(config: &JobConfig) -> Vec<String> {
        let mut argv = vec![
            expand_tilde(&config.job.bin_path),
            expand_tilde(&config.job.file),
        ];
        argv.extend(config.job.args.iter().cloned());
        argv
    }

    /// Append the single trigger entry the job's configuration selects.
    fn push_trigger(document: &mut Document, config: &JobConfig) -> Result<(), GenerateError> {
        match config.trigger() {
            Some(Trigger::Calendar(schedule)) => {
                document.push(
                    "StartCalendarInterval",
                    Value::IntegerMapArray(vec![schedule.calendar_pairs()]),
                );
            }
            Some(Trigger::Cron(expr)) => {
                let maps = cron::expand(expr)?
                    .iter()
                    .map(|schedule| schedule.calendar_pairs())
                    .collect();
                document.push("StartCalendarInterval", Value::IntegerMapArray(maps));
            }
            Some(Trigger::Interval(interval)) => {
                document.push("StartInterval", interval.total_seconds() as i64);
            }
            None => return Err(GenerateError::MissingTrigger(config.name.clone())),
        }
        Ok(())
    }
}

fn expand_tilde(path: &str) -> String {
    shellexpand::tilde(path).into_owned()
}
