pub mod config;
pub mod cron;
pub mod launchd;
pub mod plist;

pub use config::{ConfigError, FullJobName, Interval, Job, JobConfig, Schedule, Trigger, YamlLoader};
pub use cron::{CronExpression, CronParseError};
pub use launchd::{JobLoader, LaunchdError, LogReader, LogStream};
pub use plist::{Document, GenerateError, PlistGenerator, Value};
