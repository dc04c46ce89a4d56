//! Job configuration loading and parsing.
//!
//! This module provides the typed job model and its YAML loader.

mod types;
mod yaml;

pub use types::{FullJobName, Interval, Job, JobConfig, NAMESPACE, Schedule, Trigger};
pub use yaml::{ConfigError, YamlLoader};
