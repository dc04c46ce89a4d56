//! Job configuration model.
//!
//! Typed representation of a job definition: what to run, when launchd
//! should trigger it, and the identity the generated agent is known by.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Namespace prefix for generated agent names.
pub const NAMESPACE: &str = "local";

/// What a job executes: interpreter, target file, arguments, environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Job {
    /// Interpreter or binary that runs the job file.
    #[serde(rename = "binpath")]
    pub bin_path: String,
    /// Script or program file handed to the interpreter.
    pub file: String,
    /// Extra arguments appended after the file.
    #[serde(default)]
    pub args: Vec<String>,
    /// Environment variables for the job process.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// A single calendar trigger point.
///
/// Unset fields match every value of that unit, the same way launchd
/// treats keys missing from a `StartCalendarInterval` dict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Schedule {
    pub minute: Option<u32>,
    pub hour: Option<u32>,
    pub day: Option<u32>,
    pub month: Option<u32>,
    pub weekday: Option<u32>,
}

impl Schedule {
    /// True when every field is unset, i.e. the trigger fires every minute.
    pub fn is_empty(&self) -> bool {
        self.minute.is_none()
            && self.hour.is_none()
            && self.day.is_none()
            && self.month.is_none()
            && self.weekday.is_none()
    }

    /// Key/value pairs for one `StartCalendarInterval` dict, in canonical
    /// key order, with unset fields omitted.
    pub fn calendar_pairs(&self) -> Vec<(String, i64)> {
        // launchd accepts 7 for Sunday but 0 is the canonical value
        let weekday = self.weekday.map(|d| if d == 7 { 0 } else { d });
        let fields = [
            ("Minute", self.minute),
            ("Hour", self.hour),
            ("Day", self.day),
            ("Month", self.month),
            ("Weekday", weekday),
        ];
        fields
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key.to_string(), i64::from(v))))
            .collect()
    }
}

/// A fixed relaunch interval, summed across its units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Interval {
    pub seconds: u32,
    pub minutes: u32,
    pub hours: u32,
    pub days: u32,
}

impl Interval {
    /// Total seconds launchd waits between launches.
    pub fn total_seconds(&self) -> u64 {
        u64::from(self.seconds)
            + 60 * u64::from(self.minutes)
            + 3_600 * u64::from(self.hours)
            + 86_400 * u64::from(self.days)
    }
}

/// The trigger selected for a job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger<'a> {
    /// A direct calendar point.
    Calendar(&'a Schedule),
    /// A cron expression, expanded into calendar points at generation time.
    Cron(&'a str),
    /// A fixed relaunch interval.
    Interval(&'a Interval),
}

/// One job definition, parsed from a YAML job file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Short job name, unique per user.
    pub name: String,
    /// What to execute.
    pub job: Job,
    /// Direct calendar trigger.
    pub schedule: Option<Schedule>,
    /// Cron expression trigger.
    pub cron: Option<String>,
    /// Fixed relaunch interval trigger.
    pub interval: Option<Interval>,
    /// Seconds launchd waits between SIGTERM and SIGKILL at unload.
    #[serde(rename = "exittimeout", default = "default_exit_timeout")]
    pub exit_timeout: u32,
    /// Working directory for the job process.
    #[serde(rename = "workingdir", default = "default_working_dir")]
    pub working_dir: String,
}

fn default_exit_timeout() -> u32 {
    30
}

fn default_working_dir() -> String {
    "~".to_string()
}

impl JobConfig {
    /// The trigger that will drive this job.
    ///
    /// When several triggers are configured, the first of schedule, cron,
    /// interval wins and the rest are ignored. A blank cron string counts
    /// as unset.
    pub fn trigger(&self) -> Option<Trigger<'_>> {
        if let Some(schedule) = &self.schedule {
            return Some(Trigger::Calendar(schedule));
        }
        if let Some(cron) = &self.cron
            && !cron.trim().is_empty()
        {
            return Some(Trigger::Cron(cron));
        }
        if let Some(interval) = &self.interval {
            return Some(Trigger::Interval(interval));
        }
        None
    }
}

/// Fully-qualified job name: `local.<user>.macron.<name>`.
///
/// Everything launchd-visible derives from it: the agent label, the plist
/// file name, and the log file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FullJobName(String);

impl FullJobName {
    /// Derive the full name for a user/job pair.
    pub fn new(user: &str, job: &str) -> Self {
        Self(format!("{}.{}.macron.{}", NAMESPACE, user, job))
    }

    /// Get the underlying string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Label the agent registers under in launchd.
    pub fn label(&self) -> String {
        format!("{}.agent", self.0)
    }

    /// File name of the generated agent plist.
    pub fn plist_file_name(&self) -> String {
        format!("{}.agent.plist", self.0)
    }

    /// File name of the captured stdout log.
    pub fn stdout_log_name(&self) -> String {
        format!("{}.out", self.0)
    }

    /// File name of the captured stderr log.
    pub fn stderr_log_name(&self) -> String {
        format!("{}.err", self.0)
    }
}

impl fmt::Display for FullJobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
