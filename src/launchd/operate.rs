//! launchctl operations.
//!
//! Thin wrapper that hands generated agent files to `launchctl load` and
//! `launchctl unload`. No retries, no state: launchd owns the job from
//! here on.

use std::path::Path;
use std::process::Command;

use thiserror::Error;

use crate::config::FullJobName;

use super::paths;

/// Errors from launchctl invocations and agent file handling.
#[derive(Debug, Error)]
pub enum LaunchdError {
    /// Failed to spawn launchctl.
    #[error("failed to run launchctl: {0}")]
    IoError(#[from] std::io::Error),

    /// The agent plist has not been generated yet.
    #[error("agent file not found: {0} (run generate first)")]
    AgentMissing(String),

    /// launchctl reported a failure.
    #[error("launchctl {verb} failed: {message}")]
    CommandFailed { verb: &'static str, message: String },
}

/// Wrapper around `launchctl load` / `launchctl unload`.
pub struct JobLoader;

impl JobLoader {
    /// Load the job's generated agent into launchd.
    ///
    /// Fails up front when the agent plist has not been generated yet.
    pub fn load(name: &FullJobName) -> Result<(), LaunchdError> {
        let path = paths::agent_path(name);
        if !path.exists() {
            return Err(LaunchdError::AgentMissing(path.display().to_string()));
        }
        Self::run("load", &path)
    }

    /// Unload the job's agent from launchd.
    ///
    /// The path goes to launchctl as-is; launchd reports agents it does
    /// not know about through stderr.
    pub fn unload(name: &FullJobName) -> Result<(), LaunchdError> {
        Self::run("unload", &paths::agent_path(name))
    }

    // launchctl load exits 0 for several failure modes, so non-empty stderr
    // counts as failure too.
    fn run(verb: &'static str, path: &Path) -> Result<(), LaunchdError> {
        let output = Command::new("launchctl").arg(verb).arg(path).output()?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if !output.status.success() || !stderr.is_empty() {
            let message = if stderr.is_empty() {
                output.status.to_string()
            } else {
                stderr.to_string()
            };
            return Err(LaunchdError::CommandFailed { verb, message });
        }
        Ok(())
    }
}
