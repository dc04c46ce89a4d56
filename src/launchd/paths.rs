//! launchd path derivation.
//!
//! Agents land in the per-user LaunchAgents directory; the generated jobs
//! write their logs under `~/Library/Logs/macron`.

use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::config::FullJobName;

/// Directory launchd scans for per-user agents.
pub fn agents_dir() -> PathBuf {
    home_dir().join("Library").join("LaunchAgents")
}

/// Directory the generated agents write their logs to.
pub fn logs_dir() -> PathBuf {
    home_dir().join("Library").join("Logs").join("macron")
}

/// Path of the agent plist for a job.
pub fn agent_path(name: &FullJobName) -> PathBuf {
    agents_dir().join(name.plist_file_name())
}

/// Path of the captured stdout log for a job.
pub fn stdout_log_path(name: &FullJobName) -> PathBuf {
    logs_dir().join(name.stdout_log_name())
}

/// Path of the captured stderr log for a job.
pub fn stderr_log_path(name: &FullJobName) -> PathBuf {
    logs_dir().join(name.stderr_log_name())
}

/// Create the agents and logs directories if they do not exist yet.
pub fn ensure_dirs() -> io::Result<()> {
    for dir in [agents_dir(), logs_dir()] {
        ensure_dir(&dir)?;
    }
    Ok(())
}

fn ensure_dir(dir: &Path) -> io::Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o755))?;
    }
    Ok(())
}

fn home_dir() -> PathBuf {
    // no resolvable home leaves the tilde literal, like shellexpand::tilde
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"))
}
