//! launchd integration.
//!
//! Path derivation for agents and logs, launchctl load/unload, and
//! captured-log reading.

mod logs;
mod operate;
mod paths;

pub use logs::{LogReader, LogStream};
pub use operate::{JobLoader, LaunchdError};
pub use paths::{
    agent_path, agents_dir, ensure_dirs, logs_dir, stderr_log_path, stdout_log_path,
};
