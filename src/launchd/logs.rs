//! Captured job log reading.

use std::io;
use std::path::PathBuf;

use crate::config::FullJobName;

use super::paths;

/// Which captured stream of a job to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

/// Reads the log files the generated agents write.
pub struct LogReader;

impl LogReader {
    /// Last `tail` lines of the job's captured stream, or `None` if the
    /// job has never written that log.
    pub fn read(
        name: &FullJobName,
        stream: LogStream,
        tail: usize,
    ) -> io::Result<Option<Vec<String>>> {
        let path = Self::log_path(name, stream);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(Some(tail_lines(&content, tail)))
    }

    fn log_path(name: &FullJobName, stream: LogStream) -> PathBuf {
        match stream {
            LogStream::Stdout => paths::stdout_log_path(name),
            LogStream::Stderr => paths::stderr_log_path(name),
        }
    }
}

/// Last `tail` lines of a log's contents.
fn tail_lines(content: &str, tail: usize) -> Vec<String> {
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(tail);
    lines[start..].iter().map(|line| line.to_string()).collect()
}
