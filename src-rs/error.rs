use std::path::PathBuf;

use thiserror::Error;

/// Typed outcome of a launcher operation that did not succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LauncherError {
    #[error("Task not found")]
    TaskNotFound(String),

    #[error("Job not found")]
    JobNotFound(String),

    #[error("Job already running")]
    AlreadyRunning { job_id: String },

    #[error("Task configuration wrong: {0}")]
    Config(String),
}

impl LauncherError {
    /// Id of the live job when the task was busy.
    pub fn job_id(&self) -> Option<&str> {
        match self {
            LauncherError::AlreadyRunning { job_id } => Some(job_id),
            _ => None,
        }
    }
}

/// Failure while reading a task file. The current registry is never touched.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read task file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse task file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid task at position {index}: {reason}")]
    InvalidTask { index: usize, reason: String },

    #[error("duplicate task name: {0}")]
    DuplicateTask(String),
}

pub type Result<T> = std::result::Result<T, LauncherError>;
