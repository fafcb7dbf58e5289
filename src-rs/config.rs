use std::path::PathBuf;

use crate::helpers::{env_bool, env_or};

pub const DEFAULT_PORT: u16 = 20002;
pub const DEFAULT_TASK_FILE: &str = "task.json";

#[derive(Clone, Debug)]
pub struct LauncherConfig {
    pub port: u16,
    pub task_file: PathBuf,
    pub debug: bool,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            task_file: PathBuf::from(DEFAULT_TASK_FILE),
            debug: false,
        }
    }
}

impl LauncherConfig {
    /// Reads `PORT`, `TASK_FILE` and `DEBUG`, falling back to defaults.
    pub fn from_env() -> Self {
        let port = env_or("PORT", "")
            .parse::<u16>()
            .unwrap_or(DEFAULT_PORT);
        Self {
            port,
            task_file: PathBuf::from(env_or("TASK_FILE", DEFAULT_TASK_FILE)),
            debug: env_bool("DEBUG"),
        }
    }

    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}
