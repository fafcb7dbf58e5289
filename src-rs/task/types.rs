use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LauncherError;
use crate::helpers::value_to_boolean;
use crate::job::{Job, TaskView};

/// A task as written in the task file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_error: Option<Value>,
}

/// How a task's process is started.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LaunchMode<'a> {
    /// Executable with an explicit argument list, output streamed as it comes.
    Program { program: &'a str, arguments: &'a [String] },
    /// Single shell command line, output delivered once at completion.
    Command(&'a str),
}

impl TaskDefinition {
    pub fn program(name: &str, program: &str, arguments: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            program: Some(program.to_string()),
            arguments: arguments.iter().map(|arg| arg.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn command(name: &str, command: &str) -> Self {
        Self {
            name: name.to_string(),
            command: Some(command.to_string()),
            ..Self::default()
        }
    }

    pub fn with_redirect_error(mut self, value: impl Into<Value>) -> Self {
        self.redirect_error = Some(value.into());
        self
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn redirects_error(&self) -> bool {
        value_to_boolean(self.redirect_error.as_ref())
    }

    pub fn mode(&self) -> Result<LaunchMode<'_>, LauncherError> {
        let command = self.command.as_deref().filter(|c| !c.is_empty());
        let program = self.program.as_deref().filter(|p| !p.is_empty());
        match (command, program) {
            (Some(_), Some(_)) => Err(LauncherError::Config(
                "Both command and program properties cannot be used at the same time.".to_string(),
            )),
            (None, None) => Err(LauncherError::Config(
                "Either command or program property is required.".to_string(),
            )),
            (Some(command), None) => Ok(LaunchMode::Command(command)),
            (None, Some(program)) => Ok(LaunchMode::Program {
                program,
                arguments: &self.arguments,
            }),
        }
    }
}

/// A configured task plus every job it has launched.
#[derive(Debug)]
pub struct Task {
    definition: TaskDefinition,
    jobs: Mutex<Vec<Arc<Job>>>,
}

impl Task {
    pub fn new(definition: TaskDefinition) -> Self {
        Self {
            definition,
            jobs: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &TaskDefinition {
        &self.definition
    }

    /// Case-folded name used both for lookups and for duplicate detection.
    pub fn name_key(name: &str) -> String {
        name.to_lowercase()
    }

    pub fn matches_name(&self, needle: &str) -> bool {
        !needle.is_empty() && Self::name_key(&self.definition.name) == Self::name_key(needle)
    }

    pub fn matches_guid(&self, needle: &str) -> bool {
        match &self.definition.guid {
            Some(guid) => !needle.is_empty() && guid.eq_ignore_ascii_case(needle),
            None => false,
        }
    }

    /// Guard over the job list. Holding it serializes launches of this task.
    pub(crate) fn lock_jobs(&self) -> MutexGuard<'_, Vec<Arc<Job>>> {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn jobs(&self) -> Vec<Arc<Job>> {
        self.lock_jobs().clone()
    }

    pub fn running_job(&self) -> Option<Arc<Job>> {
        self.lock_jobs().iter().find(|job| job.is_running()).cloned()
    }

    pub fn status(&self) -> TaskView {
        TaskView {
            name: self.definition.name.clone(),
            jobs: self.lock_jobs().iter().map(|job| job.summary()).collect(),
        }
    }
}
