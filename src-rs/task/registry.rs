use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard};
use std::time::SystemTime;

use serde::Serialize;
use tracing::{error, info};

use crate::error::ConfigError;

use super::types::{Task, TaskDefinition};

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct TaskSummary {
    pub name: String,
}

/// What a successful task file load produced.
#[derive(Clone, Debug)]
pub struct TaskFileInfo {
    pub count: usize,
    pub modified: Option<SystemTime>,
}

/// The configured tasks, in file order.
pub struct TaskRegistry {
    tasks: RwLock<Vec<Arc<Task>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<Task>>> {
        self.tasks.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn with_definitions(definitions: Vec<TaskDefinition>) -> Result<Self, ConfigError> {
        let registry = Self::new();
        registry.load(definitions)?;
        Ok(registry)
    }

    /// Replaces every task at once. The whole list is validated first, so a
    /// bad entry leaves the current tasks in place.
    pub fn load(&self, definitions: Vec<TaskDefinition>) -> Result<usize, ConfigError> {
        let mut seen = HashSet::new();
        for (index, definition) in definitions.iter().enumerate() {
            if definition.name.trim().is_empty() {
                return Err(ConfigError::InvalidTask {
                    index,
                    reason: "name is required".to_string(),
                });
            }
            if !seen.insert(Task::name_key(&definition.name)) {
                return Err(ConfigError::DuplicateTask(definition.name.clone()));
            }
        }

        let tasks: Vec<Arc<Task>> = definitions
            .into_iter()
            .map(|definition| Arc::new(Task::new(definition)))
            .collect();
        let count = tasks.len();
        let mut current = self.tasks.write().unwrap_or_else(|e| e.into_inner());
        *current = tasks;
        Ok(count)
    }

    pub fn load_json(&self, content: &str) -> Result<usize, ConfigError> {
        let definitions: Vec<TaskDefinition> = serde_json::from_str(content)?;
        self.load(definitions)
    }

    pub fn load_file(&self, path: &Path) -> Result<TaskFileInfo, ConfigError> {
        let result = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
            .and_then(|content| self.load_json(&content));
        match result {
            Ok(count) => {
                let modified = fs::metadata(path).and_then(|meta| meta.modified()).ok();
                info!("Task configuration read ({} entries) from {}", count, path.display());
                Ok(TaskFileInfo { count, modified })
            }
            Err(err) => {
                error!("Task configuration error in {}: {}", path.display(), err);
                Err(err)
            }
        }
    }

    /// Exact case-insensitive name match first, then the task's guid.
    /// An empty needle never matches.
    pub fn find_by_name_or_id(&self, needle: &str) -> Option<Arc<Task>> {
        if needle.is_empty() {
            return None;
        }
        let tasks = self.read();
        tasks
            .iter()
            .find(|task| task.matches_name(needle))
            .or_else(|| tasks.iter().find(|task| task.matches_guid(needle)))
            .cloned()
    }

    pub fn list(&self) -> Vec<TaskSummary> {
        self.read()
            .iter()
            .map(|task| TaskSummary {
                name: task.name().to_string(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}
