use std::sync::Arc;

use crate::config::LauncherConfig;
use crate::error::{ConfigError, LauncherError, Result};
use crate::job::{Job, JobIndex, JobView, OutputChunk, TaskView};
use crate::launcher::Launcher;
use crate::task::{Task, TaskDefinition, TaskFileInfo, TaskRegistry, TaskSummary};

/// Owns the task registry and job index and answers every operation the HTTP
/// layer exposes.
pub struct App {
    pub config: LauncherConfig,
    pub tasks: TaskRegistry,
    pub jobs: Arc<JobIndex>,
    launcher: Launcher,
}

impl App {
    pub fn new(config: LauncherConfig) -> Self {
        Self::with_tasks(config, TaskRegistry::new())
    }

    pub fn with_tasks(config: LauncherConfig, tasks: TaskRegistry) -> Self {
        let jobs = Arc::new(JobIndex::new());
        Self {
            config,
            tasks,
            launcher: Launcher::new(jobs.clone()),
            jobs,
        }
    }

    /// (Re)reads the configured task file. On failure the current tasks stay.
    pub fn reload_tasks(&self) -> std::result::Result<TaskFileInfo, ConfigError> {
        self.tasks.load_file(&self.config.task_file)
    }

    fn find_task(&self, needle: &str) -> Result<Arc<Task>> {
        self.tasks
            .find_by_name_or_id(needle)
            .ok_or_else(|| LauncherError::TaskNotFound(needle.to_string()))
    }

    /// Job by id, or else the first job of the task with that name.
    fn find_job(&self, needle: &str) -> Result<Arc<Job>> {
        self.jobs
            .find(needle)
            .ok_or_else(|| LauncherError::JobNotFound(needle.to_string()))
    }

    pub fn start_job(&self, task: &str) -> Result<Arc<Job>> {
        let task = self.find_task(task)?;
        self.launcher.run(&task)
    }

    pub fn task_status(&self, task: &str) -> Result<TaskView> {
        Ok(self.find_task(task)?.status())
    }

    pub fn task_definition(&self, task: &str) -> Result<TaskDefinition> {
        Ok(self.find_task(task)?.definition().clone())
    }

    pub fn job(&self, job: &str) -> Result<JobView> {
        Ok(self.find_job(job)?.view())
    }

    pub fn job_stdout(&self, job: &str) -> Result<Vec<OutputChunk>> {
        Ok(self.find_job(job)?.stdout())
    }

    pub fn job_stderr(&self, job: &str) -> Result<Vec<OutputChunk>> {
        Ok(self.find_job(job)?.stderr())
    }

    pub fn list_tasks(&self) -> Vec<TaskSummary> {
        self.tasks.list()
    }
}
