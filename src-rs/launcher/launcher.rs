use std::sync::Arc;

use tracing::info;

use crate::error::LauncherError;
use crate::job::{Job, JobIndex};
use crate::task::{LaunchMode, Task};

use super::process::{spawn_command, spawn_program, spawn_recorder};

/// Turns tasks into running jobs.
pub struct Launcher {
    jobs: Arc<JobIndex>,
}

impl Launcher {
    pub fn new(jobs: Arc<JobIndex>) -> Self {
        Self { jobs }
    }

    pub fn jobs(&self) -> &Arc<JobIndex> {
        &self.jobs
    }

    /// Starts a new job for `task` and returns it without waiting for the
    /// process.
    ///
    /// The busy check, job creation and registration all happen under the
    /// task's job lock, so two concurrent starts of one task cannot both
    /// succeed. A misconfigured task fails before anything is created. A
    /// process that cannot be spawned still yields a job; the failure shows up
    /// on its stderr and the job stops.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run(&self, task: &Task) -> Result<Arc<Job>, LauncherError> {
        let definition = task.definition();
        let mode = definition.mode()?;

        let mut jobs = task.lock_jobs();
        if let Some(active) = jobs.iter().find(|job| job.is_running()) {
            return Err(LauncherError::AlreadyRunning {
                job_id: active.id().to_string(),
            });
        }

        let job = Arc::new(Job::new(task.name(), definition.redirects_error()));
        job.mark_running();
        jobs.push(job.clone());
        info!("Job start {} for task {}", job.id(), task.name());

        let events = spawn_recorder(job.clone());
        let directory = definition.directory.as_deref();
        match mode {
            LaunchMode::Program { program, arguments } => {
                spawn_program(&job, program, arguments, directory, events)
            }
            LaunchMode::Command(command) => spawn_command(&job, command, directory, events),
        }

        Ok(self.jobs.add(job))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskDefinition;

    fn launcher() -> Launcher {
        Launcher::new(Arc::new(JobIndex::new()))
    }

    #[tokio::test]
    async fn misconfigured_task_creates_no_job() {
        let launcher = launcher();
        let mut definition = TaskDefinition::command("dup", "echo x");
        definition.program = Some("echo".to_string());
        let task = Task::new(definition);

        let result = launcher.run(&task);
        assert!(matches!(result, Err(LauncherError::Config(_))));
        assert!(task.jobs().is_empty());
        assert!(launcher.jobs().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn busy_task_is_rejected_with_live_job_id() {
        let launcher = launcher();
        let task = Task::new(TaskDefinition::program("sleepy", "sleep", &["5"]));

        let first = launcher.run(&task).unwrap();
        assert!(first.is_running());
        assert!(first.stopped().is_none());

        match launcher.run(&task) {
            Err(LauncherError::AlreadyRunning { job_id }) => assert_eq!(job_id, first.id()),
            other => panic!("unexpected result: {:?}", other.map(|job| job.id().to_string())),
        }
        assert_eq!(task.jobs().len(), 1);
        assert_eq!(launcher.jobs().len(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn missing_program_fails_on_the_job() {
        let launcher = launcher();
        let task = Task::new(
            TaskDefinition::program("ghost", "/no/such/program-xyz", &[]).with_redirect_error("1"),
        );

        let job = launcher.run(&task).unwrap();
        job.wait().await;

        assert!(!job.is_running());
        assert!(job.stopped().is_some());
        assert_eq!(job.stderr().len(), 1);
        assert_eq!(job.stdout(), job.stderr());

        let again = launcher.run(&task).unwrap();
        assert_ne!(again.id(), job.id());
        assert_eq!(launcher.jobs().len(), 2);
    }
}
