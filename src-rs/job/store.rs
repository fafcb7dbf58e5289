use std::sync::{Arc, RwLock, RwLockReadGuard};

use super::types::Job;

/// Every job launched during the process lifetime, in launch order.
///
/// Nothing is ever evicted.
pub struct JobIndex {
    jobs: RwLock<Vec<Arc<Job>>>,
}

impl JobIndex {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<Job>>> {
        self.jobs.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn add(&self, job: Arc<Job>) -> Arc<Job> {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        jobs.push(job.clone());
        job
    }

    /// Case-insensitive exact match on the job id.
    pub fn by_id(&self, needle: &str) -> Option<Arc<Job>> {
        if needle.is_empty() {
            return None;
        }
        self.read()
            .iter()
            .find(|job| job.id().eq_ignore_ascii_case(needle))
            .cloned()
    }

    /// First job ever registered for the task, not the latest one.
    pub fn by_task_name(&self, needle: &str) -> Option<Arc<Job>> {
        if needle.is_empty() {
            return None;
        }
        let needle = needle.to_lowercase();
        self.read()
            .iter()
            .find(|job| job.task_name().to_lowercase() == needle)
            .cloned()
    }

    /// Id first, then task name.
    pub fn find(&self, needle: &str) -> Option<Arc<Job>> {
        self.by_id(needle).or_else(|| self.by_task_name(needle))
    }

    pub fn all(&self) -> Vec<Arc<Job>> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for JobIndex {
    fn default() -> Self {
        Self::new()
    }
}
