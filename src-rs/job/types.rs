use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::watch;
use uuid::Uuid;

use crate::helpers::{now, serialize_time, Timestamp};

use super::view::{BufferSizes, JobView, TaskJobView};

/// One piece of captured output, stamped when it arrived.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutputChunk {
    pub text: String,
    #[serde(serialize_with = "serialize_time")]
    pub time: Timestamp,
}

impl OutputChunk {
    pub fn new(text: impl Into<String>, time: Timestamp) -> Self {
        Self {
            text: text.into(),
            time,
        }
    }
}

/// Something that happened to a job's process.
///
/// Events are produced by the process wrapper and applied in arrival order by
/// a single recorder per job.
#[derive(Clone, Debug, PartialEq)]
pub enum JobEvent {
    Stdout { text: String, time: Timestamp },
    Stderr { text: String, time: Timestamp },
    /// The process could not be spawned or waited on.
    Error { message: String, time: Timestamp },
    /// The process exited.
    Exit { code: Option<i32>, time: Timestamp },
    /// The process' output streams are closed.
    Close { code: Option<i32>, time: Timestamp },
}

#[derive(Debug, Default)]
struct JobState {
    running: bool,
    stopped: Option<Timestamp>,
    child: Option<u32>,
    finalized: bool,
    closed: bool,
    stdout: Vec<OutputChunk>,
    stderr: Vec<OutputChunk>,
    stdin: Vec<OutputChunk>,
}

/// One execution attempt of a task.
#[derive(Debug)]
pub struct Job {
    id: String,
    task_name: String,
    created: Timestamp,
    redirect_error: bool,
    state: Mutex<JobState>,
    running_tx: watch::Sender<bool>,
    closed_tx: watch::Sender<bool>,
}

impl Job {
    pub fn new(task_name: &str, redirect_error: bool) -> Self {
        let (running_tx, _) = watch::channel(false);
        let (closed_tx, _) = watch::channel(false);
        Self {
            id: Uuid::new_v4().to_string(),
            task_name: task_name.to_string(),
            created: now(),
            redirect_error,
            state: Mutex::new(JobState::default()),
            running_tx,
            closed_tx,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    pub fn created(&self) -> Timestamp {
        self.created
    }

    pub fn redirect_error(&self) -> bool {
        self.redirect_error
    }

    fn state(&self) -> MutexGuard<'_, JobState> {
        // Appends and flag flips never leave the state half-written.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_running(&self) -> bool {
        self.state().running
    }

    pub fn stopped(&self) -> Option<Timestamp> {
        self.state().stopped
    }

    /// True once the process' output streams are closed.
    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    pub fn has_child(&self) -> bool {
        self.state().child.is_some()
    }

    pub fn child_id(&self) -> Option<u32> {
        self.state().child
    }

    pub fn stdout(&self) -> Vec<OutputChunk> {
        self.state().stdout.clone()
    }

    pub fn stderr(&self) -> Vec<OutputChunk> {
        self.state().stderr.clone()
    }

    pub fn stdin(&self) -> Vec<OutputChunk> {
        self.state().stdin.clone()
    }

    pub(crate) fn mark_running(&self) {
        let mut state = self.state();
        if state.finalized {
            return;
        }
        state.running = true;
        drop(state);
        self.running_tx.send_replace(true);
    }

    pub(crate) fn attach_child(&self, pid: Option<u32>) {
        let mut state = self.state();
        if state.running {
            state.child = pid;
        }
    }

    /// Applies one process event. Returns false for an exit/close that found
    /// the job already stopped.
    pub(crate) fn apply(&self, event: JobEvent) -> bool {
        let mut state = self.state();
        if matches!(event, JobEvent::Close { .. }) && !state.closed {
            state.closed = true;
            self.closed_tx.send_replace(true);
        }
        match event {
            JobEvent::Stdout { text, time } => {
                state.stdout.push(OutputChunk::new(text, time));
            }
            JobEvent::Stderr { text, time } | JobEvent::Error { message: text, time } => {
                let chunk = OutputChunk::new(text, time);
                if self.redirect_error {
                    state.stdout.push(chunk.clone());
                }
                state.stderr.push(chunk);
            }
            JobEvent::Exit { time, .. } | JobEvent::Close { time, .. } => {
                if state.finalized {
                    return false;
                }
                state.finalized = true;
                state.stopped = Some(time);
                state.running = false;
                state.child = None;
                drop(state);
                self.running_tx.send_replace(false);
            }
        }
        true
    }

    /// Resolves once the job has stopped.
    pub async fn wait(&self) {
        let mut rx = self.running_tx.subscribe();
        let _ = rx.wait_for(|running| !*running).await;
    }

    /// Resolves once the output streams are closed, after the job stopped.
    /// Every chunk the process wrote is captured by then.
    pub async fn wait_closed(&self) {
        let mut rx = self.closed_tx.subscribe();
        let _ = rx.wait_for(|closed| *closed).await;
    }

    pub fn buffer_sizes(&self) -> Option<BufferSizes> {
        let state = self.state();
        BufferSizes::from_lengths(state.stdin.len(), state.stdout.len(), state.stderr.len())
    }

    pub fn view(&self) -> JobView {
        let state = self.state();
        JobView {
            created: self.created,
            task_name: self.task_name.clone(),
            running: state.running,
            stopped: state.stopped,
            buffer: BufferSizes::from_lengths(
                state.stdin.len(),
                state.stdout.len(),
                state.stderr.len(),
            ),
        }
    }

    pub fn summary(&self) -> TaskJobView {
        let state = self.state();
        TaskJobView {
            id: self.id.clone(),
            created: self.created,
            running: state.running,
            stopped: state.stopped,
            child: state.child.is_some(),
            buffer: BufferSizes::from_lengths(
                state.stdin.len(),
                state.stdout.len(),
                state.stderr.len(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_job(redirect_error: bool) -> Job {
        let job = Job::new("build", redirect_error);
        job.mark_running();
        job
    }

    #[test]
    fn new_job_has_identity_and_empty_buffers() {
        let job = Job::new("build", false);
        assert_eq!(job.task_name(), "build");
        assert!(Uuid::parse_str(job.id()).is_ok());
        assert!(!job.is_running());
        assert!(job.stopped().is_none());
        assert!(job.buffer_sizes().is_none());
        assert_ne!(job.id(), Job::new("build", false).id());
    }

    #[test]
    fn stdout_chunks_keep_arrival_order() {
        let job = running_job(false);
        job.apply(JobEvent::Stdout { text: "one".into(), time: now() });
        job.apply(JobEvent::Stdout { text: "two".into(), time: now() });
        let texts: Vec<String> = job.stdout().into_iter().map(|c| c.text).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert!(job.stdout().iter().all(|chunk| chunk.time >= job.created()));
        assert!(job.stderr().is_empty());
    }

    #[test]
    fn redirected_stderr_is_mirrored_in_place() {
        let job = running_job(true);
        let time = now();
        job.apply(JobEvent::Stdout { text: "a".into(), time: now() });
        job.apply(JobEvent::Stderr { text: "oops".into(), time });
        job.apply(JobEvent::Stdout { text: "b".into(), time: now() });

        let stdout = job.stdout();
        assert_eq!(stdout.len(), 3);
        assert_eq!(stdout[1], OutputChunk::new("oops", time));
        assert_eq!(job.stderr(), vec![OutputChunk::new("oops", time)]);
    }

    #[test]
    fn stderr_stays_separate_without_redirect() {
        let job = running_job(false);
        job.apply(JobEvent::Error { message: "spawn failed".into(), time: now() });
        assert!(job.stdout().is_empty());
        assert_eq!(job.stderr()[0].text, "spawn failed");
    }

    #[test]
    fn first_exit_or_close_wins() {
        let job = running_job(false);
        job.attach_child(Some(42));
        assert!(job.has_child());

        let exit_time = now();
        assert!(job.apply(JobEvent::Exit { code: Some(0), time: exit_time }));
        assert!(!job.is_running());
        assert!(!job.has_child());
        assert_eq!(job.stopped(), Some(exit_time));

        let close_time = exit_time + chrono::Duration::seconds(1);
        assert!(!job.is_closed());
        assert!(!job.apply(JobEvent::Close { code: Some(0), time: close_time }));
        assert_eq!(job.stopped(), Some(exit_time));
        assert!(job.is_closed());

        job.mark_running();
        assert!(!job.is_running());
    }

    #[test]
    fn view_omits_empty_buffers() {
        let job = running_job(false);
        let value = serde_json::to_value(job.view()).unwrap();
        assert_eq!(value["task"], "build");
        assert_eq!(value["running"], true);
        assert!(value.get("stopped").is_none());
        assert!(value.get("buffer").is_none());

        job.apply(JobEvent::Stdout { text: "x".into(), time: now() });
        let value = serde_json::to_value(job.view()).unwrap();
        assert_eq!(value["buffer"]["stdout"], 1);
        assert!(value["buffer"].get("stderr").is_none());
    }

    #[tokio::test]
    async fn wait_resolves_after_exit() {
        let job = std::sync::Arc::new(running_job(false));
        let waiter = {
            let job = job.clone();
            tokio::spawn(async move { job.wait().await })
        };
        job.apply(JobEvent::Exit { code: Some(0), time: now() });
        waiter.await.unwrap();
        assert!(!job.is_running());
    }

    #[test]
    fn output_after_exit_still_appends() {
        let job = running_job(false);
        job.apply(JobEvent::Exit { code: Some(0), time: now() });
        assert!(!job.is_running());
        assert!(!job.is_closed());

        job.apply(JobEvent::Stdout { text: "late".into(), time: now() });
        job.apply(JobEvent::Close { code: Some(0), time: now() });
        assert_eq!(job.stdout()[0].text, "late");
        assert!(job.is_closed());
    }
}
