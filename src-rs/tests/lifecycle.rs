#![cfg(unix)]

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use task_launcher_rs::task::{TaskDefinition, TaskRegistry};
use task_launcher_rs::{App, LauncherConfig, LauncherError};
use tokio::time::timeout;

fn app(definitions: Vec<TaskDefinition>) -> App {
    let tasks = TaskRegistry::with_definitions(definitions).expect("valid tasks");
    App::with_tasks(LauncherConfig::default(), tasks)
}

async fn finish(app: &App, job_id: &str) {
    let job = app.jobs.by_id(job_id).expect("job registered");
    timeout(Duration::from_secs(10), job.wait_closed())
        .await
        .expect("job finished in time");
}

#[tokio::test]
async fn echo_program_captures_output() {
    let app = app(vec![TaskDefinition::program("echo", "echo", &["hi"])]);

    let job = app.start_job("echo").unwrap();
    assert!(job.is_running());
    assert!(job.stopped().is_none());
    let status = app.task_status("echo").unwrap();
    assert_eq!(status.jobs.iter().filter(|j| j.running).count(), 1);

    finish(&app, job.id()).await;

    let view = app.job(job.id()).unwrap();
    assert!(!view.running);
    assert!(view.stopped.is_some());
    assert_eq!(view.task_name, "echo");

    let stdout = app.job_stdout(job.id()).unwrap();
    assert_eq!(stdout.len(), 1);
    assert_eq!(stdout[0].text, "hi\n");
    assert!(stdout[0].time >= job.created());
    assert!(app.job_stderr(job.id()).unwrap().is_empty());

    let summary = &app.task_status("echo").unwrap().jobs[0];
    assert!(!summary.child);
    assert_eq!(summary.buffer.as_ref().and_then(|b| b.stdout), Some(1));
}

#[tokio::test]
async fn job_stops_when_process_exits_despite_open_pipes() {
    let app = app(vec![TaskDefinition::program(
        "daemon",
        "sh",
        &["-c", "sleep 20 & echo done"],
    )]);

    let job = app.start_job("daemon").unwrap();
    timeout(Duration::from_secs(5), job.wait())
        .await
        .expect("job stopped once sh exited");

    assert!(!job.is_running());
    assert!(job.stopped().is_some());
    assert!(!job.has_child());
    // The backgrounded sleep still holds stdout.
    assert!(!job.is_closed());

    let again = app.start_job("daemon").expect("task is free again");
    assert_ne!(again.id(), job.id());
}

#[tokio::test]
async fn both_modes_configured_is_rejected() {
    let mut dup = TaskDefinition::command("dup", "echo x");
    dup.program = Some("echo".to_string());
    let app = app(vec![dup]);

    assert!(matches!(app.start_job("dup"), Err(LauncherError::Config(_))));
    assert!(app.task_status("dup").unwrap().jobs.is_empty());
    assert_eq!(app.jobs.len(), 0);
}

#[tokio::test]
async fn redirected_stderr_lands_in_both_streams() {
    let app = app(vec![TaskDefinition::program(
        "noisy",
        "sh",
        &["-c", "echo problem >&2"],
    )
    .with_redirect_error("true")]);

    let job = app.start_job("noisy").unwrap();
    finish(&app, job.id()).await;

    let stderr = job.stderr();
    assert_eq!(stderr.len(), 1);
    assert_eq!(stderr[0].text, "problem\n");
    assert_eq!(job.stdout(), stderr);
}

#[tokio::test]
async fn command_mode_delivers_output_once() {
    let app = app(vec![
        TaskDefinition::command("shell", "echo one; echo two; echo bad >&2").with_redirect_error(1),
    ]);

    let job = app.start_job("shell").unwrap();
    finish(&app, job.id()).await;

    let stdout = job.stdout();
    assert_eq!(stdout.len(), 2);
    assert_eq!(stdout[0].text, "one\ntwo\n");
    assert_eq!(stdout[1].text, "bad\n");
    assert_eq!(job.stderr().len(), 1);
    assert!(job.stopped().unwrap() >= job.created());
}

#[tokio::test]
async fn directory_override_applies() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(vec![TaskDefinition::program("where", "pwd", &[]).with_directory(dir.path())]);

    let job = app.start_job("where").unwrap();
    finish(&app, job.id()).await;

    let printed = job.stdout().into_iter().map(|c| c.text).collect::<String>();
    let expected = dir.path().canonicalize().unwrap();
    assert_eq!(std::path::Path::new(printed.trim()).canonicalize().unwrap(), expected);
}

#[tokio::test]
async fn finished_task_can_run_again() {
    let app = app(vec![TaskDefinition::program("quick", "true", &[])]);

    let first = app.start_job("quick").unwrap();
    finish(&app, first.id()).await;
    let second = app.start_job("quick").unwrap();
    finish(&app, second.id()).await;

    assert_ne!(first.id(), second.id());
    assert_eq!(app.task_status("quick").unwrap().jobs.len(), 2);
    // Lookup by task name only ever reaches the first job.
    assert_eq!(app.jobs.by_task_name("quick").unwrap().id(), first.id());
    assert!(app.job(&second.id().to_uppercase()).is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_starts_yield_one_job() {
    let app = Arc::new(app(vec![TaskDefinition::program("nap", "sleep", &["2"])]));

    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { app.start_job("nap").map(|job| job.id().to_string()) })
        })
        .collect();

    let mut started = Vec::new();
    let mut rejected = Vec::new();
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(id) => started.push(id),
            Err(LauncherError::AlreadyRunning { job_id }) => rejected.push(job_id),
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(started.len(), 1);
    assert_eq!(rejected.len(), 7);
    assert!(rejected.iter().all(|id| id == &started[0]));
    assert_eq!(app.jobs.len(), 1);
}

#[tokio::test]
async fn reload_swaps_tasks_but_keeps_jobs() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"[{{"name":"old","program":"true"}}]"#).unwrap();
    file.flush().unwrap();

    let config = LauncherConfig {
        task_file: file.path().to_path_buf(),
        ..LauncherConfig::default()
    };
    let app = App::new(config);
    assert_eq!(app.reload_tasks().unwrap().count, 1);

    let job = app.start_job("old").unwrap();
    finish(&app, job.id()).await;

    std::fs::write(file.path(), r#"[{"name":"new","command":"true"},{"name":"other","command":"true"}]"#).unwrap();
    assert_eq!(app.reload_tasks().unwrap().count, 2);
    assert!(matches!(app.task_status("old"), Err(LauncherError::TaskNotFound(_))));
    assert!(app.job(job.id()).is_ok());

    std::fs::write(file.path(), "[{\"name\":\"broken\"").unwrap();
    assert!(app.reload_tasks().is_err());
    let names: Vec<String> = app.list_tasks().into_iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["new", "other"]);
}
