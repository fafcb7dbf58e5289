use std::io::{self, Write};

use crate::models::{CLIConfig, Chunk, JobInfo, StartResponse, TaskItem, TaskStatus};

pub fn banner(cfg: &CLIConfig) {
    println!("Task Launcher Debug CLI");
    println!("API: {}", cfg.base_url);
    println!("Type /help for commands.");
}

pub fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

pub fn help() {
    println!("Commands:");
    println!("  /help                 Show commands");
    println!("  /exit | /quit          Exit");
    println!("  /tasks                 List configured tasks");
    println!("  /start <task>          Start a task (a bare line does the same)");
    println!("  /status <task>         Show a task's jobs");
    println!("  /job <id>              Show job state");
    println!("  /stdout <id>           Print captured stdout");
    println!("  /stderr <id>           Print captured stderr");
    println!("  /wait <id>             Poll until the job stops, then print stdout");
    println!("  /config                Show current config");
    println!("  /base <url>            Update base URL");
    println!("  /token <token>         Update bearer token");
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn error(msg: &str) {
    println!("error: {}", msg);
}

pub fn tasks(tasks: &[TaskItem]) {
    if tasks.is_empty() {
        println!("no tasks");
        return;
    }
    for task in tasks {
        println!("  {}", task.name);
    }
}

pub fn started(resp: &StartResponse) {
    match (&resp.error, &resp.job) {
        (Some(err), Some(job)) => println!("error: {} (job {})", err, job),
        (Some(err), None) => println!("error: {}", err),
        (None, Some(job)) => println!(
            "started job {} at {}",
            job,
            resp.time.clone().unwrap_or_default()
        ),
        (None, None) => println!("no job returned"),
    }
}

fn state(running: bool) -> &'static str {
    if running {
        "running"
    } else {
        "stopped"
    }
}

pub fn job(info: &JobInfo) {
    println!(
        "[{}] task {} created {} stopped {}",
        state(info.running),
        info.task,
        info.created,
        info.stopped.clone().unwrap_or_else(|| "-".to_string())
    );
    if let Some(buffer) = &info.buffer {
        println!("  buffer: {}", buffer);
    }
}

pub fn task_status(status: &TaskStatus) {
    println!("{}", status.name);
    if status.jobs.is_empty() {
        println!("  no jobs");
        return;
    }
    for job in &status.jobs {
        println!(
            "  [{}] {} created {} stopped {}{}",
            state(job.running),
            job.id,
            job.created,
            job.stopped.clone().unwrap_or_else(|| "-".to_string()),
            if job.child { " (child)" } else { "" }
        );
    }
}

pub fn chunks(chunks: &[Chunk]) {
    if chunks.is_empty() {
        println!("(empty)");
        return;
    }
    for chunk in chunks {
        print!("{} | {}", chunk.time, chunk.text);
        if !chunk.text.ends_with('\n') {
            println!();
        }
    }
}
