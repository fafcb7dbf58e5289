use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::helpers::now;
use crate::job::{Job, JobEvent};

const READ_CHUNK: usize = 8192;

pub(crate) type EventSender = UnboundedSender<JobEvent>;

#[derive(Clone, Copy, Debug)]
enum Stream {
    Stdout,
    Stderr,
}

/// Starts the single consumer that applies a job's events in arrival order.
/// It stops once every sender is gone.
pub(crate) fn spawn_recorder(job: Arc<Job>) -> EventSender {
    let (tx, mut rx) = mpsc::unbounded_channel::<JobEvent>();
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            log_event(&job, &event);
            if !job.apply(event) {
                debug!("Job {} already stopped", job.id());
            }
        }
    });
    tx
}

fn log_event(job: &Job, event: &JobEvent) {
    match event {
        JobEvent::Stdout { text, .. } => debug!("Job output {}\n{}", job.id(), text),
        JobEvent::Stderr { text, .. } => warn!("Job error {}\n{}", job.id(), text),
        JobEvent::Error { message, .. } => error!("Job error {} {}", job.id(), message),
        JobEvent::Exit { code, .. } => info!("Job exit {} with code {:?}", job.id(), code),
        JobEvent::Close { code, .. } => info!("Job close {} with code {:?}", job.id(), code),
    }
}

fn send(events: &EventSender, event: JobEvent) {
    // The recorder lives as long as any sender, so this only fails at shutdown.
    let _ = events.send(event);
}

fn fail(events: &EventSender, message: String) {
    send(events, JobEvent::Error { message, time: now() });
    send(events, JobEvent::Close { code: None, time: now() });
}

fn prepare(mut cmd: Command, directory: Option<&Path>) -> Command {
    if let Some(directory) = directory {
        cmd.current_dir(directory);
    }
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd
}

fn spawn_child(mut cmd: Command, job: &Job, events: &EventSender) -> Option<Child> {
    match cmd.spawn() {
        Ok(child) => {
            job.attach_child(child.id());
            Some(child)
        }
        Err(err) => {
            fail(events, format!("{}", err));
            None
        }
    }
}

async fn forward<R: AsyncRead + Unpin>(mut reader: R, stream: Stream, events: EventSender) {
    let mut buffer = vec![0u8; READ_CHUNK];
    loop {
        match reader.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => {
                let text = String::from_utf8_lossy(&buffer[..n]).into_owned();
                let time = now();
                let event = match stream {
                    Stream::Stdout => JobEvent::Stdout { text, time },
                    Stream::Stderr => JobEvent::Stderr { text, time },
                };
                send(&events, event);
            }
            Err(err) => {
                warn!("Reading {:?} failed: {}", stream, err);
                break;
            }
        }
    }
}

/// Spawns `program` with explicit arguments. Every read from the child's
/// stdout or stderr becomes one chunk. Exit is reported as soon as the process
/// terminates; close follows once both streams are drained.
pub(crate) fn spawn_program(
    job: &Job,
    program: &str,
    arguments: &[String],
    directory: Option<&Path>,
    events: EventSender,
) {
    let mut cmd = Command::new(program);
    cmd.args(arguments);
    let cmd = prepare(cmd, directory);

    let Some(mut child) = spawn_child(cmd, job, &events) else {
        return;
    };

    let readers: Vec<_> = [
        child.stdout.take().map(|out| tokio::spawn(forward(out, Stream::Stdout, events.clone()))),
        child.stderr.take().map(|err| tokio::spawn(forward(err, Stream::Stderr, events.clone()))),
    ]
    .into_iter()
    .flatten()
    .collect();

    tokio::spawn(async move {
        let code = match child.wait().await {
            Ok(status) => {
                send(&events, JobEvent::Exit { code: status.code(), time: now() });
                status.code()
            }
            Err(err) => {
                send(&events, JobEvent::Error { message: format!("{}", err), time: now() });
                None
            }
        };
        // A background grandchild may keep the pipes open long after exit.
        for reader in readers {
            let _ = reader.await;
        }
        send(&events, JobEvent::Close { code, time: now() });
    });
}

fn shell(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

/// Runs `command` through the shell and delivers its output once, when it
/// completes: one stdout chunk and one stderr chunk, each only if non-empty.
pub(crate) fn spawn_command(job: &Job, command: &str, directory: Option<&Path>, events: EventSender) {
    let cmd = prepare(shell(command), directory);

    let Some(child) = spawn_child(cmd, job, &events) else {
        return;
    };

    tokio::spawn(async move {
        match child.wait_with_output().await {
            Ok(output) => {
                let time = now();
                if !output.stdout.is_empty() {
                    let text = String::from_utf8_lossy(&output.stdout).into_owned();
                    send(&events, JobEvent::Stdout { text, time });
                }
                if !output.stderr.is_empty() {
                    let text = String::from_utf8_lossy(&output.stderr).into_owned();
                    send(&events, JobEvent::Stderr { text, time });
                }
                if !output.status.success() {
                    warn!("Command finished with {}", output.status);
                }
                send(&events, JobEvent::Exit { code: output.status.code(), time });
                send(&events, JobEvent::Close { code: output.status.code(), time });
            }
            Err(err) => fail(&events, format!("{}", err)),
        }
    });
}
