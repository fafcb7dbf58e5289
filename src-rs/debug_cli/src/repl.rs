use std::io;
use std::thread;
use std::time::Duration;

use crate::client::HTTPClient;
use crate::models::CLIConfig;
use crate::render;

pub struct REPL {
    pub config: CLIConfig,
    pub client: HTTPClient,
}

impl REPL {
    pub fn new(config: CLIConfig, client: HTTPClient) -> Self {
        Self { config, client }
    }

    pub fn run(&mut self) {
        render::banner(&self.config);
        loop {
            render::prompt();
            let mut line = String::new();
            match io::stdin().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('/') {
                if self.handle_command(&line) {
                    break;
                }
                continue;
            }
            self.start(&line);
        }
    }

    fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.splitn(2, ' ');
        let cmd = parts.next().unwrap_or("").trim_start_matches('/');
        let rest = parts.next().unwrap_or("").trim();
        match cmd {
            "exit" | "quit" => return true,
            "help" => render::help(),
            "tasks" => match self.client.list_tasks() {
                Ok(tasks) => render::tasks(&tasks),
                Err(err) => render::error(&err),
            },
            "start" => self.with_arg(rest, "task", |repl, task| repl.start(task)),
            "status" => self.with_arg(rest, "task", |repl, task| {
                match repl.client.task_status(task) {
                    Ok(status) => render::task_status(&status),
                    Err(err) => render::error(&err),
                }
            }),
            "job" => self.with_arg(rest, "job", |repl, job| match repl.client.job(job) {
                Ok(info) => render::job(&info),
                Err(err) => render::error(&err),
            }),
            "stdout" | "stderr" => self.with_arg(rest, "job", |repl, job| {
                match repl.client.stream(job, cmd) {
                    Ok(chunks) => render::chunks(&chunks),
                    Err(err) => render::error(&err),
                }
            }),
            "wait" => self.with_arg(rest, "job", |repl, job| repl.wait(job)),
            "config" => {
                render::info(&format!("base: {}", self.config.base_url));
                render::info(&format!("token: {}", self.config.token.is_some()));
                render::info(&format!("poll: {}ms", self.config.poll_ms));
            }
            "base" => {
                if rest.is_empty() {
                    render::info(&format!("base: {}", self.config.base_url));
                } else {
                    self.config.base_url = rest.to_string();
                    self.client = HTTPClient::new(rest, self.config.token.clone());
                    render::info("base URL updated");
                }
            }
            "token" => {
                if rest.is_empty() {
                    self.config.token = None;
                    render::info("token cleared");
                } else {
                    self.config.token = Some(rest.to_string());
                    render::info("token updated");
                }
                self.client.token = self.config.token.clone();
            }
            _ => render::error("unknown command, try /help"),
        }
        false
    }

    fn with_arg(&mut self, rest: &str, what: &str, action: impl FnOnce(&mut Self, &str)) {
        if rest.is_empty() {
            render::error(&format!("{} required", what));
        } else {
            action(self, rest);
        }
    }

    fn start(&mut self, task: &str) {
        match self.client.start(task) {
            Ok(resp) => render::started(&resp),
            Err(err) => render::error(&err),
        }
    }

    fn wait(&mut self, job: &str) {
        loop {
            match self.client.job(job) {
                Ok(info) if info.running => {
                    thread::sleep(Duration::from_millis(self.config.poll_ms));
                }
                Ok(info) => {
                    render::job(&info);
                    break;
                }
                Err(err) => {
                    render::error(&err);
                    return;
                }
            }
        }
        match self.client.stream(job, "stdout") {
            Ok(chunks) => render::chunks(&chunks),
            Err(err) => render::error(&err),
        }
    }
}
