use std::env;

use crate::models::CLIConfig;

const DEFAULT_URL: &str = "http://localhost:20002";
const DEFAULT_POLL_MS: u64 = 500;

pub fn parse_config() -> CLIConfig {
    let mut cfg = CLIConfig {
        base_url: env_or("TASK_LAUNCHER_URL", DEFAULT_URL.to_string()),
        token: env_opt("TASK_LAUNCHER_TOKEN"),
        poll_ms: env_u64("TASK_LAUNCHER_POLL_MS", DEFAULT_POLL_MS),
    };

    let args: Vec<String> = env::args().collect();
    let mut idx = 1;
    while idx < args.len() {
        match args[idx].as_str() {
            "--base" => {
                if let Some(value) = args.get(idx + 1) {
                    cfg.base_url = value.clone();
                    idx += 1;
                }
            }
            "--token" => {
                if let Some(value) = args.get(idx + 1) {
                    cfg.token = Some(value.clone());
                    idx += 1;
                }
            }
            "--poll" => {
                if let Some(value) = args.get(idx + 1) {
                    if let Ok(parsed) = value.parse::<u64>() {
                        cfg.poll_ms = parsed;
                    }
                    idx += 1;
                }
            }
            _ => {}
        }
        idx += 1;
    }

    cfg
}

fn env_or(key: &str, fallback: String) -> String {
    env::var(key).unwrap_or(fallback)
}

fn env_opt(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn env_u64(key: &str, fallback: u64) -> u64 {
    match env::var(key) {
        Ok(value) => value.parse::<u64>().unwrap_or(fallback),
        Err(_) => fallback,
    }
}
