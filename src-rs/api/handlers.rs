use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::app::App;
use crate::error::LauncherError;
use crate::helpers::now_string;
use crate::result::JobStarted;

pub type Reply = (StatusCode, Json<Value>);

fn ok<T: serde::Serialize>(body: T) -> Reply {
    match serde_json::to_value(body) {
        Ok(value) => (StatusCode::OK, Json(value)),
        Err(err) => {
            error!("Response serialization failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "serialization error"})),
            )
        }
    }
}

fn not_found(err: LauncherError) -> Reply {
    (StatusCode::NOT_FOUND, Json(json!({"error": err.to_string()})))
}

pub async fn handle_health() -> Json<Value> {
    Json(json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}))
}

pub async fn handle_hello() -> Json<Value> {
    Json(json!({"hello": "Hello, World.", "time": now_string()}))
}

/// Always fails; exercises the error log and the 500 path.
pub async fn handle_hello_exception() -> Reply {
    let message = "Example Error Exception";
    error!("{}", message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": message})),
    )
}

pub async fn handle_start(State(app): State<Arc<App>>, Path(task): Path<String>) -> Reply {
    match app.start_job(&task) {
        Ok(job) => ok(JobStarted {
            job: job.id().to_string(),
            time: now_string(),
        }),
        Err(err) => {
            debug!("Task {} not started: {}", task, err);
            let mut body = json!({"error": err.to_string(), "time": now_string()});
            if let Some(job_id) = err.job_id() {
                body["job"] = json!(job_id);
            }
            (StatusCode::BAD_REQUEST, Json(body))
        }
    }
}

pub async fn handle_task_info(State(app): State<Arc<App>>, Path(task): Path<String>) -> Reply {
    match app.task_status(&task) {
        Ok(view) => ok(view),
        Err(err) => not_found(err),
    }
}

pub async fn handle_job_info(State(app): State<Arc<App>>, Path(job): Path<String>) -> Reply {
    match app.job(&job) {
        Ok(view) => ok(view),
        Err(err) => not_found(err),
    }
}

pub async fn handle_job_stdout(State(app): State<Arc<App>>, Path(job): Path<String>) -> Reply {
    match app.job_stdout(&job) {
        Ok(chunks) => ok(json!({ "stdout": chunks })),
        Err(err) => not_found(err),
    }
}

pub async fn handle_job_stderr(State(app): State<Arc<App>>, Path(job): Path<String>) -> Reply {
    match app.job_stderr(&job) {
        Ok(chunks) => ok(json!({ "stderr": chunks })),
        Err(err) => not_found(err),
    }
}

pub async fn handle_task_list(State(app): State<Arc<App>>) -> Json<Value> {
    Json(json!({"list": app.list_tasks(), "time": now_string()}))
}

pub async fn handle_task_definition(
    State(app): State<Arc<App>>,
    Path(task): Path<String>,
) -> Reply {
    match app.task_definition(&task) {
        Ok(definition) => ok(definition),
        Err(err) => not_found(err),
    }
}

pub async fn handle_reload(State(app): State<Arc<App>>) -> Reply {
    match app.reload_tasks() {
        Ok(info) => ok(json!({"tasks": info.count, "time": now_string()})),
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": err.to_string(), "time": now_string()})),
        ),
    }
}
