use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use crate::api::handlers::{
    handle_health, handle_hello, handle_hello_exception, handle_job_info, handle_job_stderr,
    handle_job_stdout, handle_reload, handle_start, handle_task_definition, handle_task_info,
    handle_task_list,
};
use crate::app::App;

pub struct LauncherServer {
    pub port: u16,
    pub app: Arc<App>,
}

impl LauncherServer {
    pub fn new(app: Arc<App>) -> Self {
        let port = app.config.port;
        Self { port, app }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(handle_health))
            .route("/api/hello/world", get(handle_hello))
            .route("/api/hello/exception", get(handle_hello_exception))
            .route("/api/task/start/:task", get(handle_start))
            .route("/api/task/info/:task", get(handle_task_info))
            .route("/api/job/info/:job", get(handle_job_info))
            .route("/api/job/stdout/:job", get(handle_job_stdout))
            .route("/api/job/stderr/:job", get(handle_job_stderr))
            .route("/api/setup/task", get(handle_task_list))
            .route("/api/setup/task/:task", get(handle_task_definition))
            .route("/api/setup/reload", post(handle_reload))
            .with_state(self.app.clone())
    }

    /// Serves until Ctrl-C or SIGTERM.
    pub async fn start(&self) -> Result<(), String> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Launcher is listening on port: {}", self.port);
        axum::Server::bind(&addr)
            .serve(self.router().into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|err| err.to_string())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutting down gracefully");
}
