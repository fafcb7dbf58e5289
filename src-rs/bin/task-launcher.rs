use std::process;
use std::sync::Arc;

use task_launcher_rs::api::server::LauncherServer;
use task_launcher_rs::{App, LauncherConfig};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let config = LauncherConfig::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level())),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let app = App::new(config);
    if app.reload_tasks().is_err() {
        error!("Task configuration is missing");
        process::exit(1);
    }

    let server = LauncherServer::new(Arc::new(app));
    if let Err(err) = server.start().await {
        error!("server error: {}", err);
        process::exit(1);
    }
}
