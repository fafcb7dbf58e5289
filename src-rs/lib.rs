pub mod app;
pub mod config;
pub mod error;
pub mod helpers;
pub mod result;

#[path = "task/lib.rs"]
pub mod task;
#[path = "job/lib.rs"]
pub mod job;
#[path = "launcher/lib.rs"]
pub mod launcher;
#[path = "api/lib.rs"]
pub mod api;

pub use app::App;
pub use config::LauncherConfig;
pub use error::{ConfigError, LauncherError};
pub use result::JobStarted;
