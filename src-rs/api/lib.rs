pub use crate::app::App;
pub use crate::config::LauncherConfig;
pub use crate::error::{ConfigError, LauncherError};
pub use crate::job::{Job, JobIndex, JobView, OutputChunk, TaskView};
pub use crate::result::JobStarted;
pub use crate::task::{Task, TaskDefinition, TaskRegistry};

pub mod handlers;
pub mod server;
