pub mod registry;
pub mod types;

pub use registry::{TaskFileInfo, TaskRegistry, TaskSummary};
pub use types::{LaunchMode, Task, TaskDefinition};
