pub mod store;
pub mod types;
pub mod view;

pub use store::JobIndex;
pub use types::{Job, JobEvent, OutputChunk};
pub use view::{BufferSizes, JobView, TaskJobView, TaskView};
