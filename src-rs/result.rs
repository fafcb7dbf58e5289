use serde::{Deserialize, Serialize};

/// Body returned when a job has been started.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobStarted {
    pub job: String,
    pub time: String,
}
