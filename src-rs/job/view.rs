use serde::Serialize;

use crate::helpers::{serialize_opt_time, serialize_time, Timestamp};

/// Number of chunks held per stream. Empty streams are left out.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BufferSizes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<usize>,
}

impl BufferSizes {
    pub fn from_lengths(stdin: usize, stdout: usize, stderr: usize) -> Option<Self> {
        let nonzero = |len: usize| (len > 0).then_some(len);
        let sizes = Self {
            stdin: nonzero(stdin),
            stdout: nonzero(stdout),
            stderr: nonzero(stderr),
        };
        if sizes == Self::default() {
            None
        } else {
            Some(sizes)
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct JobView {
    #[serde(serialize_with = "serialize_time")]
    pub created: Timestamp,
    #[serde(rename = "task")]
    pub task_name: String,
    pub running: bool,
    #[serde(
        serialize_with = "serialize_opt_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub stopped: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer: Option<BufferSizes>,
}

/// A job as listed under its task.
#[derive(Clone, Debug, Serialize)]
pub struct TaskJobView {
    pub id: String,
    #[serde(serialize_with = "serialize_time")]
    pub created: Timestamp,
    pub running: bool,
    #[serde(
        serialize_with = "serialize_opt_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub stopped: Option<Timestamp>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub child: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer: Option<BufferSizes>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TaskView {
    pub name: String,
    pub jobs: Vec<TaskJobView>,
}
