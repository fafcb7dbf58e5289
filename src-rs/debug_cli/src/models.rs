use serde::Deserialize;
use serde_json::Value;

#[derive(Clone, Debug)]
pub struct CLIConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub poll_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct TaskItem {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct StartResponse {
    pub job: Option<String>,
    pub time: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JobInfo {
    pub created: String,
    pub task: String,
    pub running: bool,
    pub stopped: Option<String>,
    pub buffer: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct TaskJob {
    pub id: String,
    pub created: String,
    pub running: bool,
    pub stopped: Option<String>,
    #[serde(default)]
    pub child: bool,
}

#[derive(Debug, Deserialize)]
pub struct TaskStatus {
    pub name: String,
    #[serde(default)]
    pub jobs: Vec<TaskJob>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub time: String,
}
