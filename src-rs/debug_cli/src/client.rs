use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::{Chunk, JobInfo, StartResponse, TaskItem, TaskStatus};

pub struct HTTPClient {
    pub base_url: String,
    pub token: Option<String>,
    client: Client,
}

impl HTTPClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            base_url: base_url.to_string(),
            token,
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(header) => req.header(AUTHORIZATION, header),
                Err(_) => req,
            },
            None => req,
        }
    }

    fn get(&self, path: &str) -> Result<Response, String> {
        self.authorize(self.client.get(self.url(path)))
            .send()
            .map_err(|err| err.to_string())
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, String> {
        let resp = self.get(path)?;
        if resp.status().is_success() {
            resp.json::<T>().map_err(|err| err.to_string())
        } else {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            Err(format!("http {}: {}", status.as_u16(), body))
        }
    }

    pub fn list_tasks(&self) -> Result<Vec<TaskItem>, String> {
        let value: Value = self.get_json("/api/setup/task")?;
        let list = value.get("list").cloned().unwrap_or(Value::Array(vec![]));
        serde_json::from_value(list).map_err(|err| err.to_string())
    }

    /// A rejected start still carries a body, so both statuses are decoded.
    pub fn start(&self, task: &str) -> Result<StartResponse, String> {
        let resp = self.get(&format!("/api/task/start/{}", task))?;
        let status = resp.status();
        if status.is_success() || status.as_u16() == 400 {
            resp.json::<StartResponse>().map_err(|err| err.to_string())
        } else {
            let body = resp.text().unwrap_or_default();
            Err(format!("http {}: {}", status.as_u16(), body))
        }
    }

    pub fn task_status(&self, task: &str) -> Result<TaskStatus, String> {
        self.get_json(&format!("/api/task/info/{}", task))
    }

    pub fn job(&self, job: &str) -> Result<JobInfo, String> {
        self.get_json(&format!("/api/job/info/{}", job))
    }

    pub fn stream(&self, job: &str, stream: &str) -> Result<Vec<Chunk>, String> {
        let value: Value = self.get_json(&format!("/api/job/{}/{}", stream, job))?;
        let chunks = value.get(stream).cloned().unwrap_or(Value::Array(vec![]));
        serde_json::from_value(chunks).map_err(|err| err.to_string())
    }
}
