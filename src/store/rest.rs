use std::fmt;

use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::task::{NewTask, Task, TaskUpdate, now_iso};

use super::TaskStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw response: any status the server answered with, plus its body.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ---------------------------------------------------------------------------
// Client abstraction (for testability)
// ---------------------------------------------------------------------------

/// Sends one request. Non-2xx answers are returned as responses, not errors;
/// only transport-level failures are errors.
pub trait HttpClient {
    fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse>;
}

struct DefaultHttpClient;

impl HttpClient for DefaultHttpClient {
    fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse> {
        let request = ureq::request(method.as_str(), url);
        let result = match body {
            Some(json) => request
                .set("Content-Type", "application/json")
                .send_json(json),
            None => request.call(),
        };

        match result {
            Ok(response) => {
                let status = response.status();
                let body = response
                    .into_string()
                    .map_err(|e| Error::Decode(format!("failed to read response body: {e}")))?;
                Ok(HttpResponse { status, body })
            }
            Err(ureq::Error::Status(status, response)) => Ok(HttpResponse {
                status,
                body: response.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(e)) => Err(Error::Transport(e.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// RestTaskStore
// ---------------------------------------------------------------------------

/// Task collection served as a JSON CRUD resource at one base URL.
pub struct RestTaskStore {
    base_url: String,
    client: Box<dyn HttpClient>,
}

impl RestTaskStore {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, Box::new(DefaultHttpClient))
    }

    pub fn with_client(base_url: &str, client: Box<dyn HttpClient>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/{id}", self.base_url)
    }

    /// Issue a request and return the body of a 2xx response.
    fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<String> {
        debug!(%method, url, "task store request");

        let response = match self.client.send(method, url, body) {
            Ok(r) => r,
            Err(e) => {
                error!(%method, url, error = %e, "task store request failed");
                return Err(e);
            }
        };

        if !response.is_success() {
            error!(%method, url, status = response.status, "task store returned failure");
            return Err(Error::Api {
                status: response.status,
                context: format!("{method} {url}"),
            });
        }

        Ok(response.body)
    }

    fn decode<T: DeserializeOwned>(&self, body: &str, what: &str) -> Result<T> {
        serde_json::from_str(body).map_err(|e| {
            error!(error = %e, what, "failed to decode task store response");
            Error::Decode(format!("failed to parse {what}: {e}"))
        })
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| Error::Decode(format!("failed to encode body: {e}")))
}

impl TaskStore for RestTaskStore {
    fn list_tasks(&self) -> Result<Vec<Task>> {
        let body = self.request(Method::Get, &self.base_url, None)?;
        let tasks: Vec<Task> = self.decode(&body, "task list")?;
        debug!(count = tasks.len(), "fetched tasks");
        Ok(tasks)
    }

    fn get_task(&self, id: &str) -> Result<Task> {
        let body = self.request(Method::Get, &self.item_url(id), None)?;
        self.decode(&body, "task")
    }

    fn create_task(&self, task: NewTask) -> Result<Task> {
        let payload = to_json(&task.into_body(now_iso()))?;
        let body = self.request(Method::Post, &self.base_url, Some(&payload))?;
        let created: Task = self.decode(&body, "created task")?;
        debug!(id = %created.id, "created task");
        Ok(created)
    }

    fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task> {
        let payload = to_json(update)?;
        let body = self.request(Method::Put, &self.item_url(id), Some(&payload))?;
        let updated: Task = self.decode(&body, "updated task")?;
        debug!(id, "updated task");
        Ok(updated)
    }

    fn delete_task(&self, id: &str) -> Result<()> {
        self.request(Method::Delete, &self.item_url(id), None)?;
        debug!(id, "deleted task");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
