use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A task as stored by the remote collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub task_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub due_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: bool,
    #[serde(rename = "createdAt", default, deserialize_with = "null_as_default")]
    pub created_at: String,
}

impl Task {
    pub fn status_label(&self) -> &'static str {
        status_label(self.status)
    }

    /// Milliseconds since the epoch of the due date; missing or unparseable is 0.
    pub fn due_timestamp(&self) -> i64 {
        parse_timestamp_ms(&self.due_date).unwrap_or(0)
    }

    pub fn created_timestamp(&self) -> i64 {
        parse_timestamp_ms(&self.created_at).unwrap_or(0)
    }

    /// Calendar day (UTC) of the due date, as a date picker would show it.
    pub fn due_day(&self) -> Option<NaiveDate> {
        parse_day(&self.due_date)
    }
}

pub fn status_label(status: bool) -> &'static str {
    if status { "Completed" } else { "Pending" }
}

/// Friendly create input, normalized by the store into [`CreateTaskBody`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub name: String,
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn new(name: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            due_date: Some(due_date),
        }
    }

    pub fn into_body(self, created_at: String) -> CreateTaskBody {
        CreateTaskBody {
            task_name: self.name,
            due_date: self.due_date.map(iso_midnight).unwrap_or_default(),
            status: false,
            created_at,
        }
    }
}

/// Store-shaped create payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateTaskBody {
    pub task_name: String,
    pub due_date: String,
    pub status: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// Partial update; absent fields are left untouched by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
}

impl TaskUpdate {
    pub fn status(status: bool) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn details(task_name: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            task_name: Some(task_name.into()),
            due_date: Some(iso_midnight(due_date)),
            status: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.task_name.is_none() && self.due_date.is_none() && self.status.is_none()
    }

    /// Apply this update to a local copy.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(ref name) = self.task_name {
            task.task_name = name.clone();
        }
        if let Some(ref due) = self.due_date {
            task.due_date = due.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
    }
}

/// `YYYY-MM-DDT00:00:00.000Z`
pub fn iso_midnight(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp_ms(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}
