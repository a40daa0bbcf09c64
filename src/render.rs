use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::task::{Task, parse_timestamp_ms};
use crate::view::{SortDirection, SortKey, TaskView};

const DEFAULT_LIST: &str = include_str!("default_templates/list.txt");
const DEFAULT_EMPTY: &str = include_str!("default_templates/empty.txt");
const DEFAULT_TASK: &str = include_str!("default_templates/task.txt");

const TEMPLATE_NAMES: &[&str] = &["list", "empty", "task"];

fn default_template(name: &str) -> Option<&'static str> {
    match name {
        "list" => Some(DEFAULT_LIST),
        "empty" => Some(DEFAULT_EMPTY),
        "task" => Some(DEFAULT_TASK),
        _ => None,
    }
}

fn template_filename(name: &str) -> String {
    format!("{name}.txt")
}

/// Load a template by name. A file in `override_dir` wins over the default.
pub fn load_template(override_dir: Option<&Path>, name: &str) -> Result<String> {
    if let Some(dir) = override_dir {
        let path = dir.join(template_filename(name));
        if path.exists() {
            return std::fs::read_to_string(&path).map_err(|e| {
                Error::Render(format!(
                    "failed to read override template {}: {e}",
                    path.display()
                ))
            });
        }
    }

    default_template(name)
        .map(|s| s.to_string())
        .ok_or_else(|| Error::Render(format!("unknown template: {name}")))
}

pub fn title_text(task: &Task) -> &str {
    if task.task_name.is_empty() {
        "Untitled Task"
    } else {
        &task.task_name
    }
}

/// Due date as a local calendar date, `N/A` when absent.
pub fn format_due<Tz: TimeZone>(due_date: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    if due_date.trim().is_empty() {
        return "N/A".to_string();
    }
    parse_timestamp_ms(due_date)
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.with_timezone(tz).format("%m/%d/%Y").to_string())
        .unwrap_or_else(|| "Invalid Date".to_string())
}

fn header_label(label: &str, indicator: Option<SortDirection>) -> String {
    match indicator {
        Some(SortDirection::Ascending) => format!("{label} ^"),
        Some(SortDirection::Descending) => format!("{label} v"),
        None => label.to_string(),
    }
}

#[derive(Debug, Serialize)]
struct Row {
    no: String,
    title: String,
    due: String,
    status: String,
    id: String,
}

#[derive(Debug, Serialize)]
struct ListContext {
    head: Row,
    rows: Vec<Row>,
    visible: usize,
    total: usize,
}

#[derive(Debug, Serialize)]
struct EmptyContext {
    filtered: bool,
}

#[derive(Debug, Serialize)]
struct TaskContext<'a> {
    title: &'a str,
    id: &'a str,
    due: String,
    status: &'a str,
    created: &'a str,
}

fn pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    let mut out = value.to_string();
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(len)));
    out
}

fn column_width(head: &Row, rows: &[Row], cell: fn(&Row) -> &str) -> usize {
    std::iter::once(head)
        .chain(rows)
        .map(|r| cell(r).chars().count())
        .max()
        .unwrap_or(0)
}

/// Pad every column but the last to its widest cell.
fn align(head: Row, rows: Vec<Row>) -> (Row, Vec<Row>) {
    let w_no = column_width(&head, &rows, |r| r.no.as_str());
    let w_title = column_width(&head, &rows, |r| r.title.as_str());
    let w_due = column_width(&head, &rows, |r| r.due.as_str());
    let w_status = column_width(&head, &rows, |r| r.status.as_str());

    let fix = |r: Row| Row {
        no: pad(&r.no, w_no),
        title: pad(&r.title, w_title),
        due: pad(&r.due, w_due),
        status: pad(&r.status, w_status),
        id: r.id,
    };
    (fix(head), rows.into_iter().map(fix).collect())
}

/// Text renderer for the task table and task details.
pub struct Renderer {
    engine: upon::Engine<'static>,
}

impl Renderer {
    pub fn new(override_dir: Option<PathBuf>) -> Result<Self> {
        let mut engine = upon::Engine::new();
        for name in TEMPLATE_NAMES {
            let source = load_template(override_dir.as_deref(), name)?;
            engine
                .add_template(*name, source)
                .map_err(|e| Error::Render(format!("invalid template {name}: {e}")))?;
        }
        Ok(Self { engine })
    }

    fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String> {
        let template = self
            .engine
            .get_template(name)
            .ok_or_else(|| Error::Render(format!("unknown template: {name}")))?;
        template
            .render(ctx)
            .to_string()
            .map_err(|e| Error::Render(format!("failed to render {name}: {e}")))
    }

    /// The visible rows with a summary, or the empty-state text.
    pub fn render_view(&self, view: &TaskView) -> Result<String> {
        if view.visible().is_empty() {
            return self.render(
                "empty",
                EmptyContext {
                    filtered: view.is_filtered(),
                },
            );
        }

        let head = Row {
            no: "S.No".to_string(),
            title: header_label("Title", view.sort_indicator(SortKey::TaskName)),
            due: header_label("Due Date", view.sort_indicator(SortKey::DueDate)),
            status: "Status".to_string(),
            id: "ID".to_string(),
        };
        let rows = view
            .visible()
            .iter()
            .enumerate()
            .map(|(i, t)| Row {
                no: (i + 1).to_string(),
                title: title_text(t).to_string(),
                due: format_due(&t.due_date, &Local),
                status: t.status_label().to_string(),
                id: t.id.clone(),
            })
            .collect();
        let (head, rows) = align(head, rows);
        let (visible, total) = view.summary();

        self.render(
            "list",
            ListContext {
                head,
                rows,
                visible,
                total,
            },
        )
    }

    pub fn render_task(&self, task: &Task) -> Result<String> {
        self.render(
            "task",
            TaskContext {
                title: title_text(task),
                id: &task.id,
                due: format_due(&task.due_date, &Local),
                status: task.status_label(),
                created: &task.created_at,
            },
        )
    }
}

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| Error::Render(format!("failed to encode JSON: {e}")))
}
