//! Client-side list state: filtering by search term and status, and
//! column-click sorting of the visible rows.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::task::Task;

/// Narrows the visible set by completion status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => !task.status,
            StatusFilter::Completed => task.status,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Pending => "pending",
            StatusFilter::Completed => "completed",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "pending" => Ok(StatusFilter::Pending),
            "completed" | "done" => Ok(StatusFilter::Completed),
            other => Err(format!(
                "unknown status filter: {other} (expected: all, pending, completed)"
            )),
        }
    }
}

/// Sortable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    TaskName,
    DueDate,
    CreatedAt,
}

impl SortKey {
    /// Date columns compare parsed timestamps; the rest compare text.
    pub fn is_date(self) -> bool {
        matches!(self, SortKey::DueDate | SortKey::CreatedAt)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::TaskName => "task_name",
            SortKey::DueDate => "due_date",
            SortKey::CreatedAt => "createdAt",
        }
    }

    fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortKey::TaskName => locale_cmp(&a.task_name, &b.task_name),
            SortKey::DueDate => a.due_timestamp().cmp(&b.due_timestamp()),
            SortKey::CreatedAt => a.created_timestamp().cmp(&b.created_timestamp()),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "task_name" | "title" | "name" => Ok(SortKey::TaskName),
            "due_date" | "due" | "date" => Ok(SortKey::DueDate),
            "createdat" | "created_at" | "created" => Ok(SortKey::CreatedAt),
            other => Err(format!(
                "unknown sort key: {other} (expected: task_name, due_date, createdAt)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Active sort column and direction. No column is active initially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortConfig {
    pub key: Option<SortKey>,
    pub direction: SortDirection,
}

impl SortConfig {
    /// The configuration after clicking `key`: same column flips direction,
    /// a different column starts ascending.
    pub fn clicked(self, key: SortKey) -> Self {
        let direction = if self.key == Some(key) {
            self.direction.toggled()
        } else {
            SortDirection::Ascending
        };
        Self {
            key: Some(key),
            direction,
        }
    }
}

/// Collation close to a browser's default `localeCompare`: letters compare
/// case-insensitively, lowercase sorts before uppercase on ties.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b).reverse())
}

/// Tasks whose title contains `term` (case-insensitive) and whose status
/// passes `status`. A blank term matches everything.
pub fn filter_tasks(tasks: &[Task], term: &str, status: StatusFilter) -> Vec<Task> {
    let needle = (!term.trim().is_empty()).then(|| term.to_lowercase());
    tasks
        .iter()
        .filter(|t| {
            needle
                .as_deref()
                .is_none_or(|n| t.task_name.to_lowercase().contains(n))
        })
        .filter(|t| status.matches(t))
        .cloned()
        .collect()
}

/// Stable sort in place.
pub fn sort_tasks(tasks: &mut [Task], key: SortKey, direction: SortDirection) {
    match direction {
        SortDirection::Ascending => tasks.sort_by(|a, b| key.compare(a, b)),
        SortDirection::Descending => tasks.sort_by(|a, b| key.compare(b, a)),
    }
}

/// The fetched task set plus the derived visible rows.
#[derive(Debug, Clone, Default)]
pub struct TaskView {
    tasks: Vec<Task>,
    visible: Vec<Task>,
    search: String,
    status: StatusFilter,
    sort: SortConfig,
}

impl TaskView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole task set (after a fetch).
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.apply_filters();
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn visible(&self) -> &[Task] {
        &self.visible
    }

    pub fn search_term(&self) -> &str {
        &self.search
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.status
    }

    pub fn sort_config(&self) -> SortConfig {
        self.sort
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.apply_filters();
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        self.status = status;
        self.apply_filters();
    }

    pub fn clear_filters(&mut self) {
        self.search.clear();
        self.status = StatusFilter::All;
        self.apply_filters();
    }

    pub fn is_filtered(&self) -> bool {
        !self.search.is_empty() || self.status != StatusFilter::All
    }

    /// Column click: sort the visible rows by `key`.
    pub fn sort_by(&mut self, key: SortKey) {
        self.sort = self.sort.clicked(key);
        self.resort();
    }

    /// Current direction for `key`, or `None` if another column is active.
    pub fn sort_indicator(&self, key: SortKey) -> Option<SortDirection> {
        (self.sort.key == Some(key)).then_some(self.sort.direction)
    }

    /// `(visible, total)`
    pub fn summary(&self) -> (usize, usize) {
        (self.visible.len(), self.tasks.len())
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Swap in a confirmed copy of one task. Returns false if it is unknown.
    pub fn replace_task(&mut self, task: Task) -> bool {
        let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) else {
            return false;
        };
        *slot = task;
        self.apply_filters();
        true
    }

    pub fn remove_task(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            self.apply_filters();
        }
        removed
    }

    fn apply_filters(&mut self) {
        self.visible = filter_tasks(&self.tasks, &self.search, self.status);
        self.resort();
    }

    fn resort(&mut self) {
        if let Some(key) = self.sort.key {
            sort_tasks(&mut self.visible, key, self.sort.direction);
        }
    }
}
