use chrono::{Local, NaiveDate};
use tracing::error;

use crate::error::{Error, Result};
use crate::store::TaskStore;
use crate::task::{NewTask, Task, TaskUpdate};

pub const NAME_REQUIRED: &str = "Task name is required!";
pub const DUE_DATE_REQUIRED: &str = "Due date is required!";
pub const DUE_DATE_INVALID: &str = "Due date must be a valid date (YYYY-MM-DD)!";
pub const DUE_DATE_IN_PAST: &str = "Due date cannot be earlier than today!";
pub const SAVE_FAILED: &str = "Failed to add/edit task. Please try again.";
pub const LOAD_FAILED: &str = "Failed to load task data";

/// The user's local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit(String),
}

/// Create/edit form state: two text fields and one message slot.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    mode: FormMode,
    pub task_name: String,
    /// `YYYY-MM-DD`, as typed or prefilled.
    pub due_date: String,
    error: Option<String>,
}

impl TaskForm {
    pub fn add() -> Self {
        Self {
            mode: FormMode::Add,
            task_name: String::new(),
            due_date: String::new(),
            error: None,
        }
    }

    pub fn edit(id: impl Into<String>) -> Self {
        Self {
            mode: FormMode::Edit(id.into()),
            ..Self::add()
        }
    }

    /// Edit form prefilled from the store. On failure the form is empty and
    /// carries [`LOAD_FAILED`].
    pub fn load<S: TaskStore + ?Sized>(store: &S, id: &str) -> Self {
        let mut form = Self::edit(id);
        match store.get_task(id) {
            Ok(task) => form.fill_from(&task),
            Err(e) => {
                error!(id, error = %e, "failed to load task");
                form.error = Some(LOAD_FAILED.to_string());
            }
        }
        form
    }

    pub fn fill_from(&mut self, task: &Task) {
        self.task_name = task.task_name.clone();
        self.due_date = task
            .due_day()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Add => "Add New Task",
            FormMode::Edit(_) => "Edit Task",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self.mode {
            FormMode::Add => "Save Task",
            FormMode::Edit(_) => "Update Task",
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn reset(&mut self) {
        self.task_name.clear();
        self.due_date.clear();
        self.error = None;
    }

    /// Check required fields and that the due date is not before `today`.
    pub fn validate(&self, today: NaiveDate) -> Result<NaiveDate> {
        if self.task_name.trim().is_empty() {
            return Err(Error::Validation(NAME_REQUIRED.to_string()));
        }
        if self.due_date.trim().is_empty() {
            return Err(Error::Validation(DUE_DATE_REQUIRED.to_string()));
        }
        let due = NaiveDate::parse_from_str(self.due_date.trim(), "%Y-%m-%d")
            .map_err(|_| Error::Validation(DUE_DATE_INVALID.to_string()))?;
        if due < today {
            return Err(Error::Validation(DUE_DATE_IN_PAST.to_string()));
        }
        Ok(due)
    }

    /// Validate, then create or update depending on the mode. A failed
    /// validation issues no store call. On success the form is reset.
    pub fn submit<S: TaskStore + ?Sized>(&mut self, store: &S, today: NaiveDate) -> Result<Task> {
        self.error = None;

        let due = match self.validate(today) {
            Ok(d) => d,
            Err(e) => {
                self.error = Some(e.to_string());
                return Err(e);
            }
        };

        let result = match self.mode {
            FormMode::Add => store.create_task(NewTask::new(self.task_name.clone(), due)),
            FormMode::Edit(ref id) => {
                store.update_task(id, &TaskUpdate::details(self.task_name.clone(), due))
            }
        };

        match result {
            Ok(task) => {
                self.reset();
                Ok(task)
            }
            Err(e) => {
                error!(error = %e, "save failed");
                self.error = Some(SAVE_FAILED.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingStore {
        calls: RefCell<Vec<String>>,
        fail: bool,
    }

    impl RecordingStore {
        fn task(id: &str, name: &str, due: &str) -> Task {
            Task {
                id: id.to_string(),
                task_name: name.to_string(),
                due_date: due.to_string(),
                status: false,
                created_at: String::new(),
            }
        }

        fn outcome(&self, task: Task) -> Result<Task> {
            if self.fail {
                Err(Error::Api {
                    status: 500,
                    context: "mock".to_string(),
                })
            } else {
                Ok(task)
            }
        }
    }

    impl TaskStore for RecordingStore {
        fn list_tasks(&self) -> Result<Vec<Task>> {
            Ok(vec![])
        }

        fn get_task(&self, id: &str) -> Result<Task> {
            self.calls.borrow_mut().push(format!("get {id}"));
            self.outcome(Self::task(id, "Loaded", "2031-07-08T00:00:00.000Z"))
        }

        fn create_task(&self, task: NewTask) -> Result<Task> {
            self.calls.borrow_mut().push(format!("create {}", task.name));
            let body = task.into_body(String::new());
            self.outcome(Self::task("new", &body.task_name, &body.due_date))
        }

        fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task> {
            self.calls.borrow_mut().push(format!("update {id}"));
            let mut task = Self::task(id, "", "");
            update.apply_to(&mut task);
            self.outcome(task)
        }

        fn delete_task(&self, _id: &str) -> Result<()> {
            Ok(())
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn filled(name: &str, due: &str) -> TaskForm {
        let mut form = TaskForm::add();
        form.task_name = name.to_string();
        form.due_date = due.to_string();
        form
    }

    #[test]
    fn test_empty_title_blocks_submit() {
        let store = RecordingStore::default();
        let mut form = filled("   ", "2030-01-01");
        assert!(form.submit(&store, day(2025, 1, 1)).is_err());
        assert_eq!(form.error(), Some(NAME_REQUIRED));
        assert!(store.calls.borrow().is_empty());
    }

    #[test]
    fn test_empty_date_blocks_submit() {
        let store = RecordingStore::default();
        let mut form = filled("Buy milk", "");
        assert!(form.submit(&store, day(2025, 1, 1)).is_err());
        assert_eq!(form.error(), Some(DUE_DATE_REQUIRED));
        assert!(store.calls.borrow().is_empty());
    }

    #[test]
    fn test_past_date_blocks_submit() {
        let store = RecordingStore::default();
        let mut form = filled("Buy milk", "2024-12-31");
        assert!(form.submit(&store, day(2025, 1, 1)).is_err());
        assert_eq!(form.error(), Some(DUE_DATE_IN_PAST));
        assert!(store.calls.borrow().is_empty());
    }

    #[test]
    fn test_garbage_date_blocks_submit() {
        let store = RecordingStore::default();
        let mut form = filled("Buy milk", "tomorrow");
        assert!(form.submit(&store, day(2025, 1, 1)).is_err());
        assert_eq!(form.error(), Some(DUE_DATE_INVALID));
        assert!(store.calls.borrow().is_empty());
    }

    #[test]
    fn test_today_is_allowed() {
        let form = filled("Buy milk", "2025-01-01");
        assert_eq!(form.validate(day(2025, 1, 1)).unwrap(), day(2025, 1, 1));
    }

    #[test]
    fn test_add_mode_creates_and_resets() {
        let store = RecordingStore::default();
        let mut form = filled("Buy milk", "2025-01-02");
        let task = form.submit(&store, day(2025, 1, 1)).unwrap();
        assert_eq!(task.task_name, "Buy milk");
        assert_eq!(task.due_date, "2025-01-02T00:00:00.000Z");
        assert_eq!(*store.calls.borrow(), vec!["create Buy milk"]);
        assert_eq!(form.task_name, "");
        assert!(form.error().is_none());
    }

    #[test]
    fn test_edit_mode_updates() {
        let store = RecordingStore::default();
        let mut form = TaskForm::edit("42");
        form.task_name = "Renamed".to_string();
        form.due_date = "2025-02-01".to_string();
        let task = form.submit(&store, day(2025, 1, 1)).unwrap();
        assert_eq!(task.id, "42");
        assert_eq!(task.task_name, "Renamed");
        assert_eq!(*store.calls.borrow(), vec!["update 42"]);
    }

    #[test]
    fn test_store_failure_sets_generic_message() {
        let store = RecordingStore {
            fail: true,
            ..Default::default()
        };
        let mut form = filled("Buy milk", "2025-01-02");
        let err = form.submit(&store, day(2025, 1, 1)).unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(form.error(), Some(SAVE_FAILED));
        // Fields survive so the user can retry.
        assert_eq!(form.task_name, "Buy milk");
    }

    #[test]
    fn test_load_prefills_edit_form() {
        let store = RecordingStore::default();
        let form = TaskForm::load(&store, "5");
        assert_eq!(form.mode(), &FormMode::Edit("5".to_string()));
        assert_eq!(form.task_name, "Loaded");
        assert_eq!(form.due_date, "2031-07-08");
        assert_eq!(form.title(), "Edit Task");
        assert_eq!(form.submit_label(), "Update Task");
    }

    #[test]
    fn test_load_failure_sets_message() {
        let store = RecordingStore {
            fail: true,
            ..Default::default()
        };
        let form = TaskForm::load(&store, "5");
        assert_eq!(form.error(), Some(LOAD_FAILED));
        assert_eq!(form.task_name, "");
    }

    #[test]
    fn test_add_form_labels() {
        let form = TaskForm::add();
        assert_eq!(form.title(), "Add New Task");
        assert_eq!(form.submit_label(), "Save Task");
    }
}
