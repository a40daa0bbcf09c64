use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::form::TaskForm;
use crate::store::TaskStore;
use crate::task::{Task, TaskUpdate};
use crate::view::TaskView;

pub const LOAD_FAILED: &str = "Failed to load tasks. Please check your connection.";
pub const TOGGLE_FAILED: &str = "Failed to update task status";
pub const DELETE_FAILED: &str = "Failed to delete task";

/// The task table: the remote store, the local list, and the one message
/// currently shown to the user.
pub struct TaskBoard<S> {
    store: S,
    view: TaskView,
    message: Option<String>,
}

impl<S: TaskStore> TaskBoard<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            view: TaskView::new(),
            message: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn view(&self) -> &TaskView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut TaskView {
        &mut self.view
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Refetch the whole list. On failure the previous rows stay in place.
    pub fn refresh(&mut self) -> Result<()> {
        self.message = None;
        match self.store.list_tasks() {
            Ok(tasks) => {
                debug!(count = tasks.len(), "task list refreshed");
                self.view.set_tasks(tasks);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "fetch failed");
                self.message = Some(LOAD_FAILED.to_string());
                Err(e)
            }
        }
    }

    /// Flip a task's status remotely, then patch the local copy.
    pub fn toggle_status(&mut self, id: &str) -> Result<Task> {
        self.message = None;
        let Some(current) = self.view.find(id).cloned() else {
            self.message = Some(format!("Task {id} not found"));
            return Err(Error::NotFound(format!("task {id}")));
        };

        let new_status = !current.status;
        if let Err(e) = self.store.update_task(id, &TaskUpdate::status(new_status)) {
            error!(id, error = %e, "toggle failed");
            self.message = Some(TOGGLE_FAILED.to_string());
            return Err(e);
        }

        let mut updated = current;
        updated.status = new_status;
        self.view.replace_task(updated.clone());
        info!(id, status = updated.status_label(), "task status toggled");
        Ok(updated)
    }

    /// Delete remotely, then drop the local row. Confirmation is the
    /// caller's job.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        self.message = None;
        if let Err(e) = self.store.delete_task(id) {
            error!(id, error = %e, "delete failed");
            self.message = Some(DELETE_FAILED.to_string());
            return Err(e);
        }
        self.view.remove_task(id);
        info!(id, "task deleted");
        Ok(())
    }

    /// Submit a create/edit form; on success refetch the list. A failed
    /// refetch leaves its message on the board but the save still counts.
    pub fn save(&mut self, form: &mut TaskForm, today: NaiveDate) -> Result<Task> {
        self.message = None;
        let task = form.submit(&self.store, today)?;
        info!(id = %task.id, "task saved");
        if self.refresh().is_err() {
            warn!(id = %task.id, "saved task but the list could not be reloaded");
        }
        Ok(task)
    }

    /// Resolve a row number from the visible table (1-based), falling back
    /// to a raw task id.
    pub fn resolve_id(&self, reference: &str) -> Option<String> {
        let by_row = reference
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| self.view.visible().get(i));
        by_row
            .or_else(|| self.view.find(reference))
            .map(|t| t.id.clone())
    }
}
