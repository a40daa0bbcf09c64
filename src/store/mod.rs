pub mod rest;

use crate::error::Result;
use crate::task::{NewTask, Task, TaskUpdate};

pub use rest::RestTaskStore;

/// Access to the remote task collection.
pub trait TaskStore {
    /// Fetch every task in the collection.
    fn list_tasks(&self) -> Result<Vec<Task>>;

    /// Fetch a single task by id.
    fn get_task(&self, id: &str) -> Result<Task>;

    /// Create a task. The store assigns the id.
    fn create_task(&self, task: NewTask) -> Result<Task>;

    /// Send a partial update and return the stored result.
    fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task>;

    fn delete_task(&self, id: &str) -> Result<()>;
}

impl<T: TaskStore + ?Sized> TaskStore for Box<T> {
    fn list_tasks(&self) -> Result<Vec<Task>> {
        (**self).list_tasks()
    }

    fn get_task(&self, id: &str) -> Result<Task> {
        (**self).get_task(id)
    }

    fn create_task(&self, task: NewTask) -> Result<Task> {
        (**self).create_task(task)
    }

    fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task> {
        (**self).update_task(id, update)
    }

    fn delete_task(&self, id: &str) -> Result<()> {
        (**self).delete_task(id)
    }
}
