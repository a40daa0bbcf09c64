#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use tasktrack::error::{Error, Result};
use tasktrack::store::TaskStore;
use tasktrack::task::{NewTask, Task, TaskUpdate};

/// In-memory task collection that assigns ids like the hosted store and
/// records every call.
#[derive(Default)]
pub struct MemoryStore {
    pub tasks: RefCell<Vec<Task>>,
    pub calls: RefCell<Vec<String>>,
    pub offline: Cell<bool>,
    next_id: Cell<u64>,
}

impl MemoryStore {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks.len() as u64;
        Self {
            tasks: RefCell::new(tasks),
            next_id: Cell::new(next_id),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.borrow_mut().push(call);
        if self.offline.get() {
            return Err(Error::Transport("connection refused".to_string()));
        }
        Ok(())
    }

    fn missing(id: &str) -> Error {
        Error::Api {
            status: 404,
            context: format!("task {id}"),
        }
    }
}

impl TaskStore for MemoryStore {
    fn list_tasks(&self) -> Result<Vec<Task>> {
        self.record("list".to_string())?;
        Ok(self.tasks.borrow().clone())
    }

    fn get_task(&self, id: &str) -> Result<Task> {
        self.record(format!("get {id}"))?;
        self.tasks
            .borrow()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| Self::missing(id))
    }

    fn create_task(&self, task: NewTask) -> Result<Task> {
        self.record(format!("create {}", task.name))?;
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let body = task.into_body("2025-01-01T09:00:00.000Z".to_string());
        let created = Task {
            id: id.to_string(),
            task_name: body.task_name,
            due_date: body.due_date,
            status: body.status,
            created_at: body.created_at,
        };
        self.tasks.borrow_mut().push(created.clone());
        Ok(created)
    }

    fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task> {
        self.record(format!("update {id}"))?;
        let mut tasks = self.tasks.borrow_mut();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Self::missing(id))?;
        update.apply_to(task);
        Ok(task.clone())
    }

    fn delete_task(&self, id: &str) -> Result<()> {
        self.record(format!("delete {id}"))?;
        let mut tasks = self.tasks.borrow_mut();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(Self::missing(id));
        }
        Ok(())
    }
}

pub fn task(id: &str, name: &str, due: &str, status: bool, created: &str) -> Task {
    Task {
        id: id.to_string(),
        task_name: name.to_string(),
        due_date: due.to_string(),
        status,
        created_at: created.to_string(),
    }
}
