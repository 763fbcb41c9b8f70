//! In-memory task and user stores.
//!
//! Both stores are plain owned values handed to the router at construction
//! time, so every test can run against an isolated instance. Records live in
//! insertion order inside a `Vec`; nothing survives a restart.

use taskboard_common::{Error, Result, Task, TaskPatch, User, DEFAULT_PRIORITY};

/// Ordered collection of task records.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the demo fixture tasks.
    pub fn seeded() -> Self {
        Self {
            tasks: vec![
                Task {
                    id: 1,
                    title: "Learn Playwright".to_string(),
                    completed: false,
                    priority: "high".to_string(),
                },
                Task {
                    id: 2,
                    title: "Compare with Katalon".to_string(),
                    completed: false,
                    priority: "medium".to_string(),
                },
                Task {
                    id: 3,
                    title: "Write test cases".to_string(),
                    completed: true,
                    priority: "high".to_string(),
                },
            ],
        }
    }

    /// All records, insertion order preserved.
    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: i64) -> Result<&Task> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::not_found("task", id))
    }

    /// Append a new record.
    ///
    /// The id is assigned as `max(existing ids, 0) + 1`, so it is strictly
    /// greater than every id present at creation time. A blank priority is
    /// treated the same as an absent one.
    pub fn create(&mut self, title: String, priority: Option<String>) -> Task {
        let id = self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let task = Task {
            id,
            title,
            completed: false,
            priority: priority
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
        };
        self.tasks.push(task.clone());
        task
    }

    /// Shallow-merge the supplied fields over the record with the given id.
    ///
    /// The merge covers every supplied field, `id` included.
    pub fn update(&mut self, id: i64, patch: TaskPatch) -> Result<Task> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::not_found("task", id))?;
        task.apply(patch);
        Ok(task.clone())
    }

    pub fn delete(&mut self, id: i64) -> Result<()> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::not_found("task", id))?;
        self.tasks.remove(idx);
        Ok(())
    }

    /// Case-insensitive substring match over titles.
    ///
    /// An empty query matches nothing, not everything.
    pub fn search(&self, query: &str) -> Vec<Task> {
        if query.is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.tasks
            .iter()
            .filter(|t| t.title.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Append-only collection of user accounts.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: Vec<User>,
}

impl UserStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the two demo accounts.
    pub fn seeded() -> Self {
        Self {
            users: vec![
                User {
                    id: 1,
                    email: "admin@test.com".to_string(),
                    password: "admin123".to_string(),
                    name: "Admin User".to_string(),
                },
                User {
                    id: 2,
                    email: "user@test.com".to_string(),
                    password: "user123".to_string(),
                    name: "Test User".to_string(),
                },
            ],
        }
    }

    /// Exact match on both email and password. Plaintext comparison is the
    /// demo's designed behavior, not an oversight.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<&User> {
        self.users
            .iter()
            .find(|u| u.email == email && u.password == password)
            .ok_or(Error::Unauthorized)
    }

    /// Append a new account.
    ///
    /// Ids are assigned as `len + 1`; accounts are never deleted, so the
    /// scheme cannot collide here.
    pub fn register(&mut self, email: String, password: String, name: String) -> Result<User> {
        if self.users.iter().any(|u| u.email == email) {
            return Err(Error::already_exists("user", email));
        }
        let user = User {
            id: self.users.len() as i64 + 1,
            email,
            password,
            name,
        };
        self.users.push(user.clone());
        Ok(user)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
