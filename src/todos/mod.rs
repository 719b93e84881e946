//! The ordered task list of one session.
//!
//! Every mutation writes the complete list back to the key-value store
//! before returning. Invalid input and unknown ids leave the list
//! untouched and are reported through the return value only.

use crate::core::{Todo, TodoFilter, TodoId, TodoStats, normalize_text};
use crate::storage::{self, KeyValueStore, TODO_SEQ_PREFIX};

#[derive(Debug)]
pub struct TodoStore<S> {
    kv: S,
    key: String,
    seq_key: String,
    todos: Vec<Todo>,
    next_id: u64,
}

impl<S: KeyValueStore> TodoStore<S> {
    /// Loads the list stored under `key`, starting empty when it is missing
    /// or unreadable.
    pub fn restore(kv: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let seq_key = format!("{TODO_SEQ_PREFIX}{key}");

        let todos: Vec<Todo> = storage::load_json(&kv, &key).unwrap_or_default();
        let stored_seq: u64 = storage::load_json(&kv, &seq_key).unwrap_or(0);
        let after_max = todos
            .iter()
            .map(|t| t.id.0)
            .max()
            .map_or(1, |m| m.saturating_add(1));
        let next_id = stored_seq.max(after_max).max(1);

        tracing::debug!(key = %key, count = todos.len(), next_id, "restored todos");

        Self {
            kv,
            key,
            seq_key,
            todos,
            next_id,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// The tasks `filter` selects, in display order.
    pub fn filtered(&self, filter: TodoFilter) -> impl Iterator<Item = &Todo> {
        self.todos.iter().filter(move |t| filter.matches(t))
    }

    pub fn stats(&self) -> TodoStats {
        TodoStats::of(&self.todos)
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Appends a task. Returns `None` for blank text, or once the id space
    /// is used up.
    pub fn add(&mut self, text: &str) -> Option<TodoId> {
        let id = TodoId(self.next_id);
        let todo = Todo::new(id, text)?;
        let Some(next) = self.next_id.checked_add(1) else {
            tracing::warn!(key = %self.key, "todo ids exhausted");
            return None;
        };
        self.next_id = next;
        self.todos.push(todo);
        self.persist();
        Some(id)
    }

    pub fn edit(&mut self, id: TodoId, text: &str) -> bool {
        let Some(text) = normalize_text(text) else {
            return false;
        };
        let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        todo.text = text;
        self.persist();
        true
    }

    pub fn toggle(&mut self, id: TodoId) -> bool {
        let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        todo.completed = !todo.completed;
        self.persist();
        true
    }

    pub fn remove(&mut self, id: TodoId) -> bool {
        let Some(pos) = self.todos.iter().position(|t| t.id == id) else {
            return false;
        };
        self.todos.remove(pos);
        self.persist();
        true
    }

    /// Drops every completed task, returning how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.todos.len();
        self.todos.retain(|t| !t.completed);
        let removed = before - self.todos.len();
        if removed > 0 {
            self.persist();
        }
        removed
    }

    fn persist(&self) {
        storage::store_json(&self.kv, &self.key, &self.todos);
        storage::store_json(&self.kv, &self.seq_key, &self.next_id);
    }
}
