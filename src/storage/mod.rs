//! Key-value persistence used by every store.
//!
//! Values are whole JSON documents. Callers serialize before `set` and
//! treat an unparsable `get` result as absent.

mod file;
mod memory;

use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use file::FileStore;
pub use memory::MemoryStore;

pub const USER_KEY: &str = "user";
pub const TODOS_KEY: &str = "todos";
pub const TEST_RESULTS_KEY: &str = "testResults";
/// Id counters live under `todo-seq.<list key>`. List keys always start
/// with `todos`, so a counter can never share a key with a list.
pub const TODO_SEQ_PREFIX: &str = "todo-seq.";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Reads and decodes `key`. Missing keys, read errors and malformed JSON
/// all come back as `None`; the latter two are logged.
pub fn load_json<T, S>(kv: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let raw = match kv.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(key, error = %format!("{err:#}"), "failed to read stored value");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(err) => {
            tracing::warn!(key, error = %err, "ignoring malformed stored value");
            None
        }
    }
}

/// Encodes and writes `value` under `key`. Failures are logged and
/// reported as `false`; in-memory state stays authoritative.
pub fn store_json<T, S>(kv: &S, key: &str, value: &T) -> bool
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let encoded = match serde_json::to_string(value) {
        Ok(s) => s,
        Err(err) => {
            tracing::warn!(key, error = %err, "failed to encode value");
            return false;
        }
    };
    match kv.set(key, &encoded) {
        Ok(()) => {
            tracing::debug!(key, bytes = encoded.len(), "persisted");
            true
        }
        Err(err) => {
            tracing::warn!(key, error = %format!("{err:#}"), "failed to persist value");
            false
        }
    }
}

pub fn remove_key<S>(kv: &S, key: &str) -> bool
where
    S: KeyValueStore + ?Sized,
{
    match kv.remove(key) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(key, error = %format!("{err:#}"), "failed to remove value");
            false
        }
    }
}
