use crate::core::Session;
use crate::storage::{self, KeyValueStore, USER_KEY};

/// The logged-in user, kept under the `user` key so it survives restarts.
#[derive(Debug)]
pub struct SessionStore<S> {
    kv: S,
    current: Option<Session>,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn restore(kv: S) -> Self {
        let current = storage::load_json::<Session, _>(&kv, USER_KEY)
            .filter(|s| !s.username.trim().is_empty());
        Self { kv, current }
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Starts a session when both fields are non-blank. An existing session
    /// is replaced.
    pub fn login(&mut self, username: &str, password: &str) -> Option<&Session> {
        let session = Session::from_credentials(username, password)?;
        storage::store_json(&self.kv, USER_KEY, &session);
        tracing::info!(username = %session.username, "logged in");
        self.current = Some(session);
        self.current.as_ref()
    }

    pub fn logout(&mut self) -> Option<Session> {
        storage::remove_key(&self.kv, USER_KEY);
        let previous = self.current.take();
        if let Some(s) = &previous {
            tracing::info!(username = %s.username, "logged out");
        }
        previous
    }
}
