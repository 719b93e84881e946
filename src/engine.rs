use crate::core::Session;
use crate::report::ResultsStore;
use crate::session::SessionStore;
use crate::storage::{KeyValueStore, TODOS_KEY};
use crate::todos::TodoStore;

#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Keep one list per username instead of the shared `todos` key.
    pub scope_todos_by_user: bool,
}

/// Ties the session to the todo list it may see. The todo store only
/// exists while someone is logged in and is dropped on logout.
#[derive(Debug)]
pub struct Engine<S> {
    kv: S,
    opts: EngineOptions,
    sessions: SessionStore<S>,
    todos: Option<TodoStore<S>>,
}

impl<S: KeyValueStore + Clone> Engine<S> {
    pub fn restore(kv: S, opts: EngineOptions) -> Self {
        let sessions = SessionStore::restore(kv.clone());
        let todos = sessions
            .current()
            .map(|s| TodoStore::restore(kv.clone(), todos_key(s, &opts)));
        Self {
            kv,
            opts,
            sessions,
            todos,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.sessions.current()
    }

    pub fn login(&mut self, username: &str, password: &str) -> Option<&Session> {
        let session = self.sessions.login(username, password)?.clone();
        self.todos = Some(TodoStore::restore(
            self.kv.clone(),
            todos_key(&session, &self.opts),
        ));
        self.sessions.current()
    }

    pub fn logout(&mut self) -> Option<Session> {
        self.todos = None;
        self.sessions.logout()
    }

    pub fn todos(&self) -> Option<&TodoStore<S>> {
        self.todos.as_ref()
    }

    pub fn todos_mut(&mut self) -> Option<&mut TodoStore<S>> {
        self.todos.as_mut()
    }

    /// Test results are not tied to a session.
    pub fn results(&self) -> ResultsStore<S> {
        ResultsStore::restore(self.kv.clone())
    }
}

pub fn todos_key(session: &Session, opts: &EngineOptions) -> String {
    if opts.scope_todos_by_user {
        format!("{TODOS_KEY}.{}", session.username)
    } else {
        TODOS_KEY.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Todo;
    use crate::storage::MemoryStore;

    fn shared() -> EngineOptions {
        EngineOptions::default()
    }

    fn scoped() -> EngineOptions {
        EngineOptions {
            scope_todos_by_user: true,
        }
    }

    #[test]
    fn todos_require_a_session() {
        let mut engine = Engine::restore(MemoryStore::new(), shared());
        assert!(engine.todos().is_none());
        assert!(engine.login("", "x").is_none());
        assert!(engine.todos_mut().is_none());
    }

    #[test]
    fn list_survives_logout_login_cycle() {
        let kv = MemoryStore::new();
        let mut engine = Engine::restore(kv.clone(), shared());
        engine.login("alice", "x").expect("login");
        let todos = engine.todos_mut().expect("todos");
        let milk = todos.add("Buy milk").expect("milk");
        todos.add("Walk dog").expect("dog");
        todos.toggle(milk);
        let before: Vec<Todo> = todos.todos().to_vec();

        engine.logout().expect("logout");
        assert!(engine.todos().is_none());
        assert!(engine.session().is_none());

        engine.login("alice", "x").expect("login again");
        assert_eq!(engine.todos().expect("todos").todos(), before.as_slice());
    }

    #[test]
    fn restore_reopens_the_persisted_session() {
        let kv = MemoryStore::new();
        {
            let mut engine = Engine::restore(kv.clone(), shared());
            engine.login("alice", "x").expect("login");
            engine.todos_mut().expect("todos").add("persisted");
        }
        let engine = Engine::restore(kv, shared());
        assert_eq!(engine.session().map(|s| s.username.as_str()), Some("alice"));
        let todos = engine.todos().expect("todos");
        assert_eq!(todos.todos()[0].text, "persisted");
    }

    #[test]
    fn shared_key_is_seen_by_every_user() {
        let kv = MemoryStore::new();
        let mut engine = Engine::restore(kv, shared());
        engine.login("alice", "x").expect("login");
        engine.todos_mut().expect("todos").add("alice's");
        engine.logout();

        engine.login("bob", "y").expect("login");
        assert_eq!(engine.todos().expect("todos").todos().len(), 1);
    }

    #[test]
    fn scoped_keys_keep_users_apart() {
        let kv = MemoryStore::new();
        let mut engine = Engine::restore(kv.clone(), scoped());
        engine.login("alice", "x").expect("login");
        engine.todos_mut().expect("todos").add("alice's");
        assert_eq!(engine.todos().expect("todos").key(), "todos.alice");

        engine.logout();
        engine.login("bob", "y").expect("login");
        assert!(engine.todos().expect("todos").is_empty());

        engine.logout();
        engine.login("alice", "x").expect("login");
        assert_eq!(engine.todos().expect("todos").todos().len(), 1);
        assert!(kv.keys().contains(&"todos.alice".to_string()));
    }

    #[test]
    fn dotted_usernames_do_not_clobber_each_other() {
        let kv = MemoryStore::new();
        let mut engine = Engine::restore(kv.clone(), scoped());
        engine.login("x.seq", "pw").expect("login");
        engine.todos_mut().expect("todos").add("mine");
        engine.logout();

        engine.login("x", "pw").expect("login");
        engine.todos_mut().expect("todos").add("x's");
        engine.logout();

        engine.login("x.seq", "pw").expect("login");
        let todos = engine.todos().expect("todos");
        assert_eq!(todos.todos().len(), 1);
        assert_eq!(todos.todos()[0].text, "mine");
        assert_eq!(
            kv.keys(),
            vec![
                "todo-seq.todos.x",
                "todo-seq.todos.x.seq",
                "todos.x",
                "todos.x.seq",
                "user",
            ]
        );
    }

    #[test]
    fn switching_user_without_logout_replaces_the_list() {
        let mut engine = Engine::restore(MemoryStore::new(), scoped());
        engine.login("alice", "x").expect("login");
        engine.todos_mut().expect("todos").add("a");
        engine.login("bob", "y").expect("login");
        assert_eq!(engine.session().map(|s| s.username.as_str()), Some("bob"));
        assert!(engine.todos().expect("todos").is_empty());
    }
}
