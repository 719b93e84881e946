use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
}

impl Session {
    /// Any pair of non-blank credentials is accepted. The password is only
    /// checked for presence and never stored.
    pub fn from_credentials(username: &str, password: &str) -> Option<Self> {
        let username = username.trim();
        if username.is_empty() || password.trim().is_empty() {
            return None;
        }
        Some(Self {
            username: username.to_string(),
        })
    }
}
