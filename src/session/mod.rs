//! Browser session module
//!
//! A session is a small key/value map of JSON values scoped to one browser. Handlers
//! only see the [`Session`] interface; where the data lives is up to a [`SessionStore`].

mod cookie;
mod memory;

use std::collections::HashMap;

use serde_json::Value;

pub use cookie::SessionCookie;
pub use memory::MemorySessionStore;

/// Key holding the quiz currently being taken
pub const CURRENT_QUIZ: &str = "current_quiz";
/// Key holding the last submission result
pub const QUIZ_RESULT: &str = "quiz_result";

/// Per-request view of one browser's session
pub trait Session {
    fn get(&self, key: &str) -> Option<&Value>;
    fn set(&mut self, key: &str, value: Value);
}

/// Backing storage for sessions, keyed by session id
pub trait SessionStore {
    /// Load the session for `id`, or `None` if unknown or expired
    fn load(&self, id: &str) -> Option<SessionData>;
    fn save(&self, id: &str, data: SessionData);
}

/// Plain in-process session contents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionData {
    values: HashMap<String, Value>,
    dirty: bool,
}

impl SessionData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether anything was written since load
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

impl Session for SessionData {
    fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
        self.dirty = true;
    }
}

/// Generate a fresh 128-bit session id as hex
pub fn new_session_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}
