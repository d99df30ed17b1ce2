// In-memory session store
// Sessions live in a process-wide map and expire after an idle period

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::{SessionData, SessionStore};

struct Entry {
    data: SessionData,
    last_seen: Instant,
}

/// Session store backed by a mutex-guarded map
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Entry>>,
    idle_timeout: Duration,
}

impl MemorySessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.lock().map_or(0, |s| s.len())
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn purge_expired(&self, sessions: &mut HashMap<String, Entry>, now: Instant) {
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) <= self.idle_timeout);
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, id: &str) -> Option<SessionData> {
        let mut sessions = self.sessions.lock().ok()?;
        let now = Instant::now();
        self.purge_expired(&mut sessions, now);

        let entry = sessions.get_mut(id)?;
        entry.last_seen = now;
        Some(entry.data.clone())
    }

    fn save(&self, id: &str, mut data: SessionData) {
        data.mark_clean();
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.insert(
                id.to_string(),
                Entry {
                    data,
                    last_seen: Instant::now(),
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Session, CURRENT_QUIZ};

    #[test]
    fn test_save_then_load() {
        let store = MemorySessionStore::new(Duration::from_secs(60));
        let mut data = SessionData::new();
        data.set(CURRENT_QUIZ, serde_json::json!({"id": 9}));
        store.save("abc", data);

        let loaded = store.load("abc").unwrap();
        assert_eq!(loaded.get(CURRENT_QUIZ).unwrap()["id"], 9);
        assert!(!loaded.is_dirty());
        assert!(store.load("other").is_none());
    }

    #[test]
    fn test_idle_sessions_expire() {
        let store = MemorySessionStore::new(Duration::ZERO);
        store.save("abc", SessionData::new());
        std::thread::sleep(Duration::from_millis(5));
        assert!(store.load("abc").is_none());
        assert!(store.is_empty());
    }
}
