// Application state module
// Everything a request handler needs, built once at startup

use std::time::Duration;

use super::types::Config;
use crate::backend::HttpBackend;
use crate::bridge::QuizBridge;
use crate::session::{MemorySessionStore, SessionCookie};
use crate::views::Views;

/// Application state shared by all connections
pub struct AppState {
    pub config: Config,
    pub bridge: QuizBridge<HttpBackend>,
    pub sessions: MemorySessionStore,
    pub cookie: SessionCookie,
    pub views: Views,
}

impl AppState {
    /// Fails only if the page templates do not compile
    pub fn new(config: &Config) -> Result<Self, tera::Error> {
        let bridge_config = config.bridge();

        Ok(Self {
            config: config.clone(),
            bridge: QuizBridge::from_config(&bridge_config),
            sessions: MemorySessionStore::new(Duration::from_secs(config.session.idle_timeout)),
            cookie: SessionCookie::new(&config.session.cookie_name, &bridge_config.session_secret),
            views: Views::new()?,
        })
    }
}
