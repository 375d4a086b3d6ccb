//! TTL-bounded session memory
//!
//! Conversation history lives in process memory only: a restart clears all
//! sessions. Entries expire after a configured idle TTL, and a periodic
//! sweeper evicts expired entries even for sessions that are never
//! revisited, so memory stays bounded.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One conversation turn, append-only within a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Session memory configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Idle time after which an entry expires
    pub ttl: Duration,
    /// How often the background sweeper runs
    pub sweep_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(600),
        }
    }
}

#[derive(Debug)]
struct SessionRecord {
    turns: Vec<Turn>,
    last_access: Instant,
}

impl SessionRecord {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_access.elapsed() > ttl
    }
}

/// In-memory session store keyed by session id
///
/// Reads and writes both count as access and refresh the TTL countdown.
/// `set` replaces the turn list wholesale, so two concurrent requests in the
/// same session race on read-modify-write and the last writer wins; sessions
/// never interfere with each other because entries are keyed by session id.
/// Clones share the same underlying map.
#[derive(Clone)]
pub struct SessionStore {
    config: SessionConfig,
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
}

impl SessionStore {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the turns for a session, empty if absent or expired
    ///
    /// A hit refreshes the entry's TTL; an expired entry is removed on the
    /// spot rather than waiting for the sweeper.
    pub async fn get(&self, session_id: &str) -> Vec<Turn> {
        let mut sessions = self.sessions.write().await;

        match sessions.get_mut(session_id) {
            Some(record) if record.is_expired(self.config.ttl) => {
                sessions.remove(session_id);
                Vec::new()
            }
            Some(record) => {
                record.last_access = Instant::now();
                record.turns.clone()
            }
            None => Vec::new(),
        }
    }

    /// Upsert a session's turns and refresh its TTL
    pub async fn set(&self, session_id: &str, turns: Vec<Turn>) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(
            session_id.to_string(),
            SessionRecord {
                turns,
                last_access: Instant::now(),
            },
        );
    }

    /// Remove all expired entries, returning how many were evicted
    pub async fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let initial_count = sessions.len();

        let ttl = self.config.ttl;
        sessions.retain(|_, record| !record.is_expired(ttl));

        initial_count - sessions.len()
    }

    pub async fn session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }

    /// Spawn the background sweeper task
    ///
    /// Runs `cleanup_expired` every sweep interval for the life of the
    /// process; the handle is returned for callers that want to abort it.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(store.config.sweep_interval);
            // The first tick fires immediately and evicts nothing.
            interval.tick().await;
            loop {
                interval.tick().await;
                let evicted = store.cleanup_expired().await;
                if evicted > 0 {
                    debug!("Session sweep evicted {} expired sessions", evicted);
                }
            }
        })
    }
}
