//! Session-scoped result storage.
//!
//! The store holds the most recent [`BatchResult`] per session so the download endpoints
//! can serve it later. It knows nothing about cookies; the web layer maps a signed cookie
//! onto a [`SessionId`].

use std::fmt;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::types::BatchResult;

/// Opaque session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// A fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key-value store of one batch per session.
pub trait SessionStore: Send + Sync {
    /// Store `batch`, replacing whatever the session held before.
    fn put(&self, session: &SessionId, batch: BatchResult);

    fn get(&self, session: &SessionId) -> Option<BatchResult>;

    fn remove(&self, session: &SessionId) -> Option<BatchResult>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local store. Entries live until overwritten or the process exits.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: DashMap<SessionId, BatchResult>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn put(&self, session: &SessionId, batch: BatchResult) {
        self.entries.insert(session.clone(), batch);
    }

    fn get(&self, session: &SessionId) -> Option<BatchResult> {
        self.entries.get(session).map(|entry| entry.value().clone())
    }

    fn remove(&self, session: &SessionId) -> Option<BatchResult> {
        self.entries.remove(session).map(|(_, batch)| batch)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
