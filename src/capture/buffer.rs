//! Per-session event storage.
//!
//! # Responsibilities
//! - Open an empty session for an id
//! - Append events to live sessions, ignoring unknown or closed ids
//! - Remove and return a session's events exactly once
//!
//! # Design Decisions
//! - One map behind one mutex; critical sections only touch the map
//! - Event formatting and timing happen in the producer, outside the lock
//! - `SessionGuard` ties the session lifetime to a scope, so every exit
//!   path (return, error, panic, dropped future) closes the session

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::capture::event::{Event, SessionId};

/// Concurrent store of captured events keyed by session id.
#[derive(Debug, Default)]
pub struct EventBuffer {
    sessions: Mutex<HashMap<SessionId, Vec<Event>>>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    // Every critical section leaves the map consistent, so a poisoned lock is safe to reuse.
    fn sessions(&self) -> MutexGuard<'_, HashMap<SessionId, Vec<Event>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens an empty session. Re-pushing a live id replaces its events.
    pub fn push(&self, id: SessionId) {
        self.sessions().insert(id, Vec::new());
    }

    /// Appends an event to a live session; no-op for unknown ids.
    pub fn store(&self, id: SessionId, event: Event) {
        if let Some(events) = self.sessions().get_mut(&id) {
            events.push(event);
        }
    }

    /// Removes the session and returns its events in store order.
    ///
    /// Returns an empty vector if the id is not live.
    pub fn pop(&self, id: SessionId) -> Vec<Event> {
        self.sessions().remove(&id).unwrap_or_default()
    }

    /// Number of sessions currently open.
    pub fn open_sessions(&self) -> usize {
        self.sessions().len()
    }

    /// Opens a session scoped to the returned guard.
    pub fn open(self: &Arc<Self>, id: SessionId) -> SessionGuard {
        self.push(id);
        tracing::trace!(session_id = %id, "Session opened");
        SessionGuard {
            buffer: self.clone(),
            id,
            closed: false,
        }
    }
}

/// A RAII guard that closes its session when finished or dropped.
#[derive(Debug)]
pub struct SessionGuard {
    buffer: Arc<EventBuffer>,
    id: SessionId,
    closed: bool,
}

impl SessionGuard {
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Closes the session and returns the captured events.
    pub fn close(mut self) -> Vec<Event> {
        self.closed = true;
        let events = self.buffer.pop(self.id);
        tracing::trace!(session_id = %self.id, events = events.len(), "Session closed");
        events
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let discarded = self.buffer.pop(self.id);
        tracing::debug!(
            session_id = %self.id,
            discarded = discarded.len(),
            "Session closed on abnormal exit"
        );
    }
}
