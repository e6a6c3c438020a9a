//! Sub-operation producer hooks.
//!
//! A database driver (or any other sub-operation source) brackets each
//! operation with [`QueryHook::before_operation`] and
//! [`QueryHook::after_operation`]. When the call context carries no active
//! session both are cheap no-ops.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::capture::buffer::EventBuffer;
use crate::capture::event::Event;
use crate::context::CallContext;

/// The producer failed to render an operation's text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("formatted query err={0}")]
    Query(String),
}

/// Per-operation state carried between the two hook calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationStash {
    started_at: Option<Instant>,
}

impl OperationStash {
    pub fn elapsed(&self) -> Duration {
        self.started_at.map(|t| t.elapsed()).unwrap_or_default()
    }
}

/// Forwards finished operations into the [`EventBuffer`].
#[derive(Debug, Clone)]
pub struct QueryHook {
    buffer: Arc<EventBuffer>,
}

impl QueryHook {
    pub fn new(buffer: Arc<EventBuffer>) -> Self {
        Self { buffer }
    }

    /// Records the start time if a session is active.
    pub fn before_operation(&self, ctx: &CallContext) -> OperationStash {
        OperationStash {
            started_at: ctx.session_id().is_active().then(Instant::now),
        }
    }

    /// Formats the operation and stores it in the call's session.
    ///
    /// A formatting failure is returned to the producer and nothing is stored.
    pub fn after_operation<F>(
        &self,
        ctx: &CallContext,
        stash: OperationStash,
        format: F,
    ) -> Result<(), FormatError>
    where
        F: FnOnce() -> Result<String, FormatError>,
    {
        let id = ctx.session_id();
        if !id.is_active() {
            return Ok(());
        }

        let text = format()?;
        let event = Event::new(text, ctx.trace_group().clone(), stash.elapsed());
        self.buffer.store(id, event);
        Ok(())
    }

    /// Like [`after_operation`](Self::after_operation) for already-rendered text.
    pub fn record(&self, ctx: &CallContext, stash: OperationStash, text: impl Into<String>) {
        let text = text.into();
        // rendering plain text cannot fail
        let _ = self.after_operation(ctx, stash, || Ok(text));
    }

    /// Runs `op` and records it under `text` once it completes.
    pub async fn observe<Fut>(&self, ctx: &CallContext, text: impl Into<String>, op: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        let stash = self.before_operation(ctx);
        let out = op.await;
        self.record(ctx, stash, text);
        out
    }
}
