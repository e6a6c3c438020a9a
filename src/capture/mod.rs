//! Sub-operation capture subsystem.
//!
//! # Data Flow
//! ```text
//! QueryTrace interceptor
//!     → allocator.rs (next session id)
//!     → buffer.rs (open session, guard scoped to the call)
//!
//! Producers (database hooks, any sub-operation)
//!     → hooks.rs (start time, format text, elapsed)
//!     → buffer.rs (append to the session named by the call context)
//!
//! Call completes
//!     → buffer.rs (pop events exactly once)
//!     → timing extensions on the response
//! ```
//!
//! # Design Decisions
//! - One `Tracer` per server, built at startup and shared via `Arc`
//! - Only the allocator and the buffer are shared across calls
//! - Late writes from detached tasks land on a dead id and are dropped

pub mod allocator;
pub mod buffer;
pub mod event;
pub mod hooks;

use std::sync::Arc;

pub use allocator::CorrelationAllocator;
pub use buffer::{EventBuffer, SessionGuard};
pub use event::{Event, SessionId, TraceGroup};
pub use hooks::{FormatError, OperationStash, QueryHook};

/// Shared capture state: id allocation plus the event buffer.
#[derive(Debug, Default)]
pub struct Tracer {
    allocator: CorrelationAllocator,
    buffer: Arc<EventBuffer>,
}

impl Tracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocator(&self) -> &CorrelationAllocator {
        &self.allocator
    }

    pub fn buffer(&self) -> &Arc<EventBuffer> {
        &self.buffer
    }

    /// Allocates an id and opens its session.
    pub fn open_session(&self) -> SessionGuard {
        let id = self.allocator.next_id();
        self.buffer.open(id)
    }

    /// Producer hook bound to this tracer's buffer.
    pub fn query_hook(&self) -> QueryHook {
        QueryHook::new(self.buffer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CallContext;

    #[test]
    fn test_open_session_allocates_and_pushes() {
        let tracer = Tracer::new();
        let guard = tracer.open_session();
        assert_eq!(guard.id(), SessionId(1));
        assert_eq!(tracer.buffer().open_sessions(), 1);

        let hook = tracer.query_hook();
        let ctx = CallContext::new().with_session(guard.id());
        hook.record(&ctx, hook.before_operation(&ctx), "SELECT 1");

        let events = guard.close();
        assert_eq!(events.len(), 1);
        assert_eq!(tracer.buffer().open_sessions(), 0);
    }
}
