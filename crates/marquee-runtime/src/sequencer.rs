//! Per-stream request tokens.
//!
//! Every fetch captures a token before its first await and asks
//! [`Sequencer::check`] after each await. Only the most recently issued
//! token may commit; anything older is dropped without touching state.

use std::sync::atomic::{AtomicU64, Ordering};

use marquee_core::event_log::{ControllerEvent, SharedEventLog, StreamId};

/// Identifies one request within a single stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

pub struct Sequencer {
    stream: StreamId,
    current: AtomicU64,
    events: SharedEventLog,
}

impl Sequencer {
    pub fn new(stream: StreamId, events: SharedEventLog) -> Self {
        Self {
            stream,
            current: AtomicU64::new(0),
            events,
        }
    }

    pub fn stream(&self) -> StreamId {
        self.stream
    }

    /// Issue a new token, superseding every earlier one.
    pub fn begin(&self) -> RequestToken {
        let token = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(stream = %self.stream, token, "request issued");
        self.events.lock().push(ControllerEvent::RequestIssued {
            stream: self.stream,
            token,
        });
        RequestToken(token)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.current.load(Ordering::SeqCst) == token.0
    }

    /// Supersede all outstanding tokens without issuing a request.
    pub fn invalidate(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }

    /// Like `is_current`, but records the discard when the token is stale.
    pub fn check(&self, token: RequestToken) -> bool {
        let current = self.current.load(Ordering::SeqCst);
        if current == token.0 {
            return true;
        }
        tracing::debug!(
            stream = %self.stream,
            token = token.0,
            current,
            "stale response discarded"
        );
        self.events.lock().push(ControllerEvent::StaleDiscarded {
            stream: self.stream,
            token: token.0,
            current,
        });
        false
    }

    pub(crate) fn committed(&self, token: RequestToken, items: usize) {
        self.events.lock().push(ControllerEvent::Committed {
            stream: self.stream,
            token: token.0,
            items,
        });
    }

    pub(crate) fn failed(&self, token: RequestToken, message: &str) {
        tracing::warn!(stream = %self.stream, token = token.0, "fetch failed: {message}");
        self.events.lock().push(ControllerEvent::Failed {
            stream: self.stream,
            token: token.0,
            message: message.to_string(),
        });
    }
}
