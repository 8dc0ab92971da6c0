use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Maximum number of events retained in the ring buffer.
const EVENT_LOG_CAPACITY: usize = 200;

/// A logical, independently sequenced data stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamId {
    MoviesList,
    TvList,
    SearchHints,
    TrendingRail,
    NewReleases,
    Detail,
    Facets,
}

impl StreamId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MoviesList => "movies",
            Self::TvList => "tv",
            Self::SearchHints => "hints",
            Self::TrendingRail => "trending",
            Self::NewReleases => "new_releases",
            Self::Detail => "detail",
            Self::Facets => "facets",
        }
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed event from the browsing controller.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    RequestIssued {
        stream: StreamId,
        token: u64,
    },
    StaleDiscarded {
        stream: StreamId,
        token: u64,
        current: u64,
    },
    Committed {
        stream: StreamId,
        token: u64,
        items: usize,
    },
    Failed {
        stream: StreamId,
        token: u64,
        message: String,
    },
    Transition {
        surface: &'static str,
        state: &'static str,
    },
    Navigated {
        location: String,
    },
    SessionChanged {
        email: Option<String>,
    },
}

/// A timestamped event entry.
pub type EventEntry = (DateTime<Utc>, ControllerEvent);

/// Bounded ring buffer of controller events.
#[derive(Debug)]
pub struct EventLog {
    entries: VecDeque<EventEntry>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(EVENT_LOG_CAPACITY),
        }
    }

    /// Push a new event, evicting the oldest if at capacity.
    pub fn push(&mut self, event: ControllerEvent) {
        if self.entries.len() >= EVENT_LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back((Utc::now(), event));
    }

    /// Return a snapshot of all entries (newest last).
    pub fn snapshot(&self) -> Vec<EventEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Thread-safe handle to the event log.
pub type SharedEventLog = Arc<Mutex<EventLog>>;

/// Create a new shared event log.
pub fn shared_event_log() -> SharedEventLog {
    Arc::new(Mutex::new(EventLog::new()))
}
