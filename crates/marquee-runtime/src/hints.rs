use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use marquee_api::CatalogGateway;
use marquee_core::config::BrowseConfig;
use marquee_core::event_log::{SharedEventLog, StreamId};
use marquee_core::models::{MediaSummary, StreamError};

use crate::sequencer::Sequencer;

#[derive(Debug, Clone, Default)]
pub struct HintSnapshot {
    pub query: String,
    pub hints: Vec<MediaSummary>,
    pub ready: bool,
    pub error: Option<StreamError>,
}

/// Search-as-you-type preview under the search box.
pub struct HintController<G> {
    gateway: Arc<G>,
    seq: Sequencer,
    min_chars: usize,
    preview_limit: usize,
    debounce: Duration,
    state: Mutex<HintSnapshot>,
}

impl<G: CatalogGateway> HintController<G> {
    pub fn new(gateway: Arc<G>, browse: &BrowseConfig, events: SharedEventLog) -> Self {
        Self {
            gateway,
            seq: Sequencer::new(StreamId::SearchHints, events),
            min_chars: browse.hint_min_chars.max(1),
            preview_limit: browse.hint_preview_limit,
            debounce: Duration::from_millis(browse.hint_debounce_ms),
            state: Mutex::new(HintSnapshot {
                ready: true,
                ..Default::default()
            }),
        }
    }

    /// Feed the current contents of the search box.
    pub async fn set_query(&self, raw: &str) {
        let query = raw.trim().to_string();

        if query.chars().count() < self.min_chars {
            // Anything still in flight belongs to a longer query.
            self.seq.invalidate();
            *self.state.lock() = HintSnapshot {
                query,
                ready: true,
                ..Default::default()
            };
            return;
        }

        let token = self.seq.begin();
        {
            let mut state = self.state.lock();
            state.query = query.clone();
            state.ready = false;
        }

        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
            if !self.seq.check(token) {
                return;
            }
        }

        let outcome = self.gateway.search_titles(&query, 1).await;
        if !self.seq.check(token) {
            return;
        }

        let mut state = self.state.lock();
        state.ready = true;
        match outcome {
            Ok(mut hints) => {
                hints.truncate(self.preview_limit);
                self.seq.committed(token, hints.len());
                state.hints = hints;
                state.error = None;
            }
            Err(e) => {
                self.seq.failed(token, &e.to_string());
                state.hints.clear();
                state.error = Some(e.to_stream_error());
            }
        }
    }

    pub fn snapshot(&self) -> HintSnapshot {
        self.state.lock().clone()
    }
}
