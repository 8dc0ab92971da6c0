use std::sync::Arc;

use parking_lot::Mutex;

use marquee_api::CatalogGateway;
use marquee_core::event_log::{SharedEventLog, StreamId};
use marquee_core::models::StreamError;

use crate::sequencer::Sequencer;

/// Genre and language choices for the filter pickers.
#[derive(Debug, Clone, Default)]
pub struct Facets {
    pub genres: Vec<String>,
    pub languages: Vec<String>,
    pub ready: bool,
    pub error: Option<StreamError>,
}

pub struct FacetLoader<G> {
    gateway: Arc<G>,
    seq: Sequencer,
    state: Mutex<Facets>,
}

impl<G: CatalogGateway> FacetLoader<G> {
    pub fn new(gateway: Arc<G>, events: SharedEventLog) -> Self {
        Self {
            gateway,
            seq: Sequencer::new(StreamId::Facets, events),
            state: Mutex::new(Facets::default()),
        }
    }

    pub async fn load(&self) {
        let token = self.seq.begin();
        let (genres, languages) =
            futures::join!(self.gateway.get_genres(), self.gateway.get_languages());
        if !self.seq.check(token) {
            return;
        }

        let next = match (genres, languages) {
            (Ok(genres), Ok(languages)) => {
                self.seq.committed(token, genres.len() + languages.len());
                Facets {
                    genres,
                    languages,
                    ready: true,
                    error: None,
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                self.seq.failed(token, &e.to_string());
                Facets {
                    ready: true,
                    error: Some(e.to_stream_error()),
                    ..Default::default()
                }
            }
        };
        *self.state.lock() = next;
    }

    pub fn snapshot(&self) -> Facets {
        self.state.lock().clone()
    }
}
