use std::sync::Arc;

use parking_lot::Mutex;

use marquee_api::CatalogGateway;
use marquee_core::config::AppConfig;
use marquee_core::event_log::{SharedEventLog, StreamId};
use marquee_core::models::{FilterField, ListQuery, ListResult, MediaKind, QueryOverrides};

use crate::sequencer::Sequencer;
use crate::staging::FilterStaging;
use crate::transition::{SlideDirection, Surface, Swap, TransitionDirector, VisualState};

struct ListState {
    staging: FilterStaging,
    /// The query behind the most recently issued request.
    active: ListQuery,
    result: ListResult,
    loaded_once: bool,
}

/// Read-only view of one list stream.
#[derive(Debug, Clone)]
pub struct ListSnapshot {
    pub result: ListResult,
    pub committed: ListQuery,
    pub pending: ListQuery,
    pub dirty: bool,
    pub visual: VisualState,
}

/// Paginated movies or TV grid with staged filters.
pub struct ListController<G> {
    kind: MediaKind,
    gateway: Arc<G>,
    seq: Sequencer,
    director: TransitionDirector,
    state: Mutex<ListState>,
}

impl<G: CatalogGateway> ListController<G> {
    pub fn new(kind: MediaKind, gateway: Arc<G>, config: &AppConfig, events: SharedEventLog) -> Self {
        let (stream, surface) = match kind {
            MediaKind::Movie => (StreamId::MoviesList, Surface::MoviesGrid),
            MediaKind::Tv => (StreamId::TvList, Surface::TvGrid),
        };
        let query = ListQuery::new(kind, config.browse.page_size);
        Self {
            kind,
            gateway,
            seq: Sequencer::new(stream, events.clone()),
            director: TransitionDirector::new(surface, config.transitions.clone(), events),
            state: Mutex::new(ListState {
                staging: FilterStaging::new(query.clone()),
                result: ListResult::pending(query.page_size),
                active: query,
                loaded_once: false,
            }),
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Load `page` of the committed query, with optional one-off overrides.
    pub async fn load(&self, page: u32, overrides: Option<QueryOverrides>) {
        let query = {
            let state = self.state.lock();
            let committed = state.staging.committed();
            match &overrides {
                Some(o) => committed.overridden(o).with_page(page),
                None => committed.with_page(page),
            }
        };
        self.fetch(query, Swap::Fade).await;
    }

    /// Commit the staged filters and reload from page 1.
    pub async fn apply_filters(&self) {
        let query = self.state.lock().staging.apply();
        tracing::info!(stream = %self.seq.stream(), sort = %query.sort, "filters applied");
        self.fetch(query, Swap::Fade).await;
    }

    pub fn set_pending(&self, field: FilterField) {
        self.state.lock().staging.set_pending(field);
    }

    pub fn discard_pending(&self) {
        self.state.lock().staging.discard_pending();
    }

    pub fn dirty(&self) -> bool {
        self.state.lock().staging.dirty()
    }

    /// Load the next page if there is one. Returns whether a request was made.
    /// Refused while a request is still in flight.
    pub async fn go_next(&self) -> bool {
        let query = {
            let state = self.state.lock();
            if !state.result.ready || !state.result.can_go_next() {
                return false;
            }
            state.active.with_page(state.active.page + 1)
        };
        self.fetch(query, Swap::Slide(SlideDirection::Left)).await;
        true
    }

    pub async fn go_prev(&self) -> bool {
        let query = {
            let state = self.state.lock();
            if !state.result.ready || !state.result.can_go_prev() {
                return false;
            }
            state.active.with_page(state.active.page - 1)
        };
        self.fetch(query, Swap::Slide(SlideDirection::Right)).await;
        true
    }

    pub fn has_loaded(&self) -> bool {
        self.state.lock().loaded_once
    }

    pub fn snapshot(&self) -> ListSnapshot {
        let state = self.state.lock();
        ListSnapshot {
            result: state.result.clone(),
            committed: state.staging.committed().clone(),
            pending: state.staging.pending().clone(),
            dirty: state.staging.dirty(),
            visual: self.director.visual(),
        }
    }

    async fn fetch(&self, query: ListQuery, swap: Swap) {
        let token = self.seq.begin();
        let had_content = {
            let mut state = self.state.lock();
            state.active = query.clone();
            state.loaded_once = true;
            state.result.ready = false;
            !state.result.items.is_empty()
        };

        let outcome = self.gateway.list_titles(&query).await;
        if !self.seq.check(token) {
            return;
        }

        let next = match outcome {
            Ok(page) => {
                self.seq.committed(token, page.items.len());
                ListResult {
                    items: page.items,
                    page: query.page,
                    page_size: query.page_size,
                    total: page.total,
                    ready: true,
                    error: None,
                }
            }
            Err(e) => {
                self.seq.failed(token, &e.to_string());
                ListResult {
                    items: Vec::new(),
                    page: query.page,
                    page_size: query.page_size,
                    total: 0,
                    ready: true,
                    error: Some(e.to_stream_error()),
                }
            }
        };

        // Old content stays up while loading, then fades out before the swap.
        self.director
            .play(
                swap,
                had_content,
                || self.seq.check(token),
                || self.state.lock().result = next,
            )
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use marquee_core::event_log::shared_event_log;
    use marquee_core::models::{SortKey, StreamErrorKind};

    use crate::fake::FakeGateway;

    fn controller(gw: &Arc<FakeGateway>) -> ListController<FakeGateway> {
        ListController::new(
            MediaKind::Movie,
            Arc::clone(gw),
            &AppConfig::default(),
            shared_event_log(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_is_discarded() {
        let gw = Arc::new(FakeGateway::new());
        gw.list_delays
            .lock()
            .extend([Duration::from_millis(500), Duration::from_millis(10)]);
        let list = controller(&gw);

        list.set_pending(FilterField::Sort(SortKey::Rating));
        tokio::join!(list.load(1, None), async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            list.apply_filters().await;
        });

        let snap = list.snapshot();
        assert!(snap.result.ready);
        assert!(snap.result.items[0].title.contains(":rating:"));
        assert_eq!(gw.count("list:"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_after_fade_out_is_discarded() {
        let gw = Arc::new(FakeGateway::new());
        let list = controller(&gw);
        list.load(1, None).await;

        // First reload resolves at once and starts fading; the second lands mid-fade.
        gw.list_delays
            .lock()
            .extend([Duration::ZERO, Duration::from_millis(50)]);
        list.set_pending(FilterField::Genre(Some("Comedy".into())));
        tokio::join!(list.load(2, None), async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            list.apply_filters().await;
        });

        let snap = list.snapshot();
        assert_eq!(snap.result.page, 1);
        assert!(snap.result.items[0].title.contains(":Comedy"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_ends_ready_with_error() {
        let gw = Arc::new(FakeGateway::new());
        gw.list_failures.lock().push_back(500);
        let list = controller(&gw);

        list.load(1, None).await;
        let snap = list.snapshot();
        assert!(snap.result.ready);
        assert!(snap.result.items.is_empty());
        assert_eq!(snap.result.error.unwrap().kind, StreamErrorKind::Server);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unauthorized_is_distinguishable() {
        let gw = Arc::new(FakeGateway::new());
        gw.list_failures.lock().push_back(403);
        let list = controller(&gw);

        list.load(1, None).await;
        let error = list.snapshot().result.error.unwrap();
        assert_eq!(error.kind, StreamErrorKind::Unauthorized);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pagination_bounds() {
        let gw = Arc::new(FakeGateway::new());
        let list = controller(&gw);

        list.load(5, None).await;
        let snap = list.snapshot();
        assert_eq!(snap.result.items.len(), 4);
        assert!(snap.result.can_go_prev());
        assert!(!snap.result.can_go_next());
        assert!(!list.go_next().await);
        assert_eq!(gw.count("list:"), 1);

        assert!(list.go_prev().await);
        assert_eq!(list.snapshot().result.page, 4);
        assert_eq!(list.snapshot().visual, VisualState::SlideRight);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_total_has_no_navigation() {
        let gw = Arc::new(FakeGateway::new());
        *gw.list_total.lock() = 0;
        let list = controller(&gw);

        list.load(1, None).await;
        let snap = list.snapshot();
        assert!(snap.result.is_empty());
        assert!(!list.go_prev().await);
        assert!(!list.go_next().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_clamped_to_one() {
        let gw = Arc::new(FakeGateway::new());
        let list = controller(&gw);
        list.load(0, None).await;
        assert_eq!(list.snapshot().result.page, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dirty_does_not_gate_loading() {
        let gw = Arc::new(FakeGateway::new());
        let list = controller(&gw);
        list.set_pending(FilterField::Sort(SortKey::Title));
        assert!(list.dirty());

        list.load(1, None).await;
        assert!(list.dirty());
        assert!(gw.calls()[0].contains(":popularity:"));

        list.apply_filters().await;
        assert!(!list.dirty());
        assert!(gw.calls()[1].contains(":title:"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overrides_apply_to_one_load() {
        let gw = Arc::new(FakeGateway::new());
        let list = controller(&gw);
        let overrides = QueryOverrides {
            genre: Some(Some("Drama".into())),
            ..Default::default()
        };
        list.load(1, Some(overrides)).await;
        assert!(gw.calls()[0].ends_with(":Drama"));
        assert_eq!(list.snapshot().committed.genre, None);

        // Paging stays on the overridden query.
        list.go_next().await;
        assert!(gw.calls()[1].ends_with(":Drama"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_paging_waits_for_filter_apply() {
        let gw = Arc::new(FakeGateway::new());
        let list = controller(&gw);
        list.load(3, None).await;

        gw.list_delays.lock().push_back(Duration::from_millis(100));
        list.set_pending(FilterField::Genre(Some("Comedy".into())));
        tokio::join!(list.apply_filters(), async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            assert!(!list.go_next().await);
            assert!(!list.go_prev().await);
        });

        assert_eq!(gw.calls().len(), 2);
        assert_eq!(list.snapshot().result.page, 1);
        assert!(gw.calls()[1].ends_with("p1:Comedy"));

        assert!(list.go_next().await);
        assert_eq!(list.snapshot().result.page, 2);
        assert!(gw.calls()[2].ends_with("p2:Comedy"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_fades_and_slides_settle_idle() {
        let gw = Arc::new(FakeGateway::new());
        let list = controller(&gw);
        list.load(1, None).await;

        tokio::join!(
            list.go_next(),
            async {
                tokio::time::sleep(Duration::from_millis(1)).await;
                list.load(3, None).await;
            },
            async {
                tokio::time::sleep(Duration::from_millis(2)).await;
                list.load(4, None).await;
            },
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                assert_eq!(list.snapshot().visual, VisualState::ExitingFade);
            },
        );

        tokio::time::sleep(Duration::from_secs(1)).await;
        let snap = list.snapshot();
        assert_eq!(snap.result.page, 4);
        assert_eq!(snap.visual, VisualState::Idle);
    }
}
