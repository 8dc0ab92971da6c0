//! Home page rails: trending (feeding the carousel) and new releases.

use std::sync::Arc;

use parking_lot::Mutex;

use marquee_api::CatalogGateway;
use marquee_core::config::AppConfig;
use marquee_core::event_log::{SharedEventLog, StreamId};
use marquee_core::models::{KindFilter, MediaSummary, Slide, StreamError, TrendingPeriod};

use crate::carousel::CarouselScheduler;
use crate::sequencer::Sequencer;
use crate::transition::{
    SlideDirection, Surface, Swap, TransitionDirector, TransitionMode, VisualState,
};

#[derive(Debug, Clone)]
pub struct TrendingSnapshot {
    pub period: TrendingPeriod,
    pub slides: Vec<Slide>,
    pub ready: bool,
    pub error: Option<StreamError>,
    pub visual: VisualState,
}

struct TrendingState {
    period: TrendingPeriod,
    slides: Vec<Slide>,
    ready: bool,
    error: Option<StreamError>,
}

pub struct TrendingRail<G> {
    gateway: Arc<G>,
    seq: Sequencer,
    director: TransitionDirector,
    carousel: Arc<CarouselScheduler>,
    limit: u32,
    state: Mutex<TrendingState>,
}

impl<G: CatalogGateway> TrendingRail<G> {
    pub fn new(
        gateway: Arc<G>,
        carousel: Arc<CarouselScheduler>,
        config: &AppConfig,
        events: SharedEventLog,
    ) -> Self {
        Self {
            gateway,
            seq: Sequencer::new(StreamId::TrendingRail, events.clone()),
            director: TransitionDirector::new(
                Surface::TrendingRail,
                config.transitions.clone(),
                events,
            ),
            carousel,
            limit: config.browse.trending_limit,
            state: Mutex::new(TrendingState {
                period: TrendingPeriod::default(),
                slides: Vec::new(),
                ready: false,
                error: None,
            }),
        }
    }

    /// Load the trending window. The slides also become the carousel's.
    pub async fn load(&self, period: TrendingPeriod) {
        let token = self.seq.begin();
        let had_content = {
            let mut state = self.state.lock();
            state.period = period;
            state.ready = false;
            !state.slides.is_empty()
        };

        let outcome = self.gateway.get_trending(period, self.limit).await;
        if !self.seq.check(token) {
            return;
        }

        let (slides, error) = match outcome {
            Ok(slides) => {
                self.seq.committed(token, slides.len());
                (slides, None)
            }
            Err(e) => {
                self.seq.failed(token, &e.to_string());
                (Vec::new(), Some(e.to_stream_error()))
            }
        };

        self.director
            .play(
                Swap::Fade,
                had_content,
                || self.seq.check(token),
                || {
                    self.carousel.set_slides(slides.clone());
                    let mut state = self.state.lock();
                    state.slides = slides;
                    state.error = error;
                    state.ready = true;
                },
            )
            .await;
    }

    pub fn snapshot(&self) -> TrendingSnapshot {
        let state = self.state.lock();
        TrendingSnapshot {
            period: state.period,
            slides: state.slides.clone(),
            ready: state.ready,
            error: state.error.clone(),
            visual: self.director.visual(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewReleasesSnapshot {
    pub filter: KindFilter,
    /// Items on the visible page only.
    pub items: Vec<MediaSummary>,
    pub page: usize,
    pub total_pages: usize,
    pub can_go_prev: bool,
    pub can_go_next: bool,
    pub ready: bool,
    pub error: Option<StreamError>,
    pub visual: VisualState,
}

struct ReleasesState {
    filter: KindFilter,
    items: Vec<MediaSummary>,
    page: usize,
    ready: bool,
    error: Option<StreamError>,
}

impl ReleasesState {
    fn total_pages(&self, page_size: usize) -> usize {
        self.items.len().div_ceil(page_size)
    }
}

/// Newest titles, fetched once per filter and paged locally.
pub struct NewReleasesGrid<G> {
    gateway: Arc<G>,
    seq: Sequencer,
    director: TransitionDirector,
    limit: u32,
    page_size: usize,
    state: Mutex<ReleasesState>,
}

impl<G: CatalogGateway> NewReleasesGrid<G> {
    pub fn new(gateway: Arc<G>, config: &AppConfig, events: SharedEventLog) -> Self {
        Self {
            gateway,
            seq: Sequencer::new(StreamId::NewReleases, events.clone()),
            director: TransitionDirector::new(
                Surface::NewReleases,
                config.transitions.clone(),
                events,
            ),
            limit: config.browse.new_releases_limit,
            page_size: config.browse.new_releases_page_size.max(1),
            state: Mutex::new(ReleasesState {
                filter: KindFilter::All,
                items: Vec::new(),
                page: 1,
                ready: false,
                error: None,
            }),
        }
    }

    pub async fn load(&self, filter: KindFilter) {
        let token = self.seq.begin();
        let had_content = {
            let mut state = self.state.lock();
            state.filter = filter;
            state.ready = false;
            !state.items.is_empty()
        };

        let outcome = self.gateway.get_new_releases(self.limit, filter).await;
        if !self.seq.check(token) {
            return;
        }

        let (items, error) = match outcome {
            Ok(items) => {
                let items: Vec<_> = items.into_iter().filter(|m| filter.matches(m.kind)).collect();
                self.seq.committed(token, items.len());
                (items, None)
            }
            Err(e) => {
                self.seq.failed(token, &e.to_string());
                (Vec::new(), Some(e.to_stream_error()))
            }
        };

        self.director
            .play(
                Swap::Fade,
                had_content,
                || self.seq.check(token),
                || {
                    let mut state = self.state.lock();
                    state.items = items;
                    state.error = error;
                    state.page = 1;
                    state.ready = true;
                },
            )
            .await;
    }

    /// Returns whether the page changed.
    pub fn next_page(&self) -> bool {
        let moved = {
            let mut state = self.state.lock();
            if state.page < state.total_pages(self.page_size) {
                state.page += 1;
                true
            } else {
                false
            }
        };
        if moved {
            self.director
                .enter(TransitionMode::Slide(SlideDirection::Left));
        }
        moved
    }

    pub fn prev_page(&self) -> bool {
        let moved = {
            let mut state = self.state.lock();
            if state.page > 1 {
                state.page -= 1;
                true
            } else {
                false
            }
        };
        if moved {
            self.director
                .enter(TransitionMode::Slide(SlideDirection::Right));
        }
        moved
    }

    pub fn snapshot(&self) -> NewReleasesSnapshot {
        let state = self.state.lock();
        let total_pages = state.total_pages(self.page_size);
        let start = (state.page - 1) * self.page_size;
        let items = state
            .items
            .iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect();
        NewReleasesSnapshot {
            filter: state.filter,
            items,
            page: state.page,
            total_pages,
            can_go_prev: state.page > 1,
            can_go_next: state.page < total_pages,
            ready: state.ready,
            error: state.error.clone(),
            visual: self.director.visual(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use marquee_core::event_log::shared_event_log;
    use marquee_core::models::MediaKind;

    use crate::fake::FakeGateway;

    fn carousel() -> Arc<CarouselScheduler> {
        let director = TransitionDirector::new(
            Surface::Carousel,
            AppConfig::default().transitions,
            shared_event_log(),
        );
        Arc::new(CarouselScheduler::new(Duration::from_secs(6), director))
    }

    #[tokio::test(start_paused = true)]
    async fn test_trending_feeds_carousel() {
        let gw = Arc::new(FakeGateway::new());
        let carousel = carousel();
        let rail = TrendingRail::new(
            Arc::clone(&gw),
            Arc::clone(&carousel),
            &AppConfig::default(),
            shared_event_log(),
        );

        rail.load(TrendingPeriod::Day).await;
        assert_eq!(carousel.snapshot().slides.len(), 5);

        carousel.go_to(4);
        *gw.trending_count.lock() = 2;
        rail.load(TrendingPeriod::Week).await;

        let snap = rail.snapshot();
        assert_eq!(snap.period, TrendingPeriod::Week);
        assert_eq!(snap.slides.len(), 2);
        assert!(carousel.active_index() <= 1);
        assert_eq!(gw.calls(), vec!["trending:day", "trending:week"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trending_period_change_fades() {
        let gw = Arc::new(FakeGateway::new());
        let rail = TrendingRail::new(
            Arc::clone(&gw),
            carousel(),
            &AppConfig::default(),
            shared_event_log(),
        );
        rail.load(TrendingPeriod::Day).await;

        let started = tokio::time::Instant::now();
        rail.load(TrendingPeriod::Week).await;
        assert!(started.elapsed() >= Duration::from_millis(180));
        assert_eq!(rail.snapshot().visual, VisualState::EnteringFade);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_releases_paging() {
        let gw = Arc::new(FakeGateway::new());
        let grid = NewReleasesGrid::new(Arc::clone(&gw), &AppConfig::default(), shared_event_log());

        grid.load(KindFilter::All).await;
        let snap = grid.snapshot();
        assert_eq!(snap.items.len(), 6);
        assert_eq!(snap.total_pages, 4);
        assert!(!snap.can_go_prev);

        assert!(grid.next_page());
        assert!(grid.next_page());
        assert!(grid.next_page());
        assert!(!grid.next_page());
        let last = grid.snapshot();
        assert_eq!(last.items.len(), 2);
        assert_eq!(last.visual, VisualState::SlideLeft);
        assert_eq!(gw.count("new_releases:"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_filter_change_resets_page() {
        let gw = Arc::new(FakeGateway::new());
        let grid = NewReleasesGrid::new(Arc::clone(&gw), &AppConfig::default(), shared_event_log());
        grid.load(KindFilter::All).await;
        grid.next_page();

        grid.load(KindFilter::Tv).await;
        let snap = grid.snapshot();
        assert_eq!(snap.page, 1);
        assert!(snap.items.iter().all(|m| m.kind == MediaKind::Tv));
        assert_eq!(snap.total_pages, 2);
    }
}
