//! The browsing controller.
//!
//! [`Browser`] owns one controller per data stream and screen surface,
//! plus the session store and the route synchronizer. Front ends call its
//! methods on user interaction and render from [`Browser::snapshot`].

pub mod carousel;
pub mod detail;
pub mod error;
pub mod facets;
pub mod hints;
pub mod list;
pub mod rails;
pub mod router;
pub mod sequencer;
pub mod session;
pub mod staging;
pub mod transition;

#[cfg(test)]
mod fake;

use std::sync::Arc;

use marquee_api::{CatalogGateway, HealthStatus};
use marquee_core::config::AppConfig;
use marquee_core::event_log::{shared_event_log, EventEntry, SharedEventLog};
use marquee_core::models::{KindFilter, MediaKind, SessionIdentity, TrendingPeriod};
use marquee_core::route::{RouteState, Tab, View};
use marquee_core::storage::KeyValueStore;

pub use carousel::{CarouselScheduler, CarouselSnapshot};
pub use detail::{DetailController, DetailSnapshot};
pub use error::RuntimeError;
pub use facets::{FacetLoader, Facets};
pub use hints::{HintController, HintSnapshot};
pub use list::{ListController, ListSnapshot};
pub use rails::{NewReleasesGrid, NewReleasesSnapshot, TrendingRail, TrendingSnapshot};
pub use router::{RouteSnapshot, RouteSynchronizer};
pub use session::SessionStore;
pub use transition::{Surface, TransitionDirector, VisualState};

/// Everything a front end needs to render one frame.
#[derive(Debug, Clone)]
pub struct BrowserSnapshot {
    pub route: RouteSnapshot,
    pub session: Option<SessionIdentity>,
    pub movies: ListSnapshot,
    pub tv: ListSnapshot,
    pub hints: HintSnapshot,
    pub trending: TrendingSnapshot,
    pub carousel: CarouselSnapshot,
    pub new_releases: NewReleasesSnapshot,
    pub detail: DetailSnapshot,
    pub facets: Facets,
}

pub struct Browser<G> {
    config: AppConfig,
    gateway: Arc<G>,
    events: SharedEventLog,
    session: Arc<SessionStore<G>>,
    router: RouteSynchronizer,
    movies: ListController<G>,
    tv: ListController<G>,
    hints: HintController<G>,
    carousel: Arc<CarouselScheduler>,
    trending: TrendingRail<G>,
    new_releases: NewReleasesGrid<G>,
    detail: DetailController<G>,
    facets: FacetLoader<G>,
}

impl<G: CatalogGateway> Browser<G> {
    /// `short_lived` holds the session for this run only; `long_lived`
    /// survives restarts and backs remember-me.
    pub fn new(
        config: AppConfig,
        gateway: Arc<G>,
        short_lived: Arc<dyn KeyValueStore>,
        long_lived: Arc<dyn KeyValueStore>,
    ) -> Self {
        let events = shared_event_log();
        let session = Arc::new(SessionStore::new(
            Arc::clone(&gateway),
            short_lived,
            long_lived,
            events.clone(),
        ));
        let carousel = Arc::new(CarouselScheduler::new(
            config.carousel.interval(),
            TransitionDirector::new(
                Surface::Carousel,
                config.transitions.clone(),
                events.clone(),
            ),
        ));

        Self {
            router: RouteSynchronizer::new("/", events.clone()),
            movies: ListController::new(
                MediaKind::Movie,
                Arc::clone(&gateway),
                &config,
                events.clone(),
            ),
            tv: ListController::new(MediaKind::Tv, Arc::clone(&gateway), &config, events.clone()),
            hints: HintController::new(Arc::clone(&gateway), &config.browse, events.clone()),
            trending: TrendingRail::new(
                Arc::clone(&gateway),
                Arc::clone(&carousel),
                &config,
                events.clone(),
            ),
            new_releases: NewReleasesGrid::new(Arc::clone(&gateway), &config, events.clone()),
            detail: DetailController::new(
                Arc::clone(&gateway),
                Arc::clone(&session),
                events.clone(),
            ),
            facets: FacetLoader::new(Arc::clone(&gateway), events.clone()),
            carousel,
            session,
            events,
            gateway,
            config,
        }
    }

    /// Restore the session, follow the initial location and fill the home page.
    pub async fn bootstrap(&self, initial_path: &str) {
        if let Some(identity) = self.session.restore() {
            tracing::info!(user = identity.label(), "welcome back");
        }
        futures::join!(
            self.on_location_changed(initial_path),
            self.facets.load(),
            self.trending.load(TrendingPeriod::default()),
            self.new_releases.load(KindFilter::All),
        );
    }

    pub async fn navigate_to(&self, state: RouteState) -> RouteSnapshot {
        let snapshot = self.router.navigate_to(state);
        self.enter_route(snapshot.state).await;
        snapshot
    }

    pub async fn navigate_path(&self, path: &str) -> RouteSnapshot {
        let snapshot = self.router.navigate_path(path);
        self.enter_route(snapshot.state).await;
        snapshot
    }

    /// Back/forward or an external link changed the location.
    pub async fn on_location_changed(&self, path: &str) -> RouteSnapshot {
        let snapshot = self.router.on_location_changed(path);
        self.enter_route(snapshot.state).await;
        snapshot
    }

    pub async fn back(&self) -> Option<RouteSnapshot> {
        let snapshot = self.router.back()?;
        self.enter_route(snapshot.state).await;
        Some(snapshot)
    }

    pub async fn forward(&self) -> Option<RouteSnapshot> {
        let snapshot = self.router.forward()?;
        self.enter_route(snapshot.state).await;
        Some(snapshot)
    }

    pub async fn load_facets(&self) {
        self.facets.load().await;
    }

    pub async fn health(&self) -> Result<HealthStatus, RuntimeError> {
        Ok(self.gateway.get_health().await?)
    }

    pub fn snapshot(&self) -> BrowserSnapshot {
        BrowserSnapshot {
            route: self.router.current(),
            session: self.session.current(),
            movies: self.movies.snapshot(),
            tv: self.tv.snapshot(),
            hints: self.hints.snapshot(),
            trending: self.trending.snapshot(),
            carousel: self.carousel.snapshot(),
            new_releases: self.new_releases.snapshot(),
            detail: self.detail.snapshot(),
            facets: self.facets.snapshot(),
        }
    }

    pub fn events(&self) -> Vec<EventEntry> {
        self.events.lock().snapshot()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionStore<G> {
        &self.session
    }

    pub fn router(&self) -> &RouteSynchronizer {
        &self.router
    }

    pub fn list(&self, kind: MediaKind) -> &ListController<G> {
        match kind {
            MediaKind::Movie => &self.movies,
            MediaKind::Tv => &self.tv,
        }
    }

    pub fn hints(&self) -> &HintController<G> {
        &self.hints
    }

    pub fn trending(&self) -> &TrendingRail<G> {
        &self.trending
    }

    pub fn carousel(&self) -> &CarouselScheduler {
        &self.carousel
    }

    pub fn new_releases(&self) -> &NewReleasesGrid<G> {
        &self.new_releases
    }

    pub fn detail(&self) -> &DetailController<G> {
        &self.detail
    }

    async fn enter_route(&self, state: RouteState) {
        self.carousel.set_view_active(state == RouteState::HOME);

        match state.view {
            View::Detail(media) => self.detail.open(media).await,
            View::App => {
                self.detail.close();
                match state.tab {
                    Tab::Movies if !self.movies.has_loaded() => self.movies.load(1, None).await,
                    Tab::Tv if !self.tv.has_loaded() => self.tv.load(1, None).await,
                    _ => {}
                }
            }
            View::Login | View::Signup | View::Settings | View::Profile => self.detail.close(),
        }
    }
}
