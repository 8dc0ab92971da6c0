use std::sync::Arc;

use parking_lot::Mutex;

use marquee_api::{CatalogGateway, NewReview};
use marquee_core::event_log::{SharedEventLog, StreamId};
use marquee_core::models::{
    MediaKind, MediaRef, Review, Season, StreamError, TitleDetail, MAX_REVIEW_RATING,
};
use marquee_core::route;

use crate::error::RuntimeError;
use crate::sequencer::Sequencer;
use crate::session::SessionStore;

#[derive(Debug, Clone, Default)]
pub struct DetailSnapshot {
    pub media: Option<MediaRef>,
    pub detail: Option<TitleDetail>,
    pub reviews: Vec<Review>,
    pub seasons: Vec<Season>,
    pub on_watchlist: bool,
    pub ready: bool,
    pub error: Option<StreamError>,
}

/// Title detail page: metadata, reviews, seasons and the user's actions on them.
pub struct DetailController<G> {
    gateway: Arc<G>,
    session: Arc<SessionStore<G>>,
    seq: Sequencer,
    state: Mutex<DetailSnapshot>,
}

impl<G: CatalogGateway> DetailController<G> {
    pub fn new(gateway: Arc<G>, session: Arc<SessionStore<G>>, events: SharedEventLog) -> Self {
        Self {
            gateway,
            session,
            seq: Sequencer::new(StreamId::Detail, events),
            state: Mutex::new(DetailSnapshot {
                ready: true,
                ..Default::default()
            }),
        }
    }

    /// Show a title. Detail, reviews and (for shows) seasons load together.
    pub async fn open(&self, media: MediaRef) {
        let token = self.seq.begin();
        *self.state.lock() = DetailSnapshot {
            media: Some(media),
            ..Default::default()
        };

        let seasons = async {
            match media.kind {
                MediaKind::Tv => self.gateway.get_seasons(media.id).await,
                MediaKind::Movie => Ok(Vec::new()),
            }
        };
        let (detail, reviews, seasons) = futures::join!(
            self.gateway.get_title_detail(media),
            self.gateway.get_reviews(media),
            seasons,
        );
        if !self.seq.check(token) {
            return;
        }

        let mut state = self.state.lock();
        state.ready = true;
        match detail {
            Ok(detail) => {
                self.seq.committed(token, 1);
                state.detail = Some(detail);
            }
            Err(e) => {
                self.seq.failed(token, &e.to_string());
                state.error = Some(e.to_stream_error());
            }
        }
        // Secondary sections degrade to empty.
        state.reviews = reviews.unwrap_or_else(|e| {
            tracing::warn!(%media, "Failed to load reviews: {e}");
            Vec::new()
        });
        state.seasons = seasons.unwrap_or_else(|e| {
            tracing::warn!(%media, "Failed to load seasons: {e}");
            Vec::new()
        });
    }

    /// Open a `/movie/{id}` or `/tv/{id}` path. Anything else is rejected
    /// without a request.
    pub async fn open_path(&self, path: &str) -> Result<MediaRef, RuntimeError> {
        let media = route::parse_detail_path(path)?;
        self.open(media).await;
        Ok(media)
    }

    /// Leave the page; a load still in flight is dropped.
    pub fn close(&self) {
        self.seq.invalidate();
        *self.state.lock() = DetailSnapshot {
            ready: true,
            ..Default::default()
        };
    }

    /// Post a review for the open title and refresh its review list.
    pub async fn submit_review(
        &self,
        rating: f32,
        content: Option<&str>,
    ) -> Result<u64, RuntimeError> {
        if !rating.is_finite() || !(0.0..=MAX_REVIEW_RATING).contains(&rating) {
            return Err(RuntimeError::Validation(format!(
                "rating must be between 0 and {MAX_REVIEW_RATING}"
            )));
        }
        let media = self.open_media()?;
        let user_id = self.user_id()?;

        let review = NewReview {
            rating,
            content: content
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        };
        let review_id = self.gateway.create_review(user_id, media, &review).await?;
        tracing::info!(%media, review_id, "review posted");

        match self.gateway.get_reviews(media).await {
            Ok(reviews) => {
                let mut state = self.state.lock();
                if state.media == Some(media) {
                    state.reviews = reviews;
                }
            }
            Err(e) => tracing::warn!(%media, "Failed to refresh reviews: {e}"),
        }
        Ok(review_id)
    }

    pub async fn add_to_watchlist(&self) -> Result<(), RuntimeError> {
        let media = self.open_media()?;
        let user_id = self.user_id()?;
        self.gateway.add_to_watchlist(user_id, media).await?;
        self.set_on_watchlist(media, true);
        Ok(())
    }

    /// Returns whether an entry was removed.
    pub async fn remove_from_watchlist(&self) -> Result<bool, RuntimeError> {
        let media = self.open_media()?;
        let user_id = self.user_id()?;
        let removed = self.gateway.remove_from_watchlist(user_id, media).await?;
        self.set_on_watchlist(media, false);
        Ok(removed)
    }

    pub fn snapshot(&self) -> DetailSnapshot {
        self.state.lock().clone()
    }

    fn open_media(&self) -> Result<MediaRef, RuntimeError> {
        self.state
            .lock()
            .media
            .ok_or_else(|| RuntimeError::Validation("no title is open".into()))
    }

    fn user_id(&self) -> Result<i64, RuntimeError> {
        self.session
            .require()?
            .user_id
            .ok_or(RuntimeError::NotAuthenticated)
    }

    fn set_on_watchlist(&self, media: MediaRef, on: bool) {
        let mut state = self.state.lock();
        if state.media == Some(media) {
            state.on_watchlist = on;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use marquee_core::event_log::shared_event_log;
    use marquee_core::models::StreamErrorKind;
    use marquee_core::storage::MemoryStore;

    use crate::fake::{FakeGateway, PASSWORD};

    fn controller(gw: &Arc<FakeGateway>) -> (Arc<SessionStore<FakeGateway>>, DetailController<FakeGateway>) {
        let events = shared_event_log();
        let session = Arc::new(SessionStore::new(
            Arc::clone(gw),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
            events.clone(),
        ));
        let detail = DetailController::new(Arc::clone(gw), Arc::clone(&session), events);
        (session, detail)
    }

    #[tokio::test]
    async fn test_open_show_loads_seasons() {
        let gw = Arc::new(FakeGateway::new());
        let (_, detail) = controller(&gw);

        detail.open(MediaRef::new(MediaKind::Tv, 3)).await;
        let snap = detail.snapshot();
        assert!(snap.ready);
        assert_eq!(snap.seasons.len(), 2);
        assert_eq!(snap.detail.unwrap().season_count, Some(2));
        assert_eq!(gw.count("seasons:"), 1);
    }

    #[tokio::test]
    async fn test_malformed_path_issues_no_request() {
        let gw = Arc::new(FakeGateway::new());
        let (_, detail) = controller(&gw);

        for path in ["/movie/abc", "/movie/0", "/movies", "/tv/"] {
            let err = detail.open_path(path).await.unwrap_err();
            assert!(matches!(err, RuntimeError::Validation(_)), "{path}");
        }
        assert!(gw.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_open_wins() {
        let gw = Arc::new(FakeGateway::new());
        *gw.detail_delay.lock() = Some(Duration::from_millis(100));
        let (_, detail) = controller(&gw);

        let first = MediaRef::new(MediaKind::Movie, 1);
        let second = MediaRef::new(MediaKind::Movie, 2);
        tokio::join!(detail.open(first), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            detail.open(second).await;
        });

        let snap = detail.snapshot();
        assert_eq!(snap.media, Some(second));
        assert_eq!(snap.detail.unwrap().summary.id, 2);
    }

    #[tokio::test]
    async fn test_failure_ends_ready() {
        let gw = Arc::new(FakeGateway::new());
        *gw.detail_failure.lock() = Some(404);
        let (_, detail) = controller(&gw);

        detail.open(MediaRef::new(MediaKind::Movie, 9)).await;
        let snap = detail.snapshot();
        assert!(snap.ready);
        assert!(snap.detail.is_none());
        assert_eq!(snap.error.unwrap().kind, StreamErrorKind::Server);
    }

    #[tokio::test]
    async fn test_review_rating_bounds() {
        let gw = Arc::new(FakeGateway::new());
        let (session, detail) = controller(&gw);
        session.login("ada@example.com", PASSWORD, false).await.unwrap();
        detail.open(MediaRef::new(MediaKind::Movie, 1)).await;

        for rating in [-0.5, 10.5, f32::NAN] {
            let err = detail.submit_review(rating, None).await.unwrap_err();
            assert!(matches!(err, RuntimeError::Validation(_)));
        }
        assert_eq!(gw.count("create_review"), 0);

        detail.submit_review(10.0, Some("  great  ")).await.unwrap();
        let reviews = detail.snapshot().reviews;
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].content.as_deref(), Some("great"));
    }

    #[tokio::test]
    async fn test_actions_require_session() {
        let gw = Arc::new(FakeGateway::new());
        let (_, detail) = controller(&gw);
        detail.open(MediaRef::new(MediaKind::Movie, 1)).await;

        let err = detail.add_to_watchlist().await.unwrap_err();
        assert!(matches!(err, RuntimeError::NotAuthenticated));
        let err = detail.submit_review(5.0, None).await.unwrap_err();
        assert!(matches!(err, RuntimeError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_watchlist_flag() {
        let gw = Arc::new(FakeGateway::new());
        let (session, detail) = controller(&gw);
        session.login("ada@example.com", PASSWORD, false).await.unwrap();
        detail.open(MediaRef::new(MediaKind::Tv, 5)).await;

        detail.add_to_watchlist().await.unwrap();
        assert!(detail.snapshot().on_watchlist);
        assert!(detail.remove_from_watchlist().await.unwrap());
        assert!(!detail.snapshot().on_watchlist);
    }
}
