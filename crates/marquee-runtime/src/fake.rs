//! In-memory `CatalogGateway` with scripted latency and failures.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};

use marquee_api::{AuthContext, AuthUser, CatalogGateway, GatewayError, HealthStatus, NewReview};
use marquee_core::models::{
    CastMember, Episode, KindFilter, ListQuery, MediaKind, MediaRef, MediaSummary, Review, Season,
    Slide, TitleDetail, TitlePage, TrendingPeriod, UserProfile, UserSettings,
};

pub const PASSWORD: &str = "secret";

#[derive(Default)]
pub struct FakeGateway {
    /// Total titles reported by `list_titles`.
    pub list_total: Mutex<u64>,
    /// Latency for successive `list_titles` calls; empty means immediate.
    pub list_delays: Mutex<VecDeque<Duration>>,
    /// Status codes for successive `list_titles` calls to fail with.
    pub list_failures: Mutex<VecDeque<u16>>,
    pub search_delays: Mutex<HashMap<String, Duration>>,
    pub trending_count: Mutex<usize>,
    pub detail_delay: Mutex<Option<Duration>>,
    pub detail_failure: Mutex<Option<u16>>,
    pub profile_failure: Mutex<Option<u16>>,
    pub reviews: Mutex<Vec<Review>>,
    pub calls: Mutex<Vec<String>>,
    auth: RwLock<Option<AuthContext>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        let gw = Self::default();
        *gw.list_total.lock() = 100;
        *gw.trending_count.lock() = 5;
        gw
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }

    fn require_auth(&self) -> Result<AuthContext, GatewayError> {
        self.auth.read().clone().ok_or(GatewayError::Unauthorized {
            status: 401,
            message: "authentication required".into(),
        })
    }
}

pub fn summary(kind: MediaKind, id: u64, title: &str) -> MediaSummary {
    MediaSummary {
        id,
        external_id: Some(id + 1000),
        kind,
        title: title.to_string(),
        poster_ref: None,
        rating: Some(7.5),
        original_language: Some("en".into()),
        release_date: Some("2024-05-01".into()),
        genres: vec!["Drama".into()],
    }
}

async fn pause(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

impl CatalogGateway for FakeGateway {
    async fn list_titles(&self, query: &ListQuery) -> Result<TitlePage, GatewayError> {
        let label = format!(
            "list:{}:{}:p{}:{}",
            query.kind.as_str(),
            query.sort.as_str(),
            query.page,
            query.genre.as_deref().unwrap_or("any")
        );
        self.record(label.clone());
        let delay = self.list_delays.lock().pop_front();
        let failure = self.list_failures.lock().pop_front();
        pause(delay).await;
        if let Some(status) = failure {
            return Err(GatewayError::from_status(status, "scripted failure".into()));
        }

        let total = *self.list_total.lock();
        let start = u64::from(query.page - 1) * u64::from(query.page_size);
        let end = (start + u64::from(query.page_size)).min(total);
        let items = (start..end)
            .map(|i| summary(query.kind, i + 1, &format!("{label} #{i}")))
            .collect();
        Ok(TitlePage {
            items,
            page: query.page,
            total,
        })
    }

    async fn search_titles(
        &self,
        query: &str,
        _page: u32,
    ) -> Result<Vec<MediaSummary>, GatewayError> {
        self.record(format!("search:{query}"));
        let delay = self.search_delays.lock().get(query).copied();
        pause(delay).await;
        Ok((1..=10)
            .map(|i| summary(MediaKind::Movie, i, &format!("{query} {i}")))
            .collect())
    }

    async fn get_trending(
        &self,
        period: TrendingPeriod,
        limit: u32,
    ) -> Result<Vec<Slide>, GatewayError> {
        self.record(format!("trending:{}", period.as_str()));
        let count = (*self.trending_count.lock()).min(limit as usize);
        Ok((1..=count as u64)
            .map(|i| Slide {
                media: summary(MediaKind::Movie, i, &format!("{} {i}", period.as_str())),
                backdrop_ref: None,
                overview: None,
            })
            .collect())
    }

    async fn get_new_releases(
        &self,
        limit: u32,
        kind: KindFilter,
    ) -> Result<Vec<MediaSummary>, GatewayError> {
        self.record(format!("new_releases:{}", kind.as_str()));
        let all = (1..=20u64).map(|i| {
            let k = if i % 2 == 0 { MediaKind::Tv } else { MediaKind::Movie };
            summary(k, i, &format!("release {i}"))
        });
        Ok(all
            .filter(|m| kind.matches(m.kind))
            .take(limit as usize)
            .collect())
    }

    async fn get_title_detail(&self, media: MediaRef) -> Result<TitleDetail, GatewayError> {
        self.record(format!("detail:{media}"));
        let delay = *self.detail_delay.lock();
        let failure = *self.detail_failure.lock();
        pause(delay).await;
        if let Some(status) = failure {
            return Err(GatewayError::from_status(status, "scripted failure".into()));
        }
        Ok(TitleDetail {
            summary: summary(media.kind, media.id, &format!("title {media}")),
            overview: Some("overview".into()),
            runtime_min: Some(120),
            user_rating: None,
            review_count: 0,
            season_count: (media.kind == MediaKind::Tv).then_some(2),
            top_cast: vec![CastMember {
                name: "Lead".into(),
                character: Some("Hero".into()),
                order: 0,
            }],
        })
    }

    async fn get_seasons(&self, show_id: u64) -> Result<Vec<Season>, GatewayError> {
        self.record(format!("seasons:{show_id}"));
        Ok((1..=2)
            .map(|n| Season {
                id: show_id * 10 + u64::from(n),
                number: n,
                title: Some(format!("Season {n}")),
                air_date: None,
                episodes: vec![Episode {
                    id: 1,
                    number: 1,
                    title: Some("Pilot".into()),
                    air_date: None,
                    runtime_min: Some(45),
                }],
            })
            .collect())
    }

    async fn get_genres(&self) -> Result<Vec<String>, GatewayError> {
        self.record("genres".into());
        Ok(vec!["Comedy".into(), "Drama".into()])
    }

    async fn get_languages(&self) -> Result<Vec<String>, GatewayError> {
        self.record("languages".into());
        Ok(vec!["en".into(), "fr".into()])
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthUser, GatewayError> {
        self.record(format!("login:{email}"));
        if password != PASSWORD {
            return Err(GatewayError::from_status(401, "invalid credentials".into()));
        }
        Ok(AuthUser {
            user_id: Some(7),
            email: email.to_string(),
            display_name: "Ada".into(),
            is_admin: false,
        })
    }

    async fn signup(
        &self,
        email: &str,
        _password: &str,
        name: &str,
    ) -> Result<AuthUser, GatewayError> {
        self.record(format!("signup:{email}"));
        Ok(AuthUser {
            user_id: Some(8),
            email: email.to_string(),
            display_name: name.to_string(),
            is_admin: false,
        })
    }

    async fn get_health(&self) -> Result<HealthStatus, GatewayError> {
        Ok(HealthStatus {
            healthy: true,
            status: "healthy".into(),
        })
    }

    async fn get_reviews(&self, media: MediaRef) -> Result<Vec<Review>, GatewayError> {
        self.record(format!("reviews:{media}"));
        Ok(self.reviews.lock().clone())
    }

    async fn create_review(
        &self,
        user_id: i64,
        media: MediaRef,
        review: &NewReview,
    ) -> Result<u64, GatewayError> {
        self.record(format!("create_review:{media}"));
        let mut reviews = self.reviews.lock();
        let id = reviews.len() as u64 + 1;
        reviews.push(Review {
            id,
            user_id,
            author: None,
            rating: review.rating,
            content: review.content.clone(),
            created_at: None,
        });
        Ok(id)
    }

    async fn add_to_watchlist(&self, _user_id: i64, media: MediaRef) -> Result<(), GatewayError> {
        self.record(format!("watchlist_add:{media}"));
        Ok(())
    }

    async fn remove_from_watchlist(
        &self,
        _user_id: i64,
        media: MediaRef,
    ) -> Result<bool, GatewayError> {
        self.record(format!("watchlist_remove:{media}"));
        Ok(true)
    }

    async fn get_user_profile(&self) -> Result<UserProfile, GatewayError> {
        if let Some(status) = *self.profile_failure.lock() {
            return Err(GatewayError::from_status(status, "scripted failure".into()));
        }
        let ctx = self.require_auth()?;
        Ok(UserProfile {
            user_id: ctx.user_id.unwrap_or_default(),
            email: ctx.email,
            display_name: "Ada".into(),
            is_admin: false,
            review_count: 3,
            watchlist_count: 2,
            created_at: None,
        })
    }

    async fn get_user_settings(&self) -> Result<UserSettings, GatewayError> {
        self.require_auth()?;
        Ok(UserSettings::default())
    }

    async fn update_user_settings(
        &self,
        settings: &UserSettings,
    ) -> Result<UserSettings, GatewayError> {
        self.require_auth()?;
        Ok(settings.clone())
    }

    async fn delete_user_account(&self, password: &str) -> Result<(), GatewayError> {
        self.require_auth()?;
        if password != PASSWORD {
            return Err(GatewayError::from_status(401, "password incorrect".into()));
        }
        self.record("delete_account".into());
        Ok(())
    }

    fn set_auth_context(&self, auth: Option<AuthContext>) {
        *self.auth.write() = auth;
    }

    fn auth_context(&self) -> Option<AuthContext> {
        self.auth.read().clone()
    }
}
