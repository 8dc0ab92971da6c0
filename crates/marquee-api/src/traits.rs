//! The remote catalog as seen by the browsing controller.
//!
//! `HttpGateway` is the production implementation; tests substitute an
//! in-memory one. Implementations are stateless apart from the auth
//! context, and make no ordering or retry decisions of their own.

use std::future::Future;

use marquee_core::models::{
    KindFilter, ListQuery, MediaRef, MediaSummary, Review, Season, Slide, TitleDetail, TitlePage,
    TrendingPeriod, UserProfile, UserSettings,
};

use crate::error::GatewayError;

/// Identity attached to authenticated calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Option<i64>,
    pub email: String,
}

/// A user as returned by login and signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Option<i64>,
    pub email: String,
    pub display_name: String,
    pub is_admin: bool,
}

/// A review to be posted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub rating: f32,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub healthy: bool,
    pub status: String,
}

/// Every remote operation the browsing client needs.
pub trait CatalogGateway: Send + Sync {
    /// One page of movies or shows under the query's sort and filters.
    fn list_titles(
        &self,
        query: &ListQuery,
    ) -> impl Future<Output = Result<TitlePage, GatewayError>> + Send;

    /// Title search across movies and shows.
    fn search_titles(
        &self,
        query: &str,
        page: u32,
    ) -> impl Future<Output = Result<Vec<MediaSummary>, GatewayError>> + Send;

    fn get_trending(
        &self,
        period: TrendingPeriod,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Slide>, GatewayError>> + Send;

    /// Most recent releases, newest first.
    fn get_new_releases(
        &self,
        limit: u32,
        kind: KindFilter,
    ) -> impl Future<Output = Result<Vec<MediaSummary>, GatewayError>> + Send;

    fn get_title_detail(
        &self,
        media: MediaRef,
    ) -> impl Future<Output = Result<TitleDetail, GatewayError>> + Send;

    /// Seasons with their episodes, ordered by number.
    fn get_seasons(
        &self,
        show_id: u64,
    ) -> impl Future<Output = Result<Vec<Season>, GatewayError>> + Send;

    fn get_genres(&self) -> impl Future<Output = Result<Vec<String>, GatewayError>> + Send;

    fn get_languages(&self) -> impl Future<Output = Result<Vec<String>, GatewayError>> + Send;

    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthUser, GatewayError>> + Send;

    fn signup(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> impl Future<Output = Result<AuthUser, GatewayError>> + Send;

    fn get_health(&self) -> impl Future<Output = Result<HealthStatus, GatewayError>> + Send;

    fn get_reviews(
        &self,
        media: MediaRef,
    ) -> impl Future<Output = Result<Vec<Review>, GatewayError>> + Send;

    /// Post a review, returning its id.
    fn create_review(
        &self,
        user_id: i64,
        media: MediaRef,
        review: &NewReview,
    ) -> impl Future<Output = Result<u64, GatewayError>> + Send;

    fn add_to_watchlist(
        &self,
        user_id: i64,
        media: MediaRef,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Returns whether an entry was actually removed.
    fn remove_from_watchlist(
        &self,
        user_id: i64,
        media: MediaRef,
    ) -> impl Future<Output = Result<bool, GatewayError>> + Send;

    fn get_user_profile(&self) -> impl Future<Output = Result<UserProfile, GatewayError>> + Send;

    fn get_user_settings(&self)
        -> impl Future<Output = Result<UserSettings, GatewayError>> + Send;

    fn update_user_settings(
        &self,
        settings: &UserSettings,
    ) -> impl Future<Output = Result<UserSettings, GatewayError>> + Send;

    fn delete_user_account(
        &self,
        password: &str,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Replace the identity sent with authenticated calls. `None` clears it.
    fn set_auth_context(&self, auth: Option<AuthContext>);

    fn auth_context(&self) -> Option<AuthContext>;
}
