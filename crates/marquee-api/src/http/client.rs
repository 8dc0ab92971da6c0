use std::time::Duration;

use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use marquee_core::models::{
    KindFilter, ListQuery, MediaKind, MediaRef, MediaSummary, Review, Season, Slide, TitleDetail,
    TitlePage, TrendingPeriod, UserProfile, UserSettings,
};

use super::auth;
use super::types::{
    AckResponse, ErrorBody, HealthDto, ListResponse, ProfileDto, ReviewDto, SearchResponse,
    SeasonDto, TitleDto,
};
use crate::error::GatewayError;
use crate::traits::{AuthContext, AuthUser, CatalogGateway, HealthStatus, NewReview};

const USER_ID_HEADER: &str = "X-User-Id";
const USER_EMAIL_HEADER: &str = "X-User-Email";

/// JSON client for the catalog backend.
pub struct HttpGateway {
    base_url: String,
    http: Client,
    auth: RwLock<Option<AuthContext>>,
}

impl HttpGateway {
    /// `base_url` is the API root, e.g. `http://127.0.0.1:5000/api`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let parsed = url::Url::parse(base_url)?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            http,
            auth: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach the auth headers, if signed in.
    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        match self.auth.read().as_ref() {
            Some(ctx) => {
                let req = req.header(USER_EMAIL_HEADER, ctx.email.as_str());
                match ctx.user_id {
                    Some(id) => req.header(USER_ID_HEADER, id.to_string()),
                    None => req,
                }
            }
            None => req,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let resp = self
            .authed(self.http.get(self.url(path)))
            .query(query)
            .send()
            .await?;
        let resp = check_response(resp).await?;
        resp.json::<T>()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))
    }

    async fn send_ack(&self, req: RequestBuilder) -> Result<AckResponse, GatewayError> {
        let resp = self.authed(req).send().await?;
        let resp = check_response(resp).await?;
        let ack: AckResponse = resp
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;
        if !ack.ok {
            return Err(GatewayError::Api {
                status: 200,
                message: ack.error.unwrap_or_else(|| "request rejected".into()),
            });
        }
        Ok(ack)
    }

    fn target_body(user_id: i64, media: MediaRef) -> serde_json::Value {
        serde_json::json!({
            "user_id": user_id,
            "target_type": media.kind.target_type(),
            "target_id": media.id,
        })
    }
}

/// Turn a non-success response into a `GatewayError`.
pub(crate) async fn check_response(
    resp: reqwest::Response,
) -> Result<reqwest::Response, GatewayError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let url = resp.url().path().to_string();
    let body = resp.text().await.unwrap_or_default();
    let message = error_message(&body);
    tracing::warn!(status, %url, "API request failed: {message}");
    Err(GatewayError::from_status(status, message))
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string())
}

impl CatalogGateway for HttpGateway {
    async fn list_titles(&self, query: &ListQuery) -> Result<TitlePage, GatewayError> {
        let mut params = vec![
            ("type", query.kind.as_str().to_string()),
            ("sort", query.sort.as_str().to_string()),
            ("page", query.page.to_string()),
            ("limit", query.page_size.to_string()),
        ];
        if let Some(genre) = &query.genre {
            params.push(("genre", genre.clone()));
        }
        if let Some(lang) = &query.language {
            params.push(("language", lang.clone()));
        }

        let body: ListResponse = self.get_json("/titles", &params).await?;
        Ok(body.into_page(query.kind))
    }

    async fn search_titles(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Vec<MediaSummary>, GatewayError> {
        let q = query.trim();
        if q.is_empty() {
            return Ok(Vec::new());
        }
        let body: SearchResponse = self
            .get_json(
                "/search",
                &[("q", q.to_string()), ("page", page.max(1).to_string())],
            )
            .await?;
        Ok(body.into_items())
    }

    async fn get_trending(
        &self,
        period: TrendingPeriod,
        limit: u32,
    ) -> Result<Vec<Slide>, GatewayError> {
        let rows: Vec<TitleDto> = self
            .get_json(
                "/trending",
                &[
                    ("window", period.as_str().to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(rows
            .into_iter()
            .map(|t| t.into_slide(MediaKind::Movie))
            .collect())
    }

    async fn get_new_releases(
        &self,
        limit: u32,
        kind: KindFilter,
    ) -> Result<Vec<MediaSummary>, GatewayError> {
        let fallback = match kind {
            KindFilter::Tv => MediaKind::Tv,
            KindFilter::All | KindFilter::Movies => MediaKind::Movie,
        };
        let rows: Vec<TitleDto> = self
            .get_json(
                "/new-releases",
                &[
                    ("limit", limit.to_string()),
                    ("type", kind.as_str().to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(|t| t.into_summary(fallback)).collect())
    }

    async fn get_title_detail(&self, media: MediaRef) -> Result<TitleDetail, GatewayError> {
        let path = match media.kind {
            MediaKind::Movie => format!("/movie/{}", media.id),
            MediaKind::Tv => format!("/show/{}", media.id),
        };
        let dto: TitleDto = self.get_json(&path, &[]).await?;
        Ok(dto.into_detail(media.kind))
    }

    async fn get_seasons(&self, show_id: u64) -> Result<Vec<Season>, GatewayError> {
        let rows: Vec<SeasonDto> = self
            .get_json(&format!("/show/{show_id}/seasons"), &[])
            .await?;
        let mut seasons: Vec<Season> = rows.into_iter().map(SeasonDto::into_season).collect();
        seasons.sort_by_key(|s| s.number);
        Ok(seasons)
    }

    async fn get_genres(&self) -> Result<Vec<String>, GatewayError> {
        self.get_json("/genres", &[]).await
    }

    async fn get_languages(&self) -> Result<Vec<String>, GatewayError> {
        self.get_json("/languages", &[]).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthUser, GatewayError> {
        auth::login(&self.http, &self.base_url, email, password).await
    }

    async fn signup(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthUser, GatewayError> {
        auth::signup(&self.http, &self.base_url, email, password, name).await
    }

    async fn get_health(&self) -> Result<HealthStatus, GatewayError> {
        let body: HealthDto = self.get_json("/health", &[]).await?;
        Ok(HealthStatus {
            healthy: body.status.eq_ignore_ascii_case("healthy"),
            status: body.status,
        })
    }

    async fn get_reviews(&self, media: MediaRef) -> Result<Vec<Review>, GatewayError> {
        let rows: Vec<ReviewDto> = self
            .get_json(
                "/reviews",
                &[
                    ("target_type", media.kind.target_type().to_string()),
                    ("target_id", media.id.to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    async fn create_review(
        &self,
        user_id: i64,
        media: MediaRef,
        review: &NewReview,
    ) -> Result<u64, GatewayError> {
        let mut body = Self::target_body(user_id, media);
        body["rating"] = serde_json::json!(review.rating);
        body["content"] = serde_json::json!(review.content.as_deref().unwrap_or(""));

        let ack = self
            .send_ack(self.http.post(self.url("/reviews")).json(&body))
            .await?;
        ack.review_id
            .ok_or_else(|| GatewayError::Parse("review response without review_id".into()))
    }

    async fn add_to_watchlist(&self, user_id: i64, media: MediaRef) -> Result<(), GatewayError> {
        self.send_ack(
            self.http
                .post(self.url("/watchlist"))
                .json(&Self::target_body(user_id, media)),
        )
        .await?;
        Ok(())
    }

    async fn remove_from_watchlist(
        &self,
        user_id: i64,
        media: MediaRef,
    ) -> Result<bool, GatewayError> {
        let ack = self
            .send_ack(
                self.http
                    .delete(self.url("/watchlist"))
                    .json(&Self::target_body(user_id, media)),
            )
            .await?;
        Ok(ack.deleted.unwrap_or(0) > 0)
    }

    async fn get_user_profile(&self) -> Result<UserProfile, GatewayError> {
        let dto: ProfileDto = self.get_json("/user/profile", &[]).await?;
        Ok(dto.into())
    }

    async fn get_user_settings(&self) -> Result<UserSettings, GatewayError> {
        self.get_json("/user/settings", &[]).await
    }

    async fn update_user_settings(
        &self,
        settings: &UserSettings,
    ) -> Result<UserSettings, GatewayError> {
        let resp = self
            .authed(self.http.put(self.url("/user/settings")))
            .json(settings)
            .send()
            .await?;
        let resp = check_response(resp).await?;
        resp.json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))
    }

    async fn delete_user_account(&self, password: &str) -> Result<(), GatewayError> {
        self.send_ack(
            self.http
                .delete(self.url("/user/account"))
                .json(&serde_json::json!({ "password": password })),
        )
        .await?;
        Ok(())
    }

    fn set_auth_context(&self, auth: Option<AuthContext>) {
        *self.auth.write() = auth;
    }

    fn auth_context(&self) -> Option<AuthContext> {
        self.auth.read().clone()
    }
}
