use serde::{Deserialize, Deserializer};

use marquee_core::models::{
    CastMember, Episode, MediaKind, MediaSummary, Review, Season, Slide, TitleDetail, TitlePage,
    UserProfile,
};

use crate::traits::AuthUser;

// ── Lenient field decoders ───────────────────────────────────────

/// Genres arrive either as a JSON list or as one comma-separated string.
fn genres_field<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Joined(String),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Raw::List(list)) => list,
        Some(Raw::Joined(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(String::from)
            .collect(),
        None => Vec::new(),
    })
}

/// `year_or_date` is a bare year for movies and a date string for shows.
fn date_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Year(i64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) if !s.trim().is_empty() => Some(s),
        Some(Raw::Year(y)) => Some(y.to_string()),
        _ => None,
    })
}

// ── Titles ───────────────────────────────────────────────────────

/// A title row as returned by list, search, trending and detail endpoints.
///
/// The backend names the same columns differently per endpoint, hence the
/// aliases.
#[derive(Debug, Deserialize)]
pub struct TitleDto {
    #[serde(alias = "movie_id", alias = "show_id", alias = "item_id", alias = "target_id")]
    pub id: u64,
    pub tmdb_id: Option<u64>,
    #[serde(alias = "target_type")]
    pub media_type: Option<String>,
    #[serde(alias = "name")]
    pub title: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(alias = "tmdb_vote_avg", alias = "score")]
    pub vote_average: Option<f32>,
    pub original_language: Option<String>,
    #[serde(
        default,
        alias = "first_air_date",
        alias = "year_or_date",
        deserialize_with = "date_field"
    )]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "genres_field")]
    pub genres: Vec<String>,
    pub overview: Option<String>,
    pub runtime_min: Option<u32>,
    pub user_vote_avg: Option<f32>,
    pub review_count: Option<u32>,
    pub season_count: Option<u32>,
    #[serde(default)]
    pub top_cast: Vec<CastDto>,
}

impl TitleDto {
    /// Convert to a summary. `fallback` is used when the row has no type column.
    pub fn into_summary(self, fallback: MediaKind) -> MediaSummary {
        let kind = self
            .media_type
            .as_deref()
            .and_then(MediaKind::parse)
            .unwrap_or(fallback);
        MediaSummary {
            id: self.id,
            external_id: self.tmdb_id,
            kind,
            title: self.title,
            poster_ref: self.poster_path.filter(|p| !p.is_empty()),
            rating: self.vote_average,
            original_language: self.original_language,
            release_date: self.release_date,
            genres: self.genres,
        }
    }

    pub fn into_slide(mut self, fallback: MediaKind) -> Slide {
        let backdrop_ref = self.backdrop_path.take().filter(|p| !p.is_empty());
        let overview = self.overview.take().filter(|o| !o.trim().is_empty());
        Slide {
            media: self.into_summary(fallback),
            backdrop_ref,
            overview,
        }
    }

    pub fn into_detail(mut self, kind: MediaKind) -> TitleDetail {
        let overview = self.overview.take().filter(|o| !o.trim().is_empty());
        let runtime_min = self.runtime_min;
        let user_rating = self.user_vote_avg;
        let review_count = self.review_count.unwrap_or(0);
        let season_count = self.season_count;
        let mut top_cast: Vec<CastMember> = std::mem::take(&mut self.top_cast)
            .into_iter()
            .map(CastDto::into_cast_member)
            .collect();
        top_cast.sort_by_key(|c| c.order);
        top_cast.truncate(10);
        // The detail endpoint knows its kind from the URL, not the row.
        self.media_type = None;
        TitleDetail {
            summary: self.into_summary(kind),
            overview,
            runtime_min,
            user_rating,
            review_count,
            season_count,
            top_cast,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CastDto {
    pub name: String,
    pub character: Option<String>,
    #[serde(default)]
    pub cast_order: u32,
}

impl CastDto {
    fn into_cast_member(self) -> CastMember {
        CastMember {
            name: self.name,
            character: self.character.filter(|c| !c.is_empty()),
            order: self.cast_order,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListResponse {
    pub total: u64,
    pub page: u32,
    pub results: Vec<TitleDto>,
}

impl ListResponse {
    pub fn into_page(self, kind: MediaKind) -> TitlePage {
        TitlePage {
            items: self
                .results
                .into_iter()
                .map(|t| t.into_summary(kind))
                .collect(),
            page: self.page,
            total: self.total,
        }
    }
}

/// Search returns either a bare list or a `{results: [...]}` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Bare(Vec<TitleDto>),
    Envelope { results: Vec<TitleDto> },
}

impl SearchResponse {
    pub fn into_items(self) -> Vec<MediaSummary> {
        let rows = match self {
            Self::Bare(rows) => rows,
            Self::Envelope { results } => results,
        };
        rows.into_iter()
            .map(|t| t.into_summary(MediaKind::Movie))
            .collect()
    }
}

// ── Seasons ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SeasonDto {
    pub season_id: u64,
    pub season_number: u32,
    pub title: Option<String>,
    pub air_date: Option<String>,
    #[serde(default)]
    pub episodes: Vec<EpisodeDto>,
}

#[derive(Debug, Deserialize)]
pub struct EpisodeDto {
    pub episode_id: u64,
    pub episode_number: u32,
    pub title: Option<String>,
    pub air_date: Option<String>,
    pub runtime_min: Option<u32>,
}

impl SeasonDto {
    pub fn into_season(self) -> Season {
        let mut episodes: Vec<Episode> = self
            .episodes
            .into_iter()
            .map(|e| Episode {
                id: e.episode_id,
                number: e.episode_number,
                title: e.title,
                air_date: e.air_date,
                runtime_min: e.runtime_min,
            })
            .collect();
        episodes.sort_by_key(|e| e.number);
        Season {
            id: self.season_id,
            number: self.season_number,
            title: self.title,
            air_date: self.air_date,
            episodes,
        }
    }
}

// ── Reviews ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReviewDto {
    #[serde(alias = "review_id")]
    pub id: u64,
    pub user_id: i64,
    #[serde(alias = "user_name", alias = "display_name")]
    pub author: Option<String>,
    pub rating: f32,
    pub content: Option<String>,
    pub created_at: Option<String>,
}

impl From<ReviewDto> for Review {
    fn from(dto: ReviewDto) -> Self {
        Review {
            id: dto.id,
            user_id: dto.user_id,
            author: dto.author,
            rating: dto.rating,
            content: dto.content.filter(|c| !c.trim().is_empty()),
            created_at: dto.created_at,
        }
    }
}

/// `{ok, review_id}` / `{ok, deleted}` acknowledgements.
#[derive(Debug, Deserialize)]
pub struct AckResponse {
    #[serde(default)]
    pub ok: bool,
    pub review_id: Option<u64>,
    pub deleted: Option<u64>,
    pub error: Option<String>,
}

// ── Auth & user ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub ok: bool,
    pub user: Option<UserDto>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserDto {
    #[serde(alias = "user_id")]
    pub id: Option<i64>,
    pub email: String,
    #[serde(alias = "display_name")]
    pub name: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl From<UserDto> for AuthUser {
    fn from(dto: UserDto) -> Self {
        AuthUser {
            user_id: dto.id,
            display_name: dto.name.unwrap_or_default(),
            email: dto.email,
            is_admin: dto.is_admin,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProfileDto {
    #[serde(alias = "user_id")]
    pub id: i64,
    pub email: String,
    #[serde(alias = "display_name")]
    pub name: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub watchlist_count: u32,
    pub created_at: Option<String>,
}

impl From<ProfileDto> for UserProfile {
    fn from(dto: ProfileDto) -> Self {
        UserProfile {
            user_id: dto.id,
            email: dto.email,
            display_name: dto.name.unwrap_or_default(),
            is_admin: dto.is_admin,
            review_count: dto.review_count,
            watchlist_count: dto.watchlist_count,
            created_at: dto.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HealthDto {
    pub status: String,
}

/// Flask error bodies: `{"error": "..."}`.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
