use serde::{Deserialize, Serialize};

/// Whether a title is a movie or a TV show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    #[serde(alias = "show")]
    Tv,
}

impl MediaKind {
    pub const ALL: &[MediaKind] = &[Self::Movie, Self::Tv];

    /// Path segment and query value used by the catalog API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }

    /// The backend's `target_type` spelling for reviews and watchlists.
    pub fn target_type(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "show",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" | "movies" => Some(Self::Movie),
            "tv" | "show" | "shows" => Some(Self::Tv),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Movie => write!(f, "Movie"),
            Self::Tv => write!(f, "TV"),
        }
    }
}

/// Identity of a title. Movies and shows have separate id spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub id: u64,
}

impl MediaRef {
    pub fn new(kind: MediaKind, id: u64) -> Self {
        Self { kind, id }
    }
}

impl std::fmt::Display for MediaRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind.as_str(), self.id)
    }
}

/// One card in a grid, rail or hint list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSummary {
    pub id: u64,
    pub external_id: Option<u64>,
    pub kind: MediaKind,
    pub title: String,
    pub poster_ref: Option<String>,
    pub rating: Option<f32>,
    pub original_language: Option<String>,
    pub release_date: Option<String>,
    pub genres: Vec<String>,
}

impl MediaSummary {
    pub fn media_ref(&self) -> MediaRef {
        MediaRef::new(self.kind, self.id)
    }

    /// Four-digit release year, if the release date starts with one.
    pub fn year(&self) -> Option<u32> {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok())
    }
}

/// A cast credit on a detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    pub character: Option<String>,
    pub order: u32,
}

/// Everything shown on a title's detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleDetail {
    pub summary: MediaSummary,
    pub overview: Option<String>,
    pub runtime_min: Option<u32>,
    /// Mean of site reviews, distinct from the external rating.
    pub user_rating: Option<f32>,
    pub review_count: u32,
    pub season_count: Option<u32>,
    pub top_cast: Vec<CastMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: u64,
    pub number: u32,
    pub title: Option<String>,
    pub air_date: Option<String>,
    pub runtime_min: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub id: u64,
    pub number: u32,
    pub title: Option<String>,
    pub air_date: Option<String>,
    pub episodes: Vec<Episode>,
}

/// A trending entry shown in the home carousel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub media: MediaSummary,
    pub backdrop_ref: Option<String>,
    pub overview: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    pub user_id: i64,
    pub author: Option<String>,
    pub rating: f32,
    pub content: Option<String>,
    pub created_at: Option<String>,
}

/// Highest rating a review may carry.
pub const MAX_REVIEW_RATING: f32 = 10.0;

/// Time window for the trending rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendingPeriod {
    #[default]
    Day,
    Week,
}

impl TrendingPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
        }
    }
}

/// Kind filter for the new-releases grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindFilter {
    #[default]
    All,
    Movies,
    Tv,
}

impl KindFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Movies => "movie",
            Self::Tv => "tv",
        }
    }

    pub fn matches(self, kind: MediaKind) -> bool {
        match self {
            Self::All => true,
            Self::Movies => kind == MediaKind::Movie,
            Self::Tv => kind == MediaKind::Tv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(kind: MediaKind, id: u64) -> MediaSummary {
        MediaSummary {
            id,
            external_id: None,
            kind,
            title: "Dune".into(),
            poster_ref: None,
            rating: None,
            original_language: None,
            release_date: Some("2021-10-22".into()),
            genres: vec![],
        }
    }

    #[test]
    fn test_show_alias_deserializes_as_tv() {
        let kind: MediaKind = serde_json::from_str("\"show\"").unwrap();
        assert_eq!(kind, MediaKind::Tv);
        assert_eq!(serde_json::to_string(&MediaKind::Tv).unwrap(), "\"tv\"");
    }

    #[test]
    fn test_same_id_different_kind_is_distinct() {
        let movie = summary(MediaKind::Movie, 7);
        let show = summary(MediaKind::Tv, 7);
        assert_ne!(movie.media_ref(), show.media_ref());
    }

    #[test]
    fn test_year_from_release_date() {
        assert_eq!(summary(MediaKind::Movie, 1).year(), Some(2021));
        let mut undated = summary(MediaKind::Movie, 1);
        undated.release_date = None;
        assert_eq!(undated.year(), None);
    }

    #[test]
    fn test_kind_filter_matches() {
        assert!(KindFilter::All.matches(MediaKind::Tv));
        assert!(KindFilter::Movies.matches(MediaKind::Movie));
        assert!(!KindFilter::Movies.matches(MediaKind::Tv));
    }
}
