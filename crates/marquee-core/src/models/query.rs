use serde::{Deserialize, Serialize};

use super::media::{MediaKind, MediaSummary};

/// Sort order for catalog lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Popularity,
    Rating,
    ReleaseDate,
    Title,
}

impl SortKey {
    pub const ALL: &[SortKey] = &[
        Self::Popularity,
        Self::Rating,
        Self::ReleaseDate,
        Self::Title,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Popularity => "popularity",
            Self::Rating => "rating",
            Self::ReleaseDate => "release_date",
            Self::Title => "title",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Popularity => write!(f, "Popular"),
            Self::Rating => write!(f, "Top rated"),
            Self::ReleaseDate => write!(f, "Newest"),
            Self::Title => write!(f, "A-Z"),
        }
    }
}

/// One page request against a catalog list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub kind: MediaKind,
    pub sort: SortKey,
    pub page: u32,
    pub page_size: u32,
    pub genre: Option<String>,
    pub language: Option<String>,
}

impl ListQuery {
    pub fn new(kind: MediaKind, page_size: u32) -> Self {
        Self {
            kind,
            sort: SortKey::default(),
            page: 1,
            page_size: page_size.max(1),
            genre: None,
            language: None,
        }
    }

    /// Same filters and sort, different page (clamped to 1).
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    /// Structural equality over the user-selectable fields, ignoring paging.
    pub fn same_filters(&self, other: &ListQuery) -> bool {
        self.kind == other.kind
            && self.sort == other.sort
            && self.genre == other.genre
            && self.language == other.language
    }

    /// Apply one filter change in place. Blank genre/language means "any".
    pub fn set(&mut self, field: FilterField) {
        match field {
            FilterField::Sort(sort) => self.sort = sort,
            FilterField::Genre(genre) => self.genre = normalize_filter(genre),
            FilterField::Language(lang) => self.language = normalize_filter(lang),
        }
    }

    /// Overlay explicit overrides onto this query.
    pub fn overridden(&self, overrides: &QueryOverrides) -> Self {
        let mut q = self.clone();
        if let Some(sort) = overrides.sort {
            q.sort = sort;
        }
        if let Some(genre) = &overrides.genre {
            q.genre = normalize_filter(genre.clone());
        }
        if let Some(lang) = &overrides.language {
            q.language = normalize_filter(lang.clone());
        }
        if let Some(size) = overrides.page_size {
            q.page_size = size.max(1);
        }
        q
    }
}

fn normalize_filter(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A single staged filter edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterField {
    Sort(SortKey),
    Genre(Option<String>),
    Language(Option<String>),
}

/// Per-call overrides for a list load. `Some(None)` clears a filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOverrides {
    pub sort: Option<SortKey>,
    pub genre: Option<Option<String>>,
    pub language: Option<Option<String>>,
    pub page_size: Option<u32>,
}

/// How a stream's last fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamErrorKind {
    /// Network failure, timeout, unreachable host.
    Connectivity,
    /// 401/403 from the catalog.
    Unauthorized,
    /// Any other non-success response or unreadable body.
    Server,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamError {
    pub kind: StreamErrorKind,
    pub message: String,
}

impl StreamError {
    /// Short inline text for the UI.
    pub fn user_message(&self) -> &'static str {
        match self.kind {
            StreamErrorKind::Connectivity => "Could not reach the catalog. Check your connection.",
            StreamErrorKind::Unauthorized => "You are not allowed to view this. Try signing in again.",
            StreamErrorKind::Server => "The catalog returned an error.",
        }
    }
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// A server response for one list page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TitlePage {
    pub items: Vec<MediaSummary>,
    pub page: u32,
    pub total: u64,
}

/// The visible state of a paginated list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListResult {
    pub items: Vec<MediaSummary>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub ready: bool,
    pub error: Option<StreamError>,
}

impl ListResult {
    /// Initial state before the first fetch resolves.
    pub fn pending(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            page_size: page_size.max(1),
            total: 0,
            ready: false,
            error: None,
        }
    }

    pub fn can_go_prev(&self) -> bool {
        can_go_prev(self.page)
    }

    pub fn can_go_next(&self) -> bool {
        can_go_next(self.page, self.page_size, self.total)
    }

    /// Loaded, no error, nothing to show.
    pub fn is_empty(&self) -> bool {
        self.ready && self.error.is_none() && self.items.is_empty()
    }

    pub fn total_pages(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size)) as u32
    }
}

pub fn can_go_prev(page: u32) -> bool {
    page > 1
}

pub fn can_go_next(page: u32, page_size: u32, total: u64) -> bool {
    total > 0 && u64::from(page) * u64::from(page_size) < total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigability_empty_total() {
        assert!(!can_go_next(1, 24, 0));
        assert!(!can_go_prev(1));
    }

    #[test]
    fn test_navigability_last_partial_page() {
        // 5 * 24 = 120 >= 100
        assert!(!can_go_next(5, 24, 100));
        assert!(can_go_prev(5));
        assert!(can_go_next(4, 24, 100));
    }

    #[test]
    fn test_with_page_clamps_to_one() {
        let q = ListQuery::new(MediaKind::Movie, 24);
        assert_eq!(q.with_page(0).page, 1);
        assert_eq!(q.with_page(3).page, 3);
    }

    #[test]
    fn test_same_filters_ignores_page() {
        let a = ListQuery::new(MediaKind::Tv, 24);
        let b = a.with_page(4);
        assert!(a.same_filters(&b));

        let mut c = a.clone();
        c.set(FilterField::Sort(SortKey::Rating));
        assert!(!a.same_filters(&c));
    }

    #[test]
    fn test_blank_genre_means_any() {
        let mut q = ListQuery::new(MediaKind::Movie, 24);
        q.set(FilterField::Genre(Some("  ".into())));
        assert_eq!(q.genre, None);
        q.set(FilterField::Genre(Some(" Drama ".into())));
        assert_eq!(q.genre.as_deref(), Some("Drama"));
    }

    #[test]
    fn test_overrides_clear_filter() {
        let mut q = ListQuery::new(MediaKind::Movie, 24);
        q.set(FilterField::Language(Some("en".into())));
        let o = QueryOverrides {
            language: Some(None),
            sort: Some(SortKey::Title),
            ..Default::default()
        };
        let r = q.overridden(&o);
        assert_eq!(r.language, None);
        assert_eq!(r.sort, SortKey::Title);
    }

    #[test]
    fn test_total_pages() {
        let mut r = ListResult::pending(24);
        assert_eq!(r.total_pages(), 0);
        r.total = 100;
        assert_eq!(r.total_pages(), 5);
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!(SortKey::parse("release_date"), Some(SortKey::ReleaseDate));
        assert_eq!(SortKey::parse("bogus"), None);
    }
}
