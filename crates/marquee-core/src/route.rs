//! Mapping between navigation locations and the app's (tab, view) state.
//!
//! `location_to_state` is total: anything unrecognised lands on the home
//! page. `state_to_location` inverts it for every state the app can reach.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::{MediaKind, MediaRef};

/// Top-level navigation tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tab {
    #[default]
    Home,
    Movies,
    Tv,
    Search,
    Watchlist,
    Admin,
}

/// What is shown inside the current tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum View {
    #[default]
    App,
    Login,
    Signup,
    Settings,
    Profile,
    Detail(MediaRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RouteState {
    pub tab: Tab,
    pub view: View,
}

impl RouteState {
    pub const HOME: RouteState = RouteState {
        tab: Tab::Home,
        view: View::App,
    };

    pub fn new(tab: Tab, view: View) -> Self {
        Self { tab, view }
    }

    /// The state a detail location resolves to.
    pub fn detail(media: MediaRef) -> Self {
        let tab = match media.kind {
            MediaKind::Movie => Tab::Movies,
            MediaKind::Tv => Tab::Tv,
        };
        Self::new(tab, View::Detail(media))
    }
}

/// Fixed routes. Detail routes are handled separately.
const STATIC_ROUTES: &[(&str, Tab, View)] = &[
    ("/", Tab::Home, View::App),
    ("/movies", Tab::Movies, View::App),
    ("/tv", Tab::Tv, View::App),
    ("/search", Tab::Search, View::App),
    ("/watchlist", Tab::Watchlist, View::App),
    ("/admin", Tab::Admin, View::App),
    ("/login", Tab::Home, View::Login),
    ("/signup", Tab::Home, View::Signup),
    ("/settings", Tab::Home, View::Settings),
    ("/profile", Tab::Home, View::Profile),
];

/// Every static path plus one sample of each detail form.
pub fn supported_paths() -> Vec<String> {
    let mut paths: Vec<String> = STATIC_ROUTES.iter().map(|(p, _, _)| p.to_string()).collect();
    paths.push("/movie/42".into());
    paths.push("/tv/1399".into());
    paths
}

/// Strip query, fragment and trailing slashes.
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Parse `/movie/{id}` or `/tv/{id}`.
pub fn parse_detail_path(path: &str) -> Result<MediaRef, CoreError> {
    let path = normalize_path(path);
    let mut parts = path.trim_start_matches('/').splitn(2, '/');
    let kind = match parts.next() {
        Some("movie") => MediaKind::Movie,
        Some("tv") => MediaKind::Tv,
        _ => return Err(CoreError::Validation(format!("not a detail path: {path}"))),
    };
    let raw_id = parts
        .next()
        .ok_or_else(|| CoreError::Validation(format!("missing id in {path}")))?;
    // Canonical decimal only: no sign, no leading zero.
    let canonical = !raw_id.is_empty()
        && raw_id.bytes().all(|b| b.is_ascii_digit())
        && !raw_id.starts_with('0');
    if !canonical {
        return Err(CoreError::Validation(format!(
            "malformed id {raw_id:?} in {path}"
        )));
    }
    let id: u64 = raw_id
        .parse()
        .map_err(|_| CoreError::Validation(format!("malformed id {raw_id:?} in {path}")))?;
    Ok(MediaRef::new(kind, id))
}

/// Resolve a location to app state, falling back to home.
pub fn location_to_state(path: &str) -> RouteState {
    let normalized = normalize_path(path);
    if let Some((_, tab, view)) = STATIC_ROUTES.iter().find(|(p, _, _)| *p == normalized) {
        return RouteState::new(*tab, *view);
    }
    match parse_detail_path(normalized) {
        Ok(media) => RouteState::detail(media),
        Err(_) => RouteState::HOME,
    }
}

/// Location for an app state.
pub fn state_to_location(state: RouteState) -> String {
    if let View::Detail(media) = state.view {
        return format!("/{}/{}", media.kind.as_str(), media.id);
    }
    STATIC_ROUTES
        .iter()
        .find(|(_, tab, view)| *tab == state.tab && *view == state.view)
        .map(|(p, _, _)| p.to_string())
        // Combinations with no route of their own keep their tab.
        .or_else(|| {
            STATIC_ROUTES
                .iter()
                .find(|(_, tab, view)| *tab == state.tab && *view == View::App)
                .map(|(p, _, _)| p.to_string())
        })
        .unwrap_or_else(|| "/".to_string())
}
