use clap::{Parser, Subcommand, ValueEnum};

use marquee_core::models::{KindFilter, MediaKind, SortKey, TrendingPeriod};

#[derive(Parser, Debug)]
#[command(name = "marquee", version, about = "Browse the movie and TV catalog")]
pub struct Cli {
    /// API root, overriding the configured `api.base_url`.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Print the controller event log after the command.
    #[arg(long, global = true)]
    pub events: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// One page of movies or shows
    Browse {
        #[arg(value_enum)]
        kind: KindArg,
        #[arg(long, value_enum, default_value = "popularity")]
        sort: SortArg,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Search-as-you-type preview for a query
    Search { query: String },
    /// Trending carousel
    Trending {
        #[arg(long, value_enum, default_value = "day")]
        period: PeriodArg,
    },
    /// Newest releases, paged locally
    NewReleases {
        #[arg(long, value_enum, default_value = "all")]
        kind: FilterArg,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Open a detail path such as /movie/42 or /tv/1399
    Open { path: String },
    /// Rate a title (0-10), optionally with a comment
    Review {
        path: String,
        #[arg(long)]
        rating: f32,
        #[arg(long)]
        content: Option<String>,
    },
    /// Add a title to the watchlist, or remove it with --remove
    Watch {
        path: String,
        #[arg(long)]
        remove: bool,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Keep the session across runs
        #[arg(long)]
        remember: bool,
    },
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        remember: bool,
    },
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Check the backend is reachable
    Health,
    /// List genres and languages available for filtering
    Facets,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum KindArg {
    Movies,
    Tv,
}

impl From<KindArg> for MediaKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Movies => MediaKind::Movie,
            KindArg::Tv => MediaKind::Tv,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SortArg {
    Popularity,
    Rating,
    ReleaseDate,
    Title,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Popularity => SortKey::Popularity,
            SortArg::Rating => SortKey::Rating,
            SortArg::ReleaseDate => SortKey::ReleaseDate,
            SortArg::Title => SortKey::Title,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum PeriodArg {
    Day,
    Week,
}

impl From<PeriodArg> for TrendingPeriod {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Day => TrendingPeriod::Day,
            PeriodArg::Week => TrendingPeriod::Week,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum FilterArg {
    All,
    Movie,
    Tv,
}

impl From<FilterArg> for KindFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => KindFilter::All,
            FilterArg::Movie => KindFilter::Movies,
            FilterArg::Tv => KindFilter::Tv,
        }
    }
}
