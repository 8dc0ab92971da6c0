mod cli;
mod logging;
mod render;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use marquee_api::{GatewayError, HttpGateway};
use marquee_core::config::AppConfig;
use marquee_core::error::CoreError;
use marquee_core::models::{FilterField, QueryOverrides, SortKey};
use marquee_core::storage::{MemoryStore, Storage};
use marquee_runtime::{Browser, RuntimeError};

use crate::cli::{Cli, Command};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("backend unhealthy: {0}")]
    Unhealthy(String),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("config error, using defaults: {e}");
            AppConfig::default()
        }
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    let _log_guard = logging::init(&config.logging);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("{e:?}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<(), CliError> {
    let gateway = Arc::new(HttpGateway::new(
        &config.api.base_url,
        Duration::from_secs(config.api.timeout_secs),
    )?);
    let db_path = AppConfig::ensure_db_path()?;
    let long_lived = Arc::new(Storage::open(&db_path)?);
    let browser = Browser::new(config, gateway, Arc::new(MemoryStore::new()), long_lived);

    browser.session().restore();
    dispatch(&browser, cli.command).await?;

    if cli.events {
        render::events(&browser.events());
    }
    Ok(())
}

async fn dispatch(browser: &Browser<HttpGateway>, command: Command) -> Result<(), CliError> {
    match command {
        Command::Browse {
            kind,
            sort,
            genre,
            language,
            page,
        } => {
            let list = browser.list(kind.into());
            let sort: SortKey = sort.into();
            if page <= 1 {
                list.set_pending(FilterField::Sort(sort));
                list.set_pending(FilterField::Genre(genre));
                list.set_pending(FilterField::Language(language));
                list.apply_filters().await;
            } else {
                let overrides = QueryOverrides {
                    sort: Some(sort),
                    genre: Some(genre),
                    language: Some(language),
                    page_size: None,
                };
                list.load(page, Some(overrides)).await;
            }
            render::list(&list.snapshot());
        }
        Command::Search { query } => {
            browser.hints().set_query(&query).await;
            render::hints(&browser.hints().snapshot());
        }
        Command::Trending { period } => {
            browser.trending().load(period.into()).await;
            let trending = browser.trending().snapshot();
            match &trending.error {
                Some(error) => eprintln!("{}", error.user_message()),
                None => render::carousel(&browser.carousel().snapshot()),
            }
        }
        Command::NewReleases { kind, page } => {
            let grid = browser.new_releases();
            grid.load(kind.into()).await;
            for _ in 1..page {
                if !grid.next_page() {
                    break;
                }
            }
            render::new_releases(&grid.snapshot());
        }
        Command::Open { path } => {
            let media = browser.detail().open_path(&path).await?;
            browser.router().navigate_path(&path);
            tracing::debug!(%media, "opened");
            render::detail(&browser.detail().snapshot());
        }
        Command::Review {
            path,
            rating,
            content,
        } => {
            browser.detail().open_path(&path).await?;
            let id = browser
                .detail()
                .submit_review(rating, content.as_deref())
                .await?;
            println!("Review #{id} posted.");
        }
        Command::Watch { path, remove } => {
            let media = browser.detail().open_path(&path).await?;
            if remove {
                match browser.detail().remove_from_watchlist().await? {
                    true => println!("Removed {media} from your watchlist."),
                    false => println!("{media} was not on your watchlist."),
                }
            } else {
                browser.detail().add_to_watchlist().await?;
                println!("Added {media} to your watchlist.");
            }
        }
        Command::Login {
            email,
            password,
            remember,
        } => {
            let identity = browser.session().login(&email, &password, remember).await?;
            println!("Signed in as {}.", identity.label());
        }
        Command::Signup {
            email,
            password,
            name,
            remember,
        } => {
            let identity = browser
                .session()
                .signup(&email, &password, &name, remember)
                .await?;
            println!("Welcome, {}.", identity.label());
        }
        Command::Logout => {
            browser.session().logout()?;
            println!("Signed out.");
        }
        Command::Whoami => match browser.session().current() {
            Some(identity) => {
                println!("{} <{}>", identity.label(), identity.email);
                match browser.session().profile().await {
                    Ok(profile) => println!(
                        "{} reviews, {} on watchlist",
                        profile.review_count, profile.watchlist_count
                    ),
                    Err(e) => tracing::warn!("Failed to load profile: {e}"),
                }
            }
            None => println!("Not signed in."),
        },
        Command::Health => {
            let health = browser.health().await?;
            println!("{}", health.status);
            if !health.healthy {
                return Err(CliError::Unhealthy(health.status));
            }
        }
        Command::Facets => {
            browser.load_facets().await;
            render::facets(&browser.snapshot().facets);
        }
    }
    Ok(())
}
