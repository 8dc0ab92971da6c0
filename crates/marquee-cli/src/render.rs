//! Plain-text output for snapshots.

use marquee_core::event_log::{ControllerEvent, EventEntry};
use marquee_core::models::{MediaSummary, StreamError, TitleDetail};
use marquee_runtime::{
    CarouselSnapshot, DetailSnapshot, Facets, HintSnapshot, ListSnapshot, NewReleasesSnapshot,
};

fn title_line(m: &MediaSummary) -> String {
    let year = m.year().map(|y| format!(" ({y})")).unwrap_or_default();
    let rating = m
        .rating
        .map(|r| format!("  {r:.1}"))
        .unwrap_or_default();
    format!("{:>7}  {}{year}{rating}", m.media_ref().to_string(), m.title)
}

fn print_error(error: &StreamError) {
    eprintln!("{}", error.user_message());
    tracing::debug!("{error}");
}

pub fn list(snap: &ListSnapshot) {
    let r = &snap.result;
    if let Some(error) = &r.error {
        print_error(error);
        return;
    }
    if r.items.is_empty() {
        println!("Nothing matches these filters.");
        return;
    }
    for m in &r.items {
        println!("{}", title_line(m));
    }
    println!(
        "\npage {}/{} ({} titles){}{}",
        r.page,
        r.total_pages(),
        r.total,
        if r.can_go_prev() { "  [prev]" } else { "" },
        if r.can_go_next() { "  [next]" } else { "" },
    );
}

pub fn hints(snap: &HintSnapshot) {
    if let Some(error) = &snap.error {
        print_error(error);
        return;
    }
    if snap.hints.is_empty() {
        println!("No suggestions for {:?}.", snap.query);
        return;
    }
    for m in &snap.hints {
        println!("{}", title_line(m));
    }
}

pub fn carousel(snap: &CarouselSnapshot) {
    for (i, slide) in snap.slides.iter().enumerate() {
        let marker = if i == snap.active_index { ">" } else { " " };
        println!("{marker} {}", title_line(&slide.media));
    }
}

pub fn new_releases(snap: &NewReleasesSnapshot) {
    if let Some(error) = &snap.error {
        print_error(error);
        return;
    }
    for m in &snap.items {
        println!("{}", title_line(m));
    }
    println!("\npage {}/{}", snap.page, snap.total_pages.max(1));
}

fn detail_body(d: &TitleDetail) {
    println!("{}", title_line(&d.summary));
    if !d.summary.genres.is_empty() {
        println!("  {}", d.summary.genres.join(", "));
    }
    if let Some(minutes) = d.runtime_min {
        println!("  {minutes} min");
    }
    if let Some(rating) = d.user_rating {
        println!("  site rating {rating:.1} from {} reviews", d.review_count);
    }
    if let Some(overview) = &d.overview {
        println!("\n{overview}");
    }
    if !d.top_cast.is_empty() {
        println!("\nCast:");
        for c in &d.top_cast {
            match &c.character {
                Some(role) => println!("  {} as {role}", c.name),
                None => println!("  {}", c.name),
            }
        }
    }
}

pub fn detail(snap: &DetailSnapshot) {
    if let Some(error) = &snap.error {
        print_error(error);
        return;
    }
    let Some(d) = &snap.detail else {
        println!("Title not available.");
        return;
    };
    detail_body(d);

    for season in &snap.seasons {
        println!(
            "\nSeason {}: {} episodes",
            season.number,
            season.episodes.len()
        );
    }
    if !snap.reviews.is_empty() {
        println!("\nReviews:");
        for r in &snap.reviews {
            let author = r.author.as_deref().unwrap_or("anonymous");
            println!("  {:.1}  {author}  {}", r.rating, r.content.as_deref().unwrap_or(""));
        }
    }
}

pub fn facets(snap: &Facets) {
    if let Some(error) = &snap.error {
        print_error(error);
        return;
    }
    println!("Genres:    {}", snap.genres.join(", "));
    println!("Languages: {}", snap.languages.join(", "));
}

pub fn events(entries: &[EventEntry]) {
    println!("\n-- events --");
    for (at, event) in entries {
        let line = match event {
            ControllerEvent::RequestIssued { stream, token } => format!("{stream} #{token} issued"),
            ControllerEvent::StaleDiscarded {
                stream,
                token,
                current,
            } => format!("{stream} #{token} discarded (current #{current})"),
            ControllerEvent::Committed {
                stream,
                token,
                items,
            } => format!("{stream} #{token} committed {items} items"),
            ControllerEvent::Failed {
                stream,
                token,
                message,
            } => format!("{stream} #{token} failed: {message}"),
            ControllerEvent::Transition { surface, state } => format!("{surface} -> {state}"),
            ControllerEvent::Navigated { location } => format!("navigated to {location}"),
            ControllerEvent::SessionChanged { email } => match email {
                Some(email) => format!("signed in as {email}"),
                None => "signed out".to_string(),
            },
        };
        println!("{}  {line}", at.format("%H:%M:%S%.3f"));
    }
}
