use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use marquee_core::models::Slide;

use crate::transition::{SlideDirection, TransitionDirector, TransitionMode};

#[derive(Debug, Default)]
struct CarouselState {
    slides: Vec<Slide>,
    active_index: usize,
    view_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CarouselSnapshot {
    pub slides: Vec<Slide>,
    pub active_index: usize,
    pub view_active: bool,
    pub autoplaying: bool,
}

/// Hero carousel with a fixed-interval autoplay.
///
/// Autoplay runs only while the owning view is active and there is more
/// than one slide. Manual moves do not restart its cadence.
pub struct CarouselScheduler {
    interval: Duration,
    director: TransitionDirector,
    state: Arc<Mutex<CarouselState>>,
    autoplay: Mutex<Option<JoinHandle<()>>>,
}

impl CarouselScheduler {
    pub fn new(interval: Duration, director: TransitionDirector) -> Self {
        Self {
            interval,
            director,
            state: Arc::new(Mutex::new(CarouselState::default())),
            autoplay: Mutex::new(None),
        }
    }

    /// Replace the slide set, keeping the active index in range.
    pub fn set_slides(&self, slides: Vec<Slide>) {
        {
            let mut state = self.state.lock();
            state.active_index = clamp_index(state.active_index, slides.len());
            state.slides = slides;
        }
        self.reconcile();
    }

    pub fn set_view_active(&self, active: bool) {
        self.state.lock().view_active = active;
        self.reconcile();
    }

    pub fn next(&self) {
        if self.step(true) {
            self.director
                .enter(TransitionMode::Slide(SlideDirection::Left));
        }
    }

    pub fn prev(&self) {
        if self.step(false) {
            self.director
                .enter(TransitionMode::Slide(SlideDirection::Right));
        }
    }

    /// Jump to a slide; out-of-range indices clamp to the last one.
    pub fn go_to(&self, index: usize) {
        let direction = {
            let mut state = self.state.lock();
            let target = clamp_index(index, state.slides.len());
            let previous = state.active_index;
            state.active_index = target;
            match target.cmp(&previous) {
                std::cmp::Ordering::Greater => Some(SlideDirection::Left),
                std::cmp::Ordering::Less => Some(SlideDirection::Right),
                std::cmp::Ordering::Equal => None,
            }
        };
        if let Some(direction) = direction {
            self.director.enter(TransitionMode::Slide(direction));
        }
    }

    pub fn active_index(&self) -> usize {
        self.state.lock().active_index
    }

    pub fn active_slide(&self) -> Option<Slide> {
        let state = self.state.lock();
        state.slides.get(state.active_index).cloned()
    }

    pub fn is_autoplaying(&self) -> bool {
        self.autoplay.lock().is_some()
    }

    pub fn snapshot(&self) -> CarouselSnapshot {
        let autoplaying = self.is_autoplaying();
        let state = self.state.lock();
        CarouselSnapshot {
            slides: state.slides.clone(),
            active_index: state.active_index,
            view_active: state.view_active,
            autoplaying,
        }
    }

    fn step(&self, forward: bool) -> bool {
        let mut state = self.state.lock();
        let len = state.slides.len();
        if len < 2 {
            return false;
        }
        state.active_index = if forward {
            (state.active_index + 1) % len
        } else {
            (state.active_index + len - 1) % len
        };
        true
    }

    /// Start or stop autoplay to match the current view and slide count.
    fn reconcile(&self) {
        let wanted = {
            let state = self.state.lock();
            state.view_active && state.slides.len() > 1
        };
        let mut autoplay = self.autoplay.lock();

        match (wanted, autoplay.is_some()) {
            (true, false) => {
                let Ok(runtime) = tokio::runtime::Handle::try_current() else {
                    tracing::warn!("no runtime, carousel autoplay disabled");
                    return;
                };
                tracing::debug!(every = ?self.interval, "carousel autoplay started");
                *autoplay = Some(runtime.spawn(autoplay_loop(
                    self.interval,
                    Arc::clone(&self.state),
                    self.director.clone(),
                )));
            }
            (false, true) => {
                if let Some(handle) = autoplay.take() {
                    handle.abort();
                }
                tracing::debug!("carousel autoplay stopped");
            }
            _ => {}
        }
    }
}

impl Drop for CarouselScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.autoplay.get_mut().take() {
            handle.abort();
        }
    }
}

async fn autoplay_loop(
    period: Duration,
    state: Arc<Mutex<CarouselState>>,
    director: TransitionDirector,
) {
    let mut ticks = interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticks.tick().await;
        let advanced = {
            let mut state = state.lock();
            let len = state.slides.len();
            if len > 1 {
                state.active_index = (state.active_index + 1) % len;
            }
            len > 1
        };
        if advanced {
            director.enter(TransitionMode::Slide(SlideDirection::Left));
        }
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        index.min(len - 1)
    }
}
