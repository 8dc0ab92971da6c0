//! Enter/exit sequencing for content surfaces.
//!
//! Each surface owns one [`TransitionDirector`]. A fade plays as
//! exit, content swap, enter; a slide swaps immediately and only marks the
//! direction until its timer resets it. Whatever path the machine takes,
//! the single live reset timer brings it back to idle.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use marquee_core::config::TransitionConfig;
use marquee_core::event_log::{ControllerEvent, SharedEventLog};

/// A region of the screen that animates independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    MoviesGrid,
    TvGrid,
    TrendingRail,
    NewReleases,
    Carousel,
}

impl Surface {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MoviesGrid => "movies_grid",
            Self::TvGrid => "tv_grid",
            Self::TrendingRail => "trending_rail",
            Self::NewReleases => "new_releases",
            Self::Carousel => "carousel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Exiting,
    Entering,
}

/// `Left` reveals the next item, `Right` the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionMode {
    #[default]
    None,
    Fade,
    Slide(SlideDirection),
}

/// The flattened state a renderer picks its animation class from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualState {
    Idle,
    EnteringFade,
    ExitingFade,
    SlideLeft,
    SlideRight,
}

impl VisualState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::EnteringFade => "entering_fade",
            Self::ExitingFade => "exiting_fade",
            Self::SlideLeft => "slide_left",
            Self::SlideRight => "slide_right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionState {
    pub phase: Phase,
    pub mode: TransitionMode,
}

impl TransitionState {
    pub const IDLE: TransitionState = TransitionState {
        phase: Phase::Idle,
        mode: TransitionMode::None,
    };

    pub fn visual(&self) -> VisualState {
        match (self.phase, self.mode) {
            (_, TransitionMode::Slide(SlideDirection::Left)) => VisualState::SlideLeft,
            (_, TransitionMode::Slide(SlideDirection::Right)) => VisualState::SlideRight,
            (Phase::Exiting, TransitionMode::Fade) => VisualState::ExitingFade,
            (Phase::Entering, TransitionMode::Fade) => VisualState::EnteringFade,
            _ => VisualState::Idle,
        }
    }
}

/// How a content swap should be animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swap {
    Fade,
    Slide(SlideDirection),
}

#[derive(Debug, Default)]
struct Timed {
    state: TransitionState,
    /// Bumped on every state change; a timer only resets the generation it armed.
    generation: u64,
}

struct Inner {
    surface: Surface,
    timings: TransitionConfig,
    state: Arc<Mutex<Timed>>,
    timer: Mutex<Option<JoinHandle<()>>>,
    events: SharedEventLog,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self.timer.get_mut().take() {
            handle.abort();
        }
    }
}

/// Per-surface transition state machine. Clones share the same surface.
#[derive(Clone)]
pub struct TransitionDirector {
    inner: Arc<Inner>,
}

impl TransitionDirector {
    pub fn new(surface: Surface, timings: TransitionConfig, events: SharedEventLog) -> Self {
        Self {
            inner: Arc::new(Inner {
                surface,
                timings,
                state: Arc::new(Mutex::new(Timed::default())),
                timer: Mutex::new(None),
                events,
            }),
        }
    }

    pub fn surface(&self) -> Surface {
        self.inner.surface
    }

    pub fn state(&self) -> TransitionState {
        self.inner.state.lock().state
    }

    pub fn visual(&self) -> VisualState {
        self.state().visual()
    }

    /// Start fading the current content out. No timer: the caller swaps
    /// content and calls [`enter`](Self::enter) once the fade-out has run.
    pub fn begin_exit(&self) {
        self.cancel_timer();
        self.set(TransitionState {
            phase: Phase::Exiting,
            mode: TransitionMode::Fade,
        });
    }

    /// Mark new content as entering and arm the reset timer.
    pub fn enter(&self, mode: TransitionMode) {
        let after = match mode {
            TransitionMode::None => {
                self.reset();
                return;
            }
            TransitionMode::Fade => self.inner.timings.fade_in(),
            TransitionMode::Slide(_) => self.inner.timings.slide(),
        };
        let generation = self.set(TransitionState {
            phase: Phase::Entering,
            mode,
        });
        self.arm(generation, after);
    }

    /// Return to idle. Safe to call any number of times.
    pub fn reset(&self) {
        self.cancel_timer();
        let already_idle = self.inner.state.lock().state == TransitionState::IDLE;
        if !already_idle {
            self.set(TransitionState::IDLE);
        }
    }

    /// Run a content swap under the given animation.
    ///
    /// For a fade over existing content this waits out the fade-out and
    /// then asks `still_current`; a stale caller returns `false` without
    /// committing. Slides and fades onto an empty surface commit at once.
    pub async fn play<C, F>(&self, swap: Swap, had_content: bool, still_current: C, commit: F) -> bool
    where
        C: Fn() -> bool + Send,
        F: FnOnce() + Send,
    {
        match swap {
            Swap::Fade => {
                if had_content {
                    self.begin_exit();
                    tokio::time::sleep(self.inner.timings.fade_out()).await;
                    if !still_current() {
                        return false;
                    }
                }
                commit();
                self.enter(TransitionMode::Fade);
            }
            Swap::Slide(direction) => {
                commit();
                self.enter(TransitionMode::Slide(direction));
            }
        }
        true
    }

    fn set(&self, state: TransitionState) -> u64 {
        let generation = {
            let mut timed = self.inner.state.lock();
            timed.state = state;
            timed.generation += 1;
            timed.generation
        };
        self.inner.events.lock().push(ControllerEvent::Transition {
            surface: self.inner.surface.as_str(),
            state: state.visual().as_str(),
        });
        generation
    }

    fn cancel_timer(&self) {
        if let Some(handle) = self.inner.timer.lock().take() {
            handle.abort();
        }
    }

    fn arm(&self, generation: u64, after: Duration) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(surface = self.inner.surface.as_str(), "no runtime for transition timer");
            self.reset();
            return;
        };

        let state = Arc::clone(&self.inner.state);
        let events = self.inner.events.clone();
        let surface = self.inner.surface;
        let handle = runtime.spawn(async move {
            tokio::time::sleep(after).await;
            let reset = {
                let mut timed = state.lock();
                if timed.generation == generation {
                    timed.state = TransitionState::IDLE;
                    timed.generation += 1;
                    true
                } else {
                    false
                }
            };
            if reset {
                events.lock().push(ControllerEvent::Transition {
                    surface: surface.as_str(),
                    state: VisualState::Idle.as_str(),
                });
            }
        });

        if let Some(previous) = self.inner.timer.lock().replace(handle) {
            previous.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_core::event_log::shared_event_log;

    fn timings() -> TransitionConfig {
        TransitionConfig {
            fade_out_ms: 180,
            fade_in_ms: 220,
            slide_ms: 350,
        }
    }

    fn director(surface: Surface) -> TransitionDirector {
        TransitionDirector::new(surface, timings(), shared_event_log())
    }

    #[tokio::test(start_paused = true)]
    async fn test_fade_enter_returns_to_idle() {
        let d = director(Surface::MoviesGrid);
        d.begin_exit();
        assert_eq!(d.visual(), VisualState::ExitingFade);

        d.enter(TransitionMode::Fade);
        assert_eq!(d.visual(), VisualState::EnteringFade);

        tokio::time::sleep(Duration::from_millis(221)).await;
        assert_eq!(d.state(), TransitionState::IDLE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slide_resets_direction() {
        let d = director(Surface::TvGrid);
        d.enter(TransitionMode::Slide(SlideDirection::Right));
        assert_eq!(d.visual(), VisualState::SlideRight);

        tokio::time::sleep(Duration::from_millis(349)).await;
        assert_eq!(d.visual(), VisualState::SlideRight);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(d.state().mode, TransitionMode::None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_is_idempotent() {
        let d = director(Surface::Carousel);
        d.enter(TransitionMode::Slide(SlideDirection::Left));
        d.reset();
        d.reset();
        assert_eq!(d.state(), TransitionState::IDLE);

        // The aborted timer must not fire into a later state.
        d.enter(TransitionMode::Fade);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(d.visual(), VisualState::EnteringFade);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_keeps_one_timer() {
        let d = director(Surface::NewReleases);
        d.enter(TransitionMode::Slide(SlideDirection::Left));
        tokio::time::sleep(Duration::from_millis(300)).await;

        // Re-entering pushes the deadline out; the first timer is gone.
        d.enter(TransitionMode::Slide(SlideDirection::Left));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(d.visual(), VisualState::SlideLeft);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(d.visual(), VisualState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_fade_skips_exit_when_empty() {
        let d = director(Surface::MoviesGrid);
        let started = tokio::time::Instant::now();
        let committed = d.play(Swap::Fade, false, || true, || {}).await;
        assert!(committed);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(d.visual(), VisualState::EnteringFade);
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_fade_stale_after_exit() {
        let d = director(Surface::MoviesGrid);
        let mut swapped = false;
        let committed = d.play(Swap::Fade, true, || false, || swapped = true).await;
        assert!(!committed);
        assert!(!swapped);
    }

    #[test]
    fn test_enter_without_runtime_falls_back_to_idle() {
        let d = director(Surface::TrendingRail);
        d.enter(TransitionMode::Fade);
        assert_eq!(d.state(), TransitionState::IDLE);
    }
}
