use parking_lot::Mutex;
use tokio::sync::watch;

use marquee_core::event_log::{ControllerEvent, SharedEventLog};
use marquee_core::route::{self, RouteState};

/// The location bar and the (tab, view) it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSnapshot {
    pub location: String,
    pub state: RouteState,
}

#[derive(Debug)]
struct History {
    entries: Vec<String>,
    index: usize,
}

/// Keeps the location and the visible (tab, view) in step.
///
/// In-app navigation pushes history. Location changes from outside
/// (back/forward, a pasted link) only drive state.
pub struct RouteSynchronizer {
    history: Mutex<History>,
    tx: watch::Sender<RouteSnapshot>,
    events: SharedEventLog,
}

impl RouteSynchronizer {
    pub fn new(initial_path: &str, events: SharedEventLog) -> Self {
        let location = route::normalize_path(initial_path).to_string();
        let snapshot = RouteSnapshot {
            state: route::location_to_state(&location),
            location: location.clone(),
        };
        let (tx, _) = watch::channel(snapshot);
        Self {
            history: Mutex::new(History {
                entries: vec![location],
                index: 0,
            }),
            tx,
            events,
        }
    }

    pub fn current(&self) -> RouteSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RouteSnapshot> {
        self.tx.subscribe()
    }

    /// Navigate within the app: location and state change together.
    ///
    /// A combination with no route of its own lands on the state its
    /// location resolves to.
    pub fn navigate_to(&self, state: RouteState) -> RouteSnapshot {
        let location = route::state_to_location(state);
        let state = route::location_to_state(&location);
        self.push(location, state)
    }

    /// Navigate to a path typed or linked within the app.
    pub fn navigate_path(&self, path: &str) -> RouteSnapshot {
        let location = route::normalize_path(path).to_string();
        let state = route::location_to_state(&location);
        self.push(location, state)
    }

    /// The location changed outside our control; follow it.
    pub fn on_location_changed(&self, path: &str) -> RouteSnapshot {
        let location = route::normalize_path(path).to_string();
        let snapshot = RouteSnapshot {
            state: route::location_to_state(&location),
            location,
        };
        self.publish(snapshot.clone());
        snapshot
    }

    pub fn back(&self) -> Option<RouteSnapshot> {
        let location = {
            let mut history = self.history.lock();
            if history.index == 0 {
                return None;
            }
            history.index -= 1;
            history.entries[history.index].clone()
        };
        Some(self.on_location_changed(&location))
    }

    pub fn forward(&self) -> Option<RouteSnapshot> {
        let location = {
            let mut history = self.history.lock();
            if history.index + 1 >= history.entries.len() {
                return None;
            }
            history.index += 1;
            history.entries[history.index].clone()
        };
        Some(self.on_location_changed(&location))
    }

    pub fn can_go_back(&self) -> bool {
        self.history.lock().index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        let history = self.history.lock();
        history.index + 1 < history.entries.len()
    }

    fn push(&self, location: String, state: RouteState) -> RouteSnapshot {
        {
            let mut history = self.history.lock();
            if history.entries[history.index] != location {
                let keep = history.index + 1;
                history.entries.truncate(keep);
                history.entries.push(location.clone());
                history.index = keep;
            }
        }
        let snapshot = RouteSnapshot { location, state };
        self.publish(snapshot.clone());
        snapshot
    }

    fn publish(&self, snapshot: RouteSnapshot) {
        tracing::info!(location = %snapshot.location, "navigated");
        self.events.lock().push(ControllerEvent::Navigated {
            location: snapshot.location.clone(),
        });
        self.tx.send_replace(snapshot);
    }
}
