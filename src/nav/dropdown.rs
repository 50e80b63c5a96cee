use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use serde::Serialize;

use super::timer::CloseTimer;

/// DropdownState
///
/// `ClosingPending` is still logically open: the panel stays visible until the close
/// timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropdownState {
    Closed,
    Open,
    ClosingPending,
}

impl DropdownState {
    pub fn is_open(self) -> bool {
        self != DropdownState::Closed
    }
}

#[derive(Debug)]
struct Shared {
    state: DropdownState,
    // Bumped on every transition; a timer only closes the generation it was armed for.
    generation: u64,
    closes: u64,
}

/// Dropdown
///
/// Hover-triggered menu with a delayed close. The delay covers the pointer's trip from the
/// trigger to the panel, which are adjacent but not contiguous. Each dropdown owns its
/// timer, so hovering across neighbouring menus never cancels another menu's close.
#[derive(Debug)]
pub struct Dropdown {
    id: &'static str,
    delay: Duration,
    shared: Arc<Mutex<Shared>>,
    pending: Option<CloseTimer>,
}

impl Dropdown {
    pub fn new(id: &'static str, delay: Duration) -> Self {
        Self {
            id,
            delay,
            shared: Arc::new(Mutex::new(Shared {
                state: DropdownState::Closed,
                generation: 0,
                closes: 0,
            })),
            pending: None,
        }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    /// hover_enter
    ///
    /// Cancels any pending close before opening, so a stale timer can never close a menu
    /// the pointer has come back to.
    pub fn hover_enter(&mut self) {
        if let Some(timer) = self.pending.take() {
            timer.cancel();
        }
        let mut shared = lock(&self.shared);
        shared.generation += 1;
        shared.state = DropdownState::Open;
    }

    /// hover_leave
    ///
    /// From `Open`, arms the close timer and moves to `ClosingPending`. Ignored in any other
    /// state, which keeps at most one timer pending.
    pub fn hover_leave(&mut self) {
        let generation = {
            let mut shared = lock(&self.shared);
            if shared.state != DropdownState::Open {
                return;
            }
            shared.state = DropdownState::ClosingPending;
            shared.generation += 1;
            shared.generation
        };

        let shared = Arc::clone(&self.shared);
        let id = self.id;
        self.pending = Some(CloseTimer::schedule(self.delay, move || {
            let mut shared = lock(&shared);
            if shared.state == DropdownState::ClosingPending && shared.generation == generation {
                shared.state = DropdownState::Closed;
                shared.closes += 1;
                tracing::trace!(dropdown = id, "dropdown closed after delay");
            }
        }));
    }

    /// Closes immediately, e.g. after an item in the panel was chosen.
    pub fn close_now(&mut self) {
        self.pending = None;
        let mut shared = lock(&self.shared);
        if shared.state != DropdownState::Closed {
            shared.generation += 1;
            shared.state = DropdownState::Closed;
            shared.closes += 1;
        }
    }

    pub fn state(&self) -> DropdownState {
        lock(&self.shared).state
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    pub fn has_pending_close(&self) -> bool {
        self.pending.as_ref().is_some_and(|timer| !timer.is_finished())
    }

    /// How many times this dropdown has transitioned to `Closed`.
    pub fn close_count(&self) -> u64 {
        lock(&self.shared).closes
    }

    /// Cancels the pending close without touching the state.
    pub fn teardown(&mut self) {
        self.pending = None;
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
