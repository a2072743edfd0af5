//! Saved-State Guard
//!
//! Per-item bookmark logic. On attach the guard asks the membership provider whether its
//! item is saved (only when a session is active) and subscribes to the invalidation bus so
//! that any publish makes it re-check. `toggle` flips membership remotely, then publishes.
//!
//! State machine:
//!
//! ```text
//! Unknown --check--> Known(b) --toggle--> Saving { previous: b } --ok--> Known(!b) + publish
//!                                                               \--err--> Known(b)
//! ```

use crate::bus::{InvalidationBus, Subscription};
use crate::remote::{MembershipProvider, SessionProvider};
use crate::types::CatalogItem;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Bookmark state of one displayed item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavedState {
    /// No session, or the membership check has not resolved
    Unknown,
    Known(bool),
    /// Remote add/remove in flight
    Saving { previous: bool },
}

impl SavedState {
    /// Saved flag to render, if known. `Saving` reports the pre-toggle value.
    pub fn saved(&self) -> Option<bool> {
        match self {
            SavedState::Unknown => None,
            SavedState::Known(saved) => Some(*saved),
            SavedState::Saving { previous } => Some(*previous),
        }
    }

    pub fn is_saving(&self) -> bool {
        matches!(self, SavedState::Saving { .. })
    }
}

/// Collaborators shared by every guard and saved-list view
#[derive(Clone)]
pub struct GuardDeps {
    pub session: Arc<dyn SessionProvider>,
    pub membership: Arc<dyn MembershipProvider>,
    pub bus: InvalidationBus,
}

struct Control {
    /// Only the membership check holding the latest ticket may commit
    check_ticket: u64,
    detached: bool,
}

struct GuardShared {
    item: CatalogItem,
    deps: GuardDeps,
    state: watch::Sender<SavedState>,
    control: Mutex<Control>,
}

impl GuardShared {
    fn next_ticket(&self) -> Option<u64> {
        let mut control = self.control.lock();
        if control.detached {
            return None;
        }
        control.check_ticket += 1;
        Some(control.check_ticket)
    }

    async fn check(self: Arc<Self>) {
        let Some(ticket) = self.next_ticket() else {
            return;
        };
        if !self.deps.session.has_active_session().await {
            debug!(item = %self.item.id, "No active session; membership unknown");
            self.apply_check(ticket, SavedState::Unknown);
            return;
        }
        match self.deps.membership.check(self.item.id).await {
            Ok(saved) => self.apply_check(ticket, SavedState::Known(saved)),
            Err(err) => {
                warn!(item = %self.item.id, error = %err, "Membership check failed");
            }
        }
    }

    fn apply_check(&self, ticket: u64, next: SavedState) {
        let control = self.control.lock();
        if control.detached || control.check_ticket != ticket {
            debug!(item = %self.item.id, ticket, "Discarded superseded membership check");
            return;
        }
        self.state.send_if_modified(|state| {
            if state.is_saving() || *state == next {
                return false;
            }
            *state = next;
            true
        });
    }

    async fn commit_toggle(self: Arc<Self>, previous: bool) {
        let item_id = self.item.id;
        if !self.deps.session.has_active_session().await {
            debug!(item = %item_id, "Toggle ignored: no active session");
            self.settle_toggle(previous);
            return;
        }

        let result = if previous {
            self.deps.membership.remove(item_id).await
        } else {
            self.deps.membership.add(&self.item).await
        };

        match result {
            Ok(()) => {
                self.settle_toggle(!previous);
                info!(item = %item_id, saved = !previous, "Saved state changed");
                self.deps.bus.publish();
            }
            Err(err) => {
                self.settle_toggle(previous);
                error!(item = %item_id, error = %err, "Failed to update saved state");
            }
        }
    }

    fn settle_toggle(&self, saved: bool) {
        let control = self.control.lock();
        if control.detached {
            return;
        }
        self.state.send_replace(SavedState::Known(saved));
    }
}

/// Bookmark control for one displayed item.
///
/// Must be attached from inside a Tokio runtime. Dropping the guard detaches it: the bus
/// subscription is released and no in-flight check or toggle may touch its state again.
pub struct SavedStateGuard {
    shared: Arc<GuardShared>,
    subscription: Option<Subscription>,
}

impl SavedStateGuard {
    /// Subscribe to invalidations and start the initial membership check.
    pub fn attach(item: CatalogItem, deps: GuardDeps) -> Self {
        let (state, _) = watch::channel(SavedState::Unknown);
        let shared = Arc::new(GuardShared {
            item,
            deps,
            state,
            control: Mutex::new(Control {
                check_ticket: 0,
                detached: false,
            }),
        });

        let runtime = Handle::current();
        let weak = Arc::downgrade(&shared);
        let subscription = shared.deps.bus.subscribe(move || {
            if let Some(shared) = weak.upgrade() {
                runtime.spawn(shared.check());
            }
        });

        tokio::spawn(Arc::clone(&shared).check());

        Self {
            shared,
            subscription: Some(subscription),
        }
    }

    pub fn item(&self) -> &CatalogItem {
        &self.shared.item
    }

    pub fn state(&self) -> SavedState {
        *self.shared.state.borrow()
    }

    pub fn watch(&self) -> watch::Receiver<SavedState> {
        self.shared.state.subscribe()
    }

    /// Re-issue the membership check, e.g. after login or logout.
    pub fn refresh(&self) -> Option<JoinHandle<()>> {
        if self.shared.control.lock().detached {
            return None;
        }
        Some(tokio::spawn(Arc::clone(&self.shared).check()))
    }

    /// Flip saved membership.
    ///
    /// Moves to `Saving` before returning, so a repeated activation while the first is in
    /// flight is a no-op. Returns `None` when nothing was started: a save already in flight,
    /// membership not yet known, or the guard detached. Failures restore the previous
    /// state and are only logged.
    pub fn toggle(&self) -> Option<JoinHandle<()>> {
        let previous = {
            let mut control = self.shared.control.lock();
            if control.detached {
                return None;
            }
            let previous = match *self.shared.state.borrow() {
                SavedState::Known(saved) => saved,
                SavedState::Saving { .. } => {
                    debug!(item = %self.shared.item.id, "Toggle ignored: save in flight");
                    return None;
                }
                SavedState::Unknown => {
                    debug!(item = %self.shared.item.id, "Toggle ignored: membership unknown");
                    return None;
                }
            };
            // Any check already in flight predates this mutation.
            control.check_ticket += 1;
            self.shared
                .state
                .send_replace(SavedState::Saving { previous });
            previous
        };
        Some(tokio::spawn(
            Arc::clone(&self.shared).commit_toggle(previous),
        ))
    }

    pub fn is_attached(&self) -> bool {
        !self.shared.control.lock().detached
    }

    /// Detach explicitly. Equivalent to dropping the guard.
    pub fn detach(self) {
        drop(self);
    }
}

impl Drop for SavedStateGuard {
    fn drop(&mut self) {
        self.shared.control.lock().detached = true;
        self.subscription.take();
    }
}
