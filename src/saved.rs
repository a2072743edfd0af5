//! Saved-item consistency: per-item bookmark guards and the saved-list view, kept in sync
//! through the invalidation bus.

mod guard;
mod list;

pub use guard::{GuardDeps, SavedState, SavedStateGuard};
pub use list::SavedListView;
