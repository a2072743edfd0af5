//! Marquee: data orchestration for a media catalog browser
//!
//! Client-side lifecycle management for remote catalog queries, debounced filter-driven
//! dispatch, and an invalidation bus that keeps every "is this item saved" indicator
//! consistent after a bookmark changes anywhere in the app.

pub mod bus;
pub mod config;
pub mod debounce;
pub mod detail;
pub mod error;
pub mod filters;
pub mod logging;
pub mod query;
pub mod remote;
pub mod runtime;
pub mod saved;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use bus::{InvalidationBus, Subscription, SubscriptionId};
pub use config::{CatalogConfig, ConfigLoader};
pub use debounce::{DebouncedTrigger, TriggerConfig};
pub use detail::DetailView;
pub use error::CatalogError;
pub use filters::FilterSet;
pub use query::{ErrorInfo, ExecuteMode, QueryLifecycle, QueryState, QueryStatus};
pub use runtime::CatalogRuntime;
pub use saved::{GuardDeps, SavedListView, SavedState, SavedStateGuard};
pub use types::{CastMember, CatalogItem, Credits, CrewMember, ItemDetails, ItemId, SavedItem};
