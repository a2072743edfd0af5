//! Catalog Runtime
//!
//! Process-lifetime wiring of the invalidation bus, the remote collaborators and the
//! configuration. Views are built through the factories here so every guard and saved-list
//! view shares one bus.

use crate::bus::InvalidationBus;
use crate::config::CatalogConfig;
use crate::debounce::DebouncedTrigger;
use crate::detail::DetailView;
use crate::error::CatalogError;
use crate::query::QueryLifecycle;
use crate::remote::{CatalogSource, MembershipProvider, SessionProvider};
use crate::saved::{GuardDeps, SavedListView, SavedStateGuard};
use crate::types::{CatalogItem, ItemId};
use std::sync::Arc;
use tracing::info;

/// Filter-driven view over catalog items
pub type ItemsTrigger = DebouncedTrigger<Vec<CatalogItem>, CatalogError>;

pub struct CatalogRuntime {
    config: CatalogConfig,
    bus: InvalidationBus,
    session: Arc<dyn SessionProvider>,
    membership: Arc<dyn MembershipProvider>,
    catalog: Arc<dyn CatalogSource>,
}

impl CatalogRuntime {
    pub fn new(
        config: CatalogConfig,
        session: Arc<dyn SessionProvider>,
        membership: Arc<dyn MembershipProvider>,
        catalog: Arc<dyn CatalogSource>,
    ) -> Self {
        Self {
            config,
            bus: InvalidationBus::new(),
            session,
            membership,
            catalog,
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn bus(&self) -> &InvalidationBus {
        &self.bus
    }

    pub fn guard_deps(&self) -> GuardDeps {
        GuardDeps {
            session: Arc::clone(&self.session),
            membership: Arc::clone(&self.membership),
            bus: self.bus.clone(),
        }
    }

    /// Search-as-you-type view; a blank subject resets instead of searching.
    pub fn search_view(&self) -> ItemsTrigger {
        let settings = &self.config.search;
        let subject_key = settings
            .subject_key
            .clone()
            .unwrap_or_else(|| "query".to_string());
        let trigger_config = settings.trigger_config().with_subject(subject_key.clone());
        let catalog = Arc::clone(&self.catalog);
        DebouncedTrigger::new(trigger_config, QueryLifecycle::new(), move |filters| {
            let catalog = Arc::clone(&catalog);
            let text = filters.subject(&subject_key).unwrap_or_default().to_string();
            async move { catalog.search(&text).await }
        })
    }

    /// Multi-filter browse view; every change, including clearing all filters, refetches.
    pub fn browse_view(&self) -> ItemsTrigger {
        let catalog = Arc::clone(&self.catalog);
        DebouncedTrigger::new(
            self.config.browse.trigger_config(),
            QueryLifecycle::new(),
            move |filters| {
                let catalog = Arc::clone(&catalog);
                let filters = filters.clone();
                async move { catalog.browse(&filters).await }
            },
        )
    }

    /// Home-screen row for one genre, fetched once.
    pub fn genre_row(&self, genre_id: u32) -> QueryLifecycle<Vec<CatalogItem>> {
        let query = QueryLifecycle::new();
        let catalog = Arc::clone(&self.catalog);
        query.execute(move || async move { catalog.by_genre(genre_id).await });
        query
    }

    /// Detail screen for one item; watch providers are looked up for `region`.
    pub fn detail_view(&self, item_id: ItemId, region: impl Into<String>) -> DetailView {
        DetailView::open(Arc::clone(&self.catalog), item_id, region)
    }

    pub fn guard(&self, item: CatalogItem) -> SavedStateGuard {
        SavedStateGuard::attach(item, self.guard_deps())
    }

    pub fn saved_list(&self) -> SavedListView {
        SavedListView::attach(self.guard_deps())
    }

    /// Login/logout refresh point: every guard and saved list reloads against the new session.
    pub fn session_changed(&self) {
        info!(
            subscribers = self.bus.subscriber_count(),
            "Session changed; invalidating saved state"
        );
        self.bus.publish();
    }

    /// Run `on_authed` when a session is active, `on_unauthed` otherwise.
    pub async fn require_session<R>(
        &self,
        on_authed: impl FnOnce() -> R,
        on_unauthed: impl FnOnce() -> R,
    ) -> R {
        if self.session.has_active_session().await {
            on_authed()
        } else {
            on_unauthed()
        }
    }
}
