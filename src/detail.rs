//! Detail view: the three independent queries behind an item's detail screen.

use crate::query::QueryLifecycle;
use crate::remote::CatalogSource;
use crate::types::{Credits, ItemDetails, ItemId};
use std::sync::Arc;
use tracing::debug;

/// Details, credits and watch providers for one item.
///
/// Each part runs through its own [`QueryLifecycle`], so a slow or failing credits request
/// never holds back the details. Dropping the view disposes all three queries.
pub struct DetailView {
    item_id: ItemId,
    region: String,
    catalog: Arc<dyn CatalogSource>,
    details: QueryLifecycle<ItemDetails>,
    credits: QueryLifecycle<Credits>,
    providers: QueryLifecycle<Vec<String>>,
}

impl DetailView {
    /// Start all three loads. Must be called from inside a Tokio runtime.
    pub fn open(
        catalog: Arc<dyn CatalogSource>,
        item_id: ItemId,
        region: impl Into<String>,
    ) -> Self {
        let view = Self {
            item_id,
            region: region.into(),
            catalog,
            details: QueryLifecycle::new(),
            credits: QueryLifecycle::new(),
            providers: QueryLifecycle::new(),
        };
        view.load();
        view
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn details(&self) -> &QueryLifecycle<ItemDetails> {
        &self.details
    }

    pub fn credits(&self) -> &QueryLifecycle<Credits> {
        &self.credits
    }

    /// Streaming services in the view's region
    pub fn providers(&self) -> &QueryLifecycle<Vec<String>> {
        &self.providers
    }

    /// Re-issue every query, e.g. from a retry affordance.
    pub fn reload(&self) {
        self.load();
    }

    fn load(&self) {
        debug!(item = %self.item_id, region = %self.region, "Loading detail view");
        let item_id = self.item_id;

        let catalog = Arc::clone(&self.catalog);
        self.details.execute(move || async move { catalog.details(item_id).await });

        let catalog = Arc::clone(&self.catalog);
        self.credits.execute(move || async move { catalog.credits(item_id).await });

        let catalog = Arc::clone(&self.catalog);
        let region = self.region.clone();
        self.providers
            .execute(move || async move { catalog.watch_providers(item_id, &region).await });
    }
}

impl Drop for DetailView {
    fn drop(&mut self) {
        self.details.dispose();
        self.credits.dispose();
        self.providers.dispose();
    }
}
