//! Remote Collaborators
//!
//! Interfaces the core consumes but does not implement: session presence, saved-collection
//! membership, and the catalog itself. The embedding application supplies implementations;
//! the core only calls membership operations after the session provider reports an active
//! session.

use crate::error::CatalogError;
use crate::filters::FilterSet;
use crate::types::{CatalogItem, Credits, ItemDetails, ItemId, SavedItem};
use async_trait::async_trait;

/// Read-only view of authentication state
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Whether a user session is currently active
    async fn has_active_session(&self) -> bool;
}

/// Saved-collection membership for the active user
#[async_trait]
pub trait MembershipProvider: Send + Sync {
    /// Whether `item_id` is in the user's saved collection
    async fn check(&self, item_id: ItemId) -> Result<bool, CatalogError>;

    /// Add `item` to the saved collection
    async fn add(&self, item: &CatalogItem) -> Result<(), CatalogError>;

    /// Remove `item_id` from the saved collection
    async fn remove(&self, item_id: ItemId) -> Result<(), CatalogError>;

    /// Full saved collection, newest first
    async fn list(&self) -> Result<Vec<SavedItem>, CatalogError>;
}

/// Remote media catalog queries backing the search, browse, home and detail views
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Free-text search
    async fn search(&self, query: &str) -> Result<Vec<CatalogItem>, CatalogError>;

    /// Listing constrained by the present filters; an unconstrained set browses everything
    async fn browse(&self, filters: &FilterSet) -> Result<Vec<CatalogItem>, CatalogError>;

    /// Popular items in one genre
    async fn by_genre(&self, genre_id: u32) -> Result<Vec<CatalogItem>, CatalogError>;

    async fn details(&self, item_id: ItemId) -> Result<ItemDetails, CatalogError>;

    async fn credits(&self, item_id: ItemId) -> Result<Credits, CatalogError>;

    /// Names of the streaming services offering the item in `region`
    async fn watch_providers(
        &self,
        item_id: ItemId,
        region: &str,
    ) -> Result<Vec<String>, CatalogError>;
}
