//! In-memory collaborators for unit tests.

use crate::error::CatalogError;
use crate::filters::FilterSet;
use crate::remote::{CatalogSource, MembershipProvider, SessionProvider};
use crate::types::{CastMember, CatalogItem, Credits, ItemDetails, ItemId, SavedItem};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

pub struct FakeSession {
    active: AtomicBool,
}

impl FakeSession {
    pub fn new(active: bool) -> Arc<Self> {
        Arc::new(Self {
            active: AtomicBool::new(active),
        })
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionProvider for FakeSession {
    async fn has_active_session(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipCall {
    Check(ItemId),
    Add(ItemId),
    Remove(ItemId),
    List,
}

/// Saved collection kept in memory, with optional per-call latency.
pub struct FakeMembership {
    saved: Mutex<Vec<CatalogItem>>,
    calls: Mutex<Vec<MembershipCall>>,
    failure: Mutex<Option<CatalogError>>,
    latency: Duration,
}

impl FakeMembership {
    pub fn new() -> Arc<Self> {
        Self::with_latency(Duration::ZERO)
    }

    pub fn with_latency(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            saved: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            latency,
        })
    }

    pub fn seed(&self, item: CatalogItem) {
        self.saved.lock().insert(0, item);
    }

    pub fn calls(&self) -> Vec<MembershipCall> {
        self.calls.lock().clone()
    }

    /// Make the next add or remove fail with `err`.
    pub fn fail_next_mutation(&self, err: CatalogError) {
        *self.failure.lock() = Some(err);
    }

    async fn record(&self, call: MembershipCall) {
        self.calls.lock().push(call);
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl MembershipProvider for FakeMembership {
    async fn check(&self, item_id: ItemId) -> Result<bool, CatalogError> {
        self.record(MembershipCall::Check(item_id)).await;
        Ok(self.saved.lock().iter().any(|item| item.id == item_id))
    }

    async fn add(&self, item: &CatalogItem) -> Result<(), CatalogError> {
        self.record(MembershipCall::Add(item.id)).await;
        if let Some(err) = self.failure.lock().take() {
            return Err(err);
        }
        self.saved.lock().insert(0, item.clone());
        Ok(())
    }

    async fn remove(&self, item_id: ItemId) -> Result<(), CatalogError> {
        self.record(MembershipCall::Remove(item_id)).await;
        if let Some(err) = self.failure.lock().take() {
            return Err(err);
        }
        self.saved.lock().retain(|item| item.id != item_id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<SavedItem>, CatalogError> {
        self.record(MembershipCall::List).await;
        Ok(self
            .saved
            .lock()
            .iter()
            .map(|item| SavedItem {
                item: item.clone(),
                saved_at: None,
            })
            .collect())
    }
}

/// Catalog answering every query with items derived from the query itself.
pub struct FakeCatalog {
    pub queries: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            queries: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn search(&self, query: &str) -> Result<Vec<CatalogItem>, CatalogError> {
        self.queries.lock().push(format!("search:{query}"));
        Ok(vec![CatalogItem::new(1, query)])
    }

    async fn browse(&self, filters: &FilterSet) -> Result<Vec<CatalogItem>, CatalogError> {
        let label = filters
            .present()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        self.queries.lock().push(format!("browse:{label}"));
        Ok(vec![CatalogItem::new(2, label)])
    }

    async fn by_genre(&self, genre_id: u32) -> Result<Vec<CatalogItem>, CatalogError> {
        self.queries.lock().push(format!("genre:{genre_id}"));
        if genre_id == 0 {
            return Err(CatalogError::Network("unknown genre".into()));
        }
        Ok(vec![CatalogItem::new(u64::from(genre_id), "genre pick")])
    }

    async fn details(&self, item_id: ItemId) -> Result<ItemDetails, CatalogError> {
        self.queries.lock().push(format!("details:{item_id}"));
        Ok(ItemDetails {
            item: CatalogItem::new(item_id, "detail"),
            overview: None,
            runtime_minutes: Some(120),
            genres: vec!["Drama".to_string()],
        })
    }

    async fn credits(&self, item_id: ItemId) -> Result<Credits, CatalogError> {
        self.queries.lock().push(format!("credits:{item_id}"));
        if item_id == ItemId(0) {
            return Err(CatalogError::Network("no credits".into()));
        }
        Ok(Credits {
            cast: vec![CastMember {
                name: "lead".to_string(),
                character: None,
            }],
            crew: Vec::new(),
        })
    }

    async fn watch_providers(
        &self,
        item_id: ItemId,
        region: &str,
    ) -> Result<Vec<String>, CatalogError> {
        self.queries.lock().push(format!("providers:{item_id}:{region}"));
        Ok(vec![format!("{region} streaming")])
    }
}
