//! Saved-list view: the user's full saved collection, reloaded on every invalidation.

use crate::bus::Subscription;
use crate::error::CatalogError;
use crate::query::{ExecuteMode, QueryLifecycle, QueryState};
use crate::remote::{MembershipProvider, SessionProvider};
use crate::saved::GuardDeps;
use crate::types::SavedItem;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Clone)]
struct ListSource {
    session: Arc<dyn SessionProvider>,
    membership: Arc<dyn MembershipProvider>,
}

impl ListSource {
    fn load(&self, query: &QueryLifecycle<Vec<SavedItem>>, mode: ExecuteMode) -> JoinHandle<()> {
        let source = self.clone();
        query.dispatch(mode, move || async move {
            if !source.session.has_active_session().await {
                debug!("No active session; saved list is empty");
                return Ok::<_, CatalogError>(Vec::new());
            }
            source.membership.list().await
        })
    }
}

/// "My saved items" view.
///
/// Loads on attach and reloads on every bus publish, keeping the current rows visible while
/// a reload is in flight. Dropping the view unsubscribes and discards late results.
pub struct SavedListView {
    query: QueryLifecycle<Vec<SavedItem>>,
    source: ListSource,
    subscription: Option<Subscription>,
}

impl SavedListView {
    /// Must be called from inside a Tokio runtime.
    pub fn attach(deps: GuardDeps) -> Self {
        let query = QueryLifecycle::new();
        let source = ListSource {
            session: deps.session,
            membership: deps.membership,
        };

        let subscription = {
            let query = query.clone();
            let source = source.clone();
            let runtime = Handle::current();
            deps.bus.subscribe(move || {
                let _enter = runtime.enter();
                source.load(&query, ExecuteMode::Refetch);
            })
        };
        source.load(&query, ExecuteMode::Fresh);

        Self {
            query,
            source,
            subscription: Some(subscription),
        }
    }

    pub fn state(&self) -> QueryState<Vec<SavedItem>> {
        self.query.state()
    }

    pub fn watch(&self) -> watch::Receiver<QueryState<Vec<SavedItem>>> {
        self.query.watch()
    }

    /// Rows currently on screen; empty while nothing has loaded
    pub fn items(&self) -> Vec<SavedItem> {
        self.query.state().data.unwrap_or_default()
    }

    /// Reload now, keeping current rows until the result lands
    pub fn reload(&self) -> JoinHandle<()> {
        self.source.load(&self.query, ExecuteMode::Refetch)
    }

    pub fn detach(self) {
        drop(self);
    }
}

impl Drop for SavedListView {
    fn drop(&mut self) {
        self.subscription.take();
        self.query.dispose();
    }
}
