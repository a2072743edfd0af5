//! Query Lifecycle
//!
//! Tracks one asynchronous "fetch a result from a producer" operation for a view. Every
//! dispatch is tagged with a monotonically increasing generation; when a producer settles,
//! its outcome is committed only if its generation is still the current one. Superseded
//! outcomes are dropped, so resolution order never matters. In-flight producers are not
//! cancelled by `reset` or `dispose`; the generation check alone keeps late results out.

use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Lifecycle status of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Pending,
    Success,
    Failed,
}

/// Human-readable description of a producer failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub message: String,
}

impl ErrorInfo {
    pub fn describe(err: &impl fmt::Display) -> Self {
        Self {
            message: err.to_string(),
        }
    }

    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Self {
            message: format!("producer panicked: {}", detail),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Snapshot of a query, as rendered by a view
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    pub status: QueryStatus,
    pub data: Option<T>,
    pub error: Option<ErrorInfo>,
    /// Generation of the latest `execute` or `reset`
    pub generation: u64,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            generation: 0,
        }
    }
}

impl<T> QueryState<T> {
    pub fn is_pending(&self) -> bool {
        self.status == QueryStatus::Pending
    }
}

/// How a dispatch treats data already on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecuteMode {
    /// Clear data to `None` while pending
    #[default]
    Fresh,
    /// Keep the previous data until the new result lands
    Refetch,
}

/// Outcome of settling one dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution {
    Applied,
    Stale,
}

struct Shared<T> {
    state: watch::Sender<QueryState<T>>,
    disposed: AtomicBool,
}

/// Generation-tagged state machine for one view-level query.
///
/// Cloning yields another handle to the same query. Dispatching spawns onto the current
/// Tokio runtime, so it must be called from inside one.
pub struct QueryLifecycle<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for QueryLifecycle<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for QueryLifecycle<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> QueryLifecycle<T> {
    /// Treat the owning view as destroyed: later dispatches are ignored and late results
    /// are dropped unconditionally. The last visible state is left as it was.
    pub fn dispose(&self) {
        if self.shared.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.shared.state.send_modify(|state| state.generation += 1);
    }
}

impl<T> QueryLifecycle<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        let (state, _) = watch::channel(QueryState::default());
        Self {
            shared: Arc::new(Shared {
                state,
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> QueryState<T> {
        self.shared.state.borrow().clone()
    }

    pub fn generation(&self) -> u64 {
        self.shared.state.borrow().generation
    }

    /// Receiver notified on every committed state change
    pub fn watch(&self) -> watch::Receiver<QueryState<T>> {
        self.shared.state.subscribe()
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.disposed.load(Ordering::Acquire)
    }

    /// Dispatch clearing any previous data.
    pub fn execute<F, Fut, E>(&self, producer: F) -> JoinHandle<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        self.dispatch(ExecuteMode::Fresh, producer)
    }

    /// Dispatch keeping previous data visible until the new result lands.
    pub fn refetch<F, Fut, E>(&self, producer: F) -> JoinHandle<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        self.dispatch(ExecuteMode::Refetch, producer)
    }

    /// Bump the generation, mark the query pending and spawn the producer.
    ///
    /// The producer is invoked synchronously; its future is awaited on a spawned task. A
    /// producer that panics while building its future fails the query the same way a
    /// panicking future does. After `dispose` the producer is never invoked and the returned
    /// task is a no-op.
    pub fn dispatch<F, Fut, E>(&self, mode: ExecuteMode, producer: F) -> JoinHandle<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let Some(generation) = self.begin(mode) else {
            return tokio::spawn(async {});
        };
        let future = match panic::catch_unwind(AssertUnwindSafe(producer)) {
            Ok(future) => future,
            Err(payload) => {
                Self::commit(&self.shared, generation, Err(ErrorInfo::from_panic(payload)));
                return tokio::spawn(async {});
            }
        };
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            Self::settle(&shared, generation, future).await;
        })
    }

    /// Return to `Idle` with no data or error, invalidating any in-flight dispatch.
    pub fn reset(&self) {
        if self.is_disposed() {
            return;
        }
        self.shared.state.send_modify(|state| {
            state.generation += 1;
            state.status = QueryStatus::Idle;
            state.data = None;
            state.error = None;
        });
    }

    fn begin(&self, mode: ExecuteMode) -> Option<u64> {
        if self.is_disposed() {
            debug!("Ignoring dispatch on disposed query");
            return None;
        }
        let mut generation = 0;
        self.shared.state.send_modify(|state| {
            state.generation += 1;
            generation = state.generation;
            state.status = QueryStatus::Pending;
            state.error = None;
            if mode == ExecuteMode::Fresh {
                state.data = None;
            }
        });
        Some(generation)
    }

    async fn settle<Fut, E>(shared: &Shared<T>, generation: u64, future: Fut) -> Resolution
    where
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let outcome = match AssertUnwindSafe(future).catch_unwind().await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(ErrorInfo::describe(&err)),
            Err(payload) => Err(ErrorInfo::from_panic(payload)),
        };

        Self::commit(shared, generation, outcome)
    }

    fn commit(shared: &Shared<T>, generation: u64, outcome: Result<T, ErrorInfo>) -> Resolution {
        let applied = shared.state.send_if_modified(|state| {
            // Checked at resolution time only; dispatch order is irrelevant.
            if shared.disposed.load(Ordering::Acquire) || state.generation != generation {
                return false;
            }
            match outcome {
                Ok(value) => {
                    state.status = QueryStatus::Success;
                    state.data = Some(value);
                    state.error = None;
                }
                Err(error) => {
                    state.status = QueryStatus::Failed;
                    state.error = Some(error);
                }
            }
            true
        });

        if applied {
            Resolution::Applied
        } else {
            debug!(generation, "Discarded stale query result");
            Resolution::Stale
        }
    }
}
