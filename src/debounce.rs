//! Debounced Trigger
//!
//! Watches a [`FilterSet`] and dispatches the underlying [`QueryLifecycle`] only after the
//! filters have stopped changing for a quiet interval. At most one scheduled dispatch is
//! live at a time; every change supersedes the previous one.

use crate::filters::FilterSet;
use crate::query::{ExecuteMode, QueryLifecycle};
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, trace};

type ProducerFactory<T, E> =
    Arc<dyn Fn(&FilterSet) -> BoxFuture<'static, Result<T, E>> + Send + Sync>;

/// Trigger configuration
#[derive(Debug, Clone)]
pub struct TriggerConfig {
    /// Quiet interval before a dispatch fires
    pub delay: Duration,
    /// Filter naming the query subject; blank means "no query" and resets immediately
    pub subject_key: Option<String>,
    /// Dispatch mode used when the timer fires
    pub mode: ExecuteMode,
}

impl TriggerConfig {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            subject_key: None,
            mode: ExecuteMode::Refetch,
        }
    }

    pub fn with_subject(mut self, key: impl Into<String>) -> Self {
        self.subject_key = Some(key.into());
        self
    }

    pub fn with_mode(mut self, mode: ExecuteMode) -> Self {
        self.mode = mode;
        self
    }
}

#[derive(Default)]
struct Schedule {
    /// Identifies the only timer allowed to fire
    ticket: u64,
    pending: Option<JoinHandle<()>>,
    latest: Option<FilterSet>,
    torn_down: bool,
}

impl Schedule {
    fn cancel_pending(&mut self) {
        self.ticket += 1;
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

/// Debounces filter changes into dispatches on a [`QueryLifecycle`].
///
/// The trigger owns its query's lifetime: dropping it cancels any scheduled dispatch and
/// disposes the query.
pub struct DebouncedTrigger<T, E> {
    config: TriggerConfig,
    query: QueryLifecycle<T>,
    factory: ProducerFactory<T, E>,
    schedule: Arc<Mutex<Schedule>>,
}

impl<T, E> DebouncedTrigger<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: fmt::Display + Send + 'static,
{
    /// `factory` builds the producer from the filters in force when the timer fires.
    pub fn new<F, Fut>(config: TriggerConfig, query: QueryLifecycle<T>, factory: F) -> Self
    where
        F: Fn(&FilterSet) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            config,
            query,
            factory: Arc::new(move |filters| factory(filters).boxed()),
            schedule: Arc::new(Mutex::new(Schedule::default())),
        }
    }

    /// Underlying query, for rendering
    pub fn query(&self) -> &QueryLifecycle<T> {
        &self.query
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    /// Observe a new filter value.
    ///
    /// A value equal to the last observed one is not a change. Otherwise any scheduled
    /// dispatch is cancelled; a blank subject resets the query at once, anything else
    /// schedules a dispatch after the quiet interval.
    pub fn update(&self, filters: FilterSet) {
        let mut schedule = self.schedule.lock();
        if schedule.torn_down {
            return;
        }
        if schedule.latest.as_ref() == Some(&filters) {
            trace!("Filters unchanged; keeping current schedule");
            return;
        }
        schedule.cancel_pending();

        let blank_subject = self
            .config
            .subject_key
            .as_deref()
            .is_some_and(|key| filters.subject(key).is_none());
        schedule.latest = Some(filters);

        if blank_subject {
            drop(schedule);
            debug!("Query subject is blank; resetting");
            self.query.reset();
            return;
        }

        let ticket = schedule.ticket;
        let delay = self.config.delay;
        let mode = self.config.mode;
        let shared = Arc::clone(&self.schedule);
        let query = self.query.clone();
        let factory = Arc::clone(&self.factory);
        schedule.pending = Some(tokio::spawn(async move {
            sleep(delay).await;
            let filters = {
                let mut schedule = shared.lock();
                if schedule.torn_down || schedule.ticket != ticket {
                    return;
                }
                schedule.pending = None;
                schedule.latest.clone()
            };
            if let Some(filters) = filters {
                Self::fire(&query, &factory, mode, filters);
            }
        }));
    }

    /// Fire the scheduled dispatch now instead of waiting out the interval.
    pub fn flush(&self) {
        let filters = {
            let mut schedule = self.schedule.lock();
            if schedule.torn_down || schedule.pending.is_none() {
                return;
            }
            schedule.cancel_pending();
            schedule.latest.clone()
        };
        if let Some(filters) = filters {
            Self::fire(&self.query, &self.factory, self.config.mode, filters);
        }
    }

    // Called without the schedule lock so the factory may call back into the trigger. A
    // teardown racing with this dispatch has already disposed the query, which ignores it.
    fn fire(
        query: &QueryLifecycle<T>,
        factory: &ProducerFactory<T, E>,
        mode: ExecuteMode,
        filters: FilterSet,
    ) {
        debug!(
            filters = ?filters.present().collect::<Vec<_>>(),
            "Debounce interval elapsed; dispatching query"
        );
        query.dispatch(mode, || factory(&filters));
    }
}

impl<T, E> DebouncedTrigger<T, E> {
    /// Whether a dispatch is currently scheduled
    pub fn is_pending(&self) -> bool {
        self.schedule.lock().pending.is_some()
    }

    /// Cancel any scheduled dispatch, stop observing changes and dispose the query, so a
    /// dispatch already in flight never lands.
    pub fn teardown(&self) {
        {
            let mut schedule = self.schedule.lock();
            if schedule.torn_down {
                return;
            }
            schedule.torn_down = true;
            schedule.cancel_pending();
        }
        self.query.dispose();
    }
}

impl<T, E> Drop for DebouncedTrigger<T, E> {
    fn drop(&mut self) {
        self.teardown();
    }
}
