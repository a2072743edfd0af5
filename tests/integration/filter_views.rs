//! Integration tests for filter-driven views
//!
//! Tests cover:
//! - Search-as-you-type coalescing
//! - Slow stale searches never overwriting newer results
//! - Blank search text resetting the view
//! - Browse refetching when every filter is cleared
//! - Configured debounce intervals
//! - Closed views dropping results still in flight

use crate::integration::test_utils::{harness, settle, Catalog, SavedStore, Session};
use marquee::{CatalogConfig, CatalogRuntime, FilterSet, ItemId, QueryStatus};
use std::time::Duration;
use tokio::time::sleep;

const LATENCY: Duration = Duration::from_millis(20);

fn text(value: &str) -> FilterSet {
    FilterSet::new().with("query", Some(value))
}

#[tokio::test(start_paused = true)]
async fn test_typing_burst_issues_one_search() {
    let h = harness(false, LATENCY);
    let search = h.runtime.search_view();

    for partial in ["s", "se", "sev", "seven"] {
        search.update(text(partial));
        sleep(Duration::from_millis(100)).await;
    }
    settle().await;

    assert_eq!(*h.catalog.searches.lock(), vec!["seven".to_string()]);
    let state = search.query().state();
    assert_eq!(state.status, QueryStatus::Success);
    assert_eq!(state.data.unwrap()[0].title, "seven");
}

#[tokio::test(start_paused = true)]
async fn test_slow_stale_search_is_discarded() {
    let h = harness(false, LATENCY);
    h.catalog.delay_query("alien", Duration::from_secs(2));
    let search = h.runtime.search_view();

    search.update(text("alien"));
    sleep(Duration::from_millis(600)).await;
    search.update(text("aliens"));
    sleep(Duration::from_millis(600)).await;
    assert_eq!(search.query().state().data.unwrap()[0].title, "aliens");

    sleep(Duration::from_secs(3)).await;
    assert_eq!(
        *h.catalog.searches.lock(),
        vec!["alien".to_string(), "aliens".to_string()]
    );
    let state = search.query().state();
    assert_eq!(state.status, QueryStatus::Success);
    assert_eq!(state.data.unwrap()[0].title, "aliens");
}

#[tokio::test(start_paused = true)]
async fn test_clearing_search_text_resets_view() {
    let h = harness(false, LATENCY);
    let search = h.runtime.search_view();

    search.update(text("heat"));
    settle().await;
    assert_eq!(search.query().state().status, QueryStatus::Success);

    search.update(text("   "));
    let state = search.query().state();
    assert_eq!(state.status, QueryStatus::Idle);
    assert!(state.data.is_none());

    settle().await;
    assert_eq!(*h.catalog.searches.lock(), vec!["heat".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_search_view_cancels_pending_search() {
    let h = harness(false, LATENCY);
    let search = h.runtime.search_view();
    search.update(text("ran"));
    sleep(Duration::from_millis(100)).await;
    drop(search);

    settle().await;
    assert!(h.catalog.searches.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_browse_clearing_filters_refetches_everything() {
    let h = harness(false, LATENCY);
    let browse = h.runtime.browse_view();

    let mut filters = FilterSet::new();
    filters.set("genre", Some("28"));
    filters.set("year", Some("1954"));
    browse.update(filters.clone());
    settle().await;
    assert_eq!(
        browse.query().state().data.unwrap()[0].title,
        "genre=28&year=1954"
    );

    filters.clear();
    browse.update(filters);
    settle().await;
    let state = browse.query().state();
    assert_eq!(state.status, QueryStatus::Success);
    assert_eq!(state.data.unwrap()[0].title, "");
}

#[tokio::test(start_paused = true)]
async fn test_configured_debounce_interval_is_used() {
    let mut config = CatalogConfig::default();
    config.search.debounce_ms = 250;
    let catalog = Catalog::new();
    let runtime = CatalogRuntime::new(
        config,
        Session::new(false),
        SavedStore::new(LATENCY),
        catalog.clone(),
    );
    let search = runtime.search_view();

    search.update(text("ikiru"));
    sleep(Duration::from_millis(240)).await;
    assert!(catalog.searches.lock().is_empty());

    sleep(Duration::from_millis(20)).await;
    assert_eq!(*catalog.searches.lock(), vec!["ikiru".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_genre_rows_load_independently() {
    let h = harness(false, LATENCY);
    let action = h.runtime.genre_row(28);
    let drama = h.runtime.genre_row(18);
    settle().await;

    assert_eq!(action.state().data.unwrap()[0].id.0, 28);
    assert_eq!(drama.state().data.unwrap()[0].id.0, 18);
}

#[tokio::test(start_paused = true)]
async fn test_closed_search_view_drops_search_in_flight() {
    let h = harness(false, LATENCY);
    h.catalog.delay_query("ran", Duration::from_millis(300));
    let search = h.runtime.search_view();
    let mut rx = search.query().watch();

    search.update(text("ran"));
    sleep(Duration::from_millis(550)).await;
    assert_eq!(*h.catalog.searches.lock(), vec!["ran".to_string()]);
    assert_eq!(search.query().state().status, QueryStatus::Pending);
    drop(search);

    settle().await;
    assert_eq!(rx.borrow_and_update().status, QueryStatus::Pending);
    assert!(!rx.has_changed().unwrap_or(false));
}

#[tokio::test(start_paused = true)]
async fn test_detail_parts_settle_independently() {
    let h = harness(false, LATENCY);
    let detail = h.runtime.detail_view(ItemId(42), "JP");

    sleep(Duration::from_millis(50)).await;
    assert_eq!(detail.details().state().data.unwrap().runtime_minutes, Some(207));
    assert_eq!(detail.providers().state().data, Some(vec!["JP streaming".to_string()]));
    assert_eq!(detail.credits().state().status, QueryStatus::Pending);

    let credits = detail.credits().clone();
    drop(detail);
    settle().await;
    assert_eq!(credits.state().status, QueryStatus::Pending);
}
