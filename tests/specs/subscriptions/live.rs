//! Live subscription specs
//!
//! Change feeds mirror into the cache and reach callers once per snapshot.

use crate::prelude::*;

fn open_leads() -> SubscriptionQuery {
    SubscriptionQuery::new().filter(Filter::eq("status", "open"))
}

#[tokio::test]
async fn open_leads_feed_picks_up_new_matching_lead() {
    let h = Harness::new();
    h.create_lead("Ada").await;
    let (on_change, mut snapshots) = Snapshots::collector();

    h.access
        .subscribe(&lead(), open_leads(), "open-leads", on_change)
        .await;
    assert_eq!(names(&snapshots.next().await), vec!["Ada"]);

    let id = h.create_lead("Bob").await;

    let snapshot = snapshots.next().await;
    assert_eq!(names(&snapshot), vec!["Ada", "Bob"]);
    assert!(snapshot.iter().any(|d| d.id == id));
}

#[tokio::test]
async fn leads_that_stop_matching_leave_the_feed() {
    let h = Harness::new();
    let id = h.create_lead("Ada").await;
    let (on_change, mut snapshots) = Snapshots::collector();
    h.access
        .subscribe(&lead(), open_leads(), "open-leads", on_change)
        .await;
    snapshots.next().await;

    h.access
        .update(&lead(), &id, fields(json!({"status": "closed"})), None)
        .await
        .unwrap();

    assert!(snapshots.next().await.is_empty());
}

#[tokio::test]
async fn subscribing_twice_with_one_key_keeps_one_listener() {
    let h = Harness::new();
    let (first, mut first_snapshots) = Snapshots::collector();
    let (second, mut second_snapshots) = Snapshots::collector();

    h.access
        .subscribe(&lead(), open_leads(), "open-leads", first)
        .await;
    first_snapshots.next().await;
    h.access
        .subscribe(&lead(), open_leads(), "open-leads", second)
        .await;
    second_snapshots.next().await;

    h.create_lead("Ada").await;

    assert_eq!(names(&second_snapshots.next().await), vec!["Ada"]);
    assert!(first_snapshots.quiet().await);
    assert_eq!(h.access.subscriptions().active_keys(), vec!["open-leads"]);
}

#[tokio::test]
async fn explicit_order_is_honoured_alongside_filters() {
    let h = Harness::new();
    for name in ["Ada", "Bob", "Cy"] {
        h.create_lead(name).await;
    }
    let (on_change, mut snapshots) = Snapshots::collector();

    h.access
        .subscribe(
            &lead(),
            open_leads().order(Order::newest_first()),
            "newest-open",
            on_change,
        )
        .await;

    assert_eq!(names(&snapshots.next().await), vec!["Cy", "Bob", "Ada"]);
}

#[tokio::test]
async fn feed_failure_degrades_to_cached_documents() {
    let h = Harness::new();
    h.create_lead("Ada").await;
    h.create_lead("Bob").await;
    let (on_change, mut snapshots) = Snapshots::collector();
    h.access
        .subscribe(&lead(), open_leads(), "open-leads", on_change)
        .await;
    snapshots.next().await;

    h.network(false);
    h.store
        .push_feed_error("lead", RemoteError::Unavailable("connection reset".into()));

    assert_eq!(names(&snapshots.next().await), vec!["Ada", "Bob"]);
    assert!(!h.access.connection_status().online);
}

#[tokio::test]
async fn failed_setup_reports_an_empty_result() {
    let h = Harness::new();
    h.create_lead("Ada").await;
    h.store.set_watch_fails(true);
    let (on_change, mut snapshots) = Snapshots::collector();

    let handle = h
        .access
        .subscribe(&lead(), open_leads(), "open-leads", on_change)
        .await;

    assert!(snapshots.next().await.is_empty());
    assert!(!handle.is_active());
}

#[tokio::test]
async fn unsubscribe_is_idempotent_and_final() {
    let h = Harness::new();
    let (on_change, mut snapshots) = Snapshots::collector();
    let handle = h
        .access
        .subscribe(&lead(), open_leads(), "open-leads", on_change)
        .await;
    snapshots.next().await;

    handle.unsubscribe();
    handle.unsubscribe();
    h.create_lead("Ada").await;

    assert!(snapshots.quiet().await);
    assert!(h.access.subscriptions().active_keys().is_empty());
}
