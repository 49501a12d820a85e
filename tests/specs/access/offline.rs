//! Offline continuity specs
//!
//! Reads keep answering from the local mirror while the store is down.

use crate::prelude::*;

#[tokio::test]
async fn get_returns_last_cached_value_when_unreachable() {
    let h = Harness::new();
    let id = h.create_lead("Ada").await;
    h.access
        .update(&lead(), &id, fields(json!({"priority": "high"})), None)
        .await
        .unwrap();
    h.network(false);

    let doc = h.access.get(&lead(), &id).await.unwrap();

    assert_eq!(doc.fields["priority"], "high");
    assert!(!h.access.connection_status().online);
}

#[tokio::test]
async fn get_is_absent_when_never_cached() {
    let h = Harness::new();
    h.store.insert(Document::new(
        lead(),
        DocumentId::from("remote-only"),
        lead_input("Ada"),
    ));
    h.network(false);

    assert!(h.access.get(&lead(), &"remote-only".into()).await.is_none());
}

#[tokio::test]
async fn subscription_snapshots_feed_offline_reads() {
    let h = Harness::new();
    h.store.insert(Document::new(
        lead(),
        DocumentId::from("seen-by-feed"),
        lead_input("Ada"),
    ));
    let (on_change, mut snapshots) = Snapshots::collector();
    h.access
        .subscribe(&lead(), SubscriptionQuery::new(), "all", on_change)
        .await;
    snapshots.next().await;
    h.network(false);

    let doc = h.access.get(&lead(), &"seen-by-feed".into()).await;

    assert_eq!(doc.unwrap().fields["name"], "Ada");
}

#[tokio::test]
async fn bulk_reads_fall_back_to_the_mirror() {
    let h = Harness::new();
    for name in ["Ada", "Bob", "Cy"] {
        h.create_lead(name).await;
    }
    h.access
        .create(
            &EntityKind::from("user"),
            fields(json!({"email": "root@example.com", "displayName": "Root"})),
            None,
        )
        .await
        .unwrap();
    h.network(false);

    let page = h.access.get_many(&lead(), PageRequest::new(10)).await;

    assert_eq!(names(&page.docs), vec!["Ada", "Bob", "Cy"]);
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn service_resumes_after_the_network_returns() {
    let h = Harness::new();
    let id = h.create_lead("Ada").await;
    h.network(false);
    assert!(h.access.get(&lead(), &id).await.is_some());
    assert!(!h.access.connection_status().online);

    h.network(true);
    h.access
        .update(&lead(), &id, fields(json!({"status": "resolved"})), None)
        .await
        .unwrap();

    assert!(h.access.connection_status().online);
    assert_eq!(
        h.store.document("lead", id.as_str()).unwrap().fields["status"],
        "resolved"
    );
}

#[tokio::test(start_paused = true)]
async fn slow_reads_are_treated_as_unreachable() {
    let h = Harness::with_config(
        AccessConfig::default().with_remote_timeout(Duration::from_secs(2)),
    );
    let id = h.create_lead("Ada").await;
    h.store.set_latency(Some(Duration::from_secs(30)));

    let doc = h.access.get(&lead(), &id).await;

    assert_eq!(doc.unwrap().fields["name"], "Ada");
    assert!(!h.access.connection_status().online);
}
