//! Document lifecycle specs
//!
//! Create, update, and delete through the facade, with auditing.

use crate::prelude::*;

#[tokio::test]
async fn updating_a_never_created_document_is_not_found() {
    let h = Harness::new();
    let id = DocumentId::from("lead-that-never-was");

    let err = h
        .access
        .update(&lead(), &id, fields(json!({"status": "resolved"})), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AccessError::DocumentNotFound { .. }));
    assert_eq!(err.to_string(), "document not found: lead/lead-that-never-was");
    assert_eq!(h.access.connection_status().cache_size, 0);
}

#[tokio::test]
async fn document_lifecycle_is_audited() {
    let h = Harness::new();
    let actor = ActorId::from("counselor-1");

    let id = h
        .access
        .create(&lead(), lead_input("Ada"), Some(&actor))
        .await
        .unwrap();
    h.access
        .update(
            &lead(),
            &id,
            fields(json!({"status": "in_progress", "assignedTo": "counselor-1"})),
            Some(&actor),
        )
        .await
        .unwrap();
    h.access.delete(&lead(), &id, Some(&actor)).await.unwrap();
    h.access.shutdown().await;

    assert!(h.access.get(&lead(), &id).await.is_none());
    let trail: Vec<Fields> = h
        .store
        .documents("audit_logs")
        .into_iter()
        .map(|d| d.fields)
        .collect();
    let actions: Vec<_> = trail.iter().map(|r| r["action"].clone()).collect();
    assert_eq!(actions, vec![json!("create"), json!("update"), json!("delete")]);
    assert!(trail.iter().all(|r| r["actor"] == "counselor-1"));
    assert!(trail.iter().all(|r| r["documentId"] == id.as_str()));
    assert_eq!(trail[1]["before"]["status"], "open");
    assert_eq!(trail[1]["after"]["status"], "in_progress");
    assert_eq!(trail[1]["after"]["assignedTo"], "counselor-1");
}

#[tokio::test]
async fn writes_fail_loudly_when_the_store_is_unreachable() {
    let h = Harness::new();
    let id = h.create_lead("Ada").await;
    h.network(false);

    let create = h.access.create(&lead(), lead_input("Bob"), None).await;
    let update = h
        .access
        .update(&lead(), &id, fields(json!({"status": "closed"})), None)
        .await;
    let delete = h.access.delete(&lead(), &id, None).await;

    assert!(matches!(create, Err(AccessError::RemoteWrite { .. })));
    assert!(matches!(update, Err(AccessError::RemoteWrite { .. })));
    assert!(matches!(delete, Err(AccessError::RemoteWrite { .. })));
    assert_eq!(
        h.store.document("lead", id.as_str()).unwrap().fields["status"],
        "open"
    );
}

#[tokio::test]
async fn audit_backpressure_never_blocks_writes() {
    let h = Harness::with_config(AccessConfig::default().with_audit_queue_capacity(1));

    for name in ["Ada", "Bob", "Cy", "Dee", "Eve"] {
        h.create_lead(name).await;
    }
    h.access.shutdown().await;

    assert_eq!(h.store.documents("lead").len(), 5);
    assert!(h.store.documents("audit_logs").len() <= 5);
}

#[tokio::test]
async fn identifiers_are_never_reused() {
    let h = Harness::new();
    let first = h.create_lead("Ada").await;
    h.access.delete(&lead(), &first, None).await.unwrap();

    let second = h.create_lead("Ada").await;

    assert_ne!(first, second);
}

fn seed_remote_lead(h: &Harness, id: &str) -> DocumentId {
    let mut input = lead_input("Ada");
    input.insert("status".into(), json!("open"));
    h.store.insert(Document::new(lead(), DocumentId::from(id), input));
    DocumentId::from(id)
}

#[tokio::test]
async fn updates_reach_uncached_documents_after_a_network_blip() {
    let h = Harness::new();
    let id = seed_remote_lead(&h, "remote-only");
    h.network(false);
    assert!(h.access.get(&lead(), &"other".into()).await.is_none());
    h.network(true);

    h.access
        .update(&lead(), &id, fields(json!({"status": "resolved"})), None)
        .await
        .unwrap();

    assert_eq!(
        h.store.document("lead", "remote-only").unwrap().fields["status"],
        "resolved"
    );
    assert!(h.access.connection_status().online);
}

#[tokio::test]
async fn updates_during_an_outage_report_the_outage() {
    let h = Harness::new();
    let id = seed_remote_lead(&h, "remote-only");
    h.network(false);

    let err = h
        .access
        .update(&lead(), &id, fields(json!({"status": "resolved"})), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AccessError::RemoteWrite { .. }));
}

#[tokio::test]
async fn deletes_after_a_network_blip_audit_the_prior_state() {
    let h = Harness::new();
    let id = seed_remote_lead(&h, "remote-only");
    h.network(false);
    assert!(h.access.get(&lead(), &"other".into()).await.is_none());
    h.network(true);

    h.access.delete(&lead(), &id, None).await.unwrap();
    h.access.shutdown().await;

    let trail = h.store.documents("audit_logs");
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].fields["before"]["name"], "Ada");
    assert_eq!(trail[0].fields["before"]["status"], "open");
}
