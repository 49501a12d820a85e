//! Configuration specs
//!
//! Limits come from configuration rather than constants.

use crate::prelude::*;

const CONFIG: &str = r#"
max_page_size = 2
cache_capacity = 2
audit_collection = "trail"

[rate_limit]
max_requests = 4
window = "30s"
"#;

fn configured() -> Harness {
    Harness::with_config(AccessConfig::from_toml_str(CONFIG).unwrap())
}

#[tokio::test]
async fn page_size_ceiling_comes_from_config() {
    let h = configured();
    for name in ["Ada", "Bob", "Cy"] {
        h.create_lead(name).await;
    }

    let page = h.access.get_many(&lead(), PageRequest::new(100)).await;

    assert_eq!(page.docs.len(), 2);
    assert!(page.next_cursor.is_some());
}

#[tokio::test]
async fn rate_limit_comes_from_config() {
    let h = configured();
    let actor = ActorId::from("alice");
    for name in ["Ada", "Bob", "Cy", "Dee"] {
        h.access
            .create(&lead(), lead_input(name), Some(&actor))
            .await
            .unwrap();
    }

    assert!(h
        .access
        .create(&lead(), lead_input("Eve"), Some(&actor))
        .await
        .is_err());
    h.clock.advance(Duration::from_secs(30));
    assert!(h
        .access
        .create(&lead(), lead_input("Eve"), Some(&actor))
        .await
        .is_ok());
}

#[tokio::test]
async fn cache_capacity_bounds_the_mirror() {
    let h = configured();
    for name in ["Ada", "Bob", "Cy"] {
        h.create_lead(name).await;
    }

    assert_eq!(h.access.connection_status().cache_size, 2);
}

#[tokio::test]
async fn audit_records_go_to_the_configured_collection() {
    let h = configured();
    h.create_lead("Ada").await;
    h.access.shutdown().await;

    assert_eq!(h.store.documents("trail").len(), 1);
    assert!(h.store.documents("audit_logs").is_empty());
}
