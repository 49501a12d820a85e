//! Rate limiting specs
//!
//! Mutations are admitted per actor within a trailing window.

use crate::prelude::*;

#[tokio::test]
async fn fifty_first_create_within_a_minute_is_rejected() {
    let h = Harness::new();
    let actor = ActorId::from("counselor-7");

    for i in 0..50 {
        let name = format!("Lead {}", i);
        h.access
            .create(&lead(), lead_input(&name), Some(&actor))
            .await
            .unwrap();
    }
    let err = h
        .access
        .create(&lead(), lead_input("Lead 51"), Some(&actor))
        .await
        .unwrap_err();

    assert!(matches!(err, AccessError::RateLimitExceeded { .. }));
    assert_eq!(h.store.documents("lead").len(), 50);
}

#[tokio::test]
async fn admission_resumes_once_the_window_passes() {
    let h = Harness::with_config(
        AccessConfig::default().with_rate_limit(3, Duration::from_secs(60)),
    );
    let actor = ActorId::from("alice");
    for name in ["Ada", "Bob", "Cy"] {
        h.access
            .create(&lead(), lead_input(name), Some(&actor))
            .await
            .unwrap();
    }
    assert!(h
        .access
        .create(&lead(), lead_input("Dee"), Some(&actor))
        .await
        .is_err());

    h.clock.advance(Duration::from_secs(60));

    assert!(h
        .access
        .create(&lead(), lead_input("Dee"), Some(&actor))
        .await
        .is_ok());
}

#[tokio::test]
async fn each_actor_has_its_own_window() {
    let h = Harness::with_config(
        AccessConfig::default().with_rate_limit(1, Duration::from_secs(60)),
    );
    let alice = ActorId::from("alice");
    let bob = ActorId::from("bob");

    h.access
        .create(&lead(), lead_input("Ada"), Some(&alice))
        .await
        .unwrap();

    assert!(h
        .access
        .create(&lead(), lead_input("Bob"), Some(&bob))
        .await
        .is_ok());
    assert!(h
        .access
        .update(&lead(), &DocumentId::from("x"), Fields::new(), Some(&alice))
        .await
        .is_err_and(|e| matches!(e, AccessError::RateLimitExceeded { .. })));
}

#[tokio::test]
async fn rejected_requests_never_reach_the_store() {
    let h = Harness::with_config(
        AccessConfig::default().with_rate_limit(0, Duration::from_secs(60)),
    );
    let actor = ActorId::from("alice");

    let _ = h
        .access
        .create(&lead(), lead_input("Ada"), Some(&actor))
        .await;
    let _ = h
        .access
        .delete(&lead(), &DocumentId::from("x"), Some(&actor))
        .await;

    assert!(h.store.calls().is_empty());
}
