//! Shared fixtures for document access specs

#![allow(dead_code, unused_imports)]

pub use mirra_adapters::{FakeRemoteStore, RemoteError, StoreCall, TracedRemoteStore};
pub use mirra_core::{
    AccessConfig, ActorId, Document, DocumentId, EntityKind, FakeClock, Fields, Filter, Order,
    PageRequest, ValidationError, ValidationReason,
};
pub use mirra_engine::{AccessError, DocumentAccess, SubscriptionQuery};
pub use serde_json::json;
pub use std::time::Duration;

use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

pub type Access = DocumentAccess<TracedRemoteStore<FakeRemoteStore>, FakeClock>;

/// Install a test subscriber once; `RUST_LOG` controls verbosity
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// An access layer wired to a fake store and a controllable clock
pub struct Harness {
    pub access: Access,
    pub store: FakeRemoteStore,
    pub clock: FakeClock,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(AccessConfig::default())
    }

    pub fn with_config(config: AccessConfig) -> Self {
        init_tracing();
        let store = FakeRemoteStore::new();
        let clock = FakeClock::new();
        let access = DocumentAccess::new(
            TracedRemoteStore::new(store.clone()),
            clock.clone(),
            config,
        );
        Self {
            access,
            store,
            clock,
        }
    }

    pub async fn create_lead(&self, name: &str) -> DocumentId {
        self.access
            .create(&lead(), lead_input(name), None)
            .await
            .unwrap()
    }

    /// Take the remote store down (or bring it back)
    pub fn network(&self, up: bool) {
        self.store.set_unreachable(!up);
    }
}

pub fn fields(value: serde_json::Value) -> Fields {
    value.as_object().cloned().unwrap()
}

pub fn lead() -> EntityKind {
    EntityKind::from("lead")
}

pub fn lead_input(name: &str) -> Fields {
    let mailbox: String = name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase();
    fields(json!({
        "name": name,
        "email": format!("{}@example.com", mailbox),
        "doubtDescription": "Which scholarships are open to transfer students?",
    }))
}

/// Receives every snapshot handed to a subscription callback
pub struct Snapshots {
    rx: mpsc::UnboundedReceiver<Vec<Document>>,
}

impl Snapshots {
    pub fn collector() -> (impl FnMut(Vec<Document>) + Send + 'static, Snapshots) {
        let (tx, rx) = mpsc::unbounded_channel();
        let on_change = move |docs| {
            let _ = tx.send(docs);
        };
        (on_change, Snapshots { rx })
    }

    pub async fn next(&mut self) -> Vec<Document> {
        tokio::time::timeout(Duration::from_secs(5), self.rx.recv())
            .await
            .expect("no snapshot within 5s")
            .expect("subscription callback dropped")
    }

    /// Nothing delivered within a short grace period
    pub async fn quiet(&mut self) -> bool {
        !matches!(
            tokio::time::timeout(Duration::from_millis(50), self.rx.recv()).await,
            Ok(Some(_))
        )
    }
}

pub fn names(docs: &[Document]) -> Vec<String> {
    docs.iter()
        .map(|d| d.fields["name"].as_str().unwrap_or_default().to_string())
        .collect()
}
