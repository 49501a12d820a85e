// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reachability of the remote store

use mirra_adapters::RemoteStore;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Online,
    /// A transient failure was observed; `attempts` counts failed reconnects
    Reconnecting { attempts: u32 },
}

/// Tracks whether the remote store is believed reachable.
///
/// The tracker never retries on its own. Callers decide when a reconnect is
/// worth attempting and supply the probe.
#[derive(Debug, Clone)]
pub struct ConnectionTracker {
    state: Arc<Mutex<ConnectionState>>,
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ConnectionState::Online)),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_online(&self) -> bool {
        self.state() == ConnectionState::Online
    }

    pub fn mark_unreachable(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state == ConnectionState::Online {
            tracing::warn!("remote store unreachable");
            *state = ConnectionState::Reconnecting { attempts: 0 };
        }
    }

    /// Run the probe and transition on its outcome. Returns whether online.
    pub async fn attempt_reconnect<F>(&self, probe: F) -> bool
    where
        F: Future<Output = bool>,
    {
        let reachable = probe.await;

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match (*state, reachable) {
            (ConnectionState::Online, _) => {}
            (ConnectionState::Reconnecting { attempts }, true) => {
                tracing::info!(attempts, "remote store reconnected");
                *state = ConnectionState::Online;
            }
            (ConnectionState::Reconnecting { attempts }, false) => {
                tracing::debug!(attempts = attempts + 1, "reconnect failed");
                *state = ConnectionState::Reconnecting {
                    attempts: attempts.saturating_add(1),
                };
            }
        }
        *state == ConnectionState::Online
    }

    /// Probe the store's reconnect within `timeout`
    pub async fn reconnect_store<S: RemoteStore>(&self, store: &S, timeout: Duration) -> bool {
        self.attempt_reconnect(async {
            matches!(tokio::time::timeout(timeout, store.reconnect()).await, Ok(Ok(())))
        })
        .await
    }
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
