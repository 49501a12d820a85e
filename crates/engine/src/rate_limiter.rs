// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sliding-window admission control per actor

use mirra_core::{ActorId, Clock, RateLimitConfig};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Admits at most `max_requests` per actor within any trailing `window`.
///
/// State is in memory only and resets with the process.
pub struct RateLimiter<C: Clock> {
    max_requests: usize,
    window: Duration,
    clock: C,
    windows: Mutex<HashMap<ActorId, VecDeque<Instant>>>,
}

impl<C: Clock> RateLimiter<C> {
    pub fn new(config: &RateLimitConfig, clock: C) -> Self {
        Self {
            max_requests: config.max_requests,
            window: config.window,
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request if the actor is under its ceiling
    pub fn admit(&self, actor: &ActorId) -> bool {
        let now = self.clock.now();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        // Actors whose newest request has left the window carry no state
        windows.retain(|_, stamps| {
            stamps
                .back()
                .is_some_and(|latest| now.duration_since(*latest) < self.window)
        });

        if self.max_requests == 0 {
            return false;
        }
        let stamps = windows.entry(actor.clone()).or_default();
        self.expire(stamps, now);
        if stamps.len() >= self.max_requests {
            return false;
        }
        stamps.push_back(now);
        true
    }

    /// Requests the actor may still make in the current window
    pub fn remaining(&self, actor: &ActorId) -> usize {
        let now = self.clock.now();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        let used = match windows.get_mut(actor) {
            Some(stamps) => {
                self.expire(stamps, now);
                stamps.len()
            }
            None => return self.max_requests,
        };
        if used == 0 {
            windows.remove(actor);
        }
        self.max_requests.saturating_sub(used)
    }

    pub fn reset(&self, actor: &ActorId) {
        self.windows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(actor);
    }

    fn expire(&self, stamps: &mut VecDeque<Instant>, now: Instant) {
        while let Some(oldest) = stamps.front() {
            if now.duration_since(*oldest) < self.window {
                break;
            }
            stamps.pop_front();
        }
    }
}

#[cfg(test)]
#[path = "rate_limiter_tests.rs"]
mod tests;
