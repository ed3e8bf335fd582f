// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory record of webhook deliveries that were already handled.
//!
//! Svix delivers at least once and retries with the same `svix-id`. Ids are
//! remembered for the replay window only: anything older is rejected by the
//! signature check anyway. State is per instance.

use crate::services::webhook_verifier::TIMESTAMP_TOLERANCE_SECS;
use dashmap::DashMap;

/// Tracks successfully processed delivery ids.
pub struct EventDeduplicator {
    /// svix-id -> Unix seconds when processing succeeded
    processed: DashMap<String, i64>,
    window_secs: i64,
}

impl Default for EventDeduplicator {
    fn default() -> Self {
        Self::new(TIMESTAMP_TOLERANCE_SECS)
    }
}

impl EventDeduplicator {
    pub fn new(window_secs: i64) -> Self {
        Self {
            processed: DashMap::new(),
            window_secs,
        }
    }

    /// Whether `id` was processed within the window ending at `now`.
    pub fn is_processed(&self, id: &str, now: i64) -> bool {
        self.processed
            .get(id)
            .is_some_and(|seen_at| now - *seen_at <= self.window_secs)
    }

    /// Record `id` as processed. Expired entries are pruned first.
    pub fn mark_processed(&self, id: &str, now: i64) {
        self.processed
            .retain(|_, seen_at| now - *seen_at <= self.window_secs);
        self.processed.insert(id.to_string(), now);
    }

    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }
}
