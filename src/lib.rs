// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Fitplan: backend for an AI fitness-coaching app
//!
//! This crate keeps users in sync with Clerk via signed webhooks and
//! generates workout and diet plans with Gemini, validating the model's
//! JSON before it is stored.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::PlanStore;
use services::{EventDeduplicator, PlanGenerator};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn PlanStore>,
    pub generator: Arc<dyn PlanGenerator>,
    pub webhook_dedup: EventDeduplicator,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn PlanStore>,
        generator: Arc<dyn PlanGenerator>,
    ) -> Self {
        Self {
            config,
            store,
            generator,
            webhook_dedup: EventDeduplicator::default(),
        }
    }
}
