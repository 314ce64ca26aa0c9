//! HTTP handlers
//!
//! - health: liveness and readiness
//! - catalog: ingredient catalog listing
//! - price: pricing a form
//! - recipes: saved recipe CRUD and pricing
//! - quotes: quote drafts, exports and history
//! - metrics_handler: Prometheus exposition

pub mod catalog;
pub mod health;
pub mod metrics_handler;
pub mod price;
pub mod quotes;
pub mod recipes;

use crate::pricing::PricingService;

/// Shared state for the API routes
#[derive(Clone)]
pub struct AppState {
    pub service: PricingService,
}
