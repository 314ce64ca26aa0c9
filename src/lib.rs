pub mod catalog;
pub mod config;
pub mod delivery;
pub mod error;
pub mod export;
pub mod form;
pub mod handlers;
pub mod metrics;
pub mod money;
pub mod payment;
pub mod pricing;
pub mod quote;
pub mod recipe;
pub mod server;
pub mod signals;
pub mod storage;
pub mod units;
pub mod warnings;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// `RUST_LOG` wins over `level`. `format` is "json" or anything else for
/// human-readable output. Can only be called once per process.
pub fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);

    if format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_target(true))
            .init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}
