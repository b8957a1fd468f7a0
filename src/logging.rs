//! Tracing setup
//!
//! The explorer logs state transitions at debug level and absorbed widget
//! failures at warn; the host decides how much of that to surface via
//! `RUST_LOG`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for a host application.
///
/// Respects `RUST_LOG`; defaults to `info` with the explorer's own
/// `tablex` targets at debug. Safe to call once at startup.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tablex=debug"));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    tracing::debug!(target: "system", "tracing initialized");
}
