//! Configuration module
//!
//! Host-level settings for the explorer: where the data API lives and how
//! the explorer behaves. Per-table column configuration is not here; it
//! travels with each `TableSchema`.

pub mod config;

pub use config::Config;
