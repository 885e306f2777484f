//! AML quick-look engine: window metrics and spotlight flags over transaction tables.

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod narrative;
pub mod payload;
pub mod spotlight;
pub mod types;
