//! HTTP API handlers for beatschain-dp
//!
//! Read-only JSON endpoints over the unified data provider.

pub mod catalog;
pub mod health;

pub use catalog::catalog_routes;
pub use health::health_routes;
