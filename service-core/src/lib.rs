//! service-core: Shared infrastructure for the plant care relay and its tooling.
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod observability;

