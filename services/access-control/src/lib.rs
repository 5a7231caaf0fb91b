//! Catalog access-control service library crate.
//!
//! # Purpose
//! Exposes the HTTP API, configuration, storage and the store-backed
//! validation collaborators for use by the binary and tests.
pub mod api;
pub mod app;
pub mod config;
pub mod lookups;
pub mod observability;
pub mod seed;
pub mod store;
