//! Custom Axum extractors.

pub mod user;
