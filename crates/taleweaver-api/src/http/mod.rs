//! HTTP/REST API layer for Taleweaver.
//!
//! Axum-based REST API at `/api/v1/` with envelope responses, CORS, and the
//! upstream-supplied `X-User-Id` identity header.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
