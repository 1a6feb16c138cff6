//! HTTP request handlers for the REST API.

pub mod generation;
pub mod tale;
