//! LLM provider abstractions for Taleweaver.
//!
//! - `LlmProvider`: RPITIT trait for concrete generation backends
//! - `BoxLlmProvider`: object-safe wrapper for dynamic dispatch

pub mod box_provider;
pub mod provider;
