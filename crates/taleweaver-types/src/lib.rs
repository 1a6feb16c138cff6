//! Shared domain types for Taleweaver.
//!
//! This crate contains the core domain types used across the Taleweaver
//! workspace: Tale and its identifiers, the age band and mood enumerations,
//! request/draft shapes, LLM request types, configuration, and error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod llm;
pub mod tale;
