//! Anthropic Claude generation backend.
//!
//! [`AnthropicProvider`] implements the
//! [`LlmProvider`](taleweaver_core::llm::provider::LlmProvider) trait against
//! the non-streaming Anthropic Messages API.

pub mod client;
pub mod types;

pub use client::AnthropicProvider;
