//! Infrastructure layer for Taleweaver.
//!
//! Implementations of the ports defined in `taleweaver-core`: SQLite tale
//! storage and the Anthropic generation backend, plus the `config.toml`
//! loader.

pub mod config;
pub mod llm;
pub mod sqlite;
