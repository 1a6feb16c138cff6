//! Business logic and repository trait definitions for Taleweaver.
//!
//! This crate defines the "ports" (repository and LLM provider traits) that
//! the infrastructure layer implements, plus the tale generation pipeline and
//! lifecycle rules. It depends only on `taleweaver-types` -- never on
//! `taleweaver-infra` or any database/IO crate.

pub mod llm;
pub mod repository;
pub mod service;
pub mod tale;
