//! Service layer: business logic orchestrating repositories and the
//! generation pipeline.

pub mod tale;
