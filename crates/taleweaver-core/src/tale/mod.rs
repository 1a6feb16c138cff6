//! Tale generation pipeline: prompt construction, template fallback, and the
//! synthesizer that ties them to a generation backend.

pub mod prompt;
pub mod synthesizer;
pub mod template;
