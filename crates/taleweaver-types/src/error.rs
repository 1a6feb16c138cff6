use thiserror::Error;

/// Errors surfaced by tale operations.
///
/// Everything except `Storage` is an expected, recoverable outcome the
/// transport layer translates into a user-facing response. `Storage` carries
/// infrastructure faults through unmasked.
#[derive(Debug, Error)]
pub enum TaleError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("tale not found")]
    NotFound,

    #[error("not authorized to modify this tale")]
    Forbidden,

    #[error("tale generation failed: {0}")]
    Generation(String),

    #[error("tale generation is unavailable")]
    GenerationUnavailable,

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors from the tale synthesizer.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The backend answered (or timed out) but produced nothing usable.
    #[error("{0}")]
    Failure(String),
}

impl From<GenerationError> for TaleError {
    fn from(e: GenerationError) -> Self {
        match e {
            GenerationError::Failure(msg) => TaleError::Generation(msg),
        }
    }
}

/// Errors from repository operations (used by trait definitions in taleweaver-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tale_error_display() {
        let err = TaleError::Validation("title is required".to_string());
        assert_eq!(err.to_string(), "validation error: title is required");
        assert_eq!(TaleError::Forbidden.to_string(), "not authorized to modify this tale");
    }

    #[test]
    fn test_generation_error_converts() {
        let err: TaleError = GenerationError::Failure("empty response".to_string()).into();
        assert!(matches!(err, TaleError::Generation(msg) if msg == "empty response"));
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }
}
