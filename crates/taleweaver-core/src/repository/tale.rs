//! Tale repository trait definition.

use taleweaver_types::error::RepositoryError;
use taleweaver_types::tale::{LikeStatus, Tale, TaleId, UserId};

/// Repository trait for tale persistence.
///
/// Implementations live in taleweaver-infra (e.g., SqliteTaleRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
///
/// Implementations must give per-record read-modify-write atomicity for the
/// liker toggle: it decides, mutates and counts the set as one unit, so
/// concurrent toggles by one user alternate instead of both adding.
pub trait TaleRepository: Send + Sync {
    /// Insert a new tale. Returns the stored tale.
    fn create(
        &self,
        tale: &Tale,
    ) -> impl std::future::Future<Output = Result<Tale, RepositoryError>> + Send;

    /// Get a tale by ID. `Ok(None)` when it does not exist.
    fn find_by_id(
        &self,
        id: &TaleId,
    ) -> impl std::future::Future<Output = Result<Option<Tale>, RepositoryError>> + Send;

    /// All public tales, newest first.
    fn find_public(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Tale>, RepositoryError>> + Send;

    /// All tales by one author, newest first.
    fn find_by_author(
        &self,
        author: &UserId,
    ) -> impl std::future::Future<Output = Result<Vec<Tale>, RepositoryError>> + Send;

    /// Persist the mutable fields of an existing tale (visibility).
    ///
    /// Identity, authorship, content and creation time are immutable and are
    /// not written. Likers are managed through `toggle_liker`.
    fn save(
        &self,
        tale: &Tale,
    ) -> impl std::future::Future<Output = Result<Tale, RepositoryError>> + Send;

    /// Permanently delete a tale and its likes.
    fn delete(
        &self,
        id: &TaleId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Flip `user`'s membership in the liker set: remove when present, add
    /// otherwise. Returns the resulting set size and membership.
    ///
    /// Fails with `NotFound` when the tale does not exist.
    fn toggle_liker(
        &self,
        id: &TaleId,
        user: &UserId,
    ) -> impl std::future::Future<Output = Result<LikeStatus, RepositoryError>> + Send;
}
