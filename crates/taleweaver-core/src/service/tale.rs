//! Tale service.
//!
//! Owns the tale lifecycle (validated creation, author-gated visibility
//! change and deletion), the listings, and the like toggle. Generation goes
//! through [`TaleSynthesizer`]; drafts are never persisted here, a caller
//! that wants to keep one submits it through `create_tale`.

use taleweaver_types::error::{RepositoryError, TaleError};
use taleweaver_types::llm::BackendStatus;
use taleweaver_types::tale::{
    AgeBand, CreateTaleRequest, GenerateTaleRequest, GeneratedTale, GenerationParams, LikeStatus,
    Mood, Tale, TaleId, TaleView, UpdateTaleRequest, UserId,
};

use crate::repository::tale::TaleRepository;
use crate::tale::synthesizer::TaleSynthesizer;

/// Service orchestrating tale generation and the tale lifecycle.
///
/// Generic over the repository so taleweaver-core never depends on
/// taleweaver-infra.
pub struct TaleService<R: TaleRepository> {
    repo: R,
    synthesizer: TaleSynthesizer,
}

impl<R: TaleRepository> TaleService<R> {
    pub fn new(repo: R, synthesizer: TaleSynthesizer) -> Self {
        Self { repo, synthesizer }
    }

    pub fn synthesizer(&self) -> &TaleSynthesizer {
        &self.synthesizer
    }

    /// Generate an unpersisted tale from raw request parameters.
    ///
    /// Fails with `Validation` on missing or out-of-domain parameters,
    /// `Generation` when the backend produced nothing usable, and
    /// `GenerationUnavailable` when neither backend nor fallback could run.
    #[tracing::instrument(skip_all)]
    pub async fn generate(&self, request: GenerateTaleRequest) -> Result<GeneratedTale, TaleError> {
        let params = GenerationParams {
            child_age: parse_age(request.child_age.as_deref())?,
            topic: required_text("topic", request.topic.as_deref())?,
            setting: optional_text(request.setting.as_deref()),
            characters: optional_text(request.characters.as_deref()),
            mood: parse_mood(request.mood.as_deref())?,
        };

        let draft = self
            .synthesizer
            .synthesize(&params)
            .await?
            .ok_or(TaleError::GenerationUnavailable)?;

        tracing::info!(title = %draft.title, "tale generated");
        Ok(GeneratedTale::new(draft, params))
    }

    /// Validate and persist a new tale owned by `author`.
    #[tracing::instrument(skip_all, fields(author = %author))]
    pub async fn create_tale(
        &self,
        author: &UserId,
        request: CreateTaleRequest,
    ) -> Result<Tale, TaleError> {
        let tale = Tale {
            id: TaleId::new(),
            title: required_text("title", request.title.as_deref())?,
            content: required_body("content", request.content)?,
            child_age: parse_age(request.child_age.as_deref())?,
            topic: required_text("topic", request.topic.as_deref())?,
            setting: optional_text(request.setting.as_deref()),
            characters: optional_text(request.characters.as_deref()),
            mood: parse_mood(request.mood.as_deref())?,
            is_public: request.is_public.unwrap_or(false),
            author: author.clone(),
            liked_by: Default::default(),
            created_at: chrono::Utc::now(),
        };

        let tale = self.repo.create(&tale).await.map_err(storage)?;
        tracing::info!(tale_id = %tale.id, is_public = tale.is_public, "tale created");
        Ok(tale)
    }

    /// All public tales, newest first, annotated with whether `viewer`
    /// likes each one.
    pub async fn list_public_tales(
        &self,
        viewer: Option<&UserId>,
    ) -> Result<Vec<TaleView>, TaleError> {
        let tales = self.repo.find_public().await.map_err(storage)?;
        Ok(tales
            .into_iter()
            .map(|tale| TaleView::for_viewer(tale, viewer))
            .collect())
    }

    /// All tales authored by `author`, newest first.
    pub async fn list_my_tales(&self, author: &UserId) -> Result<Vec<TaleView>, TaleError> {
        let tales = self.repo.find_by_author(author).await.map_err(storage)?;
        Ok(tales.into_iter().map(TaleView::new).collect())
    }

    /// Change a tale's visibility. Only `is_public` is applied; any other
    /// field in the request is ignored.
    #[tracing::instrument(skip_all, fields(tale_id = %id, requester = %requester))]
    pub async fn update_visibility(
        &self,
        id: &TaleId,
        requester: &UserId,
        request: UpdateTaleRequest,
    ) -> Result<Tale, TaleError> {
        let mut tale = self.load_owned(id, requester).await?;

        if !request.extra.is_empty() {
            tracing::debug!(
                ignored = ?request.extra.keys().collect::<Vec<_>>(),
                "ignoring non-visibility fields"
            );
        }

        let Some(is_public) = request.is_public else {
            return Ok(tale);
        };

        tale.is_public = is_public;
        let tale = self.repo.save(&tale).await.map_err(storage)?;
        tracing::info!(is_public, "tale visibility updated");
        Ok(tale)
    }

    /// Permanently delete a tale. Author only.
    #[tracing::instrument(skip_all, fields(tale_id = %id, requester = %requester))]
    pub async fn delete_tale(&self, id: &TaleId, requester: &UserId) -> Result<(), TaleError> {
        self.load_owned(id, requester).await?;
        self.repo.delete(id).await.map_err(storage)?;
        tracing::info!("tale deleted");
        Ok(())
    }

    /// Flip `user`'s membership in the tale's liker set.
    #[tracing::instrument(skip_all, fields(tale_id = %id, user = %user))]
    pub async fn toggle_like(&self, id: &TaleId, user: &UserId) -> Result<LikeStatus, TaleError> {
        let status = self.repo.toggle_liker(id, user).await.map_err(storage)?;
        tracing::debug!(likes = status.likes, is_liked = status.is_liked, "like toggled");
        Ok(status)
    }

    /// Probe the configured generation backend.
    pub async fn check_backend(&self) -> BackendStatus {
        self.synthesizer.check_backend().await
    }

    async fn load(&self, id: &TaleId) -> Result<Tale, TaleError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(storage)?
            .ok_or(TaleError::NotFound)
    }

    async fn load_owned(&self, id: &TaleId, requester: &UserId) -> Result<Tale, TaleError> {
        let tale = self.load(id).await?;
        if !tale.is_authored_by(requester) {
            tracing::warn!(author = %tale.author, "rejected change by non-author");
            return Err(TaleError::Forbidden);
        }
        Ok(tale)
    }
}

/// A record that disappeared between load and write is reported as missing,
/// anything else as a storage fault.
fn storage(e: RepositoryError) -> TaleError {
    match e {
        RepositoryError::NotFound => TaleError::NotFound,
        other => TaleError::Storage(other.to_string()),
    }
}

fn required_text(field: &str, value: Option<&str>) -> Result<String, TaleError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(TaleError::Validation(format!("{field} is required"))),
    }
}

/// Like `required_text`, but the stored value keeps its whitespace.
fn required_body(field: &str, value: Option<String>) -> Result<String, TaleError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(TaleError::Validation(format!("{field} is required"))),
    }
}

fn optional_text(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

fn parse_age(value: Option<&str>) -> Result<AgeBand, TaleError> {
    match value {
        Some(v) if !v.trim().is_empty() => v.parse::<AgeBand>().map_err(TaleError::Validation),
        _ => Err(TaleError::Validation("childAge is required".to_string())),
    }
}

fn parse_mood(value: Option<&str>) -> Result<Mood, TaleError> {
    match value {
        Some(v) if !v.trim().is_empty() => v.parse::<Mood>().map_err(TaleError::Validation),
        _ => Ok(Mood::default()),
    }
}
