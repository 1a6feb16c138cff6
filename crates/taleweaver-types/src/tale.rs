use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tale, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaleId(pub Uuid);

impl TaleId {
    /// Create a new TaleId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for TaleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Opaque identifier of an already-authenticated user.
///
/// Taleweaver never issues or verifies credentials; the transport layer hands
/// this value in as-is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Target audience of a tale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    #[serde(rename = "3-4")]
    Preschool,
    #[serde(rename = "5-8")]
    EarlyElementary,
    #[serde(rename = "9-12")]
    UpperElementary,
}

impl AgeBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeBand::Preschool => "3-4",
            AgeBand::EarlyElementary => "5-8",
            AgeBand::UpperElementary => "9-12",
        }
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgeBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "3-4" => Ok(AgeBand::Preschool),
            "5-8" => Ok(AgeBand::EarlyElementary),
            "9-12" => Ok(AgeBand::UpperElementary),
            other => Err(format!(
                "invalid childAge: '{other}' (expected one of 3-4, 5-8, 9-12)"
            )),
        }
    }
}

/// Overall tone of a tale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    Happy,
    Adventurous,
    Educational,
    Calming,
}

impl Mood {
    pub const ALL: [Mood; 4] = [
        Mood::Happy,
        Mood::Adventurous,
        Mood::Educational,
        Mood::Calming,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Adventurous => "adventurous",
            Mood::Educational => "educational",
            Mood::Calming => "calming",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "happy" => Ok(Mood::Happy),
            "adventurous" => Ok(Mood::Adventurous),
            "educational" => Ok(Mood::Educational),
            "calming" => Ok(Mood::Calming),
            other => Err(format!(
                "invalid mood: '{other}' (expected one of happy, adventurous, educational, calming)"
            )),
        }
    }
}

/// A stored story with its metadata.
///
/// `author` and `created_at` are fixed at creation. After that only
/// `is_public` (by the author) and `liked_by` (by any user) ever change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tale {
    pub id: TaleId,
    pub title: String,
    /// The story body.
    pub content: String,
    pub child_age: AgeBand,
    pub topic: String,
    /// Empty when not supplied.
    #[serde(default)]
    pub setting: String,
    /// Empty when not supplied.
    #[serde(default)]
    pub characters: String,
    #[serde(default)]
    pub mood: Mood,
    #[serde(default)]
    pub is_public: bool,
    pub author: UserId,
    /// Users who liked this tale. A set, so a user appears at most once.
    #[serde(default)]
    pub liked_by: BTreeSet<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Tale {
    /// Number of likes, always `liked_by.len()`.
    pub fn likes(&self) -> usize {
        self.liked_by.len()
    }

    pub fn is_liked_by(&self, user: &UserId) -> bool {
        self.liked_by.contains(user)
    }

    pub fn is_authored_by(&self, user: &UserId) -> bool {
        &self.author == user
    }
}

/// Read-side projection of a tale: the stored fields plus derived `likes`
/// and, for listings shown to a particular viewer, `isLiked`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaleView {
    #[serde(flatten)]
    pub tale: Tale,
    pub likes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_liked: Option<bool>,
}

impl TaleView {
    pub fn new(tale: Tale) -> Self {
        let likes = tale.likes();
        Self {
            tale,
            likes,
            is_liked: None,
        }
    }

    /// Annotate with whether `viewer` likes the tale. Anonymous viewers
    /// never like anything.
    pub fn for_viewer(tale: Tale, viewer: Option<&UserId>) -> Self {
        let is_liked = viewer.is_some_and(|v| tale.is_liked_by(v));
        let mut view = Self::new(tale);
        view.is_liked = Some(is_liked);
        view
    }
}

/// Request to create a tale.
///
/// Every field is optional at the type level so that validation (missing
/// fields, out-of-domain enum values) happens in the service with a proper
/// validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub child_age: Option<String>,
    pub topic: Option<String>,
    pub setting: Option<String>,
    pub characters: Option<String>,
    pub mood: Option<String>,
    pub is_public: Option<bool>,
}

/// Request to change a tale. Only `is_public` is ever applied; anything else
/// the caller sends lands in `extra` and is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaleRequest {
    pub is_public: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Raw generation request as received from a caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTaleRequest {
    pub child_age: Option<String>,
    pub topic: Option<String>,
    pub setting: Option<String>,
    pub characters: Option<String>,
    pub mood: Option<String>,
}

/// Validated generation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    pub child_age: AgeBand,
    pub topic: String,
    #[serde(default)]
    pub setting: String,
    #[serde(default)]
    pub characters: String,
    #[serde(default)]
    pub mood: Mood,
}

/// A generated title and story body that has not been persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaleDraft {
    pub title: String,
    pub content: String,
}

/// A draft together with the parameters it was generated from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTale {
    pub title: String,
    pub content: String,
    #[serde(flatten)]
    pub params: GenerationParams,
}

impl GeneratedTale {
    pub fn new(draft: TaleDraft, params: GenerationParams) -> Self {
        Self {
            title: draft.title,
            content: draft.content,
            params,
        }
    }
}

/// Outcome of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    pub likes: usize,
    pub is_liked: bool,
}
