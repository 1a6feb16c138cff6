//! SQLite tale repository implementation.
//!
//! Implements `TaleRepository` from `taleweaver-core` using sqlx with split
//! read/write pools. Likers live in `tale_likes`, one row per (tale, user).

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;

use taleweaver_core::repository::tale::TaleRepository;
use taleweaver_types::error::RepositoryError;
use taleweaver_types::tale::{AgeBand, LikeStatus, Mood, Tale, TaleId, UserId};

use super::pool::DatabasePool;

const TALE_COLUMNS: &str =
    "id, title, content, child_age, topic, setting, characters, mood, is_public, author, created_at";

/// SQLite-backed implementation of `TaleRepository`.
pub struct SqliteTaleRepository {
    pool: DatabasePool,
}

impl SqliteTaleRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Load tales matching `filter` (a WHERE clause over `tales` with one
    /// bound parameter, or none), newest first, with their liker sets.
    async fn fetch_tales(
        &self,
        filter: &str,
        param: Option<&str>,
    ) -> Result<Vec<Tale>, RepositoryError> {
        let sql = format!(
            "SELECT {TALE_COLUMNS} FROM tales WHERE {filter} ORDER BY created_at DESC, id DESC"
        );
        let mut query = sqlx::query(&sql);
        if let Some(param) = param {
            query = query.bind(param);
        }
        let rows = query.fetch_all(&self.pool.reader).await.map_err(query_err)?;

        let likes_sql = format!(
            "SELECT tale_id, user_id FROM tale_likes WHERE tale_id IN (SELECT id FROM tales WHERE {filter})"
        );
        let mut likes_query = sqlx::query(&likes_sql);
        if let Some(param) = param {
            likes_query = likes_query.bind(param);
        }
        let like_rows = likes_query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_err)?;

        let mut likers: HashMap<String, BTreeSet<UserId>> = HashMap::new();
        for row in &like_rows {
            let tale_id: String = row.try_get("tale_id").map_err(query_err)?;
            let user_id: String = row.try_get("user_id").map_err(query_err)?;
            likers.entry(tale_id).or_default().insert(UserId(user_id));
        }

        let mut tales = Vec::with_capacity(rows.len());
        for row in &rows {
            let tale_row = TaleRow::from_row(row).map_err(query_err)?;
            let liked_by = likers.remove(&tale_row.id).unwrap_or_default();
            tales.push(tale_row.into_tale(liked_by)?);
        }
        Ok(tales)
    }
}

/// Internal row type for mapping SQLite rows to a domain Tale.
struct TaleRow {
    id: String,
    title: String,
    content: String,
    child_age: String,
    topic: String,
    setting: String,
    characters: String,
    mood: String,
    is_public: bool,
    author: String,
    created_at: String,
}

impl TaleRow {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            child_age: row.try_get("child_age")?,
            topic: row.try_get("topic")?,
            setting: row.try_get("setting")?,
            characters: row.try_get("characters")?,
            mood: row.try_get("mood")?,
            is_public: row.try_get("is_public")?,
            author: row.try_get("author")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_tale(self, liked_by: BTreeSet<UserId>) -> Result<Tale, RepositoryError> {
        let id = self
            .id
            .parse::<TaleId>()
            .map_err(|e| RepositoryError::Query(format!("invalid tale id: {e}")))?;
        let child_age: AgeBand = self.child_age.parse().map_err(RepositoryError::Query)?;
        let mood: Mood = self.mood.parse().map_err(RepositoryError::Query)?;

        Ok(Tale {
            id,
            title: self.title,
            content: self.content,
            child_age,
            topic: self.topic,
            setting: self.setting,
            characters: self.characters,
            mood,
            is_public: self.is_public,
            author: UserId(self.author),
            liked_by,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width UTC timestamps so that text order is chronological order.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn query_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

async fn ensure_exists(conn: &mut SqliteConnection, id: &str) -> Result<(), RepositoryError> {
    sqlx::query("SELECT 1 FROM tales WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(query_err)?
        .map(|_| ())
        .ok_or(RepositoryError::NotFound)
}

async fn count_likers(conn: &mut SqliteConnection, id: &str) -> Result<usize, RepositoryError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tale_likes WHERE tale_id = ?")
        .bind(id)
        .fetch_one(&mut *conn)
        .await
        .map_err(query_err)?;
    Ok(count as usize)
}

impl TaleRepository for SqliteTaleRepository {
    async fn create(&self, tale: &Tale) -> Result<Tale, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;
        let id = tale.id.to_string();

        let result = sqlx::query(
            "INSERT INTO tales (id, title, content, child_age, topic, setting, characters, mood, is_public, author, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&tale.title)
        .bind(&tale.content)
        .bind(tale.child_age.as_str())
        .bind(&tale.topic)
        .bind(&tale.setting)
        .bind(&tale.characters)
        .bind(tale.mood.as_str())
        .bind(tale.is_public)
        .bind(tale.author.as_str())
        .bind(format_datetime(&tale.created_at))
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => {
                return Err(RepositoryError::Conflict(format!("tale '{id}' already exists")));
            }
            Err(e) => return Err(query_err(e)),
        }

        let now = format_datetime(&Utc::now());
        for user in &tale.liked_by {
            sqlx::query("INSERT OR IGNORE INTO tale_likes (tale_id, user_id, created_at) VALUES (?, ?, ?)")
                .bind(&id)
                .bind(user.as_str())
                .bind(&now)
                .execute(&mut *tx)
                .await
                .map_err(query_err)?;
        }

        tx.commit().await.map_err(query_err)?;
        Ok(tale.clone())
    }

    async fn find_by_id(&self, id: &TaleId) -> Result<Option<Tale>, RepositoryError> {
        let id = id.to_string();
        Ok(self.fetch_tales("id = ?", Some(&id)).await?.pop())
    }

    async fn find_public(&self) -> Result<Vec<Tale>, RepositoryError> {
        self.fetch_tales("is_public = 1", None).await
    }

    async fn find_by_author(&self, author: &UserId) -> Result<Vec<Tale>, RepositoryError> {
        self.fetch_tales("author = ?", Some(author.as_str())).await
    }

    async fn save(&self, tale: &Tale) -> Result<Tale, RepositoryError> {
        let result = sqlx::query("UPDATE tales SET is_public = ? WHERE id = ?")
            .bind(tale.is_public)
            .bind(tale.id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(tale.clone())
    }

    async fn delete(&self, id: &TaleId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tales WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn toggle_liker(&self, id: &TaleId, user: &UserId) -> Result<LikeStatus, RepositoryError> {
        let id = id.to_string();
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        ensure_exists(&mut *tx, &id).await?;
        let removed = sqlx::query("DELETE FROM tale_likes WHERE tale_id = ? AND user_id = ?")
            .bind(&id)
            .bind(user.as_str())
            .execute(&mut *tx)
            .await
            .map_err(query_err)?
            .rows_affected()
            > 0;
        if !removed {
            sqlx::query("INSERT INTO tale_likes (tale_id, user_id, created_at) VALUES (?, ?, ?)")
                .bind(&id)
                .bind(user.as_str())
                .bind(format_datetime(&Utc::now()))
                .execute(&mut *tx)
                .await
                .map_err(query_err)?;
        }
        let likes = count_likers(&mut *tx, &id).await?;

        tx.commit().await.map_err(query_err)?;
        Ok(LikeStatus {
            likes,
            is_liked: !removed,
        })
    }
}
