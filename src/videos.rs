//! Video records and the store that owns them.

use std::time::Duration;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::db::{timeout_query, timeout_query_with};
use crate::errors::AppError;
use crate::youtube::{extract_video_id, VideoId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub video_id: VideoId,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Input for [`VideoRepository::create`]. The identifier is derived from `url`.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub name: String,
    pub url: String,
    pub notes: Option<String>,
}

#[derive(Clone, Debug)]
pub struct VideoRepository {
    db: SqlitePool,
    query_timeout: Duration,
}

impl VideoRepository {
    pub fn new(db: SqlitePool, query_timeout: Duration) -> Self {
        Self { db, query_timeout }
    }

    /// Validates the URL, then inserts. A repeated video id is rejected by the
    /// table's UNIQUE constraint on the same statement that inserts the row,
    /// so nothing is written when either check fails.
    #[tracing::instrument(name = "Create video", skip(self, new_video), fields(name = %new_video.name))]
    pub async fn create(&self, new_video: NewVideo) -> Result<Video, AppError> {
        if new_video.name.trim().is_empty() {
            return Err(AppError::Validation("Video name must not be empty".to_string()));
        }

        let video_id = extract_video_id(&new_video.url).map_err(|e| {
            tracing::warn!(url = %new_video.url, reason = %e, "Rejected video URL");
            AppError::InvalidUrl(e)
        })?;

        let insert_query = r#"
            INSERT INTO videos (name, url, video_id, notes)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, name, url, video_id, notes, created_at
        "#;

        let video = timeout_query_with(
            self.query_timeout,
            sqlx::query_as::<_, Video>(insert_query)
                .bind(&new_video.name)
                .bind(&new_video.url)
                .bind(&video_id)
                .bind(&new_video.notes)
                .fetch_one(&self.db),
            |e| match e {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    tracing::warn!(video_id = %video_id, "Video already in the collection");
                    AppError::DuplicateVideo(video_id.clone())
                }
                e => {
                    tracing::error!("Database error while inserting video: {:?}", e);
                    AppError::from(e)
                }
            },
        )
        .await?;

        tracing::info!(id = video.id, video_id = %video.video_id, "Video saved");
        Ok(video)
    }

    #[tracing::instrument(name = "Get video", skip(self))]
    pub async fn get(&self, id: i64) -> Result<Option<Video>, AppError> {
        timeout_query(
            self.query_timeout,
            sqlx::query_as::<_, Video>(
                r#"SELECT id, name, url, video_id, notes, created_at FROM videos WHERE id = ?1"#,
            )
            .bind(id)
            .fetch_optional(&self.db),
        )
        .await
    }

    /// Like [`get`](Self::get) but a missing record is an error.
    pub async fn find(&self, id: i64) -> Result<Video, AppError> {
        self.get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))
    }

    /// Removes the record for good. Deleting an unknown id is `NotFound`.
    #[tracing::instrument(name = "Delete video", skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = timeout_query(
            self.query_timeout,
            sqlx::query(r#"DELETE FROM videos WHERE id = ?1"#)
                .bind(id)
                .execute(&self.db),
        )
        .await?;

        if result.rows_affected() == 0 {
            tracing::warn!("No video with id {} to delete", id);
            return Err(AppError::NotFound(format!("Video {} not found", id)));
        }

        tracing::info!("Deleted video {}", id);
        Ok(())
    }

    /// Every record, ordered by name ignoring case. Ties keep creation order.
    pub async fn list(&self) -> Result<Vec<Video>, AppError> {
        self.query(None).await
    }

    /// Records whose name contains `search_term`, ignoring case, in the same
    /// order as [`list`](Self::list). `None` returns everything.
    #[tracing::instrument(name = "Query videos", skip(self))]
    pub async fn query(&self, search_term: Option<&str>) -> Result<Vec<Video>, AppError> {
        let videos = match search_term.filter(|term| !term.is_empty()) {
            Some(term) => {
                timeout_query(
                    self.query_timeout,
                    sqlx::query_as::<_, Video>(
                        r#"
                        SELECT id, name, url, video_id, notes, created_at
                        FROM videos
                        WHERE instr(LOWER(name), LOWER(?1)) > 0
                        ORDER BY LOWER(name) ASC, id ASC
                        "#,
                    )
                    .bind(term)
                    .fetch_all(&self.db),
                )
                .await?
            }
            None => {
                timeout_query(
                    self.query_timeout,
                    sqlx::query_as::<_, Video>(
                        r#"
                        SELECT id, name, url, video_id, notes, created_at
                        FROM videos
                        ORDER BY LOWER(name) ASC, id ASC
                        "#,
                    )
                    .fetch_all(&self.db),
                )
                .await?
            }
        };

        tracing::debug!("Found {} videos", videos.len());
        Ok(videos)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        timeout_query(
            self.query_timeout,
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM videos").fetch_one(&self.db),
        )
        .await
    }
}
