use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error as StdError;

use crate::youtube::{InvalidUrl, VideoId};

pub const INVALID_URL_MESSAGE: &str = "Invalid YouTube URL";
pub const DUPLICATE_VIDEO_MESSAGE: &str = "You already added that video";
pub const CHECK_DATA_MESSAGE: &str = "Please check the data entered.";

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid YouTube URL: {0}")]
    InvalidUrl(#[from] InvalidUrl),

    #[error("Duplicate video: {0}")]
    DuplicateVideo(VideoId),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation errors")]
    ValidationErrors(HashMap<String, Vec<String>>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[source] anyhow::Error),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, messages, errors) = match &self {
            AppError::InvalidUrl(e) => (
                StatusCode::BAD_REQUEST,
                format!("{}: {}", INVALID_URL_MESSAGE, e),
                vec![INVALID_URL_MESSAGE, CHECK_DATA_MESSAGE],
                None,
            ),
            AppError::DuplicateVideo(video_id) => (
                StatusCode::CONFLICT,
                format!("Video {} is already in the collection", video_id),
                vec![DUPLICATE_VIDEO_MESSAGE, CHECK_DATA_MESSAGE],
                None,
            ),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                msg.clone(),
                vec![CHECK_DATA_MESSAGE],
                None,
            ),
            AppError::ValidationErrors(validation_errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                vec![CHECK_DATA_MESSAGE],
                Some(validation_errors.clone()),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), vec![], None),
            AppError::Database(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
                vec![],
                None,
            ),
            AppError::Session(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Session error: {}", e),
                vec![],
                None,
            ),
        };

        if status.is_server_error() {
            tracing::error!(
                error_type = %self,
                error_message = %error_message,
                status_code = %status,
                "Request error"
            );
        } else {
            tracing::warn!(
                error_type = %self,
                error_message = %error_message,
                status_code = %status,
                "Request rejected"
            );
        }

        if let AppError::Database(e) = &self {
            let mut source_chain = String::new();
            let mut current_err: Option<&(dyn StdError + 'static)> = e.source();
            while let Some(err) = current_err {
                source_chain.push_str(&format!("\n  Caused by: {}", err));
                current_err = err.source();
            }
            if !source_chain.is_empty() {
                tracing::error!("Error source chain:{}", source_chain);
            }
        }

        let mut body = json!({
            "message": error_message,
            "status": status.as_u16(),
            "messages": messages,
        });
        if let Some(validation_errors) = errors {
            body["errors"] = json!(validation_errors);
        }

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Database record not found".to_string()),
            _ => AppError::Database(anyhow::Error::new(err).context("SQLx operation failed")),
        }
    }
}
