use std::collections::HashMap;

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::response::Redirect;
use axum::Json;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::api::common::ApiResponse;
use crate::errors::AppError;
use crate::flash;
use crate::videos::{NewVideo, Video};
use crate::InnerState;

const REQUIRED_FIELD_MESSAGE: &str = "This field is required.";
const VIDEO_SAVED_MESSAGE: &str = "New video saved!";
const VIDEO_DELETED_MESSAGE: &str = "Video deleted";
const CONFIRM_PROMPT: &str = "Are you sure you want to delete this video?";

/// Primary key taken from the path. Anything that is not a positive
/// integer, including values past `i64::MAX`, names no video and is a 404.
#[derive(Debug, Clone, Copy)]
pub struct VideoPk(pub i64);

#[axum::async_trait]
impl<S> FromRequestParts<S> for VideoPk
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::NotFound(e.body_text()))?;

        match raw.parse::<i64>() {
            Ok(pk) if pk > 0 && raw.bytes().all(|b| b.is_ascii_digit()) => Ok(VideoPk(pk)),
            _ => {
                tracing::debug!(video_pk = %raw, "Path does not name a video");
                Err(AppError::NotFound(format!("No video at {}", raw)))
            }
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VideoForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub notes: String,
}

impl VideoForm {
    /// Trims every field and checks the required ones are present.
    fn clean(self) -> Result<NewVideo, AppError> {
        let name = self.name.trim().to_string();
        let url = self.url.trim().to_string();
        let notes = self.notes.trim().to_string();

        let mut errors: HashMap<String, Vec<String>> = HashMap::new();
        if name.is_empty() {
            errors.insert("name".to_string(), vec![REQUIRED_FIELD_MESSAGE.to_string()]);
        }
        if url.is_empty() {
            errors.insert("url".to_string(), vec![REQUIRED_FIELD_MESSAGE.to_string()]);
        }
        if !errors.is_empty() {
            return Err(AppError::ValidationErrors(errors));
        }

        Ok(NewVideo {
            name,
            url,
            notes: (!notes.is_empty()).then_some(notes),
        })
    }
}

/// Query string of the list page. When it does not decode, or the term is
/// blank, the page lists every video.
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    pub search_term: String,
}

impl SearchForm {
    fn cleaned(&self) -> Option<String> {
        let term = self.search_term.trim();
        (!term.is_empty()).then(|| term.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteConfirmation {
    pub confirm: Option<String>,
}

impl DeleteConfirmation {
    fn is_confirmed(&self) -> bool {
        self.confirm.as_deref() == Some("yes")
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomePage {
    pub app_name: String,
    pub video_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListPage {
    pub videos: Vec<Video>,
    pub count: usize,
    pub summary: String,
    pub search_term: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteConfirmationPage {
    pub video: Video,
    pub prompt: String,
}

/// "No videos", "1 video", "2 videos", ...
pub fn video_count_summary(count: usize) -> String {
    match count {
        0 => "No videos".to_string(),
        1 => "1 video".to_string(),
        n => format!("{} videos", n),
    }
}

#[tracing::instrument(name = "Home page", skip(inner))]
pub async fn home(State(inner): State<InnerState>) -> Result<Json<ApiResponse<HomePage>>, AppError> {
    let InnerState { videos, app_name } = inner;
    let video_count = videos.count().await?;
    Ok(Json(ApiResponse::success(HomePage { app_name, video_count })))
}

pub async fn add_form() -> Json<ApiResponse<VideoForm>> {
    Json(ApiResponse::success(VideoForm::default()))
}

#[tracing::instrument(name = "Add video", skip(session, inner, form))]
pub async fn add_video(
    session: Session,
    State(inner): State<InnerState>,
    form: Result<Form<VideoForm>, FormRejection>,
) -> Result<Redirect, AppError> {
    let InnerState { videos, .. } = inner;

    let Form(form) = form.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    let new_video = form.clean()?;
    tracing::info!("Adding video {:?} from {}", new_video.name, new_video.url);

    let video = videos.create(new_video).await?;
    tracing::info!(id = video.id, video_id = %video.video_id, "Video added");

    flash::push(&session, VIDEO_SAVED_MESSAGE).await?;
    Ok(Redirect::to("/video_list"))
}

#[tracing::instrument(name = "List videos", skip(session, inner, search))]
pub async fn video_list(
    session: Session,
    State(inner): State<InnerState>,
    search: Option<Query<SearchForm>>,
) -> Result<Json<ApiResponse<VideoListPage>>, AppError> {
    let InnerState { videos, .. } = inner;

    let search_term = search.and_then(|Query(form)| form.cleaned());
    tracing::debug!(search_term = ?search_term, "Listing videos");

    let videos = match search_term.as_deref() {
        Some(term) => videos.query(Some(term)).await?,
        None => videos.list().await?,
    };
    let messages = flash::drain(&session).await?;

    let page = VideoListPage {
        count: videos.len(),
        summary: video_count_summary(videos.len()),
        videos,
        search_term,
    };

    Ok(Json(ApiResponse::success(page).with_messages(messages)))
}

#[tracing::instrument(name = "Video detail", skip(inner))]
pub async fn video_detail(
    VideoPk(video_pk): VideoPk,
    State(inner): State<InnerState>,
) -> Result<Json<ApiResponse<Video>>, AppError> {
    let video = inner.videos.find(video_pk).await?;
    Ok(Json(ApiResponse::success(video)))
}

/// First delete step without a submission: show the video, change nothing.
#[tracing::instrument(name = "Delete video page", skip(inner))]
pub async fn video_delete_page(
    VideoPk(video_pk): VideoPk,
    State(inner): State<InnerState>,
) -> Result<Json<ApiResponse<Video>>, AppError> {
    let video = inner.videos.find(video_pk).await?;
    Ok(Json(ApiResponse::success(video)))
}

/// First delete step: records the intent by sending the visitor to the
/// confirmation page. Nothing is removed here.
#[tracing::instrument(name = "Request video deletion", skip(inner))]
pub async fn video_delete(
    VideoPk(video_pk): VideoPk,
    State(inner): State<InnerState>,
) -> Result<Redirect, AppError> {
    let video = inner.videos.find(video_pk).await?;
    tracing::info!("Deletion requested for video {}", video.id);
    Ok(Redirect::to(&format!("/video_confirmation/{}", video.id)))
}

#[tracing::instrument(name = "Delete confirmation page", skip(inner))]
pub async fn video_confirmation_page(
    VideoPk(video_pk): VideoPk,
    State(inner): State<InnerState>,
) -> Result<Json<ApiResponse<DeleteConfirmationPage>>, AppError> {
    let video = inner.videos.find(video_pk).await?;
    Ok(Json(ApiResponse::success(DeleteConfirmationPage {
        video,
        prompt: CONFIRM_PROMPT.to_string(),
    })))
}

/// Second delete step. Only `confirm=yes` deletes; anything else, including
/// an empty submission, goes back to the untouched detail page.
#[tracing::instrument(name = "Confirm video deletion", skip(session, inner, confirmation))]
pub async fn video_confirmation(
    VideoPk(video_pk): VideoPk,
    session: Session,
    State(inner): State<InnerState>,
    confirmation: Option<Form<DeleteConfirmation>>,
) -> Result<Redirect, AppError> {
    let InnerState { videos, .. } = inner;

    let video = videos.find(video_pk).await?;

    let confirmed = confirmation
        .map(|Form(confirmation)| confirmation.is_confirmed())
        .unwrap_or(false);

    if !confirmed {
        tracing::info!("Deletion of video {} cancelled", video.id);
        return Ok(Redirect::to(&format!("/video_detail/{}", video.id)));
    }

    videos.delete(video.id).await?;
    flash::push(&session, VIDEO_DELETED_MESSAGE).await?;
    Ok(Redirect::to("/video_list"))
}
