pub mod videos;

use axum::routing::get;
use axum::Router;
use time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::api::common::tracing::{
    make_custom_span, on_custom_failure, on_custom_request, on_custom_response,
};
use crate::system::create_system_router;
use crate::InnerState;

/// Builds the page routes with sessions, CORS and request tracing.
/// Metrics are added by the binary so tests can build many routers.
#[tracing::instrument(name = "create_app", skip(state))]
pub fn create_app(state: InnerState) -> Router {
    tracing::info!("Creating video collection router");

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(Duration::days(120)));

    Router::new()
        .route("/", get(videos::home))
        .route("/add", get(videos::add_form).post(videos::add_video))
        .route("/video_list", get(videos::video_list))
        .route("/video_detail/:video_pk", get(videos::video_detail))
        .route(
            "/video/:video_pk/delete",
            get(videos::video_delete_page).post(videos::video_delete),
        )
        .route(
            "/video_confirmation/:video_pk",
            get(videos::video_confirmation_page).post(videos::video_confirmation),
        )
        .merge(create_system_router())
        .layer(session_layer)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_custom_span)
                .on_request(on_custom_request)
                .on_response(on_custom_response)
                .on_failure(on_custom_failure),
        )
        .with_state(state)
}
