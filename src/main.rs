mod api;
mod config;
mod db;
mod errors;
mod flash;
mod routes;
mod system;
mod videos;
mod youtube;

use std::error::Error;

use anyhow::Context;
use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Settings;
use crate::db::init_db;
use crate::routes::create_app;
use crate::videos::VideoRepository;

#[derive(Clone)]
pub struct InnerState {
    pub videos: VideoRepository,
    pub app_name: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "video_collection=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env().context("Invalid configuration")?;

    let db = init_db(&settings)
        .await
        .context("Could not open the video database")?;

    let app_state = InnerState {
        videos: VideoRepository::new(db, settings.query_timeout),
        app_name: settings.app_name.clone(),
    };

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let app = create_app(app_state)
        .route("/metrics", get(|| async move { metric_handle.render() }))
        .layer(prometheus_layer);

    let listener = tokio::net::TcpListener::bind(&settings.listen_addr)
        .await
        .with_context(|| format!("Could not bind {}", settings.listen_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
