pub mod config;
pub mod error;
pub mod index;
pub mod posts;
pub mod resources;
pub mod search;
pub mod startup_checks;
pub mod static_files;

pub use config::{Config, ConfigError, PAGE_SIZE};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
};
use std::{sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::index::DynDocumentIndex;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub posts: posts::PostRepository,
    pub search: search::SearchService,
    pub resources: resources::ResourceStore,
    pub static_handler: static_files::StaticFileHandler,
}

impl AppState {
    pub fn new(config: Config, index: DynDocumentIndex) -> Self {
        let uploads_dir = config.uploads.directory.clone();
        Self {
            posts: posts::PostRepository::new(index.clone()),
            search: search::SearchService::new(index, config.search.page_size),
            resources: resources::ResourceStore::new(uploads_dir.clone()),
            static_handler: static_files::StaticFileHandler::new(uploads_dir),
            config: Arc::new(config),
        }
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

pub fn create_app(config: Config, index: DynDocumentIndex) -> Router {
    let app_state = AppState::new(config, index);
    let max_upload_bytes = app_state.config.uploads.max_upload_bytes;
    let request_timeout = Duration::from_secs(app_state.config.server.request_timeout_secs);

    Router::new()
        .route("/posts", post(posts::handlers::upsert_post_handler))
        .route(
            "/posts/{postId}",
            get(posts::handlers::get_post_handler).delete(posts::handlers::delete_post_handler),
        )
        .route(
            "/uploads/{postId}",
            post(resources::handlers::upload_resource_handler)
                .layer(DefaultBodyLimit::max(max_upload_bytes))
                .get(resources::handlers::list_resources_handler),
        )
        .route(
            "/uploads/{postId}/{resourceName}",
            axum::routing::delete(resources::handlers::delete_resource_handler),
        )
        .route("/search", get(search::handlers::search_handler))
        .route("/health", get(health_handler))
        .route(
            "/public/{*path}",
            get(static_files::static_file_handler),
        )
        .fallback(error::not_found_handler)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &axum::http::Request<_>| {
                            let method = request.method();
                            let uri = request.uri();
                            let matched_path = request
                                .extensions()
                                .get::<axum::extract::MatchedPath>()
                                .map(|matched_path| matched_path.as_str());

                            tracing::info_span!(
                                "http_request",
                                method = %method,
                                uri = %uri,
                                matched_path,
                            )
                        })
                        .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
                            let headers = request.headers();
                            let user_agent = headers
                                .get("user-agent")
                                .and_then(|h| h.to_str().ok())
                                .unwrap_or("-");
                            let referer = headers
                                .get("referer")
                                .and_then(|h| h.to_str().ok())
                                .unwrap_or("-");

                            tracing::info!(
                                target: "access_log",
                                method = %request.method(),
                                path = %request.uri().path(),
                                query = ?request.uri().query(),
                                user_agent = %user_agent,
                                referer = %referer,
                                "request"
                            );
                        })
                        .on_response(
                            |response: &axum::http::Response<_>,
                             latency: Duration,
                             _span: &tracing::Span| {
                                let size = response
                                    .headers()
                                    .get("content-length")
                                    .and_then(|h| h.to_str().ok())
                                    .unwrap_or("-");

                                tracing::info!(
                                    target: "access_log",
                                    status = %response.status(),
                                    size = %size,
                                    latency_ms = %latency.as_millis(),
                                    "response"
                                );
                            },
                        ),
                )
                .layer(CorsLayer::permissive())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    request_timeout,
                )),
        )
        .with_state(app_state)
}
