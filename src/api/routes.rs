use crate::api::handlers::{news, reports, status};
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Job submissions are a topic plus three preferences.
const MAX_BODY_BYTES: usize = 16 * 1024;

/// CORS layer restricted to the configured origins.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
}

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config_manager.config().server.cors_origins);

    let router = Router::new()
        .route("/", get(news::root))
        .route("/health", get(news::health))
        .route("/process_news", post(news::process_news))
        .route("/ws/status/{job_id}", get(status::job_status))
        .route("/reports", get(reports::list_reports))
        .route("/reports/{job_id}", get(reports::get_report));

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", crate::api::docs::ApiDoc::openapi()),
        )
    };

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
