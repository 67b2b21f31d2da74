use crate::api::handlers::{news, reports};
use crate::pipeline::{StageEvent, Status, Step};
use crate::types::{
    Article, Focus, HealthResponse, NewsRequest, NewsResponse, Preferences, Profile,
    Report, ReportStages, ReportSummary, Tone,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Signal API",
        description = "Multi-perspective news pipeline with live progress over WebSockets"
    ),
    paths(
        news::root,
        news::health,
        news::process_news,
        reports::get_report,
        reports::list_reports,
    ),
    components(schemas(
        NewsRequest,
        NewsResponse,
        HealthResponse,
        Preferences,
        Focus,
        Tone,
        Article,
        Profile,
        Report,
        ReportStages,
        ReportSummary,
        StageEvent,
        Step,
        Status,
    )),
    tags(
        (name = "news", description = "Pipeline jobs"),
        (name = "reports", description = "Stored reports"),
        (name = "system", description = "Liveness and health")
    )
)]
pub struct ApiDoc;
