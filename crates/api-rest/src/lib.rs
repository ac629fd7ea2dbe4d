//! # API REST
//!
//! REST proxy for the design-file service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status mapping)
//!
//! Every handler is stateless apart from the shared [`DesignService`]; each request triggers a
//! fresh fetch from the upstream service.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    BatchNodesReq, BatchNodesRes, DesignQueryParams, DesignQueryRes, ErrorRes, FileMetadataRes,
    HealthRes, HealthService, ListPagesRes, PageRes, PagesParams, ResultKind,
};
use figproxy_core::{batch_response, DesignError, DesignService};

type ApiError = (StatusCode, Json<ErrorRes>);

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    pub design_service: DesignService,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, query_design, batch_nodes, list_pages),
    components(schemas(
        HealthRes,
        DesignQueryRes,
        ResultKind,
        FileMetadataRes,
        BatchNodesReq,
        BatchNodesRes,
        ListPagesRes,
        PageRes,
        ErrorRes
    ))
)]
pub struct ApiDoc;

/// Build the REST router with OpenAPI docs and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/figma", get(query_design))
        .route("/api/figma/nodes", post(batch_nodes))
        .route("/api/figma/pages", get(list_pages))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Map a core error onto an HTTP status and error payload.
///
/// Upstream error statuses are passed through so callers see what the design service said;
/// transport failures and malformed upstream bodies become `502 Bad Gateway`.
fn error_response(err: DesignError) -> ApiError {
    let upstream_status = err.upstream_status();
    let (status, error, details) = match err {
        DesignError::Config(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server configuration error",
            Some(msg),
        ),
        DesignError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "Invalid request", Some(msg)),
        DesignError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not found", Some(msg)),
        DesignError::Upstream { message, .. } => {
            let passthrough = upstream_status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            (
                passthrough,
                "Failed to fetch design data",
                Some(match upstream_status {
                    Some(s) => format!("upstream status {s}: {message}"),
                    None => message,
                }),
            )
        }
        DesignError::Serialization(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal error",
            Some(e.to_string()),
        ),
    };

    if status.is_server_error() {
        tracing::error!("request failed with {}: {:?}", status, details);
    } else {
        tracing::warn!("request failed with {}: {:?}", status, details);
    }

    (
        status,
        Json(ErrorRes {
            error: error.to_string(),
            details,
        }),
    )
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Reports process liveness only; the design service is not contacted.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/api/figma",
    params(DesignQueryParams),
    responses(
        (status = 200, description = "Selected node, component subtree or whole file", body = DesignQueryRes),
        (status = 400, description = "Malformed fileId or nodeId", body = ErrorRes),
        (status = 404, description = "Node not found", body = ErrorRes),
        (status = 500, description = "Server configuration error", body = ErrorRes),
        (status = 502, description = "Design service unreachable or failed", body = ErrorRes)
    )
)]
/// Query a design file
///
/// `nodeId` selects one node; otherwise `component` searches node names (case-insensitive
/// substring, first match in document order); otherwise the whole file is returned with its
/// metadata. `fileId` defaults to the server's configured file key.
#[axum::debug_handler]
async fn query_design(
    State(state): State<AppState>,
    Query(params): Query<DesignQueryParams>,
) -> Result<Json<DesignQueryRes>, ApiError> {
    let outcome = state
        .design_service
        .query(params.into())
        .await
        .map_err(error_response)?;
    outcome.into_response().map(Json).map_err(error_response)
}

#[utoipa::path(
    post,
    path = "/api/figma/nodes",
    request_body = BatchNodesReq,
    responses(
        (status = 200, description = "Resolved nodes keyed by ID", body = BatchNodesRes),
        (status = 400, description = "Empty or malformed ID list", body = ErrorRes),
        (status = 502, description = "Design service unreachable or failed", body = ErrorRes)
    )
)]
/// Fetch several nodes in one upstream request
#[axum::debug_handler]
async fn batch_nodes(
    State(state): State<AppState>,
    Json(req): Json<BatchNodesReq>,
) -> Result<Json<BatchNodesRes>, ApiError> {
    let nodes = state
        .design_service
        .query_nodes(req.file_id.as_deref(), &req.ids)
        .await
        .map_err(error_response)?;
    batch_response(nodes).map(Json).map_err(error_response)
}

#[utoipa::path(
    get,
    path = "/api/figma/pages",
    params(PagesParams),
    responses(
        (status = 200, description = "Pages of the file in order", body = ListPagesRes),
        (status = 502, description = "Design service unreachable or failed", body = ErrorRes)
    )
)]
/// List the pages of a design file
#[axum::debug_handler]
async fn list_pages(
    State(state): State<AppState>,
    Query(params): Query<PagesParams>,
) -> Result<Json<ListPagesRes>, ApiError> {
    let pages = state
        .design_service
        .list_pages(params.file_id.as_deref())
        .await
        .map_err(error_response)?;
    Ok(Json(ListPagesRes {
        success: true,
        pages: pages.into_iter().map(PageRes::from).collect(),
    }))
}
