use axum::{
    Json, Router,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use vitibrasil::{Endpoint, Record, ScraperError, WebScraper};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid endpoint")]
    InvalidEndpoint,
    #[error("Endpoint not found")]
    NotFound,
    #[error(transparent)]
    Scraper(#[from] ScraperError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::InvalidEndpoint | ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Scraper(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub scraper: WebScraper,
}

#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub name: &'static str,
    pub description: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_endpoints))
        .route("/{endpoint}", get(get_endpoint))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn list_endpoints() -> Json<Vec<EndpointInfo>> {
    Json(
        Endpoint::ALL
            .into_iter()
            .map(|e| EndpointInfo {
                name: e.slug(),
                description: e.description(),
            })
            .collect(),
    )
}

/// Every record of `endpoint` across the configured year range. Unknown names,
/// including segments that are not valid UTF-8, are rejected before any
/// request reaches the site.
pub async fn get_endpoint(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let Path(endpoint) = path
        .inspect_err(|e| log::warn!("Rejected endpoint path: {e}"))
        .map_err(|_| ApiError::InvalidEndpoint)?;

    let endpoint: Endpoint = endpoint
        .parse()
        .inspect_err(|e| log::warn!("{e}"))
        .map_err(|_| ApiError::InvalidEndpoint)?;

    let records = state
        .scraper
        .fetch_all_years(endpoint)
        .await
        .inspect_err(|e| log::error!("Failed to fetch {endpoint}: {e}"))?;

    Ok(Json(records))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
