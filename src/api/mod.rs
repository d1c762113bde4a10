use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{debug, info};

mod error;

pub use error::ApiError;

use crate::config::ServerConfig;
use crate::core::{
    ProjectionParams, Series, YearRow, parse_metric_list, run_projection, select_series,
};
use crate::report::{Currency, ProjectionSummary, csv_filename, rows_to_csv, summarize};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Debug, Clone)]
pub struct AppState {
    pub default_currency: Currency,
}

impl From<&ServerConfig> for AppState {
    fn from(config: &ServerConfig) -> Self {
        Self {
            default_currency: config.default_currency,
        }
    }
}

/// Query string or JSON body of every projection endpoint.
///
/// Parameter fields stay raw; coercion happens in the engine.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectionPayload {
    #[serde(flatten)]
    params: ProjectionParams,
    currency: Option<String>,
    metrics: Option<String>,
}

#[derive(Debug)]
struct ApiRequest {
    params: ProjectionParams,
    currency: Currency,
    metrics: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionResponse {
    currency: Currency,
    rows: Vec<YearRow>,
    summary: ProjectionSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SeriesResponse {
    currency: Currency,
    years: usize,
    series: Vec<Series>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

fn api_request_from_payload(
    payload: ProjectionPayload,
    default_currency: Currency,
) -> Result<ApiRequest, ApiError> {
    let currency = match payload.currency.as_deref().map(str::trim) {
        None | Some("") => default_currency,
        Some(code) => code.parse()?,
    };

    Ok(ApiRequest {
        params: payload.params,
        currency,
        metrics: payload.metrics,
    })
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/health", get(health_handler))
        .route(
            "/api/projection",
            get(projection_get_handler).post(projection_post_handler),
        )
        .route("/api/projection.csv", get(projection_csv_handler))
        .route("/api/series", get(series_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(config: &ServerConfig) -> std::io::Result<()> {
    let addr = config.socket_addr();
    let app = build_router(AppState::from(config));

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, currency = %config.default_currency, "capital projection API listening");
    info!("Local access: http://127.0.0.1:{}/", config.port);

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    ApiError::NotFound.into_response()
}

async fn projection_get_handler(
    State(state): State<AppState>,
    Query(payload): Query<ProjectionPayload>,
) -> Result<Response, ApiError> {
    projection_handler_impl(&state, payload)
}

async fn projection_post_handler(
    State(state): State<AppState>,
    Json(payload): Json<ProjectionPayload>,
) -> Result<Response, ApiError> {
    projection_handler_impl(&state, payload)
}

fn projection_handler_impl(
    state: &AppState,
    payload: ProjectionPayload,
) -> Result<Response, ApiError> {
    let request = api_request_from_payload(payload, state.default_currency)?;
    let rows = run_projection(&request.params);
    debug!(years = rows.len(), currency = %request.currency, "projection computed");

    let response = build_projection_response(rows, request.currency);
    Ok(json_response(StatusCode::OK, response))
}

async fn projection_csv_handler(
    State(state): State<AppState>,
    Query(payload): Query<ProjectionPayload>,
) -> Result<Response, ApiError> {
    let request = api_request_from_payload(payload, state.default_currency)?;
    let rows = run_projection(&request.params);
    let body = rows_to_csv(&rows)?;
    let disposition = format!("attachment; filename=\"{}\"", csv_filename(&rows));
    debug!(years = rows.len(), bytes = body.len(), "csv export rendered");

    Ok(with_cache_control((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )))
}

async fn series_handler(
    State(state): State<AppState>,
    Query(payload): Query<ProjectionPayload>,
) -> Result<Response, ApiError> {
    let request = api_request_from_payload(payload, state.default_currency)?;
    let metrics = parse_metric_list(request.metrics.as_deref().unwrap_or_default())?;
    let rows = run_projection(&request.params);
    debug!(years = rows.len(), metrics = metrics.len(), "series selected");

    Ok(json_response(
        StatusCode::OK,
        SeriesResponse {
            currency: request.currency,
            years: rows.len(),
            series: select_series(&rows, &metrics),
        },
    ))
}

fn build_projection_response(rows: Vec<YearRow>, currency: Currency) -> ProjectionResponse {
    let summary = summarize(&rows, currency);
    ProjectionResponse {
        currency,
        rows,
        summary,
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}
