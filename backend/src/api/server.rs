//! HTTP Server for the Voices survey API.
//!
//! # API Endpoints
//!
//! | Method | Path      | Description                                   |
//! |--------|-----------|-----------------------------------------------|
//! | POST   | `/`       | Store a survey submission (JSON object)       |
//! | GET    | `/`       | All submissions, each with its `id`           |
//! | GET    | `/csv`    | Full CSV export                               |
//! | POST   | `/csv`    | CSV export of selected `{id, shapeId}` rows   |
//! | GET    | `/health` | Health check                                  |
//! | GET    | `/logs`   | SSE stream for real-time logs                 |

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use serde_json::Value;
use std::{convert::Infallible, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_info, log_success, LOG_BROADCASTER};
use super::types::HealthResponse;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::export::{full_export, selective_export, ShapeRef, EXPORT_FILENAME};
use crate::store::RecordStore;

/// Largest accepted request body. Canvas paths make submissions bulky.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// State shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: RecordStore,
}

impl AppState {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    // The survey and admin clients are served from another origin
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(list_payloads).post(submit_payload))
        .route("/csv", get(export_all).post(export_selection))
        .route("/health", get(health))
        .route("/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = RecordStore::open(&config.db_path).await?;
    let app = build_router(AppState::new(store));

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    println!("Voices server running on http://{}", addr);
    println!("   Database: {}", config.db_path.display());
    println!("   POST /      - Submit survey payload");
    println!("   GET  /      - List submissions");
    println!("   GET  /csv   - Full CSV export");
    println!("   POST /csv   - Selective CSV export");
    println!("   GET  /logs  - SSE log stream");
    println!();

    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> ServerResult<Json<HealthResponse>> {
    let records = state.store.count().await?;
    Ok(Json(HealthResponse::ok(records)))
}

/// Store one submission
async fn submit_payload(State(state): State<AppState>, body: Bytes) -> ServerResult<StatusCode> {
    let payload = parse_body::<Value>(&body)?;
    let id = state.store.insert(&payload).await?;

    log_success(format!("Stored submission #{}", id));
    Ok(StatusCode::CREATED)
}

/// List every submission with its id
async fn list_payloads(State(state): State<AppState>) -> ServerResult<Json<Vec<Value>>> {
    let records = state.store.list_all().await?;
    log_info(format!("Listing {} submission(s)", records.len()));

    Ok(Json(records.iter().map(|r| r.listing_json()).collect()))
}

/// Full CSV export
async fn export_all(State(state): State<AppState>) -> ServerResult<Response> {
    let csv = full_export(&state.store).await?;
    Ok(csv_attachment(csv))
}

/// CSV export of selected rows
async fn export_selection(State(state): State<AppState>, body: Bytes) -> ServerResult<Response> {
    let selection = parse_body::<Vec<ShapeRef>>(&body)?;
    let csv = selective_export(&state.store, &selection).await?;
    Ok(csv_attachment(csv))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Decode a JSON request body, rejecting empty or malformed input.
fn parse_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> ServerResult<T> {
    if body.is_empty() {
        return Err(ServerError::BadRequest("empty body".to_string()));
    }
    serde_json::from_slice(body).map_err(|e| ServerError::BadRequest(format!("invalid JSON: {}", e)))
}

fn csv_attachment(csv: Vec<u8>) -> Response {
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
        ),
    ];
    (headers, csv).into_response()
}
