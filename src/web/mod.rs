//! Control API for the splitflap scheduler.
//!
//! Every handler talks to the scheduler service through a
//! [`SchedulerHandle`], so requests are serialized with timer ticks.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /api/status` - Scheduler status
//! - `POST /api/modes/{mode}` - Start `clock`, `flight` or `airports`
//! - `DELETE /api/modes` - Stop the active mode
//! - `GET /api/airports` - Airport sequence
//! - `PUT /api/airports/interval` - Change the airport interval
//! - `POST /api/airports/current` - Show the current airport
//! - `POST /api/airports/reset` - Rewind the airport cycler
//! - `PUT /api/clock/format` - Change the clock template
//! - `POST /api/text` - Show free text (or a formatted code)
//! - `POST /api/blank` - Blank the display
//! - `POST /api/test-character` - Show one character on every module
//! - `POST /api/home` - Home all modules
//! - `POST /api/calibrate` - Calibrate one module or all of them
//! - `GET /api/airlines/{code}` - Format an airline code
//! - `PUT /api/airlines/{code}` - Add or replace a code mapping
//! - `POST /api/commands` - Remote command

pub mod commands;

use std::future::Future;
use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, FromRequest, Path, Request, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::constants::APP_NAME;
use crate::formatter::{normalize, CodeLookup};
use crate::models::{ClockFormat, CycleInterval, DisplayText, Mode};
use crate::scheduler::{SchedulerError, SchedulerHandle, SchedulerStatus};
use crate::sink::SinkError;

pub use commands::{CommandReceipt, RemoteCommand};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the control API.
#[derive(Clone)]
pub struct AppState {
    scheduler: SchedulerHandle,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(scheduler: SchedulerHandle) -> Self {
        Self { scheduler }
    }

    /// Returns the scheduler handle.
    #[must_use]
    pub fn scheduler(&self) -> &SchedulerHandle {
        &self.scheduler
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Current health status (e.g., "healthy").
    pub status: String,
    /// Application version.
    pub version: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Error message.
    pub error: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

type ApiFailure = (StatusCode, Json<ApiError>);
type ApiResult<T> = Result<Json<T>, ApiFailure>;

/// JSON body extractor that rejects malformed input with a 400 [`ApiError`].
struct ApiJson<T>(T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiFailure;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(invalid_body(rejection.body_text())),
        }
    }
}

/// Airport interval, as a duration id (`"5m"`) or milliseconds.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum IntervalValue {
    /// Milliseconds, e.g. `300000`.
    Millis(u64),
    /// Duration id, e.g. `"5m"`.
    Text(String),
}

/// Body of `PUT /api/airports/interval`.
#[derive(Debug, Deserialize)]
pub struct IntervalRequest {
    /// New interval.
    pub interval: IntervalValue,
}

/// Body of `PUT /api/clock/format`.
#[derive(Debug, Deserialize)]
pub struct ClockFormatRequest {
    /// Template, e.g. `"HH:MM"`.
    pub format: String,
}

/// Body of `POST /api/text`.
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    /// Text to show.
    pub text: String,
    /// Run the text through the code formatter first.
    #[serde(default)]
    pub code: bool,
}

/// Body of `POST /api/test-character`.
#[derive(Debug, Deserialize)]
pub struct TestCharacterRequest {
    /// A single character.
    pub character: String,
}

/// Body of `POST /api/calibrate`.
#[derive(Debug, Default, Deserialize)]
pub struct CalibrateRequest {
    /// Module index; absent calibrates every module.
    #[serde(default)]
    pub module: Option<usize>,
}

/// Body of `PUT /api/airlines/{code}`.
#[derive(Debug, Deserialize)]
pub struct AirlineUpdateRequest {
    /// Short display code.
    pub short_code: String,
}

/// Text that was sent to the display.
#[derive(Debug, Serialize)]
pub struct TextResponse {
    /// Exact payload.
    pub text: DisplayText,
}

/// Result of stopping a mode.
#[derive(Debug, Serialize)]
pub struct StopResponse {
    /// The mode that was stopped, if any.
    pub stopped: Option<Mode>,
}

/// Airport sequence.
#[derive(Debug, Serialize)]
pub struct AirportListResponse {
    /// Codes in display order.
    pub airports: Vec<String>,
    /// Number of codes.
    pub total: usize,
}

/// Acknowledgement for maintenance requests.
#[derive(Debug, Serialize)]
pub struct AckResponse {
    /// Always "ok".
    pub status: String,
}

impl AckResponse {
    fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

fn bad_request(error: impl Into<String>) -> ApiFailure {
    (StatusCode::BAD_REQUEST, Json(ApiError::new(error)))
}

fn invalid_body(details: impl Into<String>) -> ApiFailure {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::with_details("Invalid request body", details)),
    )
}

fn scheduler_failure(err: SchedulerError) -> ApiFailure {
    let message = err.to_string();
    match err {
        SchedulerError::NotConnected | SchedulerError::Sink(SinkError::NotConnected) => (
            StatusCode::CONFLICT,
            Json(ApiError::new("Not connected to display")),
        ),
        SchedulerError::InvalidModule { .. } => bad_request(message),
        SchedulerError::ServiceStopped => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::new("Scheduler is not running")),
        ),
        SchedulerError::Sink(SinkError::Unsupported { .. }) => (
            StatusCode::NOT_IMPLEMENTED,
            Json(ApiError::with_details(
                "Operation not supported by display sink",
                message,
            )),
        ),
        SchedulerError::Sink(_) => (
            StatusCode::BAD_GATEWAY,
            Json(ApiError::with_details("Display request failed", message)),
        ),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /health - Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/status - Current scheduler state.
async fn get_status(State(state): State<AppState>) -> ApiResult<SchedulerStatus> {
    state
        .scheduler
        .status()
        .await
        .map(Json)
        .map_err(scheduler_failure)
}

/// POST /api/modes/{mode} - Start a mode.
async fn start_mode(
    State(state): State<AppState>,
    Path(mode): Path<String>,
) -> ApiResult<SchedulerStatus> {
    let mode: Mode = mode.parse().map_err(bad_request)?;
    state
        .scheduler
        .start(mode)
        .await
        .map_err(scheduler_failure)?;
    get_status(State(state)).await
}

/// DELETE /api/modes - Stop the active mode.
async fn stop_mode(State(state): State<AppState>) -> ApiResult<StopResponse> {
    let stopped = state.scheduler.stop().await.map_err(scheduler_failure)?;
    Ok(Json(StopResponse { stopped }))
}

/// GET /api/airports - Airport sequence.
async fn list_airports(State(state): State<AppState>) -> ApiResult<AirportListResponse> {
    let airports = state
        .scheduler
        .airports()
        .await
        .map_err(scheduler_failure)?;
    Ok(Json(AirportListResponse {
        total: airports.len(),
        airports,
    }))
}

/// PUT /api/airports/interval - Change the airport interval.
async fn set_interval(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<IntervalRequest>,
) -> ApiResult<SchedulerStatus> {
    let interval = match request.interval {
        IntervalValue::Millis(millis) => CycleInterval::from_millis(millis)
            .ok_or_else(|| bad_request(format!("Unsupported interval: {millis} ms")))?,
        IntervalValue::Text(text) => text.parse::<CycleInterval>().map_err(bad_request)?,
    };
    state
        .scheduler
        .set_interval(interval)
        .await
        .map_err(scheduler_failure)?;
    get_status(State(state)).await
}

/// POST /api/airports/current - Show the current airport without advancing.
async fn send_current_airport(State(state): State<AppState>) -> ApiResult<TextResponse> {
    let text = state
        .scheduler
        .send_current_airport()
        .await
        .map_err(scheduler_failure)?;
    Ok(Json(TextResponse { text }))
}

/// POST /api/airports/reset - Rewind the cycler.
async fn reset_airports(State(state): State<AppState>) -> ApiResult<SchedulerStatus> {
    state
        .scheduler
        .reset_cycler()
        .await
        .map_err(scheduler_failure)?;
    get_status(State(state)).await
}

/// PUT /api/clock/format - Change the clock template.
async fn set_clock_format(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ClockFormatRequest>,
) -> ApiResult<SchedulerStatus> {
    let format: ClockFormat = request.format.parse().map_err(bad_request)?;
    state
        .scheduler
        .set_clock_format(format)
        .await
        .map_err(scheduler_failure)?;
    get_status(State(state)).await
}

/// POST /api/text - Show free text or a formatted code.
async fn send_text(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TextRequest>,
) -> ApiResult<TextResponse> {
    let result = if request.code {
        state.scheduler.send_code(request.text).await
    } else {
        state.scheduler.send_text(request.text).await
    };
    let text = result.map_err(scheduler_failure)?;
    Ok(Json(TextResponse { text }))
}

/// POST /api/blank - Blank every module.
async fn blank(State(state): State<AppState>) -> ApiResult<TextResponse> {
    let text = state.scheduler.blank().await.map_err(scheduler_failure)?;
    Ok(Json(TextResponse { text }))
}

/// POST /api/test-character - Show one character on every module.
async fn test_character(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TestCharacterRequest>,
) -> ApiResult<TextResponse> {
    let mut chars = request.character.chars();
    let (Some(character), None) = (chars.next(), chars.next()) else {
        return Err(bad_request("Expected exactly one character"));
    };
    let text = state
        .scheduler
        .test_character(character)
        .await
        .map_err(scheduler_failure)?;
    Ok(Json(TextResponse { text }))
}

/// POST /api/home - Home all modules.
async fn home(State(state): State<AppState>) -> ApiResult<AckResponse> {
    state.scheduler.home().await.map_err(scheduler_failure)?;
    Ok(Json(AckResponse::ok()))
}

/// POST /api/calibrate - Calibrate one module or all of them.
async fn calibrate(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<AckResponse> {
    // An empty body calibrates every module.
    let request: CalibrateRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CalibrateRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| invalid_body(e.to_string()))?
    };
    let module = request.module;
    state
        .scheduler
        .calibrate(module)
        .await
        .map_err(scheduler_failure)?;
    Ok(Json(AckResponse::ok()))
}

/// GET /api/airlines/{code} - Run a code through the formatter.
async fn get_airline(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<CodeLookup> {
    state
        .scheduler
        .lookup_code(code)
        .await
        .map(Json)
        .map_err(scheduler_failure)
}

/// PUT /api/airlines/{code} - Add or replace a mapping.
async fn put_airline(
    State(state): State<AppState>,
    Path(code): Path<String>,
    ApiJson(request): ApiJson<AirlineUpdateRequest>,
) -> ApiResult<CodeLookup> {
    let key = normalize(&code);
    let short_code = request.short_code.trim().to_string();
    if key.is_empty() || short_code.is_empty() {
        return Err(bad_request("Code and short_code must not be empty"));
    }
    state
        .scheduler
        .upsert_code(key.clone(), short_code)
        .await
        .map_err(scheduler_failure)?;
    get_airline(State(state), Path(key)).await
}

/// POST /api/commands - Apply a remote command.
async fn post_command(
    State(state): State<AppState>,
    ApiJson(command): ApiJson<RemoteCommand>,
) -> ApiResult<CommandReceipt> {
    let receipt = CommandReceipt::issue(&command);
    command
        .apply(&state.scheduler)
        .await
        .map_err(scheduler_failure)?;
    Ok(Json(receipt))
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    // The API is meant for a trusted LAN; any origin may call it.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/status", get(get_status))
        // Modes
        .route("/api/modes", axum::routing::delete(stop_mode))
        .route("/api/modes/{mode}", post(start_mode))
        // Airport cycling
        .route("/api/airports", get(list_airports))
        .route("/api/airports/interval", put(set_interval))
        .route("/api/airports/current", post(send_current_airport))
        .route("/api/airports/reset", post(reset_airports))
        // Clock
        .route("/api/clock/format", put(set_clock_format))
        // Manual display control
        .route("/api/text", post(send_text))
        .route("/api/blank", post(blank))
        .route("/api/test-character", post(test_character))
        // Maintenance
        .route("/api/home", post(home))
        .route("/api/calibrate", post(calibrate))
        // Code mapping
        .route("/api/airlines/{code}", get(get_airline).put(put_airline))
        // Remote control
        .route("/api/commands", post(post_command))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs the control API until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn run_server(
    scheduler: SchedulerHandle,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(AppState::new(scheduler));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind control API to {addr}"))?;
    info!("Starting {} control API on {}", APP_NAME, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_failure_status_codes() {
        assert_eq!(
            scheduler_failure(SchedulerError::NotConnected).0,
            StatusCode::CONFLICT
        );
        assert_eq!(
            scheduler_failure(SchedulerError::Sink(SinkError::NotConnected)).0,
            StatusCode::CONFLICT
        );
        assert_eq!(
            scheduler_failure(SchedulerError::Sink(SinkError::Unsupported {
                sink: "mqtt",
                operation: "home",
            }))
            .0,
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(
            scheduler_failure(SchedulerError::Sink(SinkError::Status(500))).0,
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            scheduler_failure(SchedulerError::InvalidModule {
                module: 9,
                width: 6
            })
            .0,
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_interval_value_accepts_both_shapes() {
        let millis: IntervalRequest = serde_json::from_str(r#"{"interval":300000}"#).unwrap();
        assert!(matches!(millis.interval, IntervalValue::Millis(300_000)));

        let text: IntervalRequest = serde_json::from_str(r#"{"interval":"15m"}"#).unwrap();
        assert!(matches!(text.interval, IntervalValue::Text(ref t) if t == "15m"));
    }
}
