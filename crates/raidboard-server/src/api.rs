use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, Method},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use raidboard_core::{ActivityKind, Difficulty, Event, Slot, MAX_BACKUPS, MAX_PRIMARY};

use crate::accounts::AccountService;
use crate::board::BoardService;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::sessions::SessionProvider;

#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub board: BoardService,
    pub sessions: SessionProvider,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/info", get(server_info))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/events", get(list_events))
        .route("/events", post(create_event))
        .route("/events/:name/join", post(join_event))
        .route("/events/:name/leave", post(leave_event))
        .route("/events/:name/cancel", post(request_cancel))
        .route("/events/:name/cancel/confirm", post(confirm_cancel))
        .route("/events/:name/cancel/decline", post(decline_cancel))
        .route("/background", get(background_image))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct ServerInfoResponse {
    name: String,
    version: &'static str,
    kinds: Vec<&'static str>,
    max_primary: usize,
    max_backups: usize,
}

#[derive(Deserialize)]
struct CredentialsRequest {
    name: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    token: Uuid,
    name: String,
    expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct CreateEventRequest {
    kind: ActivityKind,
    name: String,
    scheduled_at: NaiveDateTime,
    difficulty: Difficulty,
    #[serde(default)]
    notes: String,
}

#[derive(Serialize)]
struct EventsResponse {
    active: Vec<Event>,
    concluded: Vec<Event>,
}

#[derive(Serialize)]
struct SlotResponse {
    slot: Slot,
}

// ---------------------------------------------------------------------------
// Auth helper
// ---------------------------------------------------------------------------

/// Resolve the bearer token in `Authorization` to the logged-in account.
async fn current_user(state: &AppState, headers: &HeaderMap) -> Result<String, ServerError> {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let raw = auth.strip_prefix("Bearer ").unwrap_or(auth);

    let token = Uuid::parse_str(raw.trim()).map_err(|_| ServerError::NotLoggedIn)?;
    state
        .sessions
        .current_user(token)
        .await
        .ok_or(ServerError::NotLoggedIn)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn server_info(State(state): State<AppState>) -> Json<ServerInfoResponse> {
    Json(ServerInfoResponse {
        name: state.config.instance_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        kinds: ActivityKind::ALL.iter().map(|k| k.label()).collect(),
        max_primary: MAX_PRIMARY,
        max_backups: MAX_BACKUPS,
    })
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<serde_json::Value>, ServerError> {
    state.accounts.register(&req.name, &req.password).await?;
    Ok(Json(serde_json::json!({ "registered": true })))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<LoginResponse>, ServerError> {
    let name = state.accounts.authenticate(&req.name, &req.password).await?;
    let (token, expires_at) = state.sessions.login(&name).await;

    Ok(Json(LoginResponse {
        token,
        name,
        expires_at,
    }))
}

async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ServerError> {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let raw = auth.strip_prefix("Bearer ").unwrap_or(auth);

    if let Ok(token) = Uuid::parse_str(raw.trim()) {
        state.sessions.logout(token).await;
    }
    Ok(Json(serde_json::json!({ "logged_out": true })))
}

async fn list_events(State(state): State<AppState>) -> Result<Json<EventsResponse>, ServerError> {
    let now = Local::now().naive_local();
    let (active, concluded) = state.board.overview(now).await?;
    Ok(Json(EventsResponse { active, concluded }))
}

async fn create_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateEventRequest>,
) -> Result<Json<Event>, ServerError> {
    let creator = current_user(&state, &headers).await?;
    let event = state
        .board
        .create_event(
            req.kind,
            &req.name,
            req.scheduled_at,
            req.difficulty,
            &req.notes,
            &creator,
        )
        .await?;
    Ok(Json(event))
}

async fn join_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<SlotResponse>, ServerError> {
    let account = current_user(&state, &headers).await?;
    let slot = state.board.join(&name, &account).await?;
    Ok(Json(SlotResponse { slot }))
}

async fn leave_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<SlotResponse>, ServerError> {
    let account = current_user(&state, &headers).await?;
    let slot = state.board.leave(&name, &account).await?;
    Ok(Json(SlotResponse { slot }))
}

async fn request_cancel(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let requester = current_user(&state, &headers).await?;
    state.board.request_cancel(&name, &requester).await?;
    Ok(Json(serde_json::json!({ "pending": true })))
}

async fn confirm_cancel(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let requester = current_user(&state, &headers).await?;
    state.board.confirm_cancel(&name, &requester).await?;
    Ok(Json(serde_json::json!({ "cancelled": true })))
}

async fn decline_cancel(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let requester = current_user(&state, &headers).await?;
    state.board.decline_cancel(&name, &requester).await?;
    Ok(Json(serde_json::json!({ "pending": false })))
}

/// Serve the configured static background image for event cards.
async fn background_image(
    State(state): State<AppState>,
) -> Result<([(header::HeaderName, &'static str); 1], Vec<u8>), ServerError> {
    let Some(path) = state.config.background_image.as_ref() else {
        return Err(ServerError::NotFound("no background image configured".to_string()));
    };

    match tokio::fs::read(path).await {
        Ok(data) => Ok(([(header::CONTENT_TYPE, "image/jpeg")], data)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ServerError::NotFound("background image missing".to_string()))
        }
        Err(e) => Err(ServerError::Internal(e.to_string())),
    }
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    tracing::info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
