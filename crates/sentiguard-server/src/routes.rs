//! HTTP routes and handlers

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use sentiguard_core::{Comment, CredentialStatus, Error, IngestReport, LinkedChild, Parent};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::auth;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/children", get(list_children).post(link_child))
        .route("/api/children/verify", post(verify_child))
        .route("/api/children/credentials", get(credential_health))
        .route("/api/children/:id", delete(remove_child))
        .route("/api/children/:id/ingest", post(ingest_child))
        .route("/api/children/:id/comments", get(child_comments))
        .route("/api/ingest", post(ingest_all))
        .route("/api/comments/toxic", get(toxic_comments))
        .route("/api/comments/reclassify", post(reclassify))
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}

async fn fallback() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "not_found", "no such route")
}

// -- auth --

#[derive(Debug, Deserialize)]
struct SignupRequest {
    username: String,
    email: String,
    password: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    token: String,
    parent_id: Uuid,
    username: String,
}

async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Response, ApiError> {
    if req.username.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "username, email, and password are required",
        ));
    }

    if state.store.parent_by_username(&req.username).is_some() {
        return Err(ApiError::new(
            StatusCode::CONFLICT,
            "username_taken",
            format!("username '{}' is already registered", req.username),
        ));
    }

    let parent = Parent {
        id: Uuid::new_v4(),
        username: req.username,
        email: req.email,
        display_name: req.display_name,
        password_hash: auth::hash_password(&req.password)?,
        created_at: Utc::now(),
    };
    state.store.insert_parent(parent.clone())?;
    info!(username = %parent.username, "parent account created");

    let token = state.sessions.issue(parent.id);
    let body = Json(SessionResponse {
        token,
        parent_id: parent.id,
        username: parent.username,
    });
    Ok((StatusCode::CREATED, body).into_response())
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    // Same error for unknown user and wrong password
    let rejected = || {
        ApiError::new(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "invalid username or password",
        )
    };

    let parent = state
        .store
        .parent_by_username(&req.username)
        .ok_or_else(rejected)?;
    if !auth::verify_password(&req.password, &parent.password_hash) {
        return Err(rejected());
    }

    let token = state.sessions.issue(parent.id);
    Ok(Json(SessionResponse {
        token,
        parent_id: parent.id,
        username: parent.username,
    }))
}

/// Invalidate every session of the authenticated parent
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let parent = require_parent(&state, &headers)?;
    state.sessions.revoke_parent(&parent.id);
    info!(username = %parent.username, "parent logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// Resolve the bearer token in `Authorization` to the owning parent
fn require_parent(state: &AppState, headers: &HeaderMap) -> Result<Parent, ApiError> {
    let unauthorized = || {
        ApiError::new(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "missing or invalid bearer token",
        )
    };

    let token = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(unauthorized)?;

    let parent_id = state.sessions.authenticate(token).ok_or_else(unauthorized)?;
    state.store.parent_by_id(&parent_id).ok_or_else(unauthorized)
}

// -- children --

/// Subscription view without the stored access token
#[derive(Debug, Serialize)]
struct ChildView {
    id: Uuid,
    handle: String,
    linked: bool,
    consent_given: bool,
    created_at: DateTime<Utc>,
}

impl From<LinkedChild> for ChildView {
    fn from(child: LinkedChild) -> Self {
        Self {
            linked: child.credentials().is_some(),
            id: child.id,
            handle: child.handle,
            consent_given: child.consent_given,
            created_at: child.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LinkRequest {
    handle: String,
}

async fn list_children(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ChildView>>, ApiError> {
    let parent = require_parent(&state, &headers)?;
    let children = state
        .store
        .children_of(&parent.id)
        .into_iter()
        .map(ChildView::from)
        .collect();
    Ok(Json(children))
}

async fn link_child(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LinkRequest>,
) -> Result<Response, ApiError> {
    let parent = require_parent(&state, &headers)?;
    validate_handle(&req.handle)?;
    let child = state.linkage.link_child(parent.id, &req.handle)?;
    Ok((StatusCode::CREATED, Json(ChildView::from(child))).into_response())
}

async fn verify_child(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LinkRequest>,
) -> Result<Response, ApiError> {
    let parent = require_parent(&state, &headers)?;
    validate_handle(&req.handle)?;
    let child = state.linkage.verify_child(parent.id, &req.handle)?;
    Ok((StatusCode::CREATED, Json(ChildView::from(child))).into_response())
}

async fn remove_child(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let parent = require_parent(&state, &headers)?;
    owned_child(&state, &parent, &id)?;
    state.store.delete_child(&id)?;
    info!(child = %id, "subscription removed");
    Ok(StatusCode::NO_CONTENT)
}

async fn credential_health(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<CredentialStatus>>, ApiError> {
    let parent = require_parent(&state, &headers)?;
    Ok(Json(state.engine.check_credentials(&parent.id).await))
}

// -- ingestion --

async fn ingest_child(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<IngestReport>, ApiError> {
    let parent = require_parent(&state, &headers)?;
    owned_child(&state, &parent, &id)?;
    let report = state.engine.ingest_child(&id).await?;
    Ok(Json(report))
}

async fn ingest_all(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<IngestReport>, ApiError> {
    let parent = require_parent(&state, &headers)?;
    let report = state.engine.ingest_parent(&parent.id).await?;
    Ok(Json(report))
}

// -- comments --

async fn child_comments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let parent = require_parent(&state, &headers)?;
    owned_child(&state, &parent, &id)?;
    Ok(Json(state.store.comments_of(&id)))
}

async fn toxic_comments(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let parent = require_parent(&state, &headers)?;
    Ok(Json(state.store.toxic_comments_of_parent(&parent.id)))
}

#[derive(Debug, Serialize)]
struct ReclassifyResponse {
    updated: usize,
}

async fn reclassify(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ReclassifyResponse>, ApiError> {
    require_parent(&state, &headers)?;
    let updated = state.engine.reclassify_all().await?;
    Ok(Json(ReclassifyResponse { updated }))
}

// -- helpers --

fn validate_handle(handle: &str) -> Result<(), ApiError> {
    if handle.trim().is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "handle must not be empty",
        ));
    }
    Ok(())
}

/// 404 unless the child exists and belongs to the authenticated parent.
/// Other parents' children are indistinguishable from absent ones.
fn owned_child(state: &AppState, parent: &Parent, id: &Uuid) -> Result<LinkedChild, ApiError> {
    state
        .store
        .child(id)
        .filter(|child| child.parent_id == parent.id)
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::NOT_FOUND,
                "not_found",
                format!("no such child {id}"),
            )
        })
}

// -- errors --

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = err.code();
        let status = match &err {
            Error::MissingCredentials => StatusCode::BAD_REQUEST,
            Error::NotConfigured(_) | Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Auth(_) => StatusCode::UNAUTHORIZED,
            Error::Upstream { .. } | Error::Malformed(_) => StatusCode::BAD_GATEWAY,
            Error::Timeout => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            // Details go to the log, not the client
            error!(code, error = %err, "request failed");
            return Self::new(status, code, "internal error");
        }
        Self::new(status, code, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.code,
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}
