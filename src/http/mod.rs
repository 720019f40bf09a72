//! HTTP surface of the backend.
//!
//! Translates requests into [`ProjectStore`] calls and
//! [`RequestGate`] checks, maps the error taxonomy onto status codes,
//! relays the two public forms, and serves the static frontend.
//!
//! ## Routes
//!
//! | Method | Path | Gated |
//! |---|---|---|
//! | GET | `/api/projects` | no |
//! | GET | `/admin` | yes |
//! | POST | `/api/projects/add` | yes |
//! | PUT | `/api/projects/update/{id}` | yes |
//! | DELETE | `/api/projects/delete/{id}` | yes |
//! | POST | `/api/subscribe` | no |
//! | POST | `/api/contact` | no |
//!
//! Everything else falls through to the static frontend with an
//! `index.html` fallback. Responses carry `{"message": "..."}` bodies;
//! gate denials answer 401 with a Basic challenge (credentials) or 403
//! (blocked address) before any store interaction.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Path, Request, State};
use axum::http::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info};

use crate::config::Config;
use crate::error::{BackendError, GateDenied, Result};
use crate::gate::{RequestContext, RequestGate};
use crate::project::{ProjectCollection, ProjectDraft};
use crate::relay::{DisabledRelay, EmailMessage, NotificationRelay, SmtpRelay};
use crate::store::ProjectStore;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    /// The project store.
    pub store: Arc<ProjectStore>,

    /// Gate consulted by the admin middleware.
    pub gate: Arc<RequestGate>,

    /// Outbound notification transport.
    pub relay: Arc<dyn NotificationRelay>,

    /// Server configuration (static dir, port).
    pub config: Arc<Config>,
}

/// The `{"message": "..."}` body used by every non-collection response.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageBody {
    /// Human-readable outcome.
    pub message: String,
}

impl MessageBody {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Newsletter signup payload.
#[derive(Debug, Default, Deserialize)]
pub struct SubscribePayload {
    /// Subscriber address.
    #[serde(default)]
    pub email: String,
}

/// Contact-form payload.
#[derive(Debug, Default, Deserialize)]
pub struct ContactPayload {
    /// Sender name.
    #[serde(default)]
    pub name: String,

    /// Sender address.
    #[serde(default)]
    pub email: String,

    /// Message text.
    #[serde(default)]
    pub message: String,
}

// ============================================================================
// Error mapping
// ============================================================================

/// A request-terminal error mapped to a status and message body.
struct ApiError {
    status: StatusCode,
    message: String,
    challenge: bool,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            challenge: false,
        }
    }
}

impl From<GateDenied> for ApiError {
    fn from(denied: GateDenied) -> Self {
        let status = if denied.wants_challenge() {
            StatusCode::UNAUTHORIZED
        } else {
            StatusCode::FORBIDDEN
        };
        Self {
            status,
            message: denied.to_string(),
            challenge: denied.wants_challenge(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response =
            (self.status, Json(MessageBody::new(self.message))).into_response();
        if self.challenge {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"admin\""),
            );
        }
        response
    }
}

/// Maps a store error on a project route.
///
/// Validation and not-found keep the site's established message texts;
/// anything else is a persistence failure answered with the
/// route-specific 500 message.
fn project_error(err: BackendError, failure_message: &str) -> ApiError {
    match &err {
        BackendError::Validation(_) => {
            ApiError::new(StatusCode::BAD_REQUEST, "All fields are required")
        }
        BackendError::NotFound(_) => ApiError::new(StatusCode::NOT_FOUND, "Project not found"),
        _ => {
            error!(error = %err, "Project mutation failed");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, failure_message)
        }
    }
}

// ============================================================================
// Gate middleware
// ============================================================================

/// Client address for the gate's origin predicate.
///
/// Honors the first `x-forwarded-for` hop when present (reverse-proxy
/// deployments), otherwise the connection address.
fn client_ip(headers: &HeaderMap, addr: SocketAddr) -> IpAddr {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or_else(|| addr.ip())
}

/// Middleware guarding the admin page and the mutating project routes.
///
/// A denial short-circuits here; the store is never touched.
async fn require_admin(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let ctx = RequestContext::new(client_ip(request.headers(), addr), authorization);

    match state.gate.authorize(&ctx) {
        Ok(()) => next.run(request).await,
        Err(denied) => ApiError::from(denied).into_response(),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /api/projects` — the full collection, ungated.
async fn list_projects(State(state): State<AppState>) -> Json<ProjectCollection> {
    Json(state.store.list())
}

/// `POST /api/projects/add`
async fn add_project(
    State(state): State<AppState>,
    Json(draft): Json<ProjectDraft>,
) -> std::result::Result<Json<MessageBody>, ApiError> {
    state
        .store
        .add(draft)
        .map_err(|err| project_error(err, "Failed to add project"))?;
    Ok(Json(MessageBody::new("Project added successfully")))
}

/// `PUT /api/projects/update/{id}`
async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<ProjectDraft>,
) -> std::result::Result<Json<MessageBody>, ApiError> {
    state
        .store
        .update(&id, draft)
        .map_err(|err| project_error(err, "Failed to update project"))?;
    Ok(Json(MessageBody::new("Project updated successfully")))
}

/// `DELETE /api/projects/delete/{id}`
async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> std::result::Result<Json<MessageBody>, ApiError> {
    state
        .store
        .delete(&id)
        .map_err(|err| project_error(err, "Failed to delete project"))?;
    Ok(Json(MessageBody::new("Project deleted successfully")))
}

/// `POST /api/subscribe`
async fn subscribe(
    State(state): State<AppState>,
    Json(payload): Json<SubscribePayload>,
) -> std::result::Result<Json<MessageBody>, ApiError> {
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "Email is required"));
    }

    state
        .relay
        .send(&EmailMessage::subscription(email))
        .await
        .map_err(|err| {
            error!(error = %err, "Subscription notification failed");
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to subscribe. Please try again.",
            )
        })?;

    Ok(Json(MessageBody::new("Thank you for subscribing!")))
}

/// `POST /api/contact`
async fn contact(
    State(state): State<AppState>,
    Json(payload): Json<ContactPayload>,
) -> std::result::Result<Json<MessageBody>, ApiError> {
    let (name, email, message) = (
        payload.name.trim(),
        payload.email.trim(),
        payload.message.trim(),
    );
    if name.is_empty() || email.is_empty() || message.is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "All fields are required",
        ));
    }

    state
        .relay
        .send(&EmailMessage::contact(name, email, message))
        .await
        .map_err(|err| {
            error!(error = %err, "Contact notification failed");
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send message. Please try again.",
            )
        })?;

    Ok(Json(MessageBody::new(
        "Message sent! I’ll get back to you soon.",
    )))
}

// ============================================================================
// Router and server loop
// ============================================================================

/// Builds the application router over the given state.
///
/// Exposed separately from [`serve`] so tests can mount the full surface
/// on an ephemeral listener.
pub fn router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route_service(
            "/admin",
            ServeFile::new(state.config.static_dir.join("admin.html")),
        )
        .route("/api/projects/add", post(add_project))
        .route("/api/projects/update/{id}", put(update_project))
        .route("/api/projects/delete/{id}", delete(delete_project))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ));

    let public_routes = Router::new()
        .route("/api/projects", get(list_projects))
        .route("/api/subscribe", post(subscribe))
        .route("/api/contact", post(contact));

    let frontend = ServeDir::new(&state.config.static_dir)
        .fallback(ServeFile::new(state.config.static_dir.join("index.html")));

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .fallback_service(frontend)
        .layer(cors)
        .with_state(state)
}

/// Builds the shared state from configuration.
///
/// Opens the store (loading the projects file once) and wires the gate
/// and relay the configuration asks for.
pub fn build_state(config: Config) -> Result<AppState> {
    let store = Arc::new(ProjectStore::open(&config.projects_file)?);

    let mut gate = RequestGate::new(config.admin.clone());
    if config.ip_filter {
        gate = gate.with_ip_allowlist(config.allowed_ips.clone());
    }

    let relay: Arc<dyn NotificationRelay> = match &config.mail {
        Some(mail) => Arc::new(SmtpRelay::new(mail)?),
        None => Arc::new(DisabledRelay),
    };

    Ok(AppState {
        store,
        gate: Arc::new(gate),
        relay,
        config: Arc::new(config),
    })
}

/// Runs the server until a shutdown signal arrives.
pub async fn serve(config: Config) -> Result<()> {
    let state = build_state(config)?;

    let address = format!("0.0.0.0:{}", state.config.port);
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on http://{address}");

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
