//! API request handlers

use axum::{
    extract::{rejection::JsonRejection, OriginalUri, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

use crate::auth::{Claims, JwtConfig, OtpService, OtpSettings};
use crate::clock::Clock;
use crate::config::{Config, RuntimeMode};
use crate::error::{AppError, FieldErrors};
use crate::forms::{ContactForm, RegisterInterestForm};
use crate::notify::OtpNotifier;
use crate::storage::{ContactRepository, Database, RegisterInterestRepository, SqliteCredentialStore};

/// Shared application state
pub struct AppState {
    pub otp: OtpService,
    pub tokens: Arc<JwtConfig>,
    pub contacts: ContactRepository,
    pub interests: RegisterInterestRepository,
    pub db: Database,
    pub clock: Arc<dyn Clock>,
    pub mode: RuntimeMode,
}

impl AppState {
    pub fn new(
        config: &Config,
        db: Database,
        notifier: Arc<dyn OtpNotifier>,
        clock: Arc<dyn Clock>,
    ) -> crate::error::Result<Self> {
        let tokens = Arc::new(JwtConfig::from_config(&config.admin)?);
        let otp = OtpService::new(
            Arc::new(SqliteCredentialStore::new(&db)),
            notifier,
            tokens.clone(),
            clock.clone(),
            OtpSettings::from_config(config),
        );

        Ok(Self {
            otp,
            tokens,
            contacts: ContactRepository::new(&db),
            interests: RegisterInterestRepository::new(&db),
            db,
            clock,
            mode: config.runtime.mode,
        })
    }

    /// Turn an error into the response body the client sees.
    ///
    /// Development mode adds the internal error text as `details`.
    pub fn reject(&self, err: AppError) -> (StatusCode, Json<ApiError>) {
        let status = err.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", err);
        } else {
            debug!("Request rejected: {}", err);
        }

        let details = (!err.is_client_facing() && !self.mode.is_production()).then(|| err.to_string());
        let errors = match &err {
            AppError::InvalidFields(fields) => Some(fields.clone()),
            _ => None,
        };

        (
            status,
            Json(ApiError {
                error: err.public_message(),
                errors,
                details,
            }),
        )
    }
}

pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(msg: &str) -> Self {
        Self {
            error: msg.to_string(),
            errors: None,
            details: None,
        }
    }
}

/// Unwrap a JSON body, reporting malformed input as a validation error
pub(crate) fn json_body<T>(
    state: &AppState,
    payload: Result<Json<T>, JsonRejection>,
) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| state.reject(AppError::Validation(rejection.body_text())))
}

/// GET / - Service description
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Alvant Backend API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "contact": "/api/contact",
            "register": "/api/register",
            "admin": "/api/admin",
        },
    }))
}

/// GET /api/health - Liveness plus a database probe
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let connected = state.db.health_check().await.is_ok();

    Json(json!({
        "status": "ok",
        "database": if connected { "connected" } else { "disconnected" },
        "connected": connected,
    }))
}

/// Fallback for unknown `/api/*` paths
pub async fn api_not_found(OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "API endpoint not found",
            "path": uri.path(),
        })),
    )
}

/// POST /api/contact - Save a contact submission
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let form = json_body(&state, payload)?;
    let contact = form
        .validate()
        .map_err(|fields| state.reject(AppError::InvalidFields(fields)))?;

    state
        .contacts
        .insert(contact, state.clock.now())
        .await
        .map_err(|e| state.reject(e))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Contact saved successfully" })),
    ))
}

/// GET /api/contact - List contact submissions (admin only)
pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
    claims: Claims,
) -> ApiResult<impl IntoResponse> {
    debug!("Listing contacts for {}", claims.email);
    let contacts = state.contacts.list().await.map_err(|e| state.reject(e))?;
    Ok(Json(contacts))
}

/// POST /api/register - Save an interest registration
pub async fn submit_registration(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterInterestForm>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let form = json_body(&state, payload)?;
    let registration = form
        .validate()
        .map_err(|fields| state.reject(AppError::InvalidFields(fields)))?;

    let saved = state
        .interests
        .insert(registration, state.clock.now())
        .await
        .map_err(|e| state.reject(e))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Registration saved", "data": saved })),
    ))
}

/// GET /api/register - List the newest registrations (admin only)
pub async fn list_registrations(
    State(state): State<Arc<AppState>>,
    claims: Claims,
) -> ApiResult<impl IntoResponse> {
    debug!("Listing registrations for {}", claims.email);
    let registrations = state.interests.list().await.map_err(|e| state.reject(e))?;
    Ok(Json(registrations))
}
