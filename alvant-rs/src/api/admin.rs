//! Admin login endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::api::handlers::{json_body, ApiResult, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct RequestOtpRequest {
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: Option<String>,
    /// Dashboards send the code as a string or a bare number
    #[serde(default, alias = "code", deserialize_with = "string_or_number")]
    pub otp: Option<String>,
    #[serde(default)]
    pub remember: bool,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "otp must be a string or number, got {}",
            other
        ))),
    }
}

/// POST /api/admin/request-otp - Email a login code to the admin
pub async fn request_otp(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RequestOtpRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let req = json_body(&state, payload)?;

    state
        .otp
        .request_otp(req.email.as_deref().unwrap_or_default())
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(json!({ "message": "OTP sent to your email" })))
}

/// POST /api/admin/verify-otp - Exchange a valid code for a token
pub async fn verify_otp(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let req = json_body(&state, payload)?;

    let token = state
        .otp
        .verify_otp(
            req.email.as_deref().unwrap_or_default(),
            req.otp.as_deref().unwrap_or_default(),
            req.remember,
        )
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(TokenResponse { token }))
}

/// GET /api/admin/verify-token - Check a bearer token and echo its claims
pub async fn verify_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let header = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok());

    let claims = state
        .tokens
        .validate_bearer(header, state.clock.now())
        .map_err(|e| state.reject(e))?;

    Ok(Json(json!({ "ok": true, "admin": claims })))
}
