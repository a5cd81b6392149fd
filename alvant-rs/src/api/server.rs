//! API Server - HTTP server for the REST API

use axum::{
    extract::{FromRequestParts, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        request::Parts,
        HeaderValue, Method, StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::api::admin;
use crate::api::handlers::{self, ApiError, AppState};
use crate::auth::Claims;
use crate::config::ServerConfig;

/// API Server configuration
pub struct ApiServer {
    state: Arc<AppState>,
    addr: String,
    cors_origins: Vec<String>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(state: AppState, server: &ServerConfig) -> Self {
        Self {
            state: Arc::new(state),
            addr: server.listen_addr.clone(),
            cors_origins: server.cors_origins.clone(),
        }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        // Public routes (no auth required)
        let public_routes = Router::new()
            .route("/health", get(handlers::health))
            .route("/contact", post(handlers::submit_contact))
            .route("/register", post(handlers::submit_registration))
            .route("/admin/request-otp", post(admin::request_otp))
            .route("/admin/verify-otp", post(admin::verify_otp))
            .route("/admin/verify-token", get(admin::verify_token));

        // Protected routes (admin token required)
        let protected_routes = Router::new()
            .route("/contact", get(handlers::list_contacts))
            .route("/register", get(handlers::list_registrations))
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth_middleware,
            ));

        let api_routes = public_routes
            .merge(protected_routes)
            .fallback(handlers::api_not_found);

        Router::new()
            .route("/", get(handlers::root))
            .nest("/api", api_routes)
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&self.cors_origins))
            .with_state(self.state.clone())
    }

    /// Start the API server and serve until Ctrl-C or SIGTERM
    pub async fn run(&self) -> std::io::Result<()> {
        let router = self.router();

        info!("Starting API server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("API server stopped");
        Ok(())
    }
}

/// Credentialed CORS; with no configured origins the request origin is mirrored
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|origin| {
            let parsed = origin.parse::<HeaderValue>();
            if parsed.is_err() {
                warn!("Ignoring invalid CORS origin: {}", origin);
            }
            parsed.ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Authentication middleware - validates the bearer token
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match state.tokens.validate_bearer(auth_header, state.clock.now()) {
        Ok(claims) => {
            // Store claims in request extensions for handlers
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => {
            warn!("Rejected admin request to {}: {}", req.uri().path(), e);
            state.reject(e).into_response()
        }
    }
}

/// Extract Claims from request (for handlers)
#[axum::async_trait]
impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ApiError>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Claims>().cloned().ok_or((
            StatusCode::UNAUTHORIZED,
            Json(ApiError::new("Not authenticated")),
        ))
    }
}
