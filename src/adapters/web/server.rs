use std::{convert::Infallible, future::Future, sync::Arc};

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing::instrument;

use crate::adapters::config::web_config::AuthConfig;
use crate::ports::approval_service::ApprovalService;

use super::{
    handlers,
    session::{PasswordGate, SessionContext, SessionKeys},
};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn ApprovalService>,
    pub gate: Arc<PasswordGate>,
}

impl AppState {
    pub fn new(service: Arc<dyn ApprovalService>, auth: &AuthConfig) -> Self {
        let keys = match auth.session_secret.as_deref() {
            Some(secret) if !secret.is_empty() => SessionKeys::new(secret.as_bytes()),
            _ => SessionKeys::generate(),
        };
        let gate = PasswordGate::new(auth.password.as_deref(), keys);
        if !gate.is_enabled() {
            tracing::warn!("No operator password configured, the dashboard is open to anyone who can reach it");
        }

        Self {
            service,
            gate: Arc::new(gate),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for SessionContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(state.gate.context(&parts.headers))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/resolve", post(handlers::resolve))
        .route("/healthz", get(handlers::health))
        .layer(middleware::from_fn(handlers::reject_cross_origin_posts))
        .with_state(state)
}

/// Serves the dashboard on `listener` until `shutdown` completes.
#[instrument(skip_all, fields(addr = ?listener.local_addr().ok()))]
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tracing::info!("🚀 Dashboard listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
