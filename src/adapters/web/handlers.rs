use axum::{
    extract::{Form, Query, Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::domain::request::RequestStatus;
use crate::ports::approval_service::{ApprovalServiceError, ResolveOutcome};

use super::{
    pages::{self, Notice},
    server::AppState,
    session::{self, PasswordGate, SessionContext},
};

#[derive(Debug, Deserialize)]
pub(super) struct DashboardQuery {
    outcome: Option<String>,
    rows: Option<usize>,
}

#[derive(Deserialize)]
pub(super) struct LoginForm {
    password: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(super) enum Decision {
    Approve,
    Reject,
}

impl Decision {
    fn status(self) -> RequestStatus {
        match self {
            Decision::Approve => RequestStatus::Approved,
            Decision::Reject => RequestStatus::Rejected,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ResolveForm {
    group_id: String,
    decision: Decision,
}

fn login_page(status: StatusCode, failed: bool) -> Response {
    (status, Html(pages::render_login(failed))).into_response()
}

fn error_page(status: StatusCode, message: &str) -> Response {
    (status, Html(pages::render_error(message))).into_response()
}

/// Refuses form posts sent from another site's page.
pub(super) async fn reject_cross_origin_posts(request: Request, next: Next) -> Response {
    if request.method() == Method::POST && !session::is_same_origin(request.headers()) {
        tracing::warn!(
            origin = ?request.headers().get(header::ORIGIN),
            path = %request.uri().path(),
            "Rejected cross-origin form post"
        );
        return error_page(
            StatusCode::FORBIDDEN,
            "Cross-site form submissions are not accepted.",
        );
    }
    next.run(request).await
}

pub(super) async fn dashboard(
    State(state): State<AppState>,
    session: SessionContext,
    Query(query): Query<DashboardQuery>,
) -> Response {
    if !session.authenticated {
        return login_page(StatusCode::OK, false);
    }

    match state.service.refresh().await {
        Ok(overview) => {
            let notice = Notice::from_query(query.outcome.as_deref(), query.rows);
            Html(pages::render_dashboard(&overview, notice, state.gate.is_enabled())).into_response()
        }
        Err(report) => {
            tracing::error!(?report, "Failed to load pending requests");
            error_page(
                StatusCode::SERVICE_UNAVAILABLE,
                "Could not load requests from the sheet. Check the service account and network, then refresh.",
            )
        }
    }
}

pub(super) async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    if !state.gate.check_password(&form.password) {
        tracing::warn!("Rejected login attempt");
        return login_page(StatusCode::UNAUTHORIZED, true);
    }

    tracing::info!("Operator logged in");
    (
        [(header::SET_COOKIE, state.gate.login_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}

pub(super) async fn logout() -> Response {
    (
        [(header::SET_COOKIE, PasswordGate::logout_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}

pub(super) async fn resolve(
    State(state): State<AppState>,
    session: SessionContext,
    Form(form): Form<ResolveForm>,
) -> Response {
    if !session.authenticated {
        return login_page(StatusCode::UNAUTHORIZED, false);
    }

    let status = form.decision.status();
    match state
        .service
        .resolve_pending_group(&form.group_id, status)
        .await
    {
        Ok(outcome) => {
            let notice = match (outcome, form.decision) {
                (ResolveOutcome::Resolved { rows }, Decision::Approve) => Notice::Approved { rows },
                (ResolveOutcome::Resolved { rows }, Decision::Reject) => Notice::Rejected { rows },
                (ResolveOutcome::AlreadyResolved, _) => Notice::AlreadyResolved,
            };
            tracing::info!(group_id = %form.group_id, ?outcome, status = status.slug(), "Resolved request group");
            Redirect::to(&format!("/?{}", notice.to_query())).into_response()
        }
        Err(report) => {
            tracing::error!(?report, group_id = %form.group_id, "Failed to resolve request group");
            match report.current_context() {
                ApprovalServiceError::Connectivity => error_page(
                    StatusCode::BAD_GATEWAY,
                    "Could not reach the sheet. The decision was not recorded.",
                ),
                ApprovalServiceError::Write => error_page(
                    StatusCode::BAD_GATEWAY,
                    "The sheet rejected the status update. Refresh to see which rows changed.",
                ),
                ApprovalServiceError::InvalidTransition(_) => {
                    error_page(StatusCode::BAD_REQUEST, "That decision is not allowed.")
                }
            }
        }
    }
}

pub(super) async fn health(State(state): State<AppState>) -> Response {
    match state.service.health_check().await {
        Ok(report) => (StatusCode::OK, report).into_response(),
        Err(report) => {
            tracing::warn!(?report, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "Unhealthy\n").into_response()
        }
    }
}
