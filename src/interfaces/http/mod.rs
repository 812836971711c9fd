//! HTTP surface of the service.
//!
//! Routes:
//! - `POST /api/withdraw` submit a withdrawal
//! - `GET  /api/notice` current system notice
//! - `GET  /api/admin/withdrawals?secret=…` full ledger, newest first
//! - `POST /api/admin/notice?secret=…` override the notice

pub mod handlers;

use crate::application::controller::WithdrawalController;
use crate::application::notice_board::NoticeBoard;
use crate::domain::ports::LedgerRef;
use crate::error::PayoutError;
use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::error;

/// Shared state behind every handler.
pub struct AppState {
    pub controller: Arc<WithdrawalController>,
    pub ledger: LedgerRef,
    pub notice: Arc<NoticeBoard>,
    /// Admin endpoints answer 401 to everyone while this is `None`.
    pub admin_secret: Option<String>,
}

impl AppState {
    pub(crate) fn admin_authorized(&self, secret: Option<&str>) -> bool {
        matches!(
            (self.admin_secret.as_deref(), secret),
            (Some(expected), Some(given)) if !expected.is_empty() && expected == given
        )
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/withdraw", post(handlers::withdraw))
        .route("/api/notice", get(handlers::notice))
        .route("/api/admin/withdrawals", get(handlers::list_withdrawals))
        .route("/api/admin/notice", post(handlers::set_notice))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    Internal,
}

impl From<PayoutError> for ApiError {
    fn from(err: PayoutError) -> Self {
        match err {
            PayoutError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            other => {
                error!(error = %other, "request failed");
                ApiError::Internal
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            ),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
