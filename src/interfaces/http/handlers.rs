use super::{ApiError, AppState};
use crate::domain::notice::SystemNotice;
use crate::domain::withdrawal::WithdrawalRecord;
use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    /// Payout address. Older clients send it as `email`.
    #[serde(alias = "email")]
    pub recipient: Option<String>,
    pub amount: Option<Decimal>,
}

/// Always `success: true`; `paid` says whether the money actually moved.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct WithdrawResponse {
    pub success: bool,
    pub paid: bool,
    pub message: String,
    pub batch_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    pub secret: Option<String>,
}

pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<WithdrawRequest>, JsonRejection>,
) -> Result<Json<WithdrawResponse>, ApiError> {
    let Json(req) = payload?;
    let (Some(recipient), Some(amount)) = (req.recipient, req.amount) else {
        return Err(ApiError::BadRequest(
            "recipient and amount are required".to_string(),
        ));
    };

    let receipt = state.controller.submit(&recipient, amount).await?;
    Ok(Json(WithdrawResponse {
        success: true,
        paid: receipt.settled,
        message: receipt.message,
        batch_id: receipt.reference,
    }))
}

pub async fn notice(State(state): State<Arc<AppState>>) -> Json<SystemNotice> {
    Json(state.notice.read().as_ref().clone())
}

pub async fn list_withdrawals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AdminQuery>,
) -> Result<Json<Vec<WithdrawalRecord>>, ApiError> {
    if !state.admin_authorized(query.secret.as_deref()) {
        return Err(ApiError::Unauthorized);
    }
    Ok(Json(state.ledger.snapshot().await?))
}

pub async fn set_notice(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AdminQuery>,
    payload: Result<Json<SystemNotice>, JsonRejection>,
) -> Result<Json<SystemNotice>, ApiError> {
    if !state.admin_authorized(query.secret.as_deref()) {
        return Err(ApiError::Unauthorized);
    }
    let Json(notice) = payload?;
    info!(severity = %notice.severity, message = %notice.message, "notice overridden by admin");
    state.notice.publish(notice.clone());
    Ok(Json(notice))
}
