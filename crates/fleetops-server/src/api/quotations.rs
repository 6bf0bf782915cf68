use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use fleetops_core::{Quotation, QuotationStatus, QuotationTotals};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RejectRequest {
    pub notes: Option<String>,
}

/// Quotation with its computed totals
#[derive(Debug, Serialize)]
pub struct QuotationResponse {
    #[serde(flatten)]
    pub quotation: Quotation,
    pub totals: QuotationTotals,
}

async fn load_quotation(state: &AppState, id: Uuid) -> Result<Quotation, AppError> {
    state
        .db
        .find_quotation(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quotation {} not found", id)))
}

async fn move_to(
    state: &AppState,
    id: Uuid,
    next: QuotationStatus,
    notes: Option<&str>,
) -> Result<QuotationResponse, AppError> {
    let quotation = load_quotation(state, id).await?;
    let status = quotation.status.transition(next)?;
    let quotation = state.db.set_quotation_status(id, status, notes).await?;
    let items = state.db.quotation_items(id).await?;
    tracing::info!("Quotation {} is now {}", id, status);

    Ok(QuotationResponse {
        totals: quotation.totals(&items),
        quotation,
    })
}

/// Mark a draft quotation as sent to the customer
async fn send_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let quotation = move_to(&state, id, QuotationStatus::Sent, None).await?;
    Ok(Json(json!({ "success": true, "data": quotation })))
}

async fn approve_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let quotation = move_to(&state, id, QuotationStatus::Approved, None).await?;
    Ok(Json(json!({ "success": true, "data": quotation })))
}

/// Reject a sent quotation; the body may carry `notes`
async fn reject_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let req: RejectRequest = if body.is_empty() {
        RejectRequest::default()
    } else {
        serde_json::from_slice(&body)?
    };
    let quotation = move_to(&state, id, QuotationStatus::Rejected, req.notes.as_deref()).await?;
    Ok(Json(json!({ "success": true, "data": quotation })))
}

/// Turn an approved quotation into a pending booking
async fn convert_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let quotation = load_quotation(&state, id).await?;
    let items = state.db.quotation_items(id).await?;
    let new_booking = quotation.to_new_booking(&items)?;
    let booking = state.db.convert_quotation(id, &new_booking).await?;
    tracing::info!("Quotation {} converted to booking {}", id, booking.id);

    Ok(Json(json!({
        "success": true,
        "data": booking,
        "message": "Quotation converted to booking",
    })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/quotations/{id}/send", post(send_quotation))
        .route("/api/quotations/{id}/approve", post(approve_quotation))
        .route("/api/quotations/{id}/reject", post(reject_quotation))
        .route("/api/quotations/{id}/convert", post(convert_quotation))
}
