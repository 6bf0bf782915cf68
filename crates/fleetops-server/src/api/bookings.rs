use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use fleetops_core::BookingSyncResult;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::services::{
    remove_booking_from_shifts, sync_all_bookings, sync_booking_to_shifts, BulkSyncReport,
};
use crate::AppState;

/// How many schedulable bookings already have crew tasks
#[derive(Debug, Serialize, PartialEq)]
pub struct SyncStats {
    pub total_bookings: i64,
    pub synced_bookings: i64,
    pub unsynced_bookings: i64,
    pub sync_percentage: i64,
}

impl SyncStats {
    fn new(total: i64, synced: i64) -> Self {
        let sync_percentage = if total > 0 {
            (synced as f64 / total as f64 * 100.0).round() as i64
        } else {
            0
        };
        Self {
            total_bookings: total,
            synced_bookings: synced,
            unsynced_bookings: total - synced,
            sync_percentage,
        }
    }
}

fn sync_response(result: BookingSyncResult) -> (StatusCode, Json<BookingSyncResult>) {
    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    (status, Json(result))
}

async fn sync_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> (StatusCode, Json<BookingSyncResult>) {
    sync_response(sync_booking_to_shifts(&state.db, id).await)
}

async fn unsync_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> (StatusCode, Json<BookingSyncResult>) {
    sync_response(remove_booking_from_shifts(&state.db, id).await)
}

/// Create crew tasks for every confirmed booking with a driver and no tasks
async fn sync_all(State(state): State<AppState>) -> Result<Json<BulkSyncReport>, AppError> {
    let report = sync_all_bookings(&state.db).await?;
    tracing::info!("{}", report.message);
    Ok(Json(report))
}

async fn sync_stats(State(state): State<AppState>) -> Result<Json<SyncStats>, AppError> {
    let (total, synced) = state.db.booking_sync_counts().await?;
    Ok(Json(SyncStats::new(total, synced)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/bookings/sync-to-shifts",
            post(sync_all).get(sync_stats),
        )
        .route(
            "/api/bookings/{id}/sync-to-shifts",
            post(sync_booking).delete(unsync_booking),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_stats() {
        assert_eq!(
            SyncStats::new(3, 2),
            SyncStats {
                total_bookings: 3,
                synced_bookings: 2,
                unsynced_bookings: 1,
                sync_percentage: 67,
            }
        );
        assert_eq!(SyncStats::new(0, 0).sync_percentage, 0);
    }

    #[test]
    fn test_failed_sync_is_unprocessable() {
        let (status, _) = sync_response(BookingSyncResult::failed("Booking is not confirmed"));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
