use axum::{
    extract::{RawQuery, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use fleetops_core::{build_schedule_grid, expand_multi_day, ScheduleGrid};
use serde::Serialize;

use super::params::QueryParams;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ScheduleMeta {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub driver_count: usize,
    pub date_count: usize,
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub success: bool,
    pub data: ScheduleGrid,
    pub meta: ScheduleMeta,
}

/// Driver × date grid of shifts and bookings
async fn get_schedule(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<ScheduleResponse>, AppError> {
    let params = QueryParams::parse(query.as_deref());
    let (start_date, end_date) = params.date_range()?;
    let driver_ids = params.uuids("driver_ids")?;

    let rows = state
        .db
        .shift_schedule(start_date, end_date, driver_ids.as_deref())
        .await?;
    tracing::debug!("Loaded {} schedule rows", rows.len());

    let grid = build_schedule_grid(expand_multi_day(rows));
    let meta = ScheduleMeta {
        start_date,
        end_date,
        driver_count: grid.drivers.len(),
        date_count: grid.dates.len(),
    };

    Ok(Json(ScheduleResponse {
        success: true,
        data: grid,
        meta,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/shifts/schedule", get(get_schedule))
}
