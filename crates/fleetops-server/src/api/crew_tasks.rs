use axum::{
    extract::{Path, RawQuery, State},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use fleetops_core::{
    expand_tasks, group_by_driver, normalize_driver_id, BookingPatch, CrewTask, CrewTaskUpdate,
    DriverSchedule, NewCrewTask, TaskId, TaskStatus,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::params::QueryParams;
use crate::db::CrewTaskFilter;
use crate::error::AppError;
use crate::services::sync_crew_task_to_booking;
use crate::AppState;

/// Request to create a crew task.
///
/// Every field is optional at the JSON level so that missing required
/// fields are reported as a bad request.
#[derive(Debug, Default, Deserialize)]
pub struct CreateCrewTaskRequest {
    pub task_number: Option<i32>,
    pub task_type: Option<String>,
    pub driver_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub hours_per_day: Option<f64>,
    pub total_hours: Option<f64>,
    pub booking_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub color_override: Option<String>,
    pub priority: Option<i32>,
    pub notes: Option<String>,
}

impl CreateCrewTaskRequest {
    fn into_new_task(self) -> Result<NewCrewTask, AppError> {
        let (Some(task_number), Some(start_date), Some(end_date)) =
            (self.task_number, self.start_date, self.end_date)
        else {
            return Err(AppError::BadRequest(
                "task_number, start_date, and end_date are required".to_string(),
            ));
        };

        let task = NewCrewTask {
            task_number,
            task_type: self.task_type.unwrap_or_else(|| "regular".to_string()),
            task_status: TaskStatus::Scheduled,
            driver_id: normalize_driver_id(self.driver_id),
            start_date,
            end_date,
            start_time: self.start_time,
            end_time: self.end_time,
            hours_per_day: self.hours_per_day,
            total_hours: self.total_hours,
            booking_id: self.booking_id,
            title: self.title,
            description: self.description,
            location: self.location,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            color_override: self.color_override,
            priority: self.priority.unwrap_or(0),
            notes: self.notes,
        };
        task.validate()?;
        Ok(task)
    }
}

#[derive(Debug, Serialize)]
pub struct CalendarMeta {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub driver_count: usize,
    pub total_tasks: usize,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub success: bool,
    pub data: Vec<DriverSchedule>,
    pub meta: CalendarMeta,
}

/// Crew task calendar: tasks and unscheduled bookings, per driver and day
async fn list_crew_tasks(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<CalendarResponse>, AppError> {
    let params = QueryParams::parse(query.as_deref());
    let (start_date, end_date) = params.date_range()?;
    let filter = CrewTaskFilter {
        start: start_date,
        end: end_date,
        driver_ids: params.uuids("driver_ids")?,
        task_numbers: params.parsed_list("task_numbers")?,
    };

    let mut tasks = state.db.list_crew_tasks(&filter).await?;

    // Pending bookings always render as task number 1
    let wants_bookings = filter
        .task_numbers
        .as_ref()
        .map_or(true, |numbers| numbers.contains(&1));
    if wants_bookings {
        match state
            .db
            .unscheduled_bookings(start_date, end_date, filter.driver_ids.as_deref())
            .await
        {
            Ok(bookings) => tasks.extend(
                bookings
                    .iter()
                    .map(|(booking, driver_name)| CrewTask::from_booking(booking, driver_name.clone())),
            ),
            Err(e) => tracing::warn!("Showing crew tasks without pending bookings: {}", e),
        }
    }

    let expanded = expand_tasks(&tasks, start_date, end_date);
    let total_tasks = expanded.len();
    let data = group_by_driver(expanded);

    Ok(Json(CalendarResponse {
        success: true,
        meta: CalendarMeta {
            start_date,
            end_date,
            driver_count: data.len(),
            total_tasks,
        },
        data,
    }))
}

/// Create a crew task, refusing overlaps with the driver's active tasks
async fn create_crew_task(
    State(state): State<AppState>,
    Json(req): Json<CreateCrewTaskRequest>,
) -> Result<Json<Value>, AppError> {
    let task = req.into_new_task()?;

    if let Some(driver_id) = task.driver_id {
        let conflicts = state
            .db
            .find_task_conflicts(driver_id, task.start_date, task.end_date)
            .await?;
        if !conflicts.is_empty() {
            return Err(AppError::Conflict {
                message: "Driver has conflicting tasks in this date/time range".to_string(),
                conflicts: serde_json::to_value(&conflicts)?,
            });
        }
    }

    let created = state.db.insert_crew_task(&task).await?;
    tracing::info!("Created crew task {} for {}", created.id, created.start_date);

    Ok(Json(json!({
        "success": true,
        "data": created,
        "message": "Task created successfully",
    })))
}

/// Get a crew task, or a pending booking shown as one
async fn get_crew_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let task = match id.parse::<TaskId>()? {
        TaskId::Booking(booking_id) => {
            let (booking, driver_name) = state
                .db
                .find_booking_with_driver(booking_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
            CrewTask::from_booking(&booking, driver_name)
        }
        TaskId::Task(task_id) => state
            .db
            .find_crew_task(task_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?,
    };

    Ok(Json(json!({ "success": true, "data": task })))
}

/// Update a crew task and mirror scheduling fields onto its booking.
///
/// Pending booking entries have no task row, so their edits go straight to
/// the booking.
async fn update_crew_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<CrewTaskUpdate>,
) -> Result<Json<Value>, AppError> {
    let task_id = match id.parse::<TaskId>()? {
        TaskId::Booking(booking_id) => {
            let patch = BookingPatch::from_task_fields(&update.sync_fields());
            let booking = state
                .db
                .update_booking_fields(booking_id, &patch)
                .await?
                .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

            return Ok(Json(json!({
                "success": true,
                "message": "Booking updated successfully",
                "data": booking,
            })));
        }
        TaskId::Task(task_id) => task_id,
    };

    let existing = state
        .db
        .find_crew_task(task_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;
    update.validate_against(&existing)?;

    let updated = state
        .db
        .update_crew_task(task_id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

    if let Some(booking_id) = updated.booking_id {
        let fields = update.sync_fields();
        if !fields.is_empty() {
            let result = sync_crew_task_to_booking(&state.db, task_id, booking_id, &fields).await;
            if !result.success {
                tracing::warn!(
                    "Failed to sync task {} changes to booking {}: {:?}",
                    task_id,
                    booking_id,
                    result.errors
                );
            } else if result.is_partial() {
                tracing::warn!("Partially synced task {}: {:?}", task_id, result.errors);
            }
        }
    }

    Ok(Json(json!({
        "success": true,
        "data": updated,
        "message": "Task updated successfully",
    })))
}

async fn delete_crew_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let task_id = match id.parse::<TaskId>()? {
        TaskId::Task(task_id) => task_id,
        TaskId::Booking(_) => {
            return Err(AppError::BadRequest(
                "Pending bookings are removed through the booking, not as crew tasks".to_string(),
            ))
        }
    };

    if !state.db.delete_crew_task(task_id).await? {
        return Err(AppError::NotFound("Task not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Task deleted successfully",
    })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/crew-tasks",
            get(list_crew_tasks).post(create_crew_task),
        )
        .route(
            "/api/crew-tasks/{id}",
            get(get_crew_task)
                .patch(update_crew_task)
                .delete(delete_crew_task),
        )
}
