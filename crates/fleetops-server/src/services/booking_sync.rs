use chrono::NaiveDate;
use fleetops_core::{
    plan_crew_tasks, refresh_from_booking, AssignmentStatus, Booking, BookingStatus,
    BookingSyncResult, TaskId,
};
use serde::Serialize;
use uuid::Uuid;

use crate::db::SchedulingStore;
use crate::error::AppError;

/// A crew task created by the bulk sync
#[derive(Debug, Clone, Serialize)]
pub struct SyncedTask {
    pub booking_id: Uuid,
    pub wp_id: Option<String>,
    pub task_id: TaskId,
    pub day: u32,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkSyncError {
    pub booking_id: Uuid,
    pub wp_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    pub error: String,
}

/// Summary of a bulk booking → crew task sync
#[derive(Debug, Clone, Serialize)]
pub struct BulkSyncReport {
    pub message: String,
    pub synced: usize,
    pub total_bookings: usize,
    pub synced_tasks: Vec<SyncedTask>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<BulkSyncError>,
}

struct CreatedTasks {
    created: Vec<(u32, Uuid, NaiveDate, TaskId)>,
    failed: Vec<(u32, String)>,
}

/// Insert one crew task per service day and mark the booking scheduled
async fn create_planned_tasks<S>(store: &S, booking: &Booking) -> CreatedTasks
where
    S: SchedulingStore + ?Sized,
{
    let mut out = CreatedTasks {
        created: Vec::new(),
        failed: Vec::new(),
    };

    for (day, planned) in (1u32..).zip(plan_crew_tasks(booking)) {
        match store.insert_crew_task(&planned).await {
            Ok(task) => out.created.push((day, booking.id, planned.start_date, task.id)),
            Err(e) => {
                tracing::warn!(
                    "Failed to create crew task for booking {} day {}: {}",
                    booking.id,
                    day,
                    e
                );
                out.failed.push((day, e.to_string()));
            }
        }
    }

    if let Err(e) = store
        .set_assignment_status(booking.id, AssignmentStatus::Scheduled)
        .await
    {
        tracing::warn!("Failed to mark booking {} scheduled: {}", booking.id, e);
    }

    out
}

/// Lay a confirmed booking with a driver out as crew tasks.
///
/// A booking that already has tasks gets them refreshed with its current
/// title, description, location and customer details instead.
pub async fn sync_booking_to_shifts<S>(store: &S, booking_id: Uuid) -> BookingSyncResult
where
    S: SchedulingStore + ?Sized,
{
    let booking = match store.find_booking(booking_id).await {
        Ok(Some(booking)) => booking,
        Ok(None) => return BookingSyncResult::failed(format!("Booking {} not found", booking_id)),
        Err(e) => return BookingSyncResult::failed(format!("Booking not found: {}", e)),
    };

    if booking.driver_id.is_none() {
        return BookingSyncResult::failed("Booking has no driver assigned");
    }
    if booking.status != BookingStatus::Confirmed {
        return BookingSyncResult::failed("Booking is not confirmed");
    }

    let existing = match store.task_ids_for_booking(booking.id).await {
        Ok(ids) => ids,
        Err(e) => return BookingSyncResult::failed(e.to_string()),
    };

    if !existing.is_empty() {
        return refresh_existing_tasks(store, &booking, &existing).await;
    }

    let outcome = create_planned_tasks(store, &booking).await;
    let errors: Vec<String> = outcome
        .failed
        .into_iter()
        .map(|(day, e)| format!("Day {}: {}", day, e))
        .collect();

    tracing::info!(
        "Booking {} laid out as {} crew tasks",
        booking.id,
        outcome.created.len()
    );

    BookingSyncResult {
        success: errors.is_empty(),
        tasks_created: outcome.created.len(),
        errors,
    }
}

async fn refresh_existing_tasks<S>(
    store: &S,
    booking: &Booking,
    task_ids: &[Uuid],
) -> BookingSyncResult
where
    S: SchedulingStore + ?Sized,
{
    let update = refresh_from_booking(booking);
    let mut result = BookingSyncResult::default();

    for id in task_ids {
        match store.update_crew_task(*id, &update).await {
            Ok(Some(_)) => result.tasks_created += 1,
            Ok(None) => result.errors.push(format!("Task {}: not found", id)),
            Err(e) => result.errors.push(format!("Task {}: {}", id, e)),
        }
    }

    result.success = result.errors.is_empty();
    result
}

/// Delete a booking's crew tasks and mark it unassigned
pub async fn remove_booking_from_shifts<S>(store: &S, booking_id: Uuid) -> BookingSyncResult
where
    S: SchedulingStore + ?Sized,
{
    match store.delete_tasks_for_booking(booking_id).await {
        Ok(removed) => tracing::info!("Removed {} crew tasks of booking {}", removed, booking_id),
        Err(e) => return BookingSyncResult::failed(e.to_string()),
    }

    if let Err(e) = store
        .set_assignment_status(booking_id, AssignmentStatus::Unassigned)
        .await
    {
        tracing::warn!("Failed to mark booking {} unassigned: {}", booking_id, e);
    }

    BookingSyncResult {
        success: true,
        ..Default::default()
    }
}

/// Create crew tasks for every schedulable booking that has none yet
pub async fn sync_all_bookings<S>(store: &S) -> Result<BulkSyncReport, AppError>
where
    S: SchedulingStore + ?Sized,
{
    let bookings = store.schedulable_bookings().await?;
    let mut synced_tasks = Vec::new();
    let mut errors = Vec::new();

    for booking in &bookings {
        match store.task_ids_for_booking(booking.id).await {
            Ok(ids) if !ids.is_empty() => {
                tracing::debug!("Booking {} already has crew tasks, skipping", booking.id);
                continue;
            }
            Ok(_) => {}
            Err(e) => {
                errors.push(BulkSyncError {
                    booking_id: booking.id,
                    wp_id: booking.reference.clone(),
                    day: None,
                    error: e.to_string(),
                });
                continue;
            }
        }

        let outcome = create_planned_tasks(store, booking).await;
        synced_tasks.extend(outcome.created.into_iter().map(|(day, booking_id, date, task_id)| {
            SyncedTask {
                booking_id,
                wp_id: booking.reference.clone(),
                task_id,
                day,
                date,
            }
        }));
        errors.extend(outcome.failed.into_iter().map(|(day, error)| BulkSyncError {
            booking_id: booking.id,
            wp_id: booking.reference.clone(),
            day: Some(day),
            error,
        }));
    }

    let message = if bookings.is_empty() {
        "No bookings found to sync".to_string()
    } else {
        format!(
            "Sync completed. {} tasks created from {} bookings",
            synced_tasks.len(),
            bookings.len()
        )
    };

    Ok(BulkSyncReport {
        message,
        synced: synced_tasks.len(),
        total_bookings: bookings.len(),
        synced_tasks,
        errors,
    })
}
