use fleetops_core::{BookingPatch, TaskSyncFields, TaskSyncResult};
use uuid::Uuid;

use crate::db::SchedulingStore;

/// Mirror the allow-listed fields of a crew task change onto its booking.
///
/// The booking must exist before anything is written. A failed booking write
/// ends the sync with `success == false`. Once the booking is written, a
/// driver change is fanned out to the booking's other tasks; failures there
/// are collected in `errors` and leave `success` set.
pub async fn sync_crew_task_to_booking<S>(
    store: &S,
    task_id: Uuid,
    booking_id: Uuid,
    fields: &TaskSyncFields,
) -> TaskSyncResult
where
    S: SchedulingStore + ?Sized,
{
    let mut result = TaskSyncResult::default();

    match store.find_booking(booking_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            result.errors.push(format!("Booking {} not found", booking_id));
            return result;
        }
        Err(e) => {
            result
                .errors
                .push(format!("Failed to load booking {}: {}", booking_id, e));
            return result;
        }
    }

    let patch = BookingPatch::from_task_fields(fields);
    if patch.is_empty() {
        result.success = true;
        return result;
    }

    match store.update_booking_fields(booking_id, &patch).await {
        Ok(Some(_)) => {
            result.success = true;
            result.synced_fields = patch.fields();
        }
        Ok(None) => {
            result.errors.push(format!("Booking {} not found", booking_id));
            return result;
        }
        Err(e) => {
            result
                .errors
                .push(format!("Failed to update booking {}: {}", booking_id, e));
            return result;
        }
    }

    tracing::debug!(
        "Synced {:?} from task {} to booking {}",
        result.synced_fields,
        task_id,
        booking_id
    );

    if let Some(driver_id) = patch.driver_reassignment() {
        match store
            .reassign_sibling_tasks(booking_id, task_id, driver_id)
            .await
        {
            Ok(updated) => result.sibling_tasks_updated = updated,
            Err(e) => {
                tracing::warn!(
                    "Booking {} updated but sibling tasks kept their driver: {}",
                    booking_id,
                    e
                );
                result
                    .errors
                    .push(format!("Failed to update sibling tasks: {}", e));
            }
        }
    }

    result
}
