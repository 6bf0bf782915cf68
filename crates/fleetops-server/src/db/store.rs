use async_trait::async_trait;
use fleetops_core::{AssignmentStatus, Booking, BookingPatch, CrewTask, CrewTaskUpdate, NewCrewTask};
use uuid::Uuid;

use super::Database;
use crate::error::AppError;

/// Booking and crew task persistence used by the sync services
#[async_trait]
pub trait SchedulingStore: Send + Sync {
    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>, AppError>;

    /// Write the patched columns, returning the updated booking if it exists
    async fn update_booking_fields(
        &self,
        id: Uuid,
        patch: &BookingPatch,
    ) -> Result<Option<Booking>, AppError>;

    async fn set_assignment_status(
        &self,
        booking_id: Uuid,
        status: AssignmentStatus,
    ) -> Result<(), AppError>;

    /// Confirmed bookings with a driver
    async fn schedulable_bookings(&self) -> Result<Vec<Booking>, AppError>;

    async fn task_ids_for_booking(&self, booking_id: Uuid) -> Result<Vec<Uuid>, AppError>;

    async fn insert_crew_task(&self, task: &NewCrewTask) -> Result<CrewTask, AppError>;

    async fn update_crew_task(
        &self,
        id: Uuid,
        update: &CrewTaskUpdate,
    ) -> Result<Option<CrewTask>, AppError>;

    /// Set the driver on every task of `booking_id` except `except_task`
    async fn reassign_sibling_tasks(
        &self,
        booking_id: Uuid,
        except_task: Uuid,
        driver_id: Option<Uuid>,
    ) -> Result<u64, AppError>;

    async fn delete_tasks_for_booking(&self, booking_id: Uuid) -> Result<u64, AppError>;
}

#[async_trait]
impl SchedulingStore for Database {
    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        Database::find_booking(self, id).await
    }

    async fn update_booking_fields(
        &self,
        id: Uuid,
        patch: &BookingPatch,
    ) -> Result<Option<Booking>, AppError> {
        Database::update_booking_fields(self, id, patch).await
    }

    async fn set_assignment_status(
        &self,
        booking_id: Uuid,
        status: AssignmentStatus,
    ) -> Result<(), AppError> {
        Database::set_assignment_status(self, booking_id, status).await
    }

    async fn schedulable_bookings(&self) -> Result<Vec<Booking>, AppError> {
        Database::schedulable_bookings(self).await
    }

    async fn task_ids_for_booking(&self, booking_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        Database::task_ids_for_booking(self, booking_id).await
    }

    async fn insert_crew_task(&self, task: &NewCrewTask) -> Result<CrewTask, AppError> {
        Database::insert_crew_task(self, task).await
    }

    async fn update_crew_task(
        &self,
        id: Uuid,
        update: &CrewTaskUpdate,
    ) -> Result<Option<CrewTask>, AppError> {
        Database::update_crew_task(self, id, update).await
    }

    async fn reassign_sibling_tasks(
        &self,
        booking_id: Uuid,
        except_task: Uuid,
        driver_id: Option<Uuid>,
    ) -> Result<u64, AppError> {
        Database::reassign_sibling_tasks(self, booking_id, except_task, driver_id).await
    }

    async fn delete_tasks_for_booking(&self, booking_id: Uuid) -> Result<u64, AppError> {
        Database::delete_tasks_for_booking(self, booking_id).await
    }
}
