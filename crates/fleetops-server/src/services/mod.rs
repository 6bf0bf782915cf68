//! Write paths that keep bookings and crew tasks consistent with each other

mod booking_sync;
#[cfg(test)]
mod memory_store;
mod task_sync;

pub use booking_sync::{
    remove_booking_from_shifts, sync_all_bookings, sync_booking_to_shifts, BulkSyncError,
    BulkSyncReport, SyncedTask,
};
pub use task_sync::sync_crew_task_to_booking;
