pub mod booking;
pub mod crew_task;
pub mod error;
pub mod nullable;
pub mod quotation;
pub mod schedule;
pub mod shift;
pub mod sync;
pub mod task_calendar;
pub mod task_plan;
pub mod time;

pub use booking::{AssignmentStatus, Booking, BookingStatus, NewBooking};
pub use crew_task::{
    normalize_driver_id, CrewTask, CrewTaskUpdate, NewCrewTask, TaskId, TaskStatus,
};
pub use error::DomainError;
pub use quotation::{Quotation, QuotationItem, QuotationStatus, QuotationTotals};
pub use schedule::{
    build_schedule_grid, expand_multi_day, DriverRef, GridCell, ScheduleBooking, ScheduleGrid,
    ScheduleRow,
};
pub use shift::{DriverShift, ShiftStatus, ShiftType};
pub use sync::{BookingField, BookingPatch, BookingSyncResult, TaskSyncFields, TaskSyncResult};
pub use task_calendar::{expand_tasks, group_by_driver, CalendarTask, DaySchedule, DriverSchedule};
pub use task_plan::{plan_crew_tasks, refresh_from_booking};
