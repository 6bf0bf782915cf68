use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::booking::Booking;
use crate::error::DomainError;
use crate::nullable::deserialize_some;
use crate::sync::TaskSyncFields;
use crate::time::add_hours;

/// Prefix marking a booking shown in the task calendar before it has crew tasks
pub const BOOKING_TASK_PREFIX: &str = "booking-";

/// Identifier of an entry in the crew task calendar.
///
/// Real crew tasks are addressed by their UUID. Confirmed bookings that have not
/// been laid out as tasks yet appear as `booking-<uuid>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TaskId {
    Task(Uuid),
    Booking(Uuid),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Task(id) => write!(f, "{}", id),
            TaskId::Booking(id) => write!(f, "{}{}", BOOKING_TASK_PREFIX, id),
        }
    }
}

impl FromStr for TaskId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidTaskId(s.to_string());
        match s.strip_prefix(BOOKING_TASK_PREFIX) {
            Some(rest) => Uuid::parse_str(rest)
                .map(TaskId::Booking)
                .map_err(|_| invalid()),
            None => Uuid::parse_str(s).map(TaskId::Task).map_err(|_| invalid()),
        }
    }
}

impl TryFrom<String> for TaskId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.to_string()
    }
}

/// Progress of a crew task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Scheduled => "scheduled",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Active tasks occupy the driver and take part in conflict checks
    pub fn is_active(&self) -> bool {
        !matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }
}

impl FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(TaskStatus::Scheduled),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "cancelled" => Ok(TaskStatus::Cancelled),
            other => Err(DomainError::UnknownStatus {
                kind: "task",
                value: other.to_string(),
            }),
        }
    }
}

/// A scheduling unit assignable to a driver, usually derived from a booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewTask {
    pub id: TaskId,
    pub task_number: i32,
    pub task_type: String,
    pub task_status: TaskStatus,
    pub driver_id: Option<Uuid>,
    pub driver_name: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
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
    pub priority: i32,
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_amount: Option<f64>,
    /// Set for bookings rendered as tasks
    #[serde(default)]
    pub is_booking: bool,
}

impl CrewTask {
    /// Render a booking without crew tasks as a calendar entry
    pub fn from_booking(booking: &Booking, driver_name: Option<String>) -> Self {
        let hours = booking
            .duration_hours
            .or(booking.hours_per_day)
            .filter(|h| *h > 0.0)
            .unwrap_or(1.0);

        Self {
            id: TaskId::Booking(booking.id),
            task_number: 1,
            task_type: "charter".to_string(),
            task_status: TaskStatus::Scheduled,
            driver_id: booking.driver_id,
            driver_name,
            start_date: booking.date,
            end_date: booking.date,
            start_time: booking.time,
            end_time: booking.time.map(|t| add_hours(t, hours)),
            hours_per_day: Some(hours),
            total_hours: Some(hours),
            booking_id: Some(booking.id),
            title: Some(
                booking
                    .service_name
                    .clone()
                    .unwrap_or_else(|| "Booking".to_string()),
            ),
            description: booking
                .service_type
                .as_ref()
                .map(|t| format!("{} service", t)),
            location: booking.pickup_location.clone(),
            customer_name: booking.customer_name.clone(),
            customer_phone: booking.customer_phone.clone(),
            color_override: None,
            priority: 1,
            notes: booking
                .reference
                .as_ref()
                .map(|r| format!("From booking {}", r)),
            price_amount: booking.price_amount,
            is_booking: true,
        }
    }

    /// Number of calendar days the task spans, zero for an inverted range
    pub fn span_days(&self) -> u32 {
        let days = (self.end_date - self.start_date).num_days() + 1;
        u32::try_from(days).unwrap_or(0)
    }
}

/// Map the "unassigned" sentinel (the nil UUID) used by calendar clients to no driver
pub fn normalize_driver_id(driver_id: Option<Uuid>) -> Option<Uuid> {
    driver_id.filter(|id| !id.is_nil())
}

/// Values for inserting a crew task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCrewTask {
    pub task_number: i32,
    pub task_type: String,
    pub task_status: TaskStatus,
    pub driver_id: Option<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
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
    pub priority: i32,
    pub notes: Option<String>,
}

impl NewCrewTask {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.end_date < self.start_date {
            return Err(DomainError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }
}

/// Partial update of a crew task's editable columns.
///
/// Unknown keys (such as the derived calendar fields `task_date` or
/// `is_first_day`) are ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrewTaskUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_number: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<Option<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Option<NaiveTime>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Option<NaiveTime>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub hours_per_day: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub total_hours: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub color_override: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl CrewTaskUpdate {
    /// The scheduling fields that are mirrored onto the parent booking
    pub fn sync_fields(&self) -> TaskSyncFields {
        TaskSyncFields {
            driver_id: self.driver_id.map(normalize_driver_id),
            start_date: self.start_date,
            start_time: self.start_time,
            location: self.location.clone(),
            customer_name: self.customer_name.clone(),
            customer_phone: self.customer_phone.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check the update against the task it will be applied to
    pub fn validate_against(&self, task: &CrewTask) -> Result<(), DomainError> {
        let start = self.start_date.unwrap_or(task.start_date);
        let end = self.end_date.unwrap_or(task.end_date);
        if end < start {
            return Err(DomainError::InvalidDateRange { start, end });
        }
        Ok(())
    }

    /// Apply the update to an in-memory task
    pub fn apply_to(&self, task: &mut CrewTask) {
        if let Some(v) = self.task_number {
            task.task_number = v;
        }
        if let Some(v) = &self.task_type {
            task.task_type = v.clone();
        }
        if let Some(v) = self.task_status {
            task.task_status = v;
        }
        if let Some(v) = self.driver_id {
            task.driver_id = normalize_driver_id(v);
        }
        if let Some(v) = self.start_date {
            task.start_date = v;
        }
        if let Some(v) = self.end_date {
            task.end_date = v;
        }
        if let Some(v) = self.start_time {
            task.start_time = v;
        }
        if let Some(v) = self.end_time {
            task.end_time = v;
        }
        if let Some(v) = self.hours_per_day {
            task.hours_per_day = v;
        }
        if let Some(v) = self.total_hours {
            task.total_hours = v;
        }
        if let Some(v) = self.booking_id {
            task.booking_id = v;
        }
        if let Some(v) = &self.title {
            task.title = v.clone();
        }
        if let Some(v) = &self.description {
            task.description = v.clone();
        }
        if let Some(v) = &self.location {
            task.location = v.clone();
        }
        if let Some(v) = &self.customer_name {
            task.customer_name = v.clone();
        }
        if let Some(v) = &self.customer_phone {
            task.customer_phone = v.clone();
        }
        if let Some(v) = &self.color_override {
            task.color_override = v.clone();
        }
        if let Some(v) = self.priority {
            task.priority = v;
        }
        if let Some(v) = &self.notes {
            task.notes = v.clone();
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::fixtures::booking;

    #[test]
    fn test_task_id_parsing() {
        let id = Uuid::new_v4();
        assert_eq!(id.to_string().parse::<TaskId>(), Ok(TaskId::Task(id)));
        assert_eq!(
            format!("booking-{}", id).parse::<TaskId>(),
            Ok(TaskId::Booking(id))
        );
        assert!("booking-".parse::<TaskId>().is_err());
        assert!("not-a-task".parse::<TaskId>().is_err());
    }

    #[test]
    fn test_task_id_serializes_as_string() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(TaskId::Booking(id)).unwrap();
        assert_eq!(json, serde_json::json!(format!("booking-{}", id)));
    }

    #[test]
    fn test_from_booking_renders_pseudo_task() {
        let booking = booking("2024-05-10");
        let task = CrewTask::from_booking(&booking, Some("Bob Ito".into()));

        assert_eq!(task.id, TaskId::Booking(booking.id));
        assert!(task.is_booking);
        assert_eq!(task.task_type, "charter");
        assert_eq!(task.start_date, booking.date);
        assert_eq!(task.end_date, booking.date);
        assert_eq!(task.end_time, NaiveTime::from_hms_opt(13, 30, 0));
        assert_eq!(task.title.as_deref(), Some("Airport Transfer"));
        assert_eq!(task.description.as_deref(), Some("airport service"));
        assert_eq!(task.location.as_deref(), Some("Narita T1"));
        assert_eq!(task.notes.as_deref(), Some("From booking WP-1001"));
    }

    #[test]
    fn test_from_booking_without_service_name() {
        let mut booking = booking("2024-05-10");
        booking.service_name = None;
        booking.time = None;
        let task = CrewTask::from_booking(&booking, None);
        assert_eq!(task.title.as_deref(), Some("Booking"));
        assert_eq!(task.end_time, None);
    }

    #[test]
    fn test_nil_driver_means_unassigned() {
        assert_eq!(normalize_driver_id(Some(Uuid::nil())), None);
        let id = Uuid::new_v4();
        assert_eq!(normalize_driver_id(Some(id)), Some(id));
    }

    #[test]
    fn test_new_task_rejects_inverted_range() {
        let task = NewCrewTask {
            task_number: 1,
            task_type: "regular".into(),
            task_status: TaskStatus::Scheduled,
            driver_id: None,
            start_date: "2024-05-10".parse().unwrap(),
            end_date: "2024-05-09".parse().unwrap(),
            start_time: None,
            end_time: None,
            hours_per_day: None,
            total_hours: None,
            booking_id: None,
            title: None,
            description: None,
            location: None,
            customer_name: None,
            customer_phone: None,
            color_override: None,
            priority: 0,
            notes: None,
        };
        assert!(matches!(
            task.validate(),
            Err(DomainError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_update_ignores_calendar_fields() {
        let update: CrewTaskUpdate = serde_json::from_value(serde_json::json!({
            "location": "Haneda T3",
            "task_date": "2024-05-11",
            "is_first_day": false,
            "drivers": { "first_name": "Alice" }
        }))
        .unwrap();

        assert_eq!(update.location, Some(Some("Haneda T3".into())));
        assert_eq!(update.task_number, None);
        assert!(!update.is_empty());
    }

    #[test]
    fn test_update_sync_fields_keep_only_mirrored_columns() {
        let driver = Uuid::new_v4();
        let update: CrewTaskUpdate = serde_json::from_value(serde_json::json!({
            "driver_id": driver,
            "title": "Renamed",
            "priority": 4
        }))
        .unwrap();

        let fields = update.sync_fields();
        assert_eq!(fields.driver_id, Some(Some(driver)));
        assert_eq!(fields.location, None);
        assert_eq!(fields.start_date, None);
    }

    #[test]
    fn test_apply_update_to_task() {
        let mut task = fixtures::task("2024-05-10", "2024-05-10", Some(Uuid::new_v4()));
        let update = CrewTaskUpdate {
            driver_id: Some(Some(Uuid::nil())),
            end_date: Some("2024-05-12".parse().unwrap()),
            notes: Some(Some("bring child seat".into())),
            ..Default::default()
        };
        assert!(update.validate_against(&task).is_ok());
        update.apply_to(&mut task);

        assert_eq!(task.driver_id, None);
        assert_eq!(task.span_days(), 3);
        assert_eq!(task.notes.as_deref(), Some("bring child seat"));
    }

    #[test]
    fn test_update_rejects_end_before_existing_start() {
        let task = fixtures::task("2024-05-10", "2024-05-12", None);
        let update = CrewTaskUpdate {
            end_date: Some("2024-05-01".parse().unwrap()),
            ..Default::default()
        };
        assert!(update.validate_against(&task).is_err());
    }
}
