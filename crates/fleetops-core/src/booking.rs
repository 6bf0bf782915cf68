use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::DomainError;

/// Hours per service day when a booking carries neither `hours_per_day` nor `duration_hours`
pub const DEFAULT_HOURS_PER_DAY: f64 = 8.0;

/// Upper bound on the days a single booking is spread over
pub const MAX_SERVICE_DAYS: u32 = 366;

/// Clamp a stored `service_days` value to `1..=MAX_SERVICE_DAYS`
pub fn service_day_count(service_days: Option<i32>) -> u32 {
    service_days
        .and_then(|d| u32::try_from(d).ok())
        .filter(|d| *d > 0)
        .map_or(1, |d| d.min(MAX_SERVICE_DAYS))
}

/// Lifecycle of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Assigned,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Assigned => "assigned",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled bookings accept no further dispatch changes
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "assigned" => Ok(BookingStatus::Assigned),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(DomainError::UnknownStatus {
                kind: "booking",
                value: other.to_string(),
            }),
        }
    }
}

/// Whether a booking has been laid out as crew tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    #[default]
    Unassigned,
    Scheduled,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Unassigned => "unassigned",
            AssignmentStatus::Scheduled => "scheduled",
        }
    }
}

impl FromStr for AssignmentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unassigned" => Ok(AssignmentStatus::Unassigned),
            "scheduled" => Ok(AssignmentStatus::Scheduled),
            other => Err(DomainError::UnknownStatus {
                kind: "assignment",
                value: other.to_string(),
            }),
        }
    }
}

/// A confirmed, scheduled service instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    /// External reference (e.g. the storefront order number)
    pub reference: Option<String>,
    pub quotation_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub service_name: Option<String>,
    pub service_type: Option<String>,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub duration_hours: Option<f64>,
    pub service_days: Option<i32>,
    pub hours_per_day: Option<f64>,
    pub price_amount: Option<f64>,
    pub status: BookingStatus,
    pub assignment_status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Number of consecutive service days, never less than one
    pub fn service_day_count(&self) -> u32 {
        service_day_count(self.service_days)
    }

    /// Working hours on each service day
    pub fn hours_per_service_day(&self) -> f64 {
        self.hours_per_day
            .filter(|h| *h > 0.0)
            .or(self.duration_hours.filter(|h| *h > 0.0))
            .unwrap_or(DEFAULT_HOURS_PER_DAY)
    }

    /// True when the booking can be laid out as crew tasks
    pub fn is_schedulable(&self) -> bool {
        self.status == BookingStatus::Confirmed && self.driver_id.is_some()
    }
}

/// Values for inserting a booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub reference: Option<String>,
    pub quotation_id: Option<Uuid>,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub service_name: Option<String>,
    pub service_type: Option<String>,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub duration_hours: Option<f64>,
    pub service_days: Option<i32>,
    pub hours_per_day: Option<f64>,
    pub price_amount: Option<f64>,
    pub status: BookingStatus,
}
