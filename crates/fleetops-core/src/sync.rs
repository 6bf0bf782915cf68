//! Field mirroring between crew tasks and their parent booking.
//!
//! A crew task keeps a copy of the booking's scheduling fields. When one of
//! those copies is edited on the task, the same value is written back onto the
//! booking through a [`BookingPatch`]. Only the allow-listed columns below are
//! ever mirrored:
//!
//! | crew task        | booking           |
//! |------------------|-------------------|
//! | `driver_id`      | `driver_id`       |
//! | `start_date`     | `date`            |
//! | `start_time`     | `time`            |
//! | `location`       | `pickup_location` |
//! | `customer_name`  | `customer_name`   |
//! | `customer_phone` | `customer_phone`  |

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::booking::Booking;
use crate::nullable::deserialize_some;

/// The mirrored subset of a crew task update.
///
/// Outer `None` means the field was not part of the change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskSyncFields {
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<Option<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Option<NaiveTime>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<Option<String>>,
}

impl TaskSyncFields {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A booking column that can receive a mirrored value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingField {
    DriverId,
    Date,
    Time,
    PickupLocation,
    CustomerName,
    CustomerPhone,
}

impl BookingField {
    /// Column name in the `bookings` table
    pub fn column(&self) -> &'static str {
        match self {
            BookingField::DriverId => "driver_id",
            BookingField::Date => "date",
            BookingField::Time => "time",
            BookingField::PickupLocation => "pickup_location",
            BookingField::CustomerName => "customer_name",
            BookingField::CustomerPhone => "customer_phone",
        }
    }
}

/// Values to write onto a booking, keyed by booking column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingPatch {
    pub driver_id: Option<Option<Uuid>>,
    pub date: Option<NaiveDate>,
    pub time: Option<Option<NaiveTime>>,
    pub pickup_location: Option<Option<String>>,
    pub customer_name: Option<Option<String>>,
    pub customer_phone: Option<Option<String>>,
}

impl BookingPatch {
    /// Translate task-side field names to booking columns
    pub fn from_task_fields(fields: &TaskSyncFields) -> Self {
        Self {
            driver_id: fields.driver_id,
            date: fields.start_date,
            time: fields.start_time,
            pickup_location: fields.location.clone(),
            customer_name: fields.customer_name.clone(),
            customer_phone: fields.customer_phone.clone(),
        }
    }

    /// Columns carried by this patch, in table order
    pub fn fields(&self) -> Vec<BookingField> {
        let mut fields = Vec::new();
        if self.driver_id.is_some() {
            fields.push(BookingField::DriverId);
        }
        if self.date.is_some() {
            fields.push(BookingField::Date);
        }
        if self.time.is_some() {
            fields.push(BookingField::Time);
        }
        if self.pickup_location.is_some() {
            fields.push(BookingField::PickupLocation);
        }
        if self.customer_name.is_some() {
            fields.push(BookingField::CustomerName);
        }
        if self.customer_phone.is_some() {
            fields.push(BookingField::CustomerPhone);
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// The new driver when the patch reassigns one (`Some(None)` unassigns)
    pub fn driver_reassignment(&self) -> Option<Option<Uuid>> {
        self.driver_id
    }

    /// Apply the patch to an in-memory booking
    pub fn apply_to(&self, booking: &mut Booking) {
        if let Some(v) = self.driver_id {
            booking.driver_id = v;
        }
        if let Some(v) = self.date {
            booking.date = v;
        }
        if let Some(v) = self.time {
            booking.time = v;
        }
        if let Some(v) = &self.pickup_location {
            booking.pickup_location = v.clone();
        }
        if let Some(v) = &self.customer_name {
            booking.customer_name = v.clone();
        }
        if let Some(v) = &self.customer_phone {
            booking.customer_phone = v.clone();
        }
    }
}

/// Outcome of mirroring a crew task change onto its booking.
///
/// `success` is true once the booking write went through. Errors from the
/// sibling-task fan-out are recorded in `errors` without clearing `success`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskSyncResult {
    pub success: bool,
    pub synced_fields: Vec<BookingField>,
    pub sibling_tasks_updated: u64,
    pub errors: Vec<String>,
}

impl TaskSyncResult {
    /// Booking updated but a later step failed
    pub fn is_partial(&self) -> bool {
        self.success && !self.errors.is_empty()
    }
}

/// Outcome of laying a booking out as crew tasks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingSyncResult {
    pub success: bool,
    /// Tasks created, or refreshed when the booking already had tasks
    pub tasks_created: usize,
    pub errors: Vec<String>,
}

impl BookingSyncResult {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            tasks_created: 0,
            errors: vec![error.into()],
        }
    }
}
