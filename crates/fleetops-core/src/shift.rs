use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of working window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftType {
    #[default]
    Regular,
    Overtime,
    OnCall,
    Leave,
    /// Any value this build does not know
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    #[default]
    Scheduled,
    Active,
    Completed,
    Cancelled,
    #[serde(other)]
    Other,
}

/// A driver's planned working window on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverShift {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub shift_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub shift_type: ShiftType,
    #[serde(default)]
    pub status: ShiftStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

impl DriverShift {
    /// Length of the window in hours; overnight shifts wrap past midnight
    pub fn hours(&self) -> f64 {
        let mut minutes = (self.end_time - self.start_time).num_minutes();
        if minutes < 0 {
            minutes += 24 * 60;
        }
        minutes as f64 / 60.0
    }

    /// Whether the driver is available for work during this shift
    pub fn is_working(&self) -> bool {
        self.shift_type != ShiftType::Leave && self.status != ShiftStatus::Cancelled
    }
}
