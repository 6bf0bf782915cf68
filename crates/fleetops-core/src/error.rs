use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by domain rules (status transitions, id parsing, date ranges)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// A status change that the lifecycle does not allow
    #[error("Cannot move {kind} from {from} to {to}")]
    InvalidTransition {
        kind: &'static str,
        from: String,
        to: String,
    },

    /// A stored or submitted status string that is not recognised
    #[error("Unknown {kind} status: {value}")]
    UnknownStatus { kind: &'static str, value: String },

    /// A task id that is neither a UUID nor a `booking-<uuid>` reference
    #[error("Invalid task id: {0}")]
    InvalidTaskId(String),

    #[error("End date {end} is before start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
