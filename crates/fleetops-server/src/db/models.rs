use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use fleetops_core::{
    Booking, CrewTask, DomainError, DriverShift, Quotation, QuotationItem, ScheduleBooking,
    ScheduleRow, TaskId,
};
use sqlx::types::Json;
use uuid::Uuid;

/// Booking columns, qualified with the `b` alias
pub const BOOKING_COLUMNS: &str = "b.id, b.wp_id, b.quotation_id, b.driver_id, b.vehicle_id, \
    b.date, b.time, b.service_name, b.service_type, b.pickup_location, b.dropoff_location, \
    b.customer_name, b.customer_email, b.customer_phone, b.duration_hours, b.service_days, \
    b.hours_per_day, b.price_amount, b.status, b.assignment_status, b.created_at, b.updated_at";

/// Crew task columns over `t`, plus the driver's display name from `d`
pub const CREW_TASK_COLUMNS: &str = "t.id, t.task_number, t.task_type, t.task_status, \
    t.driver_id, d.first_name || ' ' || d.last_name AS driver_name, t.start_date, t.end_date, \
    t.start_time, t.end_time, t.hours_per_day, t.total_hours, t.booking_id, t.title, \
    t.description, t.location, t.customer_name, t.customer_phone, t.color_override, \
    t.priority, t.notes";

pub const QUOTATION_COLUMNS: &str = "id, title, customer_name, customer_email, customer_phone, \
    service_type, pickup_location, dropoff_location, pickup_date, pickup_time, duration_hours, \
    service_days, hours_per_day, discount_percentage, tax_percentage, status, notes, \
    created_at, updated_at";

/// Booking database model
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookingRow {
    pub id: Uuid,
    pub wp_id: Option<String>,
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
    pub status: String,
    pub assignment_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = DomainError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            reference: row.wp_id,
            quotation_id: row.quotation_id,
            driver_id: row.driver_id,
            vehicle_id: row.vehicle_id,
            date: row.date,
            time: row.time,
            service_name: row.service_name,
            service_type: row.service_type,
            pickup_location: row.pickup_location,
            dropoff_location: row.dropoff_location,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            duration_hours: row.duration_hours,
            service_days: row.service_days,
            hours_per_day: row.hours_per_day,
            price_amount: row.price_amount,
            status: row.status.parse()?,
            assignment_status: row.assignment_status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Booking joined with its driver's display name
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookingWithDriverRow {
    #[sqlx(flatten)]
    pub booking: BookingRow,
    pub driver_name: Option<String>,
}

/// Crew task database model
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CrewTaskRow {
    pub id: Uuid,
    pub task_number: i32,
    pub task_type: String,
    pub task_status: String,
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
}

impl TryFrom<CrewTaskRow> for CrewTask {
    type Error = DomainError;

    fn try_from(row: CrewTaskRow) -> Result<Self, Self::Error> {
        Ok(CrewTask {
            id: TaskId::Task(row.id),
            task_number: row.task_number,
            task_type: row.task_type,
            task_status: row.task_status.parse()?,
            driver_id: row.driver_id,
            driver_name: row.driver_name,
            start_date: row.start_date,
            end_date: row.end_date,
            start_time: row.start_time,
            end_time: row.end_time,
            hours_per_day: row.hours_per_day,
            total_hours: row.total_hours,
            booking_id: row.booking_id,
            title: row.title,
            description: row.description,
            location: row.location,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            color_override: row.color_override,
            priority: row.priority,
            notes: row.notes,
            price_amount: None,
            is_booking: false,
        })
    }
}

/// Compact view of a task used in conflict reports
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct TaskConflict {
    pub id: Uuid,
    pub task_number: i32,
    pub title: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

/// Quotation database model
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QuotationRow {
    pub id: Uuid,
    pub title: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub service_type: Option<String>,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub pickup_date: Option<NaiveDate>,
    pub pickup_time: Option<NaiveTime>,
    pub duration_hours: Option<f64>,
    pub service_days: Option<i32>,
    pub hours_per_day: Option<f64>,
    pub discount_percentage: Option<f64>,
    pub tax_percentage: Option<f64>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<QuotationRow> for Quotation {
    type Error = DomainError;

    fn try_from(row: QuotationRow) -> Result<Self, Self::Error> {
        Ok(Quotation {
            id: row.id,
            title: row.title,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            service_type: row.service_type,
            pickup_location: row.pickup_location,
            dropoff_location: row.dropoff_location,
            pickup_date: row.pickup_date,
            pickup_time: row.pickup_time,
            duration_hours: row.duration_hours,
            service_days: row.service_days,
            hours_per_day: row.hours_per_day,
            discount_percentage: row.discount_percentage,
            tax_percentage: row.tax_percentage,
            status: row.status.parse()?,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QuotationItemRow {
    pub id: Uuid,
    pub quotation_id: Uuid,
    pub description: String,
    pub quantity: i32,
    pub unit_price: f64,
}

impl From<QuotationItemRow> for QuotationItem {
    fn from(row: QuotationItemRow) -> Self {
        QuotationItem {
            id: row.id,
            quotation_id: row.quotation_id,
            description: row.description,
            quantity: row.quantity,
            unit_price: row.unit_price,
        }
    }
}

/// Row returned by the `get_shift_schedule` function
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScheduleRecord {
    pub driver_id: Uuid,
    pub driver_name: String,
    pub shift_date: NaiveDate,
    pub shifts: Json<Vec<DriverShift>>,
    pub bookings: Json<Vec<ScheduleBooking>>,
}

impl From<ScheduleRecord> for ScheduleRow {
    fn from(record: ScheduleRecord) -> Self {
        ScheduleRow {
            driver_id: record.driver_id,
            driver_name: record.driver_name,
            shift_date: record.shift_date,
            shifts: record.shifts.0,
            bookings: record.bookings.0,
        }
    }
}
