use fleetops_core::{Booking, NewBooking, Quotation, QuotationItem, QuotationStatus};
use uuid::Uuid;

use super::models::{BookingRow, QuotationItemRow, QuotationRow, BOOKING_COLUMNS, QUOTATION_COLUMNS};
use super::Database;
use crate::error::{from_row, AppError};

impl Database {
    /// Get a quotation by ID
    pub async fn find_quotation(&self, id: Uuid) -> Result<Option<Quotation>, AppError> {
        let sql = format!("SELECT {} FROM quotations WHERE id = $1", QUOTATION_COLUMNS);
        let row = sqlx::query_as::<_, QuotationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(from_row).transpose()
    }

    pub async fn quotation_items(&self, quotation_id: Uuid) -> Result<Vec<QuotationItem>, AppError> {
        let rows = sqlx::query_as::<_, QuotationItemRow>(
            r#"
            SELECT id, quotation_id, description, quantity, unit_price
            FROM quotation_items
            WHERE quotation_id = $1
            ORDER BY sort_order, id
            "#,
        )
        .bind(quotation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Store a new status, optionally replacing the quotation's notes
    pub async fn set_quotation_status(
        &self,
        id: Uuid,
        status: QuotationStatus,
        notes: Option<&str>,
    ) -> Result<Quotation, AppError> {
        let sql = format!(
            "UPDATE quotations SET status = $1, notes = COALESCE($2, notes), updated_at = NOW() \
             WHERE id = $3 RETURNING {}",
            QUOTATION_COLUMNS
        );
        let row = sqlx::query_as::<_, QuotationRow>(&sql)
            .bind(status.as_str())
            .bind(notes)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        from_row(row)
    }

    /// Insert the booking for a quotation and mark the quotation converted, atomically
    pub async fn convert_quotation(
        &self,
        quotation_id: Uuid,
        booking: &NewBooking,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO bookings AS b (
                wp_id, quotation_id, date, time, service_name, service_type,
                pickup_location, dropoff_location, customer_name, customer_email,
                customer_phone, duration_hours, service_days, hours_per_day,
                price_amount, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        );
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(&booking.reference)
            .bind(booking.quotation_id)
            .bind(booking.date)
            .bind(booking.time)
            .bind(&booking.service_name)
            .bind(&booking.service_type)
            .bind(&booking.pickup_location)
            .bind(&booking.dropoff_location)
            .bind(&booking.customer_name)
            .bind(&booking.customer_email)
            .bind(&booking.customer_phone)
            .bind(booking.duration_hours)
            .bind(booking.service_days)
            .bind(booking.hours_per_day)
            .bind(booking.price_amount)
            .bind(booking.status.as_str())
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE quotations SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(QuotationStatus::Converted.as_str())
            .bind(quotation_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        from_row(row)
    }
}
