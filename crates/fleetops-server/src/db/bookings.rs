use chrono::NaiveDate;
use fleetops_core::{AssignmentStatus, Booking, BookingPatch, BookingStatus};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::models::{BookingRow, BookingWithDriverRow, BOOKING_COLUMNS};
use super::Database;
use crate::error::{from_row, AppError};

impl Database {
    /// Get a booking by ID
    pub async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        let sql = format!("SELECT {} FROM bookings b WHERE b.id = $1", BOOKING_COLUMNS);
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(from_row).transpose()
    }

    /// Get a booking by ID together with its driver's name
    pub async fn find_booking_with_driver(
        &self,
        id: Uuid,
    ) -> Result<Option<(Booking, Option<String>)>, AppError> {
        let sql = format!(
            "SELECT {}, d.first_name || ' ' || d.last_name AS driver_name \
             FROM bookings b LEFT JOIN drivers d ON d.id = b.driver_id WHERE b.id = $1",
            BOOKING_COLUMNS
        );
        let row = sqlx::query_as::<_, BookingWithDriverRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| -> Result<_, AppError> {
            Ok((from_row::<_, Booking>(r.booking)?, r.driver_name))
        })
        .transpose()
    }

    /// Write the patched columns onto a booking and refresh `updated_at`
    pub async fn update_booking_fields(
        &self,
        id: Uuid,
        patch: &BookingPatch,
    ) -> Result<Option<Booking>, AppError> {
        let row = booking_update_query(id, patch)
            .build_query_as::<BookingRow>()
            .fetch_optional(&self.pool)
            .await?;

        row.map(from_row).transpose()
    }

    pub async fn set_assignment_status(
        &self,
        id: Uuid,
        status: AssignmentStatus,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE bookings SET assignment_status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Confirmed bookings in the range that have not been laid out as crew tasks
    pub async fn unscheduled_bookings(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        driver_ids: Option<&[Uuid]>,
    ) -> Result<Vec<(Booking, Option<String>)>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(BOOKING_COLUMNS);
        qb.push(
            ", d.first_name || ' ' || d.last_name AS driver_name \
             FROM bookings b LEFT JOIN drivers d ON d.id = b.driver_id WHERE b.status = ",
        );
        qb.push_bind(BookingStatus::Confirmed.as_str());
        qb.push(" AND b.date >= ");
        qb.push_bind(start);
        qb.push(" AND b.date <= ");
        qb.push_bind(end);
        if let Some(ids) = driver_ids {
            qb.push(" AND b.driver_id = ANY(");
            qb.push_bind(ids.to_vec());
            qb.push(")");
        }
        qb.push(" AND NOT EXISTS (SELECT 1 FROM crew_tasks t WHERE t.booking_id = b.id)");
        qb.push(" ORDER BY b.date, b.time NULLS LAST");

        let rows = qb
            .build_query_as::<BookingWithDriverRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|r| -> Result<_, AppError> {
                Ok((from_row::<_, Booking>(r.booking)?, r.driver_name))
            })
            .collect()
    }

    /// Confirmed bookings that have a driver and can be laid out as crew tasks
    pub async fn schedulable_bookings(&self) -> Result<Vec<Booking>, AppError> {
        let sql = format!(
            "SELECT {} FROM bookings b \
             WHERE b.status = $1 AND b.driver_id IS NOT NULL ORDER BY b.date, b.time NULLS LAST",
            BOOKING_COLUMNS
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(BookingStatus::Confirmed.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(from_row).collect()
    }

    /// Count schedulable bookings, and how many of them already have crew tasks
    pub async fn booking_sync_counts(&self) -> Result<(i64, i64), AppError> {
        let counts: (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (
                    WHERE EXISTS (SELECT 1 FROM crew_tasks t WHERE t.booking_id = b.id)
                )
            FROM bookings b
            WHERE b.status = $1 AND b.driver_id IS NOT NULL
            "#,
        )
        .bind(BookingStatus::Confirmed.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }
}

/// `UPDATE` touching only the columns the patch carries, plus `updated_at`
fn booking_update_query(id: Uuid, patch: &BookingPatch) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("UPDATE bookings AS b SET ");
    let mut set = qb.separated(", ");
    set_if_present!(set, "driver_id", patch.driver_id);
    set_if_present!(set, "date", patch.date);
    set_if_present!(set, "time", patch.time);
    set_if_present!(set, "pickup_location", patch.pickup_location.clone());
    set_if_present!(set, "customer_name", patch.customer_name.clone());
    set_if_present!(set, "customer_phone", patch.customer_phone.clone());
    set.push("updated_at = NOW()");

    qb.push(" WHERE b.id = ");
    qb.push_bind(id);
    qb.push(" RETURNING ");
    qb.push(BOOKING_COLUMNS);
    qb
}

#[cfg(test)]
mod tests {
    use super::*;

    fn returning(sql: &str) -> String {
        format!("{} RETURNING {}", sql, BOOKING_COLUMNS)
    }

    #[test]
    fn test_location_only_update_sets_one_column() {
        let patch = BookingPatch {
            pickup_location: Some(Some("Narita T1".into())),
            ..Default::default()
        };
        let qb = booking_update_query(Uuid::new_v4(), &patch);
        assert_eq!(
            qb.sql(),
            returning(
                "UPDATE bookings AS b SET pickup_location = $1, updated_at = NOW() WHERE b.id = $2"
            )
        );
    }

    #[test]
    fn test_cleared_driver_is_written() {
        let patch = BookingPatch {
            driver_id: Some(None),
            date: Some("2024-06-01".parse().unwrap()),
            ..Default::default()
        };
        let qb = booking_update_query(Uuid::new_v4(), &patch);
        assert_eq!(
            qb.sql(),
            returning(
                "UPDATE bookings AS b SET driver_id = $1, date = $2, updated_at = NOW() \
                 WHERE b.id = $3"
            )
        );
    }

    #[test]
    fn test_empty_patch_only_touches_timestamp() {
        let qb = booking_update_query(Uuid::new_v4(), &BookingPatch::default());
        assert_eq!(
            qb.sql(),
            returning("UPDATE bookings AS b SET updated_at = NOW() WHERE b.id = $1")
        );
    }
}
