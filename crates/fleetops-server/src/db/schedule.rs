use chrono::NaiveDate;
use fleetops_core::ScheduleRow;
use uuid::Uuid;

use super::models::ScheduleRecord;
use super::Database;
use crate::error::AppError;

impl Database {
    /// Call the `get_shift_schedule` function for a date range
    pub async fn shift_schedule(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        driver_ids: Option<&[Uuid]>,
    ) -> Result<Vec<ScheduleRow>, AppError> {
        let records = sqlx::query_as::<_, ScheduleRecord>(
            r#"
            SELECT driver_id, driver_name, shift_date, shifts, bookings
            FROM get_shift_schedule(
                p_start_date => $1,
                p_end_date => $2,
                p_driver_ids => $3
            )
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(driver_ids.map(<[Uuid]>::to_vec))
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }
}
