use chrono::NaiveDate;
use fleetops_core::{CrewTask, CrewTaskUpdate, NewCrewTask, TaskStatus};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::models::{CrewTaskRow, TaskConflict, CREW_TASK_COLUMNS};
use super::Database;
use crate::error::{from_row, AppError};

/// Driver fan-out to the other tasks of a booking: `$1` driver, `$2` booking, `$3` task to skip
const REASSIGN_SIBLINGS_SQL: &str =
    "UPDATE crew_tasks SET driver_id = $1, updated_at = NOW() WHERE booking_id = $2 AND id <> $3";

/// Filter for the crew task calendar query
#[derive(Debug, Clone)]
pub struct CrewTaskFilter {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub driver_ids: Option<Vec<Uuid>>,
    pub task_numbers: Option<Vec<i32>>,
}

impl Database {
    /// Tasks overlapping the filter's date range
    pub async fn list_crew_tasks(&self, filter: &CrewTaskFilter) -> Result<Vec<CrewTask>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(CREW_TASK_COLUMNS);
        qb.push(" FROM crew_tasks t LEFT JOIN drivers d ON d.id = t.driver_id WHERE t.start_date <= ");
        qb.push_bind(filter.end);
        qb.push(" AND t.end_date >= ");
        qb.push_bind(filter.start);
        if let Some(ids) = &filter.driver_ids {
            qb.push(" AND t.driver_id = ANY(");
            qb.push_bind(ids.clone());
            qb.push(")");
        }
        if let Some(numbers) = &filter.task_numbers {
            qb.push(" AND t.task_number = ANY(");
            qb.push_bind(numbers.clone());
            qb.push(")");
        }
        qb.push(" ORDER BY t.start_date, t.start_time NULLS LAST, t.task_number");

        let rows = qb
            .build_query_as::<CrewTaskRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(from_row).collect()
    }

    /// Get a crew task by ID
    pub async fn find_crew_task(&self, id: Uuid) -> Result<Option<CrewTask>, AppError> {
        let sql = format!(
            "SELECT {} FROM crew_tasks t LEFT JOIN drivers d ON d.id = t.driver_id WHERE t.id = $1",
            CREW_TASK_COLUMNS
        );
        let row = sqlx::query_as::<_, CrewTaskRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(from_row).transpose()
    }

    /// Active tasks of a driver that overlap `[start, end]`
    pub async fn find_task_conflicts(
        &self,
        driver_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TaskConflict>, AppError> {
        let conflicts = sqlx::query_as::<_, TaskConflict>(
            r#"
            SELECT id, task_number, title, start_date, end_date, start_time, end_time
            FROM crew_tasks
            WHERE driver_id = $1
              AND task_status NOT IN ($2, $3)
              AND start_date <= $4
              AND end_date >= $5
            ORDER BY start_date
            "#,
        )
        .bind(driver_id)
        .bind(TaskStatus::Cancelled.as_str())
        .bind(TaskStatus::Completed.as_str())
        .bind(end)
        .bind(start)
        .fetch_all(&self.pool)
        .await?;

        Ok(conflicts)
    }

    /// Insert a crew task
    pub async fn insert_crew_task(&self, task: &NewCrewTask) -> Result<CrewTask, AppError> {
        let sql = format!(
            r#"
            WITH t AS (
                INSERT INTO crew_tasks (
                    task_number, task_type, task_status, driver_id, start_date, end_date,
                    start_time, end_time, hours_per_day, total_hours, booking_id, title,
                    description, location, customer_name, customer_phone, color_override,
                    priority, notes
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
                RETURNING *
            )
            SELECT {} FROM t LEFT JOIN drivers d ON d.id = t.driver_id
            "#,
            CREW_TASK_COLUMNS
        );

        let row = sqlx::query_as::<_, CrewTaskRow>(&sql)
            .bind(task.task_number)
            .bind(&task.task_type)
            .bind(task.task_status.as_str())
            .bind(task.driver_id)
            .bind(task.start_date)
            .bind(task.end_date)
            .bind(task.start_time)
            .bind(task.end_time)
            .bind(task.hours_per_day)
            .bind(task.total_hours)
            .bind(task.booking_id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(&task.location)
            .bind(&task.customer_name)
            .bind(&task.customer_phone)
            .bind(&task.color_override)
            .bind(task.priority)
            .bind(&task.notes)
            .fetch_one(&self.pool)
            .await?;

        from_row(row)
    }

    /// Apply a partial update to a crew task
    pub async fn update_crew_task(
        &self,
        id: Uuid,
        update: &CrewTaskUpdate,
    ) -> Result<Option<CrewTask>, AppError> {
        let row = crew_task_update_query(id, update)
            .build_query_as::<CrewTaskRow>()
            .fetch_optional(&self.pool)
            .await?;

        row.map(from_row).transpose()
    }

    /// Delete a crew task, returning whether a row was removed
    pub async fn delete_crew_task(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM crew_tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn task_ids_for_booking(&self, booking_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids: Vec<(Uuid,)> =
            sqlx::query_as("SELECT id FROM crew_tasks WHERE booking_id = $1 ORDER BY start_date")
                .bind(booking_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids.into_iter().map(|r| r.0).collect())
    }

    /// Point every other task of a booking at the same driver
    pub async fn reassign_sibling_tasks(
        &self,
        booking_id: Uuid,
        except_task: Uuid,
        driver_id: Option<Uuid>,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(REASSIGN_SIBLINGS_SQL)
            .bind(driver_id)
            .bind(booking_id)
            .bind(except_task)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_tasks_for_booking(&self, booking_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM crew_tasks WHERE booking_id = $1")
            .bind(booking_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Partial `UPDATE` of a crew task, selecting the row back with its driver name
fn crew_task_update_query(id: Uuid, update: &CrewTaskUpdate) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("WITH t AS (UPDATE crew_tasks SET ");
    let mut set = qb.separated(", ");
    set_if_present!(set, "task_number", update.task_number);
    set_if_present!(set, "task_type", update.task_type.clone());
    set_if_present!(set, "task_status", update.task_status.map(|s| s.as_str()));
    set_if_present!(
        set,
        "driver_id",
        update.driver_id.map(fleetops_core::normalize_driver_id)
    );
    set_if_present!(set, "start_date", update.start_date);
    set_if_present!(set, "end_date", update.end_date);
    set_if_present!(set, "start_time", update.start_time);
    set_if_present!(set, "end_time", update.end_time);
    set_if_present!(set, "hours_per_day", update.hours_per_day);
    set_if_present!(set, "total_hours", update.total_hours);
    set_if_present!(set, "booking_id", update.booking_id);
    set_if_present!(set, "title", update.title.clone());
    set_if_present!(set, "description", update.description.clone());
    set_if_present!(set, "location", update.location.clone());
    set_if_present!(set, "customer_name", update.customer_name.clone());
    set_if_present!(set, "customer_phone", update.customer_phone.clone());
    set_if_present!(set, "color_override", update.color_override.clone());
    set_if_present!(set, "priority", update.priority);
    set_if_present!(set, "notes", update.notes.clone());
    set.push("updated_at = NOW()");

    qb.push(" WHERE id = ");
    qb.push_bind(id);
    qb.push(" RETURNING *) SELECT ");
    qb.push(CREW_TASK_COLUMNS);
    qb.push(" FROM t LEFT JOIN drivers d ON d.id = t.driver_id");
    qb
}
