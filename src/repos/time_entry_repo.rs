/*
 * Responsibility
 * - SQLx operations for time_entries
 */
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct TimeEntryRow {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub work_date: NaiveDate,
    pub clock_in: DateTime<Utc>,
    pub clock_out: Option<DateTime<Utc>>,
    pub break_minutes: i32,
    pub total_hours: Option<f64>,
    pub overtime_hours: f64,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct EntryFilter {
    pub employee_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<String>,
}

/// Field changes for one entry; None leaves the column untouched.
#[derive(Debug, Default)]
pub struct EntryChanges<'a> {
    pub clock_out: Option<DateTime<Utc>>,
    pub break_minutes: Option<i32>,
    pub total_hours: Option<f64>,
    pub overtime_hours: Option<f64>,
    pub notes: Option<&'a str>,
    pub status: Option<&'a str>,
}

#[derive(Debug, FromRow)]
pub struct EmployeeHoursRow {
    pub total_hours: f64,
    pub overtime_hours: f64,
    pub days_worked: i64,
}

pub async fn insert(
    db: &PgPool,
    employee_id: Uuid,
    work_date: NaiveDate,
    clock_in: DateTime<Utc>,
    break_minutes: i32,
    notes: Option<&str>,
) -> Result<TimeEntryRow, RepoError> {
    let row = sqlx::query_as::<_, TimeEntryRow>(
        r#"
        INSERT INTO time_entries (employee_id, work_date, clock_in, break_minutes, notes)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, employee_id, work_date, clock_in, clock_out, break_minutes,
                  total_hours, overtime_hours, notes, status, created_at, updated_at
        "#,
    )
    .bind(employee_id)
    .bind(work_date)
    .bind(clock_in)
    .bind(break_minutes)
    .bind(notes)
    .fetch_one(db)
    .await?;

    Ok(row)
}

pub async fn get(db: &PgPool, entry_id: Uuid) -> Result<Option<TimeEntryRow>, RepoError> {
    let row = sqlx::query_as::<_, TimeEntryRow>(
        r#"
        SELECT id, employee_id, work_date, clock_in, clock_out, break_minutes,
               total_hours, overtime_hours, notes, status, created_at, updated_at
        FROM time_entries
        WHERE id = $1
        "#,
    )
    .bind(entry_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn find_active_for_date(
    db: &PgPool,
    employee_id: Uuid,
    work_date: NaiveDate,
) -> Result<Option<TimeEntryRow>, RepoError> {
    let row = sqlx::query_as::<_, TimeEntryRow>(
        r#"
        SELECT id, employee_id, work_date, clock_in, clock_out, break_minutes,
               total_hours, overtime_hours, notes, status, created_at, updated_at
        FROM time_entries
        WHERE employee_id = $1 AND work_date = $2 AND status = 'active'
        "#,
    )
    .bind(employee_id)
    .bind(work_date)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn list(
    db: &PgPool,
    filter: &EntryFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<TimeEntryRow>, RepoError> {
    let rows = sqlx::query_as::<_, TimeEntryRow>(
        r#"
        SELECT id, employee_id, work_date, clock_in, clock_out, break_minutes,
               total_hours, overtime_hours, notes, status, created_at, updated_at
        FROM time_entries
        WHERE ($1::uuid IS NULL OR employee_id = $1)
          AND ($2::date IS NULL OR work_date >= $2)
          AND ($3::date IS NULL OR work_date <= $3)
          AND ($4::text IS NULL OR status = $4)
        ORDER BY work_date DESC, clock_in DESC
        LIMIT $5 OFFSET $6
        "#,
    )
    .bind(filter.employee_id)
    .bind(filter.from)
    .bind(filter.to)
    .bind(filter.status.as_deref())
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn update(
    db: &PgPool,
    entry_id: Uuid,
    changes: &EntryChanges<'_>,
) -> Result<Option<TimeEntryRow>, RepoError> {
    let row = sqlx::query_as::<_, TimeEntryRow>(
        r#"
        UPDATE time_entries
        SET clock_out = COALESCE($2, clock_out),
            break_minutes = COALESCE($3, break_minutes),
            total_hours = COALESCE($4, total_hours),
            overtime_hours = COALESCE($5, overtime_hours),
            notes = COALESCE($6, notes),
            status = COALESCE($7, status),
            updated_at = now()
        WHERE id = $1
        RETURNING id, employee_id, work_date, clock_in, clock_out, break_minutes,
                  total_hours, overtime_hours, notes, status, created_at, updated_at
        "#,
    )
    .bind(entry_id)
    .bind(changes.clock_out)
    .bind(changes.break_minutes)
    .bind(changes.total_hours)
    .bind(changes.overtime_hours)
    .bind(changes.notes)
    .bind(changes.status)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn delete(db: &PgPool, entry_id: Uuid) -> Result<bool, RepoError> {
    let result = sqlx::query("DELETE FROM time_entries WHERE id = $1")
        .bind(entry_id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Approved hours for one employee inside a pay period (feeds payroll runs).
pub async fn approved_hours_for_period(
    db: &PgPool,
    employee_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<EmployeeHoursRow, RepoError> {
    let row = sqlx::query_as::<_, EmployeeHoursRow>(
        r#"
        SELECT COALESCE(SUM(total_hours), 0)    AS total_hours,
               COALESCE(SUM(overtime_hours), 0) AS overtime_hours,
               COUNT(DISTINCT work_date)        AS days_worked
        FROM time_entries
        WHERE employee_id = $1
          AND work_date >= $2
          AND work_date <= $3
          AND status = 'approved'
        "#,
    )
    .bind(employee_id)
    .bind(start)
    .bind(end)
    .fetch_one(db)
    .await?;

    Ok(row)
}

/// All-status hours summary for one employee, optional date range.
pub async fn hours_summary(
    db: &PgPool,
    employee_id: Uuid,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<EmployeeHoursRow, RepoError> {
    let row = sqlx::query_as::<_, EmployeeHoursRow>(
        r#"
        SELECT COALESCE(SUM(total_hours), 0)    AS total_hours,
               COALESCE(SUM(overtime_hours), 0) AS overtime_hours,
               COUNT(DISTINCT work_date)        AS days_worked
        FROM time_entries
        WHERE employee_id = $1
          AND ($2::date IS NULL OR work_date >= $2)
          AND ($3::date IS NULL OR work_date <= $3)
        "#,
    )
    .bind(employee_id)
    .bind(from)
    .bind(to)
    .fetch_one(db)
    .await?;

    Ok(row)
}
