/*
 * Responsibility
 * - SQLx operations for payroll_records
 * - List filters are optional binds ($n IS NULL OR ...) so one query serves
 *   both the admin view and the per-user view
 */
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct PayrollRecordRow {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub user_id: Uuid,
    pub pay_period_start: NaiveDate,
    pub pay_period_end: NaiveDate,
    pub gross_pay: f64,
    pub tax_deductions: f64,
    pub other_deductions: f64,
    pub net_pay: f64,
    pub hours_worked: f64,
    pub overtime_hours: f64,
    pub status: String,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

pub struct NewPayrollRecord {
    pub employee_id: Uuid,
    pub user_id: Uuid,
    pub pay_period_start: NaiveDate,
    pub pay_period_end: NaiveDate,
    pub gross_pay: f64,
    pub tax_deductions: f64,
    pub other_deductions: f64,
    pub net_pay: f64,
    pub hours_worked: f64,
    pub overtime_hours: f64,
}

#[derive(Debug, Default)]
pub struct RecordFilter {
    pub user_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Debug, FromRow)]
pub struct SummaryRow {
    pub total_employees: i64,
    pub total_gross_pay: f64,
    pub total_net_pay: f64,
    pub pending_records: i64,
    pub approved_records: i64,
    pub paid_records: i64,
}

pub async fn insert(db: &PgPool, new: &NewPayrollRecord) -> Result<PayrollRecordRow, RepoError> {
    let row = sqlx::query_as::<_, PayrollRecordRow>(
        r#"
        INSERT INTO payroll_records
            (employee_id, user_id, pay_period_start, pay_period_end, gross_pay,
             tax_deductions, other_deductions, net_pay, hours_worked, overtime_hours)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id, employee_id, user_id, pay_period_start, pay_period_end,
                  gross_pay, tax_deductions, other_deductions, net_pay,
                  hours_worked, overtime_hours, status, processed_at, created_at
        "#,
    )
    .bind(new.employee_id)
    .bind(new.user_id)
    .bind(new.pay_period_start)
    .bind(new.pay_period_end)
    .bind(new.gross_pay)
    .bind(new.tax_deductions)
    .bind(new.other_deductions)
    .bind(new.net_pay)
    .bind(new.hours_worked)
    .bind(new.overtime_hours)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn get(db: &PgPool, record_id: Uuid) -> Result<Option<PayrollRecordRow>, RepoError> {
    let row = sqlx::query_as::<_, PayrollRecordRow>(
        r#"
        SELECT id, employee_id, user_id, pay_period_start, pay_period_end,
               gross_pay, tax_deductions, other_deductions, net_pay,
               hours_worked, overtime_hours, status, processed_at, created_at
        FROM payroll_records
        WHERE id = $1
        "#,
    )
    .bind(record_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn list(
    db: &PgPool,
    filter: &RecordFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<PayrollRecordRow>, RepoError> {
    let rows = sqlx::query_as::<_, PayrollRecordRow>(
        r#"
        SELECT id, employee_id, user_id, pay_period_start, pay_period_end,
               gross_pay, tax_deductions, other_deductions, net_pay,
               hours_worked, overtime_hours, status, processed_at, created_at
        FROM payroll_records
        WHERE ($1::uuid IS NULL OR user_id = $1)
          AND ($2::uuid IS NULL OR employee_id = $2)
          AND ($3::text IS NULL OR status = $3)
        ORDER BY pay_period_start DESC, created_at DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(filter.user_id)
    .bind(filter.employee_id)
    .bind(filter.status.as_deref())
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn exists_for_period(
    db: &PgPool,
    employee_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<bool, RepoError> {
    let exists: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM payroll_records
            WHERE employee_id = $1 AND pay_period_start = $2 AND pay_period_end = $3
        )
        "#,
    )
    .bind(employee_id)
    .bind(start)
    .bind(end)
    .fetch_one(db)
    .await?;

    Ok(exists.0)
}

/// Partial update. `processed_at` is stamped by the caller when the status
/// transitions to approved/paid.
pub async fn update(
    db: &PgPool,
    record_id: Uuid,
    status: Option<&str>,
    processed_at: Option<DateTime<Utc>>,
) -> Result<Option<PayrollRecordRow>, RepoError> {
    let row = sqlx::query_as::<_, PayrollRecordRow>(
        r#"
        UPDATE payroll_records
        SET status = COALESCE($2, status),
            processed_at = COALESCE($3, processed_at)
        WHERE id = $1
        RETURNING id, employee_id, user_id, pay_period_start, pay_period_end,
                  gross_pay, tax_deductions, other_deductions, net_pay,
                  hours_worked, overtime_hours, status, processed_at, created_at
        "#,
    )
    .bind(record_id)
    .bind(status)
    .bind(processed_at)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn summary(
    db: &PgPool,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<SummaryRow, RepoError> {
    let row = sqlx::query_as::<_, SummaryRow>(
        r#"
        SELECT COUNT(DISTINCT employee_id)                     AS total_employees,
               COALESCE(SUM(gross_pay), 0)                     AS total_gross_pay,
               COALESCE(SUM(net_pay), 0)                       AS total_net_pay,
               COUNT(*) FILTER (WHERE status = 'pending')      AS pending_records,
               COUNT(*) FILTER (WHERE status = 'approved')     AS approved_records,
               COUNT(*) FILTER (WHERE status = 'paid')         AS paid_records
        FROM payroll_records
        WHERE ($1::date IS NULL OR pay_period_start >= $1)
          AND ($2::date IS NULL OR pay_period_end <= $2)
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_one(db)
    .await?;

    Ok(row)
}
