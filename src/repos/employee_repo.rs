/*
 * Responsibility
 * - SQLx operations for the employees table
 */
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct EmployeeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub employee_code: String,
    pub department: String,
    pub position: String,
    pub hire_date: NaiveDate,
    pub salary: f64,
    pub hourly_rate: Option<f64>,
    pub employment_type: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewEmployee<'a> {
    pub employee_code: &'a str,
    pub department: &'a str,
    pub position: &'a str,
    pub hire_date: NaiveDate,
    pub salary: f64,
    pub hourly_rate: Option<f64>,
    pub employment_type: &'a str,
}

pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> Result<Option<EmployeeRow>, RepoError> {
    let row = sqlx::query_as::<_, EmployeeRow>(
        r#"
        SELECT id, user_id, employee_code, department, position, hire_date,
               salary, hourly_rate, employment_type, is_active, created_at
        FROM employees
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn get(db: &PgPool, employee_id: Uuid) -> Result<Option<EmployeeRow>, RepoError> {
    let row = sqlx::query_as::<_, EmployeeRow>(
        r#"
        SELECT id, user_id, employee_code, department, position, hire_date,
               salary, hourly_rate, employment_type, is_active, created_at
        FROM employees
        WHERE id = $1
        "#,
    )
    .bind(employee_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn list_active(db: &PgPool) -> Result<Vec<EmployeeRow>, RepoError> {
    let rows = sqlx::query_as::<_, EmployeeRow>(
        r#"
        SELECT id, user_id, employee_code, department, position, hire_date,
               salary, hourly_rate, employment_type, is_active, created_at
        FROM employees
        WHERE is_active
        ORDER BY employee_code
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    new: &NewEmployee<'_>,
) -> Result<EmployeeRow, RepoError> {
    let row = sqlx::query_as::<_, EmployeeRow>(
        r#"
        INSERT INTO employees
            (user_id, employee_code, department, position, hire_date,
             salary, hourly_rate, employment_type)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, user_id, employee_code, department, position, hire_date,
                  salary, hourly_rate, employment_type, is_active, created_at
        "#,
    )
    .bind(user_id)
    .bind(new.employee_code)
    .bind(new.department)
    .bind(new.position)
    .bind(new.hire_date)
    .bind(new.salary)
    .bind(new.hourly_rate)
    .bind(new.employment_type)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}
