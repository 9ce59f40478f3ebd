/*
 * Responsibility
 * - Request/response DTOs for users and employee records
 * - validate() for shape checks before hitting the repos
 */
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::employee_repo::EmployeeRow;
use crate::repos::user_repo::UserRow;
use crate::services::payroll::EmploymentType;

#[derive(Debug, Deserialize)]
pub struct UpsertProfileRequest {
    pub email: String,
    pub full_name: String,
}

impl UpsertProfileRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_email(&self.email)?;
        if self.full_name.trim().is_empty() {
            return Err("full_name is required");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(name) = &self.full_name
            && name.trim().is_empty()
        {
            return Err("full_name cannot be empty");
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<(), &'static str> {
    // Deliverability is the provider's problem; this catches obvious garbage.
    if email.trim().is_empty() || !email.contains('@') || email.len() > 254 {
        return Err("email is invalid");
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub subject: String,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            subject: row.subject,
            email: row.email,
            full_name: row.full_name,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub employee_code: String,
    pub department: String,
    pub position: String,
    pub hire_date: NaiveDate,
    pub salary: f64,
    pub hourly_rate: Option<f64>,
    #[serde(default = "default_employment_type")]
    pub employment_type: EmploymentType,
}

fn default_employment_type() -> EmploymentType {
    EmploymentType::FullTime
}

impl CreateEmployeeRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.employee_code.trim().is_empty() {
            return Err("employee_code is required");
        }
        if self.department.trim().is_empty() {
            return Err("department is required");
        }
        if self.position.trim().is_empty() {
            return Err("position is required");
        }
        if self.salary < 0.0 {
            return Err("salary cannot be negative");
        }
        if let Some(rate) = self.hourly_rate
            && rate < 0.0
        {
            return Err("hourly_rate cannot be negative");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct EmployeeResponse {
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

impl From<EmployeeRow> for EmployeeResponse {
    fn from(row: EmployeeRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            employee_code: row.employee_code,
            department: row.department,
            position: row.position,
            hire_date: row.hire_date,
            salary: row.salary,
            hourly_rate: row.hourly_rate,
            employment_type: row.employment_type,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_requires_plausible_email() {
        let req = UpsertProfileRequest {
            email: "nope".into(),
            full_name: "Jo Doe".into(),
        };
        assert!(req.validate().is_err());

        let req = UpsertProfileRequest {
            email: "jo@example.com".into(),
            full_name: "Jo Doe".into(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn employee_rejects_negative_compensation() {
        let req = CreateEmployeeRequest {
            employee_code: "EMP001".into(),
            department: "Engineering".into(),
            position: "Developer".into(),
            hire_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            salary: -1.0,
            hourly_rate: None,
            employment_type: EmploymentType::FullTime,
        };
        assert!(req.validate().is_err());
    }
}
