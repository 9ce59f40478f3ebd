/*
 * Responsibility
 * - Request/response DTOs for time tracking
 */
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::time_entry_repo::TimeEntryRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeEntryStatus {
    Active,
    Completed,
    Approved,
}

impl TimeEntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Approved => "approved",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ClockInRequest {
    pub work_date: NaiveDate,
    pub clock_in: DateTime<Utc>,
    #[serde(default)]
    pub break_minutes: i32,
    pub notes: Option<String>,
}

impl ClockInRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.break_minutes < 0 {
            return Err("break_minutes cannot be negative");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ClockOutRequest {
    pub clock_out: DateTime<Utc>,
    pub break_minutes: Option<i32>,
    pub notes: Option<String>,
}

impl ClockOutRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(m) = self.break_minutes
            && m < 0
        {
            return Err("break_minutes cannot be negative");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateTimeEntryRequest {
    pub clock_out: Option<DateTime<Utc>>,
    pub break_minutes: Option<i32>,
    pub notes: Option<String>,
    pub status: Option<TimeEntryStatus>,
}

impl UpdateTimeEntryRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(m) = self.break_minutes
            && m < 0
        {
            return Err("break_minutes cannot be negative");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ListEntriesQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub employee_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<TimeEntryStatus>,
}

#[derive(Debug, Deserialize)]
pub struct MyEntriesQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct TimeEntryResponse {
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

impl From<TimeEntryRow> for TimeEntryResponse {
    fn from(row: TimeEntryRow) -> Self {
        Self {
            id: row.id,
            employee_id: row.employee_id,
            work_date: row.work_date,
            clock_in: row.clock_in,
            clock_out: row.clock_out,
            break_minutes: row.break_minutes,
            total_hours: row.total_hours,
            overtime_hours: row.overtime_hours,
            notes: row.notes,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryPeriod {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct TimeSummaryResponse {
    pub total_hours: f64,
    pub total_overtime_hours: f64,
    pub total_regular_hours: f64,
    pub total_days_worked: i64,
    pub average_hours_per_day: f64,
    pub period: SummaryPeriod,
}
