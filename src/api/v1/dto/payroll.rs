/*
 * Responsibility
 * - Request/response DTOs for payroll records, calculation and summaries
 */
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::payroll_repo::{PayrollRecordRow, SummaryRow};
use crate::services::payroll::PayBreakdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    Pending,
    Approved,
    Paid,
}

impl PayrollStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Paid => "paid",
        }
    }

    /// approved/paid mark the record as processed.
    pub fn is_processed(&self) -> bool {
        matches!(self, Self::Approved | Self::Paid)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePayrollRecordRequest {
    pub employee_id: Uuid,
    pub pay_period_start: NaiveDate,
    pub pay_period_end: NaiveDate,
    pub hours_worked: f64,
    #[serde(default)]
    pub overtime_hours: f64,
}

impl CreatePayrollRecordRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.pay_period_start >= self.pay_period_end {
            return Err("pay_period_start must be before pay_period_end");
        }
        if self.hours_worked < 0.0 || self.overtime_hours < 0.0 {
            return Err("hours cannot be negative");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePayrollRecordRequest {
    pub status: Option<PayrollStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ListRecordsQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub employee_id: Option<Uuid>,
    pub status: Option<PayrollStatus>,
}

#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    pub employee_id: Uuid,
    pub hours_worked: f64,
    #[serde(default)]
    pub overtime_hours: f64,
}

impl CalculateRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.hours_worked < 0.0 || self.overtime_hours < 0.0 {
            return Err("hours cannot be negative");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    pub employee_id: Uuid,
    pub employee_name: String,
    #[serde(flatten)]
    pub pay: PayBreakdown,
}

#[derive(Debug, Deserialize)]
pub struct ProcessPeriodRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct ProcessedEmployee {
    pub employee_id: Uuid,
    pub employee_name: String,
    #[serde(flatten)]
    pub pay: PayBreakdown,
}

#[derive(Debug, Serialize)]
pub struct ProcessPeriodResponse {
    pub message: String,
    pub period: String,
    pub records: Vec<ProcessedEmployee>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct PayrollSummaryResponse {
    pub total_employees: i64,
    pub total_gross_pay: f64,
    pub total_net_pay: f64,
    pub pending_records: i64,
    pub approved_records: i64,
    pub paid_records: i64,
}

impl From<SummaryRow> for PayrollSummaryResponse {
    fn from(row: SummaryRow) -> Self {
        Self {
            total_employees: row.total_employees,
            total_gross_pay: row.total_gross_pay,
            total_net_pay: row.total_net_pay,
            pending_records: row.pending_records,
            approved_records: row.approved_records,
            paid_records: row.paid_records,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PayrollRecordResponse {
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

impl From<PayrollRecordRow> for PayrollRecordResponse {
    fn from(row: PayrollRecordRow) -> Self {
        Self {
            id: row.id,
            employee_id: row.employee_id,
            user_id: row.user_id,
            pay_period_start: row.pay_period_start,
            pay_period_end: row.pay_period_end,
            gross_pay: row.gross_pay,
            tax_deductions: row.tax_deductions,
            other_deductions: row.other_deductions,
            net_pay: row.net_pay,
            hours_worked: row.hours_worked,
            overtime_hours: row.overtime_hours,
            status: row.status,
            processed_at: row.processed_at,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_period_is_rejected() {
        let req = CreatePayrollRecordRequest {
            employee_id: Uuid::new_v4(),
            pay_period_start: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            pay_period_end: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            hours_worked: 40.0,
            overtime_hours: 0.0,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn processed_statuses() {
        assert!(!PayrollStatus::Pending.is_processed());
        assert!(PayrollStatus::Approved.is_processed());
        assert!(PayrollStatus::Paid.is_processed());
    }
}
