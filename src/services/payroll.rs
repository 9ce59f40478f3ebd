//! Pay and worked-hours calculation.
//!
//! Pure functions over employee compensation data; persistence and
//! authorization live in the handlers/repos. Money is rounded to cents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const STANDARD_WEEK_HOURS: f64 = 40.0;
pub const DAILY_REGULAR_HOURS: f64 = 8.0;

const OVERTIME_MULTIPLIER: f64 = 1.5;
const TAX_RATE: f64 = 0.25;
const OTHER_DEDUCTIONS_RATE: f64 = 0.05;
const WEEKS_PER_YEAR: f64 = 52.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Hourly,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullTime => "full_time",
            Self::PartTime => "part_time",
            Self::Contract => "contract",
            Self::Hourly => "hourly",
        }
    }
}

impl std::str::FromStr for EmploymentType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full_time" => Ok(Self::FullTime),
            "part_time" => Ok(Self::PartTime),
            "contract" => Ok(Self::Contract),
            "hourly" => Ok(Self::Hourly),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PayBreakdown {
    pub gross_pay: f64,
    pub tax_deductions: f64,
    pub other_deductions: f64,
    pub net_pay: f64,
    pub hours_worked: f64,
    pub overtime_hours: f64,
}

/// Weekly pay for one employee.
///
/// Hourly employees are paid per hour with a 1.5x overtime rate. Salaried
/// employees get 1/52 of the annual salary; overtime (if any) is paid at the
/// salary-derived hourly equivalent times 1.5. When `overtime_hours` is zero
/// it is derived from hours over the standard 40-hour week.
pub fn calculate_pay(
    employment_type: EmploymentType,
    annual_salary: f64,
    hourly_rate: Option<f64>,
    hours_worked: f64,
    overtime_hours: f64,
) -> PayBreakdown {
    let regular_hours = hours_worked.min(STANDARD_WEEK_HOURS);
    let overtime_hours = if overtime_hours == 0.0 {
        (hours_worked - STANDARD_WEEK_HOURS).max(0.0)
    } else {
        overtime_hours
    };

    let gross_pay = match (employment_type, hourly_rate) {
        (EmploymentType::Hourly, Some(rate)) => {
            let regular_pay = regular_hours * rate;
            let overtime_pay = overtime_hours * rate * OVERTIME_MULTIPLIER;
            regular_pay + overtime_pay
        }
        _ => {
            let weekly_salary = annual_salary / WEEKS_PER_YEAR;
            if overtime_hours > 0.0 {
                let hourly_equivalent = weekly_salary / STANDARD_WEEK_HOURS;
                weekly_salary + overtime_hours * hourly_equivalent * OVERTIME_MULTIPLIER
            } else {
                weekly_salary
            }
        }
    };

    let tax_deductions = gross_pay * TAX_RATE;
    let other_deductions = gross_pay * OTHER_DEDUCTIONS_RATE;
    let net_pay = gross_pay - tax_deductions - other_deductions;

    PayBreakdown {
        gross_pay: round2(gross_pay),
        tax_deductions: round2(tax_deductions),
        other_deductions: round2(other_deductions),
        net_pay: round2(net_pay),
        hours_worked,
        overtime_hours,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkedHours {
    pub total_hours: f64,
    pub overtime_hours: f64,
}

#[derive(Debug, Error)]
#[error("clock out time must be after clock in time")]
pub struct InvalidTimeRange;

/// Hours for one shift: wall time minus breaks, overtime past 8 hours/day.
pub fn calculate_hours(
    clock_in: DateTime<Utc>,
    clock_out: DateTime<Utc>,
    break_minutes: i32,
) -> Result<WorkedHours, InvalidTimeRange> {
    if clock_out <= clock_in {
        return Err(InvalidTimeRange);
    }

    let worked_minutes = (clock_out - clock_in).num_seconds() as f64 / 60.0;
    let total_hours = ((worked_minutes - f64::from(break_minutes)) / 60.0).max(0.0);
    let overtime_hours = (total_hours - DAILY_REGULAR_HOURS).max(0.0);

    Ok(WorkedHours {
        total_hours: round2(total_hours),
        overtime_hours: round2(overtime_hours),
    })
}

/// Round to two decimal places (money and reported hours).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn hourly_pay_derives_overtime_past_forty_hours() {
        let pay = calculate_pay(EmploymentType::Hourly, 0.0, Some(20.0), 45.0, 0.0);
        assert_close(pay.gross_pay, 800.0 + 150.0);
        assert_close(pay.tax_deductions, 237.5);
        assert_close(pay.other_deductions, 47.5);
        assert_close(pay.net_pay, 665.0);
        assert_close(pay.overtime_hours, 5.0);
    }

    #[test]
    fn hourly_pay_uses_explicit_overtime_when_given() {
        let pay = calculate_pay(EmploymentType::Hourly, 0.0, Some(10.0), 45.0, 2.0);
        assert_close(pay.gross_pay, 400.0 + 30.0);
        assert_close(pay.overtime_hours, 2.0);
    }

    #[test]
    fn salaried_pay_is_one_fifty_second_of_annual() {
        let pay = calculate_pay(EmploymentType::FullTime, 52_000.0, None, 40.0, 0.0);
        assert_close(pay.gross_pay, 1000.0);
        assert_close(pay.net_pay, 700.0);
    }

    #[test]
    fn salaried_overtime_pays_hourly_equivalent() {
        let pay = calculate_pay(EmploymentType::FullTime, 52_000.0, None, 44.0, 0.0);
        // weekly 1000, hourly equivalent 25, 4h overtime at 1.5x
        assert_close(pay.gross_pay, 1000.0 + 150.0);
        assert_close(pay.overtime_hours, 4.0);
    }

    #[test]
    fn hourly_type_without_rate_falls_back_to_salary() {
        let pay = calculate_pay(EmploymentType::Hourly, 52_000.0, None, 40.0, 0.0);
        assert_close(pay.gross_pay, 1000.0);
    }

    #[test]
    fn money_is_rounded_to_cents() {
        let pay = calculate_pay(EmploymentType::Hourly, 0.0, Some(33.33), 40.0, 0.0);
        assert_close(pay.gross_pay, 1333.2);
        assert_close(pay.tax_deductions, 333.3);
        assert_close(pay.other_deductions, 66.66);
        assert_close(pay.net_pay, 933.24);
    }

    #[test]
    fn full_day_with_break() {
        let clock_in = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        let clock_out = Utc.with_ymd_and_hms(2024, 3, 4, 17, 30, 0).unwrap();
        let hours = calculate_hours(clock_in, clock_out, 30).unwrap();
        assert_close(hours.total_hours, 8.0);
        assert_close(hours.overtime_hours, 0.0);
    }

    #[test]
    fn overtime_starts_after_eight_hours() {
        let clock_in = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        let clock_out = Utc.with_ymd_and_hms(2024, 3, 4, 19, 0, 0).unwrap();
        let hours = calculate_hours(clock_in, clock_out, 0).unwrap();
        assert_close(hours.total_hours, 10.0);
        assert_close(hours.overtime_hours, 2.0);
    }

    #[test]
    fn clock_out_before_clock_in_is_rejected() {
        let clock_in = Utc.with_ymd_and_hms(2024, 3, 4, 17, 0, 0).unwrap();
        let clock_out = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        assert!(calculate_hours(clock_in, clock_out, 0).is_err());
    }

    #[test]
    fn employment_type_round_trips_through_str() {
        for et in [
            EmploymentType::FullTime,
            EmploymentType::PartTime,
            EmploymentType::Contract,
            EmploymentType::Hourly,
        ] {
            assert_eq!(et.as_str().parse::<EmploymentType>(), Ok(et));
        }
        assert!("freelance".parse::<EmploymentType>().is_err());
    }
}
