/*
 * Responsibility
 * - /payroll handlers: record CRUD, pay calculation, period runs, summary
 * - Admin-only mutations; non-admins only ever see their own records
 */
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::api::v1::dto::PageQuery;
use crate::api::v1::dto::payroll::{
    CalculateRequest, CalculateResponse, CreatePayrollRecordRequest, ListRecordsQuery,
    PayrollRecordResponse, PayrollSummaryResponse, ProcessPeriodRequest, ProcessPeriodResponse,
    ProcessedEmployee, SummaryQuery, UpdatePayrollRecordRequest,
};
use crate::api::v1::extractors::{AuthCtxExtractor, RequireAdmin};
use crate::error::AppError;
use crate::repos::error::RepoError;
use crate::repos::{employee_repo, payroll_repo, time_entry_repo, user_repo};
use crate::services::payroll::{EmploymentType, PayBreakdown, calculate_pay};
use crate::state::AppState;

fn employment_type_of(employee: &employee_repo::EmployeeRow) -> Result<EmploymentType, AppError> {
    employee.employment_type.parse().map_err(|_| {
        tracing::error!(
            employee_id = %employee.id,
            employment_type = %employee.employment_type,
            "unknown employment type in database"
        );
        AppError::Internal
    })
}

fn pay_for(
    employee: &employee_repo::EmployeeRow,
    hours_worked: f64,
    overtime_hours: f64,
) -> Result<PayBreakdown, AppError> {
    Ok(calculate_pay(
        employment_type_of(employee)?,
        employee.salary,
        employee.hourly_rate,
        hours_worked,
        overtime_hours,
    ))
}

pub async fn create_record(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(req): Json<CreatePayrollRecordRequest>,
) -> Result<(StatusCode, Json<PayrollRecordResponse>), AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("INVALID_PAYROLL_RECORD", m))?;

    let employee = employee_repo::get(&state.db, req.employee_id)
        .await?
        .ok_or(AppError::not_found("employee"))?;

    if payroll_repo::exists_for_period(
        &state.db,
        employee.id,
        req.pay_period_start,
        req.pay_period_end,
    )
    .await?
    {
        return Err(AppError::conflict(
            "PAYROLL_PERIOD_EXISTS",
            "payroll record already exists for this period",
        ));
    }

    let pay = pay_for(&employee, req.hours_worked, req.overtime_hours)?;

    let new = payroll_repo::NewPayrollRecord {
        employee_id: employee.id,
        user_id: employee.user_id,
        pay_period_start: req.pay_period_start,
        pay_period_end: req.pay_period_end,
        gross_pay: pay.gross_pay,
        tax_deductions: pay.tax_deductions,
        other_deductions: pay.other_deductions,
        net_pay: pay.net_pay,
        hours_worked: pay.hours_worked,
        overtime_hours: pay.overtime_hours,
    };

    let row = payroll_repo::insert(&state.db, &new).await.map_err(|e| {
        match e {
            // Lost a race with a concurrent run for the same period.
            RepoError::Conflict => AppError::conflict(
                "PAYROLL_PERIOD_EXISTS",
                "payroll record already exists for this period",
            ),
            other => other.into(),
        }
    })?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn list_records(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Query(query): Query<ListRecordsQuery>,
) -> Result<Json<Vec<PayrollRecordResponse>>, AppError> {
    let page = PageQuery {
        skip: query.skip,
        limit: query.limit,
    };

    let filter = if ctx.is_admin() {
        payroll_repo::RecordFilter {
            user_id: None,
            employee_id: query.employee_id,
            status: query.status.map(|s| s.as_str().to_string()),
        }
    } else {
        // Non-admins only see their own records, whatever filters they send.
        let Some(user) = user_repo::find_by_subject(&state.db, &ctx.user_id).await? else {
            return Ok(Json(vec![]));
        };
        payroll_repo::RecordFilter {
            user_id: Some(user.id),
            employee_id: None,
            status: query.status.map(|s| s.as_str().to_string()),
        }
    };

    let rows = payroll_repo::list(&state.db, &filter, page.limit(), page.offset()).await?;

    Ok(Json(
        rows.into_iter().map(PayrollRecordResponse::from).collect(),
    ))
}

pub async fn my_records(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<PayrollRecordResponse>>, AppError> {
    let Some(user) = user_repo::find_by_subject(&state.db, &ctx.user_id).await? else {
        return Ok(Json(vec![]));
    };

    let filter = payroll_repo::RecordFilter {
        user_id: Some(user.id),
        ..Default::default()
    };
    let rows = payroll_repo::list(&state.db, &filter, page.limit(), page.offset()).await?;

    Ok(Json(
        rows.into_iter().map(PayrollRecordResponse::from).collect(),
    ))
}

pub async fn get_record(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(record_id): Path<Uuid>,
) -> Result<Json<PayrollRecordResponse>, AppError> {
    let row = payroll_repo::get(&state.db, record_id)
        .await?
        .ok_or(AppError::not_found("payroll record"))?;

    if !ctx.is_admin() {
        let owns = user_repo::find_by_subject(&state.db, &ctx.user_id)
            .await?
            .is_some_and(|user| user.id == row.user_id);
        if !owns {
            return Err(AppError::Forbidden("not authorized to view this record"));
        }
    }

    Ok(Json(row.into()))
}

pub async fn update_record(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(record_id): Path<Uuid>,
    Json(req): Json<UpdatePayrollRecordRequest>,
) -> Result<Json<PayrollRecordResponse>, AppError> {
    // Moving into approved/paid stamps the processing time.
    let processed_at = req
        .status
        .filter(|s| s.is_processed())
        .map(|_| Utc::now());

    let row = payroll_repo::update(
        &state.db,
        record_id,
        req.status.map(|s| s.as_str()),
        processed_at,
    )
    .await?
    .ok_or(AppError::not_found("payroll record"))?;

    Ok(Json(row.into()))
}

pub async fn calculate(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(req): Json<CalculateRequest>,
) -> Result<Json<CalculateResponse>, AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("INVALID_CALCULATION", m))?;

    let employee = employee_repo::get(&state.db, req.employee_id)
        .await?
        .ok_or(AppError::not_found("employee"))?;

    let user = user_repo::get(&state.db, employee.user_id)
        .await?
        .ok_or(AppError::Internal)?;

    let pay = pay_for(&employee, req.hours_worked, req.overtime_hours)?;

    Ok(Json(CalculateResponse {
        employee_id: employee.id,
        employee_name: user.full_name,
        pay,
    }))
}

/// Run payroll for every active employee over a period: employees with a
/// record for the period are skipped, hours come from approved time entries.
pub async fn process_period(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(req): Json<ProcessPeriodRequest>,
) -> Result<Json<ProcessPeriodResponse>, AppError> {
    if req.start_date >= req.end_date {
        return Err(AppError::bad_request(
            "INVALID_PERIOD",
            "start date must be before end date",
        ));
    }

    let employees = employee_repo::list_active(&state.db).await?;
    let mut processed = Vec::new();

    for employee in employees {
        if payroll_repo::exists_for_period(&state.db, employee.id, req.start_date, req.end_date)
            .await?
        {
            continue;
        }

        let hours = time_entry_repo::approved_hours_for_period(
            &state.db,
            employee.id,
            req.start_date,
            req.end_date,
        )
        .await?;

        let pay = pay_for(&employee, hours.total_hours, hours.overtime_hours)?;

        let new = payroll_repo::NewPayrollRecord {
            employee_id: employee.id,
            user_id: employee.user_id,
            pay_period_start: req.start_date,
            pay_period_end: req.end_date,
            gross_pay: pay.gross_pay,
            tax_deductions: pay.tax_deductions,
            other_deductions: pay.other_deductions,
            net_pay: pay.net_pay,
            hours_worked: pay.hours_worked,
            overtime_hours: pay.overtime_hours,
        };

        match payroll_repo::insert(&state.db, &new).await {
            Ok(_) => {}
            // Concurrent run created the record first; same as the skip above.
            Err(RepoError::Conflict) => continue,
            Err(other) => return Err(other.into()),
        }

        let user = user_repo::get(&state.db, employee.user_id)
            .await?
            .ok_or(AppError::Internal)?;

        processed.push(ProcessedEmployee {
            employee_id: employee.id,
            employee_name: user.full_name,
            pay,
        });
    }

    Ok(Json(ProcessPeriodResponse {
        message: format!("processed payroll for {} employees", processed.len()),
        period: format!("{} to {}", req.start_date, req.end_date),
        records: processed,
    }))
}

pub async fn summary(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<PayrollSummaryResponse>, AppError> {
    let row = payroll_repo::summary(&state.db, query.start_date, query.end_date).await?;

    Ok(Json(row.into()))
}
