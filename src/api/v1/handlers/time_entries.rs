/*
 * Responsibility
 * - /time handlers: clock in/out, entry management, per-user summary
 * - Owners manage their own entries; approval and deletion are admin-only
 */
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::api::v1::dto::PageQuery;
use crate::api::v1::dto::time_entries::{
    ClockInRequest, ClockOutRequest, ListEntriesQuery, MyEntriesQuery, SummaryPeriod,
    TimeEntryResponse, TimeEntryStatus, TimeSummaryResponse, UpdateTimeEntryRequest,
};
use crate::api::v1::extractors::{AuthCtx, AuthCtxExtractor, RequireAdmin};
use crate::error::AppError;
use crate::repos::employee_repo::EmployeeRow;
use crate::repos::{employee_repo, time_entry_repo, user_repo};
use crate::services::payroll::{calculate_hours, round2};
use crate::state::AppState;

/// The caller's employee record; 404 when the profile chain is missing.
async fn current_employee(state: &AppState, ctx: &AuthCtx) -> Result<EmployeeRow, AppError> {
    let user = user_repo::find_by_subject(&state.db, &ctx.user_id)
        .await?
        .ok_or(AppError::not_found("employee record"))?;

    employee_repo::find_by_user(&state.db, user.id)
        .await?
        .ok_or(AppError::not_found("employee record"))
}

pub async fn clock_in(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<ClockInRequest>,
) -> Result<(StatusCode, Json<TimeEntryResponse>), AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("INVALID_TIME_ENTRY", m))?;

    let employee = current_employee(&state, &ctx).await?;

    if time_entry_repo::find_active_for_date(&state.db, employee.id, req.work_date)
        .await?
        .is_some()
    {
        return Err(AppError::bad_request(
            "ALREADY_CLOCKED_IN",
            "already clocked in for this date, clock out first",
        ));
    }

    let row = time_entry_repo::insert(
        &state.db,
        employee.id,
        req.work_date,
        req.clock_in,
        req.break_minutes,
        req.notes.as_deref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn clock_out(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(entry_id): Path<Uuid>,
    Json(req): Json<ClockOutRequest>,
) -> Result<Json<TimeEntryResponse>, AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("INVALID_TIME_ENTRY", m))?;

    let employee = current_employee(&state, &ctx).await?;

    let entry = time_entry_repo::get(&state.db, entry_id)
        .await?
        // Entries of other employees are indistinguishable from missing ones.
        .filter(|e| e.employee_id == employee.id)
        .ok_or(AppError::not_found("time entry"))?;

    if entry.clock_out.is_some() {
        return Err(AppError::bad_request(
            "ALREADY_CLOCKED_OUT",
            "already clocked out",
        ));
    }

    let break_minutes = req.break_minutes.unwrap_or(entry.break_minutes);
    let hours = calculate_hours(entry.clock_in, req.clock_out, break_minutes)
        .map_err(|e| AppError::bad_request("INVALID_TIME_RANGE", e.to_string()))?;

    let changes = time_entry_repo::EntryChanges {
        clock_out: Some(req.clock_out),
        break_minutes: Some(break_minutes),
        total_hours: Some(hours.total_hours),
        overtime_hours: Some(hours.overtime_hours),
        notes: req.notes.as_deref(),
        status: Some(TimeEntryStatus::Completed.as_str()),
    };

    let row = time_entry_repo::update(&state.db, entry.id, &changes)
        .await?
        .ok_or(AppError::not_found("time entry"))?;

    Ok(Json(row.into()))
}

pub async fn my_entries(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Query(query): Query<MyEntriesQuery>,
) -> Result<Json<Vec<TimeEntryResponse>>, AppError> {
    let employee = current_employee(&state, &ctx).await?;
    let page = PageQuery {
        skip: query.skip,
        limit: query.limit,
    };

    let filter = time_entry_repo::EntryFilter {
        employee_id: Some(employee.id),
        from: query.start_date,
        to: query.end_date,
        status: None,
    };
    let rows = time_entry_repo::list(&state.db, &filter, page.limit(), page.offset()).await?;

    Ok(Json(rows.into_iter().map(TimeEntryResponse::from).collect()))
}

pub async fn list_entries(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ListEntriesQuery>,
) -> Result<Json<Vec<TimeEntryResponse>>, AppError> {
    let page = PageQuery {
        skip: query.skip,
        limit: query.limit,
    };

    let filter = time_entry_repo::EntryFilter {
        employee_id: query.employee_id,
        from: query.start_date,
        to: query.end_date,
        status: query.status.map(|s| s.as_str().to_string()),
    };
    let rows = time_entry_repo::list(&state.db, &filter, page.limit(), page.offset()).await?;

    Ok(Json(rows.into_iter().map(TimeEntryResponse::from).collect()))
}

pub async fn get_entry(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(entry_id): Path<Uuid>,
) -> Result<Json<TimeEntryResponse>, AppError> {
    let entry = time_entry_repo::get(&state.db, entry_id)
        .await?
        .ok_or(AppError::not_found("time entry"))?;

    if !ctx.is_admin() {
        let employee = current_employee(&state, &ctx).await?;
        if entry.employee_id != employee.id {
            return Err(AppError::Forbidden("not authorized to view this entry"));
        }
    }

    Ok(Json(entry.into()))
}

pub async fn update_entry(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(entry_id): Path<Uuid>,
    Json(req): Json<UpdateTimeEntryRequest>,
) -> Result<Json<TimeEntryResponse>, AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("INVALID_TIME_ENTRY", m))?;

    let entry = time_entry_repo::get(&state.db, entry_id)
        .await?
        .ok_or(AppError::not_found("time entry"))?;

    if !ctx.is_admin() {
        let employee = current_employee(&state, &ctx).await?;
        if entry.employee_id != employee.id {
            return Err(AppError::Forbidden("not authorized to update this entry"));
        }
        // Approval needs a second pair of eyes.
        if req.status == Some(TimeEntryStatus::Approved) {
            return Err(AppError::Forbidden("cannot approve your own time entry"));
        }
    }

    // Changing clock_out or the break length invalidates the stored hours.
    let mut total_hours = None;
    let mut overtime_hours = None;
    if req.clock_out.is_some() || req.break_minutes.is_some() {
        let clock_out = req.clock_out.or(entry.clock_out);
        let break_minutes = req.break_minutes.unwrap_or(entry.break_minutes);

        if let Some(clock_out) = clock_out {
            let hours = calculate_hours(entry.clock_in, clock_out, break_minutes)
                .map_err(|e| AppError::bad_request("INVALID_TIME_RANGE", e.to_string()))?;
            total_hours = Some(hours.total_hours);
            overtime_hours = Some(hours.overtime_hours);
        }
    }

    let changes = time_entry_repo::EntryChanges {
        clock_out: req.clock_out,
        break_minutes: req.break_minutes,
        total_hours,
        overtime_hours,
        notes: req.notes.as_deref(),
        status: req.status.map(|s| s.as_str()),
    };

    let row = time_entry_repo::update(&state.db, entry.id, &changes)
        .await?
        .ok_or(AppError::not_found("time entry"))?;

    Ok(Json(row.into()))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(entry_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = time_entry_repo::delete(&state.db, entry_id).await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("time entry"))
    }
}

pub async fn my_summary(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Query(query): Query<MyEntriesQuery>,
) -> Result<Json<TimeSummaryResponse>, AppError> {
    let employee = current_employee(&state, &ctx).await?;

    let totals = time_entry_repo::hours_summary(
        &state.db,
        employee.id,
        query.start_date,
        query.end_date,
    )
    .await?;

    let average = if totals.days_worked > 0 {
        round2(totals.total_hours / totals.days_worked as f64)
    } else {
        0.0
    };

    Ok(Json(TimeSummaryResponse {
        total_hours: totals.total_hours,
        total_overtime_hours: totals.overtime_hours,
        total_regular_hours: round2(totals.total_hours - totals.overtime_hours),
        total_days_worked: totals.days_worked,
        average_hours_per_day: average,
        period: SummaryPeriod {
            start_date: query.start_date,
            end_date: query.end_date,
        },
    }))
}
