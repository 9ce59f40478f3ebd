/*
 * Responsibility
 * - /users handlers: own profile, admin user management, own employee record
 * - The profile row is keyed by the token subject; PUT /users/me provisions it
 */
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::api::v1::dto::PageQuery;
use crate::api::v1::dto::users::{
    CreateEmployeeRequest, EmployeeResponse, UpdateUserRequest, UpsertProfileRequest, UserResponse,
};
use crate::api::v1::extractors::{AuthCtxExtractor, RequireAdmin};
use crate::error::AppError;
use crate::repos::error::RepoError;
use crate::repos::{employee_repo, user_repo};
use crate::state::AppState;

pub async fn get_me(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<UserResponse>, AppError> {
    let row = user_repo::find_by_subject(&state.db, &ctx.user_id)
        .await?
        .ok_or(AppError::not_found("user profile"))?;

    Ok(Json(row.into()))
}

pub async fn update_me(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<UpsertProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("INVALID_PROFILE", m))?;

    let row = user_repo::upsert_by_subject(&state.db, &ctx.user_id, &req.email, &req.full_name)
        .await
        .map_err(|e| match e {
            RepoError::Conflict => AppError::conflict("EMAIL_TAKEN", "email already registered"),
            other => other.into(),
        })?;

    Ok(Json(row.into()))
}

pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let rows = user_repo::list(&state.db, page.limit(), page.offset()).await?;

    Ok(Json(rows.into_iter().map(UserResponse::from).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let row = user_repo::get(&state.db, user_id)
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(row.into()))
}

pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("INVALID_USER", m))?;

    let row = user_repo::update(
        &state.db,
        user_id,
        req.email.as_deref(),
        req.full_name.as_deref(),
        req.is_active,
    )
    .await
    .map_err(|e| match e {
        RepoError::Conflict => AppError::conflict("EMAIL_TAKEN", "email already registered"),
        other => other.into(),
    })?
    .ok_or(AppError::not_found("user"))?;

    Ok(Json(row.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let target = user_repo::get(&state.db, user_id)
        .await?
        .ok_or(AppError::not_found("user"))?;

    // Admins cannot remove their own account.
    if target.subject == admin.user_id {
        return Err(AppError::bad_request(
            "CANNOT_DELETE_SELF",
            "cannot delete yourself",
        ));
    }

    user_repo::delete(&state.db, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_my_employee(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<EmployeeResponse>, AppError> {
    let user = user_repo::find_by_subject(&state.db, &ctx.user_id)
        .await?
        .ok_or(AppError::not_found("employee record"))?;

    let employee = employee_repo::find_by_user(&state.db, user.id)
        .await?
        .ok_or(AppError::not_found("employee record"))?;

    Ok(Json(employee.into()))
}

pub async fn create_my_employee(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<EmployeeResponse>), AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("INVALID_EMPLOYEE", m))?;

    let user = user_repo::find_by_subject(&state.db, &ctx.user_id)
        .await?
        .ok_or(AppError::not_found("user profile"))?;

    if employee_repo::find_by_user(&state.db, user.id)
        .await?
        .is_some()
    {
        return Err(AppError::conflict(
            "EMPLOYEE_EXISTS",
            "employee record already exists",
        ));
    }

    let new = employee_repo::NewEmployee {
        employee_code: &req.employee_code,
        department: &req.department,
        position: &req.position,
        hire_date: req.hire_date,
        salary: req.salary,
        hourly_rate: req.hourly_rate,
        employment_type: req.employment_type.as_str(),
    };

    let employee = employee_repo::create(&state.db, user.id, &new)
        .await
        .map_err(|e| match e {
            RepoError::Conflict => {
                AppError::conflict("EMPLOYEE_CODE_TAKEN", "employee code already exists")
            }
            other => other.into(),
        })?;

    Ok((StatusCode::CREATED, Json(employee.into())))
}
