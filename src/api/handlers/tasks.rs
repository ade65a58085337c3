//! Task CRUD handlers.
//!
//! Every handler runs behind the authentication layer and receives the
//! resolved owner via [`CurrentUser`]. Ownership is enforced inside the
//! store queries themselves: a task belonging to someone else is a plain
//! `Task not found`, never a 403.

use crate::{
    api::validation::{validate_create_task, validate_update_task},
    auth::middleware::CurrentUser,
    crypto::EnvelopeFlag,
    types::{
        AppError, CreateTaskRequest, MessageResponse, Pagination, Result, TaskListQuery,
        TaskListResponse, TaskResponse, TaskStatus, UpdateTaskRequest,
    },
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 50;

/// List tasks for the authenticated user with pagination, filter, and search
#[utoipa::path(
    get,
    path = "/api/tasks",
    params(
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("search" = Option<String>, Query, description = "Case-insensitive title search"),
        ("page" = Option<u32>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<u32>, Query, description = "Page size, 1-50")
    ),
    responses(
        (status = 200, description = "Paginated task list", body = TaskListResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "tasks"
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<TaskListResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    // An unknown status value is ignored rather than rejected; the listing
    // just proceeds unfiltered.
    let status = query.status.as_deref().and_then(TaskStatus::parse);
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|needle| !needle.is_empty());

    let offset = (page - 1).saturating_mul(limit);
    let tasks = state
        .store
        .list_tasks(&user.id, status, search, limit, offset)
        .await?;
    let total = state.store.count_tasks(&user.id, status, search).await?;

    Ok(Json(TaskListResponse {
        success: true,
        encrypted: false,
        data: tasks,
        pagination: Pagination::new(total, page, limit),
    }))
}

/// Get a single task by id
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task details", body = TaskResponse),
        (status = 404, description = "Task not found or not owned"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "tasks"
)]
pub async fn get_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>> {
    let task = state
        .store
        .get_task(&id, &user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse {
        success: true,
        message: None,
        encrypted: false,
        data: task,
    }))
}

/// Create a new task owned by the authenticated user
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "tasks"
)]
pub async fn create_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    EnvelopeFlag(encrypted): EnvelopeFlag,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>)> {
    let valid = validate_create_task(&payload)?;

    let task = state
        .store
        .create_task(&user.id, &valid.title, &valid.description, valid.status)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            success: true,
            message: Some("Task created successfully".to_string()),
            // A client that sent ciphertext gets ciphertext back.
            encrypted,
            data: task,
        }),
    ))
}

/// Update a task owned by the authenticated user
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Task not found or not owned"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "tasks"
)]
pub async fn update_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    EnvelopeFlag(encrypted): EnvelopeFlag,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>> {
    let valid = validate_update_task(&payload)?;

    let task = state
        .store
        .update_task(
            &id,
            &user.id,
            valid.title.as_deref(),
            valid.description.as_deref(),
            valid.status,
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse {
        success: true,
        message: Some("Task updated successfully".to_string()),
        encrypted,
        data: task,
    }))
}

/// Delete a task owned by the authenticated user
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task deleted", body = MessageResponse),
        (status = 404, description = "Task not found or not owned"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "tasks"
)]
pub async fn delete_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let deleted = state.store.delete_task(&id, &user.id).await?;

    if !deleted {
        return Err(AppError::NotFound("Task not found".to_string()));
    }

    Ok(Json(MessageResponse {
        success: true,
        message: "Task deleted successfully".to_string(),
    }))
}
