use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::tasks::dtos::{
    CreateTaskDto, TaskListItemDto, TaskQueryParams, TaskResponseDto, TaskStatsDto, UpdateTaskDto,
};
use crate::features::tasks::services::TaskService;
use crate::shared::types::ApiResponse;

/// List the caller's tasks
///
/// Filters combine with AND. Default ordering is newest first.
#[utoipa::path(
    get,
    path = "/api/tasks",
    params(TaskQueryParams),
    responses(
        (status = 200, description = "List of tasks", body = ApiResponse<Vec<TaskListItemDto>>),
        (status = 400, description = "Invalid filter value"),
        (status = 401, description = "Authentication required")
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
pub async fn list_tasks(
    user: AuthenticatedUser,
    State(service): State<Arc<TaskService>>,
    AppQuery(params): AppQuery<TaskQueryParams>,
) -> Result<Json<ApiResponse<Vec<TaskListItemDto>>>> {
    let tasks = service.list(&user, params).await?;
    Ok(Json(ApiResponse::list(tasks)))
}

/// Create a task owned by the caller
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskDto,
    responses(
        (status = 201, description = "Task created", body = ApiResponse<TaskResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required")
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
pub async fn create_task(
    user: AuthenticatedUser,
    State(service): State<Arc<TaskService>>,
    AppJson(dto): AppJson<CreateTaskDto>,
) -> Result<(StatusCode, Json<ApiResponse<TaskResponseDto>>)> {
    dto.validate()?;

    let task = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(task), None, None)),
    ))
}

/// Task counts for the caller
#[utoipa::path(
    get,
    path = "/api/tasks/my_stats",
    responses(
        (status = 200, description = "Task statistics", body = ApiResponse<TaskStatsDto>),
        (status = 401, description = "Authentication required")
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
pub async fn my_stats(
    user: AuthenticatedUser,
    State(service): State<Arc<TaskService>>,
) -> Result<Json<ApiResponse<TaskStatsDto>>> {
    let stats = service.stats(&user).await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

/// Get one of the caller's tasks with its attachments
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task found", body = ApiResponse<TaskResponseDto>),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
pub async fn get_task(
    user: AuthenticatedUser,
    State(service): State<Arc<TaskService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TaskResponseDto>>> {
    let task = service.get(&user, id).await?;
    Ok(Json(ApiResponse::success(Some(task), None, None)))
}

/// Replace a task
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task ID")),
    request_body = CreateTaskDto,
    responses(
        (status = 200, description = "Task updated", body = ApiResponse<TaskResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
pub async fn replace_task(
    user: AuthenticatedUser,
    State(service): State<Arc<TaskService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CreateTaskDto>,
) -> Result<Json<ApiResponse<TaskResponseDto>>> {
    dto.validate()?;

    let task = service.replace(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(task), None, None)))
}

/// Partially update a task
#[utoipa::path(
    patch,
    path = "/api/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task ID")),
    request_body = UpdateTaskDto,
    responses(
        (status = 200, description = "Task updated", body = ApiResponse<TaskResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
pub async fn update_task(
    user: AuthenticatedUser,
    State(service): State<Arc<TaskService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateTaskDto>,
) -> Result<Json<ApiResponse<TaskResponseDto>>> {
    dto.validate()?;

    let task = service.update(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(task), None, None)))
}

/// Delete a task along with its attachments
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task ID")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
pub async fn delete_task(
    user: AuthenticatedUser,
    State(service): State<Arc<TaskService>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    service.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Set a task's status to completed
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/mark_completed",
    params(("id" = Uuid, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task completed", body = ApiResponse<TaskResponseDto>),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
pub async fn mark_completed(
    user: AuthenticatedUser,
    State(service): State<Arc<TaskService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TaskResponseDto>>> {
    let task = service.mark_completed(&user, id).await?;
    Ok(Json(ApiResponse::success(Some(task), None, None)))
}
