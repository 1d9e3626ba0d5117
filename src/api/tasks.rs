//! Task lifecycle and completion handlers.

use super::{AppState, ApiError, ApiResult, AuthUser};
use crate::task::{
    domain::{History, Task, TaskId},
    services::{CreateTaskRequest, MarkCompleteRequest, UpdateTaskRequest},
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use mockable::Clock;
use serde_json::{Value, json};
use uuid::Uuid;

/// Parses a task id path segment. Malformed ids cannot name a task.
pub(super) fn parse_task_id(raw: &str) -> ApiResult<TaskId> {
    Uuid::parse_str(raw)
        .map(TaskId::from_uuid)
        .map_err(|_| ApiError::task_not_found())
}

pub(super) async fn list<C>(
    State(state): State<AppState<C>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<Task>>>
where
    C: Clock + Send + Sync + 'static,
{
    Ok(Json(state.tasks.list_tasks(user).await?))
}

pub(super) async fn create<C>(
    State(state): State<AppState<C>>,
    AuthUser(user): AuthUser,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)>
where
    C: Clock + Send + Sync + 'static,
{
    let Json(request) = body?;
    let task = state.tasks.create_task(user, request).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub(super) async fn fetch<C>(
    State(state): State<AppState<C>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>>
where
    C: Clock + Send + Sync + 'static,
{
    let task_id = parse_task_id(&id)?;
    Ok(Json(state.tasks.get_task(user, task_id).await?))
}

pub(super) async fn update<C>(
    State(state): State<AppState<C>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<Task>>
where
    C: Clock + Send + Sync + 'static,
{
    let task_id = parse_task_id(&id)?;
    let Json(request) = body?;
    Ok(Json(state.tasks.update_task(user, task_id, request).await?))
}

pub(super) async fn remove<C>(
    State(state): State<AppState<C>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>>
where
    C: Clock + Send + Sync + 'static,
{
    let task_id = parse_task_id(&id)?;
    let deleted = state.tasks.delete_task(user, task_id).await?;
    Ok(Json(json!({ "id": deleted })))
}

pub(super) async fn complete<C>(
    State(state): State<AppState<C>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<History>)>
where
    C: Clock + Send + Sync + 'static,
{
    let task_id = parse_task_id(&id)?;
    // The body is optional; an empty one completes the first scheduled time.
    let request = if body.is_empty() {
        MarkCompleteRequest::new()
    } else {
        serde_json::from_slice(&body)
            .map_err(|err| ApiError::BadRequest(format!("invalid request body: {err}")))?
    };
    let record = state.completion.mark_complete(user, task_id, request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub(super) async fn completed_today<C>(
    State(state): State<AppState<C>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<TaskId>>>
where
    C: Clock + Send + Sync + 'static,
{
    Ok(Json(state.completion.completed_today(user).await?))
}
