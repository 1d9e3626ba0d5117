//! Push subscription and on-demand notification handlers.

use super::{AppState, ApiResult, AuthUser, tasks::parse_task_id};
use crate::reminder::{domain::PushSubscription, services::DeliveryReport};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use mockable::Clock;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Default, Deserialize)]
pub(super) struct UnsubscribeRequest {
    #[serde(default)]
    endpoint: Option<String>,
}

fn delivery_body(message: &str, report: &DeliveryReport) -> Json<Value> {
    Json(json!({
        "message": message,
        "success": report.delivered,
        "failed": report.failed(),
    }))
}

pub(super) async fn subscribe<C>(
    State(state): State<AppState<C>>,
    AuthUser(user): AuthUser,
    body: Result<Json<PushSubscription>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)>
where
    C: Clock + Send + Sync + 'static,
{
    let Json(subscription) = body?;
    let public_key = state.notifications.subscribe(user, subscription).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Subscribed to push notifications",
            "publicKey": public_key,
        })),
    ))
}

pub(super) async fn unsubscribe<C>(
    State(state): State<AppState<C>>,
    AuthUser(user): AuthUser,
    body: Result<Json<UnsubscribeRequest>, JsonRejection>,
) -> ApiResult<Json<Value>>
where
    C: Clock + Send + Sync + 'static,
{
    let Json(request) = body?;
    let endpoint = request.endpoint.unwrap_or_default();
    state.notifications.unsubscribe(user, &endpoint).await?;
    Ok(Json(json!({ "message": "Unsubscribed from push notifications" })))
}

pub(super) async fn test<C>(
    State(state): State<AppState<C>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Value>>
where
    C: Clock + Send + Sync + 'static,
{
    let report = state.notifications.send_test(user).await?;
    Ok(delivery_body("Test notification sent", &report))
}

pub(super) async fn remind<C>(
    State(state): State<AppState<C>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>>
where
    C: Clock + Send + Sync + 'static,
{
    let task_id = parse_task_id(&id)?;
    let task = state.tasks.get_task(user, task_id).await?;
    let report = state.notifications.send_reminder(&task).await?;
    Ok(delivery_body("Reminder sent", &report))
}
