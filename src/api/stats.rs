//! Statistics handler.

use super::{AppState, ApiResult, AuthUser};
use crate::stats::domain::Statistics;
use axum::{Json, extract::State};
use mockable::Clock;

pub(super) async fn statistics<C>(
    State(state): State<AppState<C>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Statistics>>
where
    C: Clock + Send + Sync + 'static,
{
    Ok(Json(state.statistics.statistics(user).await?))
}
