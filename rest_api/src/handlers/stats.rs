// rest_api/src/handlers/stats.rs

use axum::{extract::State, Json};

use lib::Stats;

use crate::errors::ApiResult;
use crate::middleware::AuthUser;
use crate::AppState;

pub async fn get_stats(State(state): State<AppState>, _user: AuthUser) -> ApiResult<Json<Stats>> {
    Ok(Json(state.db.stats.collect().await?))
}
