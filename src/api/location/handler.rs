//! Location Report Handler

use axum::{Extension, Json, extract::State};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::LocationPing;
use crate::utils::AppResult;

/// 位置上报请求
#[derive(Debug, Deserialize)]
pub struct LocationReport {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
}

/// POST /api/location - 上报当前位置
pub async fn report(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<LocationReport>,
) -> AppResult<Json<LocationPing>> {
    let ping = state
        .locations
        .record_ping(&user.id, req.latitude, req.longitude, req.accuracy)
        .await?;

    Ok(Json(ping))
}
