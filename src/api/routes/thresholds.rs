//! GET /thresholds?category=speech&minutes=7 - Signal times for a role

use axum::{extract::Query, response::Json, routing::get, Router};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiResult;
use crate::timing::{compute_thresholds, target_seconds, RoleCategory, TimerConfig};

#[derive(Debug, Deserialize)]
pub struct ThresholdQuery {
    pub category: RoleCategory,
    pub minutes: f64,
}

#[derive(Debug, Serialize)]
pub struct ThresholdResponse {
    pub category: RoleCategory,
    pub target_seconds: i64,
    #[serde(flatten)]
    pub config: TimerConfig,
}

pub fn router() -> Router {
    Router::new().route("/thresholds", get(thresholds))
}

async fn thresholds(Query(query): Query<ThresholdQuery>) -> ApiResult<Json<ThresholdResponse>> {
    let config = compute_thresholds(query.category, query.minutes)?;
    Ok(Json(ThresholdResponse {
        category: query.category,
        target_seconds: target_seconds(query.minutes)?,
        config,
    }))
}
