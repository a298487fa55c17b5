//! Snapshot history endpoints.
//!
//! - GET  /snapshots              - List saved meetings, newest first
//! - POST /snapshots              - Save the current meeting
//! - POST /snapshots/:id/restore  - Load a saved meeting

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::meeting::MeetingView;
use crate::api::error::ApiResult;
use crate::app::MeetingHandle;
use crate::store::SnapshotSummary;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    20
}

pub fn router(handle: MeetingHandle) -> Router {
    Router::new()
        .route("/snapshots", get(list_snapshots).post(save_snapshot))
        .route("/snapshots/:id/restore", post(restore_snapshot))
        .with_state(handle)
}

async fn list_snapshots(
    State(handle): State<MeetingHandle>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<SnapshotSummary>>> {
    Ok(Json(handle.with(|c| c.history(query.limit)).await?))
}

async fn save_snapshot(
    State(handle): State<MeetingHandle>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let id = handle.with(|c| c.save_snapshot()).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn restore_snapshot(
    State(handle): State<MeetingHandle>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MeetingView>> {
    let view = handle
        .with(|c| c.restore_snapshot(id).map(|state| MeetingView::new(state, None)))
        .await?;
    Ok(Json(view))
}
