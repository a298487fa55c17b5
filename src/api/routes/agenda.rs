//! Agenda editing endpoints.
//!
//! - POST   /agenda/preset                  - Replace agenda with the standard one
//! - POST   /agenda/items                   - Add a role
//! - PATCH  /agenda/items/:id               - Apply field edits
//! - DELETE /agenda/items/:id               - Remove a role
//! - POST   /agenda/items/:id/move          - Move up or down
//! - POST   /agenda/items/:id/toggle-speech - Flip between speech and generic role

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{patch, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::meeting::{ItemView, MeetingView};
use crate::agenda::{Direction, ItemEdit};
use crate::api::error::ApiResult;
use crate::app::MeetingHandle;
use crate::controller::NewItem;

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub direction: Direction,
}

pub fn router(handle: MeetingHandle) -> Router {
    Router::new()
        .route("/agenda/preset", post(load_preset))
        .route("/agenda/items", post(add_item))
        .route("/agenda/items/:id", patch(edit_item).delete(remove_item))
        .route("/agenda/items/:id/move", post(move_item))
        .route("/agenda/items/:id/toggle-speech", post(toggle_speech))
        .with_state(handle)
}

async fn load_preset(State(handle): State<MeetingHandle>) -> ApiResult<Json<MeetingView>> {
    let view = handle
        .with(|c| {
            c.load_preset()?;
            Ok::<_, crate::controller::ControlError>(MeetingView::new(
                c.state(),
                c.focused().map(|i| i.id),
            ))
        })
        .await?;
    Ok(Json(view))
}

async fn add_item(
    State(handle): State<MeetingHandle>,
    Json(new): Json<NewItem>,
) -> ApiResult<(StatusCode, Json<ItemView>)> {
    let view = handle
        .with(|c| c.add_item(new).map(ItemView::from))
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn edit_item(
    State(handle): State<MeetingHandle>,
    Path(id): Path<Uuid>,
    Json(edits): Json<Vec<ItemEdit>>,
) -> ApiResult<Json<ItemView>> {
    let view = handle
        .with(|c| c.edit_item(id, edits).map(ItemView::from))
        .await?;
    Ok(Json(view))
}

async fn remove_item(
    State(handle): State<MeetingHandle>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ItemView>> {
    let removed = handle.with(|c| c.remove_item(id)).await?;
    Ok(Json(ItemView::from(&removed)))
}

async fn move_item(
    State(handle): State<MeetingHandle>,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveRequest>,
) -> ApiResult<Json<Value>> {
    let moved = handle.with(|c| c.move_item(id, req.direction)).await?;
    Ok(Json(json!({ "moved": moved })))
}

async fn toggle_speech(
    State(handle): State<MeetingHandle>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ItemView>> {
    let view = handle
        .with(|c| c.toggle_speech(id).map(ItemView::from))
        .await?;
    Ok(Json(view))
}
