//! Meeting endpoints.
//!
//! - GET  /meeting               - Current meeting with per-role signal state
//! - PUT  /meeting               - Update meeting metadata
//! - POST /meeting/new           - Archive and start a new meeting
//! - POST /meeting/actual-start  - Mark the actual start as now

use axum::{extract::State, response::Json, routing::{get, post}, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::agenda::{format_clock, AgendaItem, MeetingInfo, MeetingState};
use crate::api::error::ApiResult;
use crate::app::MeetingHandle;
use crate::controller::InfoUpdate;
use crate::timing::SignalZone;

/// An agenda row with its display state.
#[derive(Debug, Serialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: AgendaItem,
    pub zone: SignalZone,
    pub instruction: &'static str,
    pub clock: String,
    pub countdown: String,
}

impl From<&AgendaItem> for ItemView {
    fn from(item: &AgendaItem) -> Self {
        let zone = item.signal_zone();
        let countdown = item.countdown();
        Self {
            item: item.clone(),
            zone,
            instruction: zone.instruction(),
            clock: format_clock(item.elapsed_seconds),
            countdown: format!("{} {}", countdown.label(), countdown),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeetingView {
    pub info: MeetingInfo,
    pub focused: Option<Uuid>,
    pub items: Vec<ItemView>,
}

impl MeetingView {
    pub fn new(state: &MeetingState, focused: Option<Uuid>) -> Self {
        Self {
            info: state.info.clone(),
            focused,
            items: state.items.iter().map(ItemView::from).collect(),
        }
    }
}

pub fn router(handle: MeetingHandle) -> Router {
    Router::new()
        .route("/meeting", get(get_meeting).put(update_meeting))
        .route("/meeting/new", post(new_meeting))
        .route("/meeting/actual-start", post(mark_actual_start))
        .with_state(handle)
}

async fn get_meeting(State(handle): State<MeetingHandle>) -> Json<MeetingView> {
    Json(
        handle
            .with(|c| MeetingView::new(c.state(), c.focused().map(|i| i.id)))
            .await,
    )
}

async fn update_meeting(
    State(handle): State<MeetingHandle>,
    Json(update): Json<InfoUpdate>,
) -> ApiResult<Json<MeetingInfo>> {
    let info = handle
        .with(|c| c.update_info(update).map(|info| info.clone()))
        .await?;
    Ok(Json(info))
}

async fn new_meeting(State(handle): State<MeetingHandle>) -> ApiResult<Json<MeetingView>> {
    info!("New meeting requested via API");
    let view = handle
        .with(|c| c.new_meeting().map(|state| MeetingView::new(state, None)))
        .await?;
    Ok(Json(view))
}

async fn mark_actual_start(State(handle): State<MeetingHandle>) -> Json<Value> {
    let time = handle.with(|c| c.mark_actual_start()).await;
    Json(json!({ "actual_start": time.format("%H:%M:%S").to_string() }))
}
