//! Timer control endpoints.
//!
//! - POST /timer/:id/adjust   - Overwrite elapsed time ({"time": "m:ss"} or {"seconds": n})
//! - POST /timer/:id/:action  - start, pause, resume, stop, confirm, cancel, reset, reopen
//!
//! Ticks are driven by the service loop and are not exposed here.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::post,
    Router,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::agenda::parse_manual_time;
use crate::api::error::{ApiError, ApiResult};
use crate::app::MeetingHandle;
use crate::controller::TimerCommand;
use crate::timing::Transition;

#[derive(Debug, Default, Deserialize)]
pub struct AdjustRequest {
    pub time: Option<String>,
    pub seconds: Option<f64>,
}

impl AdjustRequest {
    fn seconds(&self) -> ApiResult<f64> {
        match (&self.time, self.seconds) {
            (Some(text), None) => Ok(parse_manual_time(text)?),
            (None, Some(seconds)) => Ok(seconds),
            _ => Err(ApiError::bad_request(
                "provide exactly one of 'time' or 'seconds'",
            )),
        }
    }
}

pub fn router(handle: MeetingHandle) -> Router {
    Router::new()
        .route("/timer/:id/adjust", post(adjust))
        .route("/timer/:id/:action", post(command))
        .with_state(handle)
}

async fn command(
    State(handle): State<MeetingHandle>,
    Path((id, action)): Path<(Uuid, String)>,
) -> ApiResult<Json<Transition>> {
    let command: TimerCommand = action.parse()?;
    debug!("Timer {} requested for {}", command, id);
    Ok(Json(handle.command(id, command).await?))
}

async fn adjust(
    State(handle): State<MeetingHandle>,
    Path(id): Path<Uuid>,
    Json(req): Json<AdjustRequest>,
) -> ApiResult<Json<Transition>> {
    let seconds = req.seconds()?;
    Ok(Json(handle.command(id, TimerCommand::Adjust(seconds)).await?))
}
