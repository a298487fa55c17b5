//! REST API server for gavel.
//!
//! Provides HTTP endpoints for:
//! - Meeting metadata and lifecycle
//! - Agenda editing
//! - Timer control
//! - Reports and CSV export
//! - Snapshot history
//! - Threshold lookup

pub mod error;
pub mod routes;

use crate::app::MeetingHandle;
use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tracing::info;

pub struct ApiServer {
    port: u16,
    handle: MeetingHandle,
}

impl ApiServer {
    pub fn new(handle: MeetingHandle, port: u16) -> Self {
        Self { port, handle }
    }

    pub async fn start(self) -> Result<()> {
        let app = router(self.handle);

        let listener = tokio::net::TcpListener::bind(&format!("127.0.0.1:{}", self.port)).await?;

        info!("API server listening on http://127.0.0.1:{}", self.port);
        info!("Endpoints:");
        info!("  GET    /                        - Service info");
        info!("  GET    /meeting                 - Current meeting");
        info!("  PUT    /meeting                 - Update meeting details");
        info!("  POST   /meeting/new             - Start a new meeting");
        info!("  POST   /meeting/actual-start    - Mark actual start time");
        info!("  POST   /agenda/preset           - Load the standard agenda");
        info!("  POST   /agenda/items            - Add a role");
        info!("  PATCH  /agenda/items/:id        - Edit a role");
        info!("  DELETE /agenda/items/:id        - Remove a role");
        info!("  POST   /agenda/items/:id/move   - Move a role up or down");
        info!("  POST   /timer/:id/:action       - start|pause|resume|stop|confirm|cancel|reset|reopen");
        info!("  POST   /timer/:id/adjust        - Set elapsed time manually");
        info!("  GET    /report                  - Timer's report");
        info!("  GET    /report/csv              - Report as CSV");
        info!("  GET    /snapshots               - Saved meetings");
        info!("  POST   /snapshots               - Save the current meeting");
        info!("  POST   /snapshots/:id/restore   - Restore a saved meeting");
        info!("  GET    /thresholds              - Signal times for a role");

        axum::serve(listener, app).await?;

        Ok(())
    }
}

pub fn router(handle: MeetingHandle) -> Router {
    Router::new()
        .route("/", get(status))
        .merge(routes::meeting::router(handle.clone()))
        .merge(routes::agenda::router(handle.clone()))
        .merge(routes::timer::router(handle.clone()))
        .merge(routes::report::router(handle.clone()))
        .merge(routes::snapshots::router(handle))
        .merge(routes::thresholds::router())
        .layer(ServiceBuilder::new())
}

async fn status() -> Json<Value> {
    Json(json!({
        "service": "gavel",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}
