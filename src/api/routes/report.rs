//! Report endpoints.
//!
//! - GET /report      - Compiled report as JSON
//! - GET /report/csv  - CSV export

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};

use crate::app::MeetingHandle;
use crate::report::MeetingReport;

pub fn router(handle: MeetingHandle) -> Router {
    Router::new()
        .route("/report", get(report))
        .route("/report/csv", get(report_csv))
        .with_state(handle)
}

async fn report(State(handle): State<MeetingHandle>) -> Json<MeetingReport> {
    Json(handle.with(|c| c.report()).await)
}

async fn report_csv(State(handle): State<MeetingHandle>) -> impl IntoResponse {
    let report = handle.with(|c| c.report()).await;
    let filename = format!(
        "attachment; filename=\"TM_Report_{}.csv\"",
        report.report_date.format("%Y-%m-%d")
    );
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        report.to_csv(),
    )
}
