pub mod timetable;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        // Plans
        .route("/api/timetable/plans", get(timetable::list_plans))
        // Grids
        .route("/api/timetable/class", get(timetable::class_timetable))
        .route("/api/timetable/teacher", get(timetable::teacher_timetable))
        .route("/api/timetable/block", get(timetable::block_timetable))
        // Current period
        .route("/api/timetable/current-period", get(timetable::current_period))
        .route("/api/timetable/current-period/stream", get(timetable::current_period_stream))
        // Teacher dashboard
        .route("/api/timetable/teacher/next-class", get(timetable::next_class))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}
