use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use crate::{
    db::dao::{AttendanceCount, AttendanceRate, ClassAverage, MonthlyRate, StudentAverage},
    response::{ApiResult, JsonApiResponse},
    services::ServiceContext,
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reports/top-students", get(top_students))
        .route("/reports/class-performance", get(class_performance))
        .route("/reports/attendance-summary", get(attendance_summary))
        .route("/reports/attendance-rates", get(attendance_rates))
        .route("/reports/attendance-trend", get(attendance_trend))
}

async fn top_students(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Vec<StudentAverage>> {
    let rows = ServiceContext::from_state(&state)
        .report()
        .top_students(query.limit)
        .await?;
    JsonApiResponse::ok(rows)
}

async fn class_performance(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Vec<ClassAverage>> {
    let rows = ServiceContext::from_state(&state)
        .report()
        .class_performance(query.limit)
        .await?;
    JsonApiResponse::ok(rows)
}

async fn attendance_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Vec<AttendanceCount>> {
    let rows = ServiceContext::from_state(&state)
        .report()
        .attendance_summary(query.limit)
        .await?;
    JsonApiResponse::ok(rows)
}

async fn attendance_rates(State(state): State<Arc<AppState>>) -> ApiResult<Vec<AttendanceRate>> {
    let rows = ServiceContext::from_state(&state)
        .report()
        .attendance_rates()
        .await?;
    JsonApiResponse::ok(rows)
}

async fn attendance_trend(State(state): State<Arc<AppState>>) -> ApiResult<Vec<MonthlyRate>> {
    let rows = ServiceContext::from_state(&state)
        .report()
        .monthly_attendance_trend()
        .await?;
    JsonApiResponse::ok(rows)
}
