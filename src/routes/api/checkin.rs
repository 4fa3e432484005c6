use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

use crate::{
    db::entities::attendance,
    middleware::ClientIp,
    response::{ApiResult, JsonApiResponse},
    services::{
        ServiceContext, checkin_service::CheckInRequest, crud_service::SelectOption, validation,
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CheckInBody {
    pub student_id: i32,
    pub class_id: i32,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/checkin", post(check_in))
        .route("/checkin/classes", get(classes))
}

async fn check_in(
    State(state): State<Arc<AppState>>,
    ClientIp(ip_address): ClientIp,
    Json(body): Json<CheckInBody>,
) -> ApiResult<attendance::Model> {
    let request = CheckInRequest {
        student_id: body.student_id,
        class_id: body.class_id,
        ip_address,
    };
    let recorded = ServiceContext::from_state(&state)
        .check_in()
        .check_in(request, validation::today())
        .await?;
    JsonApiResponse::with_status(StatusCode::CREATED, "checked in", recorded)
}

async fn classes(State(state): State<Arc<AppState>>) -> ApiResult<Vec<SelectOption>> {
    let classes = ServiceContext::from_state(&state)
        .check_in()
        .classes()
        .await?;
    JsonApiResponse::ok(classes)
}
