use std::sync::Arc;

use axum::{Router, extract::State, routing::get};
use serde::Serialize;

use crate::{
    error::AppError,
    response::{ApiResult, JsonApiResponse},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub database: &'static str,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<Arc<AppState>>) -> ApiResult<Health> {
    state.db.ping().await.map_err(|err| {
        AppError::data_access_with_source("Database is unreachable", &err)
    })?;
    JsonApiResponse::ok(Health {
        status: "ok",
        database: "up",
    })
}
