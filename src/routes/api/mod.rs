pub mod checkin;
pub mod entities;
pub mod entity_router;
pub mod health;
pub mod reports;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(entities::router())
        .merge(checkin::router())
        .merge(reports::router())
        .merge(health::router())
        .with_state(state)
}
