use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::AppError,
    response::{ApiResult, JsonApiResponse},
    services::ServiceContext,
    state::AppState,
};

/// What the JSON API needs from an entity service. The dashboard pages use
/// the services directly; this only names the five verbs.
#[async_trait::async_trait]
pub trait EntityApi: Send + Sync + Sized + 'static {
    /// Listing row, usually joined with related names.
    type Row: Serialize + Send;
    type Model: Serialize + Send;
    type Draft: DeserializeOwned + Send;
    type Changes: DeserializeOwned + Send;

    fn from_context(ctx: &ServiceContext) -> Self;

    async fn list_rows(&self) -> Result<Vec<Self::Row>, AppError>;
    async fn get_one(&self, id: i32) -> Result<Self::Model, AppError>;
    async fn create_one(&self, draft: Self::Draft) -> Result<Self::Model, AppError>;
    async fn update_one(&self, id: i32, changes: Self::Changes) -> Result<Self::Model, AppError>;
    async fn delete_one(&self, id: i32) -> Result<(), AppError>;
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: i32,
}

fn service<E: EntityApi>(state: &AppState) -> E {
    E::from_context(&ServiceContext::from_state(state))
}

/// `GET|POST {base}` and `GET|PATCH|DELETE {base}/{id}`.
pub fn entity_router<E: EntityApi>(base: &str) -> Router<Arc<AppState>> {
    let id_path = format!("{base}/{{id}}");
    Router::new()
        .route(base, get(list_handler::<E>).post(create_handler::<E>))
        .route(
            &id_path,
            get(get_handler::<E>)
                .patch(update_handler::<E>)
                .delete(delete_handler::<E>),
        )
}

async fn list_handler<E: EntityApi>(State(state): State<Arc<AppState>>) -> ApiResult<Vec<E::Row>> {
    let rows = service::<E>(&state).list_rows().await?;
    JsonApiResponse::ok(rows)
}

async fn create_handler<E: EntityApi>(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<E::Draft>,
) -> ApiResult<E::Model> {
    let created = service::<E>(&state).create_one(draft).await?;
    JsonApiResponse::with_status(StatusCode::CREATED, "created", created)
}

async fn get_handler<E: EntityApi>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<E::Model> {
    let model = service::<E>(&state).get_one(id).await?;
    JsonApiResponse::ok(model)
}

async fn update_handler<E: EntityApi>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(changes): Json<E::Changes>,
) -> ApiResult<E::Model> {
    let updated = service::<E>(&state).update_one(id, changes).await?;
    JsonApiResponse::ok(updated)
}

async fn delete_handler<E: EntityApi>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Deleted> {
    service::<E>(&state).delete_one(id).await?;
    JsonApiResponse::with_status(StatusCode::OK, "deleted", Deleted { id })
}
