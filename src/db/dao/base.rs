use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, IntoActiveModel, PaginatorTrait, PrimaryKeyTrait, QueryOrder, Select,
};

use super::error::{DaoLayerError, DaoResult};

/// Generic create / read / update / delete over one table keyed by an `i32`.
///
/// Every entity DAO is a thin struct holding the pooled connection; the
/// statements themselves live here so the five tables share one failure
/// policy.
#[async_trait::async_trait]
pub trait DaoBase: Clone + Send + Sync + Sized {
    type Entity: EntityTrait<
            Model = Self::Model,
            ActiveModel = Self::ActiveModel,
            PrimaryKey = Self::PrimaryKey,
        > + Send
        + Sync;
    type Model: FromQueryResult + IntoActiveModel<Self::ActiveModel> + Clone + Send + Sync;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + Sync;
    type PrimaryKey: PrimaryKeyTrait<ValueType = i32>;

    /// Human readable name used in not-found messages.
    const ENTITY_NAME: &'static str;

    fn from_db(db: DatabaseConnection) -> Self;

    fn new(db: &DatabaseConnection) -> Self {
        Self::from_db(db.clone())
    }

    fn db(&self) -> &DatabaseConnection;

    /// Column listings are ordered by.
    fn key_column() -> <Self::Entity as EntityTrait>::Column;

    fn not_found(key: i32) -> DaoLayerError {
        DaoLayerError::NotFound {
            entity: Self::ENTITY_NAME,
            key,
        }
    }

    /// Inserts on an explicit connection, usually an open transaction.
    async fn create_in<C>(conn: &C, data: Self::ActiveModel) -> DaoResult<Self::Model>
    where
        C: ConnectionTrait + Sync,
    {
        data.insert(conn).await.map_err(DaoLayerError::Db)
    }

    async fn find_in<C>(conn: &C, key: i32) -> DaoResult<Option<Self::Model>>
    where
        C: ConnectionTrait + Sync,
    {
        Self::Entity::find_by_id(key)
            .one(conn)
            .await
            .map_err(DaoLayerError::Db)
    }

    async fn create(&self, data: Self::ActiveModel) -> DaoResult<Self::Model> {
        Self::create_in(self.db(), data).await
    }

    async fn find_optional(&self, key: i32) -> DaoResult<Option<Self::Model>> {
        Self::find_in(self.db(), key).await
    }

    async fn find_by_id(&self, key: i32) -> DaoResult<Self::Model> {
        self.find_optional(key)
            .await?
            .ok_or_else(|| Self::not_found(key))
    }

    async fn exists(&self, key: i32) -> DaoResult<bool> {
        Ok(self.find_optional(key).await?.is_some())
    }

    async fn list(&self) -> DaoResult<Vec<Self::Model>> {
        self.list_with(|query| query).await
    }

    async fn list_with<F>(&self, apply: F) -> DaoResult<Vec<Self::Model>>
    where
        F: FnOnce(Select<Self::Entity>) -> Select<Self::Entity> + Send,
    {
        apply(Self::Entity::find())
            .order_by_asc(Self::key_column())
            .all(self.db())
            .await
            .map_err(DaoLayerError::Db)
    }

    async fn count_with<F>(&self, apply: F) -> DaoResult<u64>
    where
        F: FnOnce(Select<Self::Entity>) -> Select<Self::Entity> + Send,
    {
        apply(Self::Entity::find())
            .count(self.db())
            .await
            .map_err(DaoLayerError::Db)
    }

    /// Loads the current row, lets `apply` overwrite fields, writes it back.
    async fn update<F>(&self, key: i32, apply: F) -> DaoResult<Self::Model>
    where
        F: FnOnce(&mut Self::ActiveModel) + Send,
    {
        let model = self.find_by_id(key).await?;
        let mut active = model.into_active_model();
        apply(&mut active);
        active.update(self.db()).await.map_err(DaoLayerError::Db)
    }

    async fn delete(&self, key: i32) -> DaoResult<i32> {
        let result = Self::Entity::delete_by_id(key)
            .exec(self.db())
            .await
            .map_err(DaoLayerError::Db)?;

        if result.rows_affected == 0 {
            return Err(Self::not_found(key));
        }

        Ok(key)
    }
}
