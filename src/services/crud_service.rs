use sea_orm::{Select, SqlErr};
use serde::Serialize;

use crate::db::dao::{DaoBase, DaoLayerError};
use crate::error::AppError;

type CrudEntity<D> = <D as DaoBase>::Entity;
type CrudModel<D> = <D as DaoBase>::Model;
type CrudActiveModel<D> = <D as DaoBase>::ActiveModel;

/// User-facing messages for the failures every entity shares.
#[derive(Clone, Copy)]
pub struct CrudErrors {
    pub create_failed: &'static str,
    pub find_failed: &'static str,
    pub update_failed: &'static str,
    pub delete_failed: &'static str,
    pub duplicate_key: &'static str,
    pub missing_reference: &'static str,
    pub still_referenced: &'static str,
}

impl Default for CrudErrors {
    fn default() -> Self {
        Self {
            create_failed: "Create failed",
            find_failed: "Lookup failed",
            update_failed: "Update failed",
            delete_failed: "Delete failed",
            duplicate_key: "A record with the same key already exists",
            missing_reference: "A referenced record does not exist",
            still_referenced: "The record is still referenced by other records",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrudOp {
    Create,
    Find,
    List,
    Update,
    Delete,
}

/// `<select>` entry: the key goes in `value`, `label` is what people read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: i32,
    pub label: String,
}

#[async_trait::async_trait]
pub trait CrudService: Sync {
    type Dao: DaoBase;

    fn dao(&self) -> &Self::Dao;

    fn errors(&self) -> CrudErrors {
        CrudErrors::default()
    }

    /// Driver failures are logged and replaced by a generic message; the
    /// action has not changed anything.
    fn map_error(&self, op: CrudOp, err: DaoLayerError) -> AppError {
        let errors = self.errors();
        match err {
            DaoLayerError::NotFound { .. } => AppError::from(err),
            DaoLayerError::Db(db_err) => match db_err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    AppError::conflict(errors.duplicate_key)
                }
                Some(SqlErr::ForeignKeyConstraintViolation(_)) if op == CrudOp::Delete => {
                    AppError::conflict(errors.still_referenced)
                }
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                    AppError::not_found(errors.missing_reference)
                }
                _ => {
                    let context = match op {
                        CrudOp::Create => errors.create_failed,
                        CrudOp::Find | CrudOp::List => errors.find_failed,
                        CrudOp::Update => errors.update_failed,
                        CrudOp::Delete => errors.delete_failed,
                    };
                    AppError::data_access_with_source(
                        format!("{context}. Please check the logs for more details"),
                        &db_err,
                    )
                }
            },
        }
    }

    async fn create(
        &self,
        data: CrudActiveModel<Self::Dao>,
    ) -> Result<CrudModel<Self::Dao>, AppError> {
        self.dao()
            .create(data)
            .await
            .map_err(|err| self.map_error(CrudOp::Create, err))
    }

    async fn find_by_id(&self, id: i32) -> Result<CrudModel<Self::Dao>, AppError> {
        self.dao()
            .find_by_id(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))
    }

    async fn exists(&self, id: i32) -> Result<bool, AppError> {
        self.dao()
            .exists(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))
    }

    async fn list(&self) -> Result<Vec<CrudModel<Self::Dao>>, AppError> {
        self.dao()
            .list()
            .await
            .map_err(|err| self.map_error(CrudOp::List, err))
    }

    async fn update<F>(&self, id: i32, apply: F) -> Result<CrudModel<Self::Dao>, AppError>
    where
        F: FnOnce(&mut CrudActiveModel<Self::Dao>) + Send,
    {
        self.dao()
            .update(id, apply)
            .await
            .map_err(|err| self.map_error(CrudOp::Update, err))
    }

    async fn delete(&self, id: i32) -> Result<(), AppError> {
        self.dao()
            .delete(id)
            .await
            .map(|_| ())
            .map_err(|err| self.map_error(CrudOp::Delete, err))
    }

    async fn count_where<F>(&self, apply: F) -> Result<u64, AppError>
    where
        F: FnOnce(Select<CrudEntity<Self::Dao>>) -> Select<CrudEntity<Self::Dao>> + Send,
    {
        self.dao()
            .count_with(apply)
            .await
            .map_err(|err| self.map_error(CrudOp::List, err))
    }
}
