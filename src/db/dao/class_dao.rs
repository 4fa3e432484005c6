use sea_orm::{
    DatabaseConnection, EntityTrait, FromQueryResult, JoinType, QueryOrder, QuerySelect,
    RelationTrait,
};
use serde::Serialize;

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::prelude::SchoolClass;
use crate::db::entities::{school_class, teacher};

/// A class joined to its teacher's name for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct ClassRow {
    pub class_id: i32,
    pub class_name: String,
    pub teacher_id: i32,
    pub teacher_first_name: Option<String>,
    pub teacher_last_name: Option<String>,
}

#[derive(Clone)]
pub struct ClassDao {
    db: DatabaseConnection,
}

impl DaoBase for ClassDao {
    type Entity = SchoolClass;
    type Model = school_class::Model;
    type ActiveModel = school_class::ActiveModel;
    type PrimaryKey = school_class::PrimaryKey;

    const ENTITY_NAME: &'static str = "Class";

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    fn key_column() -> school_class::Column {
        school_class::Column::ClassId
    }
}

impl ClassDao {
    pub async fn list_display(&self) -> DaoResult<Vec<ClassRow>> {
        SchoolClass::find()
            .select_only()
            .column(school_class::Column::ClassId)
            .column(school_class::Column::ClassName)
            .column(school_class::Column::TeacherId)
            .column_as(teacher::Column::FirstName, "teacher_first_name")
            .column_as(teacher::Column::LastName, "teacher_last_name")
            .join(JoinType::LeftJoin, school_class::Relation::Teacher.def())
            .order_by_asc(school_class::Column::ClassId)
            .into_model::<ClassRow>()
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }
}
