use sea_orm::{
    DatabaseConnection, EntityTrait, FromQueryResult, JoinType, QueryOrder, QuerySelect,
    RelationTrait,
};
use serde::Serialize;

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::prelude::Grade;
use crate::db::entities::{grade, school_class, student};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct GradeRow {
    pub grade_id: i32,
    pub student_id: i32,
    pub student_first_name: Option<String>,
    pub student_last_name: Option<String>,
    pub class_id: i32,
    pub class_name: Option<String>,
    pub grade: String,
    pub date_assigned: chrono::NaiveDate,
}

#[derive(Clone)]
pub struct GradeDao {
    db: DatabaseConnection,
}

impl DaoBase for GradeDao {
    type Entity = Grade;
    type Model = grade::Model;
    type ActiveModel = grade::ActiveModel;
    type PrimaryKey = grade::PrimaryKey;

    const ENTITY_NAME: &'static str = "Grade";

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    fn key_column() -> grade::Column {
        grade::Column::GradeId
    }
}

impl GradeDao {
    pub async fn list_display(&self) -> DaoResult<Vec<GradeRow>> {
        Grade::find()
            .select_only()
            .column(grade::Column::GradeId)
            .column(grade::Column::StudentId)
            .column_as(student::Column::FirstName, "student_first_name")
            .column_as(student::Column::LastName, "student_last_name")
            .column(grade::Column::ClassId)
            .column(school_class::Column::ClassName)
            .column(grade::Column::Grade)
            .column(grade::Column::DateAssigned)
            .join(JoinType::LeftJoin, grade::Relation::Student.def())
            .join(JoinType::LeftJoin, grade::Relation::SchoolClass.def())
            .order_by_asc(grade::Column::GradeId)
            .into_model::<GradeRow>()
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }
}
