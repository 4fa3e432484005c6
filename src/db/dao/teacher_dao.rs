use sea_orm::DatabaseConnection;

use super::DaoBase;
use crate::db::entities::prelude::Teacher;
use crate::db::entities::teacher;

#[derive(Clone)]
pub struct TeacherDao {
    db: DatabaseConnection,
}

impl DaoBase for TeacherDao {
    type Entity = Teacher;
    type Model = teacher::Model;
    type ActiveModel = teacher::ActiveModel;
    type PrimaryKey = teacher::PrimaryKey;

    const ENTITY_NAME: &'static str = "Teacher";

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    fn key_column() -> teacher::Column {
        teacher::Column::TeacherId
    }
}
