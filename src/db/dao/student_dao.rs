use std::collections::HashSet;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect};

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::prelude::Student;
use crate::db::entities::student;

#[derive(Clone)]
pub struct StudentDao {
    db: DatabaseConnection,
}

impl DaoBase for StudentDao {
    type Entity = Student;
    type Model = student::Model;
    type ActiveModel = student::ActiveModel;
    type PrimaryKey = student::PrimaryKey;

    const ENTITY_NAME: &'static str = "Student";

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    fn key_column() -> student::Column {
        student::Column::StudentId
    }
}

impl StudentDao {
    /// Returns the subset of `ids` already present in `students`.
    pub async fn existing_ids(&self, ids: &[i32]) -> DaoResult<HashSet<i32>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let found: Vec<i32> = Student::find()
            .select_only()
            .column(student::Column::StudentId)
            .filter(student::Column::StudentId.is_in(ids.iter().copied()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;

        Ok(found.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};

    use super::StudentDao;
    use crate::db::dao::{DaoBase, DaoLayerError};
    use crate::db::entities::student;

    fn student_model(id: i32) -> student::Model {
        let date = NaiveDate::from_ymd_opt(2010, 1, 1).expect("valid date");
        student::Model {
            student_id: id,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            dob: date,
            gender: "F".to_string(),
            enrollment_date: date,
        }
    }

    #[tokio::test]
    async fn find_by_id_reports_missing_student() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([Vec::<student::Model>::new()])
            .into_connection();
        let dao = StudentDao::new(&db);

        let err = dao.find_by_id(7).await.expect_err("student should be missing");

        assert!(matches!(
            err,
            DaoLayerError::NotFound {
                entity: "Student",
                key: 7
            }
        ));
    }

    #[tokio::test]
    async fn find_by_id_returns_row() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([[student_model(3)]])
            .into_connection();
        let dao = StudentDao::new(&db);

        let found = dao.find_by_id(3).await.expect("query should succeed");

        assert_eq!(found.student_id, 3);
        assert_eq!(found.full_name(), "Ada Lovelace");
    }

    #[tokio::test]
    async fn delete_reports_missing_row() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let dao = StudentDao::new(&db);

        let err = dao.delete(9).await.expect_err("nothing to delete");

        assert!(matches!(err, DaoLayerError::NotFound { key: 9, .. }));
    }

    #[tokio::test]
    async fn existing_ids_skips_query_for_empty_input() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let dao = StudentDao::new(&db);

        let found = dao.existing_ids(&[]).await.expect("no query needed");

        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn list_maps_database_errors() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_errors([DbErr::Custom("list failed".to_string())])
            .into_connection();
        let dao = StudentDao::new(&db);

        let err = dao.list().await.expect_err("list should fail");

        assert!(matches!(err, DaoLayerError::Db(_)));
    }
}
