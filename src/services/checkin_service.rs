use chrono::NaiveDate;
use sea_orm::{Set, TransactionTrait};
use serde::Deserialize;
use tracing::info;

use crate::{
    db::dao::{AttendanceDao, ClassDao, DaoBase, DaoLayerError, StudentDao},
    db::entities::attendance::{self, AttendanceStatus},
    error::AppError,
    services::crud_service::SelectOption,
};

pub const INVALID_STUDENT: &str = "Invalid student ID";
pub const INVALID_CLASS: &str = "Invalid class ID";
pub const ALREADY_CHECKED_IN: &str = "Attendance already recorded for today";

#[derive(Debug, Clone, Deserialize)]
pub struct CheckInRequest {
    pub student_id: i32,
    pub class_id: i32,
    #[serde(default)]
    pub ip_address: Option<String>,
}

/// Records a student as present in a class, at most once per day.
#[derive(Clone)]
pub struct CheckInService {
    attendance_dao: AttendanceDao,
    class_dao: ClassDao,
}

impl CheckInService {
    pub fn new(attendance_dao: AttendanceDao, class_dao: ClassDao) -> Self {
        Self {
            attendance_dao,
            class_dao,
        }
    }

    /// Classes offered on the check-in form.
    pub async fn classes(&self) -> Result<Vec<SelectOption>, AppError> {
        Ok(self
            .class_dao
            .list()
            .await?
            .into_iter()
            .map(|class| SelectOption {
                value: class.class_id,
                label: class.class_name,
            })
            .collect())
    }

    /// Student, class and duplicate checks plus the insert share one
    /// transaction; the unique day index rejects a concurrent twin.
    pub async fn check_in(
        &self,
        request: CheckInRequest,
        today: NaiveDate,
    ) -> Result<attendance::Model, AppError> {
        let CheckInRequest {
            student_id,
            class_id,
            ip_address,
        } = request;

        let txn = self.attendance_dao.db().begin().await?;

        if StudentDao::find_in(&txn, student_id).await?.is_none() {
            info!(student_id, class_id, "check-in rejected: unknown student");
            return Err(AppError::not_found(INVALID_STUDENT));
        }
        if ClassDao::find_in(&txn, class_id).await?.is_none() {
            info!(student_id, class_id, "check-in rejected: unknown class");
            return Err(AppError::not_found(INVALID_CLASS));
        }
        if AttendanceDao::find_for_day(&txn, student_id, class_id, today, None)
            .await?
            .is_some()
        {
            info!(student_id, class_id, "check-in rejected: already recorded");
            return Err(AppError::conflict(ALREADY_CHECKED_IN));
        }

        let model = attendance::ActiveModel {
            student_id: Set(student_id),
            class_id: Set(class_id),
            status: Set(AttendanceStatus::Present.as_str().to_string()),
            date: Set(today),
            ip_address: Set(ip_address),
            ..Default::default()
        };
        let recorded = AttendanceDao::create_in(&txn, model)
            .await
            .map_err(insert_error)?;
        txn.commit().await?;

        info!(
            attendance_id = recorded.attendance_id,
            student_id,
            class_id,
            ip = recorded.ip_address.as_deref().unwrap_or("-"),
            "check-in recorded"
        );
        Ok(recorded)
    }
}

fn insert_error(err: DaoLayerError) -> AppError {
    if err.is_unique_violation() {
        AppError::conflict(ALREADY_CHECKED_IN)
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

    use super::{ALREADY_CHECKED_IN, CheckInRequest, CheckInService, INVALID_CLASS, INVALID_STUDENT};
    use crate::db::dao::DaoContext;
    use crate::db::entities::{attendance, school_class, student};
    use crate::error::AppError;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 2).expect("valid date")
    }

    fn service(db: &DatabaseConnection) -> CheckInService {
        let daos = DaoContext::new(db);
        CheckInService::new(daos.attendance(), daos.school_class())
    }

    fn request() -> CheckInRequest {
        CheckInRequest {
            student_id: 1,
            class_id: 10,
            ip_address: Some("10.0.0.7".to_string()),
        }
    }

    fn student_row() -> student::Model {
        let dob = NaiveDate::from_ymd_opt(2012, 4, 1).expect("valid date");
        student::Model {
            student_id: 1,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            dob,
            gender: "F".to_string(),
            enrollment_date: dob,
        }
    }

    fn class_row() -> school_class::Model {
        school_class::Model {
            class_id: 10,
            class_name: "Algebra".to_string(),
            teacher_id: 3,
        }
    }

    fn attendance_row(attendance_id: i32) -> attendance::Model {
        attendance::Model {
            attendance_id,
            student_id: 1,
            class_id: 10,
            status: "Present".to_string(),
            date: today(),
            ip_address: Some("10.0.0.7".to_string()),
        }
    }

    /// Uppercased SQL of every logged statement, transaction markers included.
    fn logged_sql(db: DatabaseConnection) -> Vec<String> {
        db.into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements())
            .map(|stmt| stmt.sql.to_uppercase())
            .collect()
    }

    fn count_starting_with(log: &[String], keyword: &str) -> usize {
        log.iter().filter(|sql| sql.trim_start().starts_with(keyword)).count()
    }

    #[tokio::test]
    async fn unknown_student_stops_after_one_query() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([Vec::<student::Model>::new()])
            .into_connection();

        let err = service(&db)
            .check_in(request(), today())
            .await
            .expect_err("student does not exist");

        assert_eq!(err, AppError::not_found(INVALID_STUDENT));
        let log = logged_sql(db);
        assert_eq!(count_starting_with(&log, "SELECT"), 1);
        assert_eq!(count_starting_with(&log, "INSERT"), 0);
    }

    #[tokio::test]
    async fn unknown_class_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![student_row()]])
            .append_query_results([Vec::<school_class::Model>::new()])
            .into_connection();

        let err = service(&db)
            .check_in(request(), today())
            .await
            .expect_err("class does not exist");

        assert_eq!(err, AppError::not_found(INVALID_CLASS));
    }

    #[tokio::test]
    async fn duplicate_is_rejected_without_insert() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![student_row()]])
            .append_query_results([vec![class_row()]])
            .append_query_results([vec![attendance_row(5)]])
            .into_connection();

        let err = service(&db)
            .check_in(request(), today())
            .await
            .expect_err("already checked in");

        assert_eq!(err, AppError::conflict(ALREADY_CHECKED_IN));
        let log = logged_sql(db);
        assert_eq!(count_starting_with(&log, "SELECT"), 3);
        assert_eq!(count_starting_with(&log, "INSERT"), 0);
    }

    // Postgres inserts with RETURNING, so the new row comes back as a query.
    #[tokio::test]
    async fn first_check_in_is_recorded_as_present() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![student_row()]])
            .append_query_results([vec![class_row()]])
            .append_query_results([Vec::<attendance::Model>::new()])
            .append_query_results([vec![attendance_row(6)]])
            .into_connection();

        let recorded = service(&db)
            .check_in(request(), today())
            .await
            .expect("check-in succeeds");

        assert_eq!(recorded.attendance_id, 6);
        assert_eq!(recorded.status, "Present");
        assert_eq!(recorded.date, today());
    }
}
