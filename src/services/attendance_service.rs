use chrono::NaiveDate;
use sea_orm::{Set, TransactionTrait};
use serde::Deserialize;

use crate::{
    db::dao::{AttendanceDao, AttendanceRow, ClassDao, DaoBase, DaoLayerError, StudentDao},
    db::entities::attendance,
    error::AppError,
    services::{
        crud_service::{CrudErrors, CrudOp, CrudService},
        validation,
    },
};

/// Manual attendance entry from the dashboard.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceDraft {
    pub student_id: Option<i32>,
    pub class_id: Option<i32>,
    pub status: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceChanges {
    pub status: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct AttendanceService {
    attendance_dao: AttendanceDao,
}

fn already_recorded(student_id: i32, class_id: i32, date: NaiveDate) -> AppError {
    AppError::conflict(format!(
        "Attendance already recorded for student {student_id} in class {class_id} on {date}"
    ))
}

impl AttendanceService {
    pub fn new(attendance_dao: AttendanceDao) -> Self {
        Self { attendance_dao }
    }

    pub async fn list_attendance(&self) -> Result<Vec<AttendanceRow>, AppError> {
        self.attendance_dao
            .list_display()
            .await
            .map_err(|err| self.map_error(CrudOp::List, err))
    }

    pub async fn get_attendance(&self, attendance_id: i32) -> Result<attendance::Model, AppError> {
        CrudService::find_by_id(self, attendance_id).await
    }

    /// Same once-per-day rule as check-in, but any status and any past date.
    pub async fn create_attendance(
        &self,
        draft: AttendanceDraft,
    ) -> Result<attendance::Model, AppError> {
        let student_id = validation::positive_id(draft.student_id, "Student ID")?;
        let class_id = validation::positive_id(draft.class_id, "Class ID")?;
        let status = validation::attendance_status(draft.status.as_deref())?;
        let date = validation::past_date(draft.date, "Date", validation::today())?;

        let txn = self.attendance_dao.db().begin().await?;
        if StudentDao::find_in(&txn, student_id).await?.is_none() {
            return Err(StudentDao::not_found(student_id).into());
        }
        if ClassDao::find_in(&txn, class_id).await?.is_none() {
            return Err(ClassDao::not_found(class_id).into());
        }
        if AttendanceDao::find_for_day(&txn, student_id, class_id, date, None)
            .await?
            .is_some()
        {
            return Err(already_recorded(student_id, class_id, date));
        }

        let model = attendance::ActiveModel {
            student_id: Set(student_id),
            class_id: Set(class_id),
            status: Set(status.as_str().to_string()),
            date: Set(date),
            ip_address: Set(None),
            ..Default::default()
        };
        let created = AttendanceDao::create_in(&txn, model)
            .await
            .map_err(|err| self.write_error(CrudOp::Create, err, student_id, class_id, date))?;
        txn.commit().await?;

        tracing::info!(
            attendance_id = created.attendance_id,
            student_id,
            class_id,
            status = status.as_str(),
            "attendance recorded"
        );
        Ok(created)
    }

    /// Moving a record to another date re-checks the daily rule against the
    /// other rows.
    pub async fn update_attendance(
        &self,
        attendance_id: i32,
        changes: AttendanceChanges,
    ) -> Result<attendance::Model, AppError> {
        let txn = self.attendance_dao.db().begin().await?;
        let current = AttendanceDao::find_in(&txn, attendance_id)
            .await?
            .ok_or_else(|| AttendanceDao::not_found(attendance_id))?;

        let status = validation::attendance_status(Some(
            changes.status.as_deref().unwrap_or(&current.status),
        ))?;
        let date = validation::past_date(
            changes.date.or(Some(current.date)),
            "Date",
            validation::today(),
        )?;
        let (student_id, class_id) = (current.student_id, current.class_id);
        if AttendanceDao::find_for_day(&txn, student_id, class_id, date, Some(attendance_id))
            .await?
            .is_some()
        {
            return Err(already_recorded(student_id, class_id, date));
        }

        let updated = AttendanceDao::update_in(&txn, current, status.as_str().to_string(), date)
            .await
            .map_err(|err| self.write_error(CrudOp::Update, err, student_id, class_id, date))?;
        txn.commit().await?;
        Ok(updated)
    }

    pub async fn delete_attendance(&self, attendance_id: i32) -> Result<(), AppError> {
        CrudService::delete(self, attendance_id).await
    }

    fn write_error(
        &self,
        op: CrudOp,
        err: DaoLayerError,
        student_id: i32,
        class_id: i32,
        date: NaiveDate,
    ) -> AppError {
        if err.is_unique_violation() {
            already_recorded(student_id, class_id, date)
        } else {
            self.map_error(op, err)
        }
    }
}

impl CrudService for AttendanceService {
    type Dao = AttendanceDao;

    fn dao(&self) -> &Self::Dao {
        &self.attendance_dao
    }

    fn errors(&self) -> CrudErrors {
        CrudErrors {
            missing_reference: "The selected student or class does not exist",
            ..CrudErrors::default()
        }
    }
}
