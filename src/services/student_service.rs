use chrono::NaiveDate;
use sea_orm::{ColumnTrait, QueryFilter, Set};
use serde::Deserialize;

use crate::{
    db::dao::{AttendanceDao, DaoBase, GradeDao, StudentDao},
    db::entities::{attendance, grade, student},
    error::AppError,
    services::{
        crud_service::{CrudErrors, CrudService, SelectOption},
        validation,
    },
};

/// Fields for a new student. Every field is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentDraft {
    pub student_id: Option<i32>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub enrollment_date: Option<NaiveDate>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub enrollment_date: Option<NaiveDate>,
}

/// A draft that passed every field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidStudent {
    pub student_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
    pub gender: student::Gender,
    pub enrollment_date: NaiveDate,
}

impl StudentDraft {
    pub fn validate(self, today: NaiveDate) -> Result<ValidStudent, AppError> {
        let student_id = validation::positive_id(self.student_id, "Student ID")?;
        let first_name = validation::name(self.first_name, "First name")?;
        let last_name = validation::name(self.last_name, "Last name")?;
        let dob = validation::past_date(self.dob, "Date of birth", today)?;
        let gender = validation::gender(self.gender.as_deref())?;
        let enrollment_date = validation::past_date(self.enrollment_date, "Enrollment date", today)?;
        if enrollment_date < dob {
            return Err(AppError::validation(
                "Enrollment date cannot be before date of birth",
            ));
        }

        Ok(ValidStudent {
            student_id,
            first_name,
            last_name,
            dob,
            gender,
            enrollment_date,
        })
    }
}

impl ValidStudent {
    pub fn into_active_model(self) -> student::ActiveModel {
        student::ActiveModel {
            student_id: Set(self.student_id),
            first_name: Set(self.first_name),
            last_name: Set(self.last_name),
            dob: Set(self.dob),
            gender: Set(self.gender.as_str().to_string()),
            enrollment_date: Set(self.enrollment_date),
        }
    }
}

#[derive(Clone)]
pub struct StudentService {
    student_dao: StudentDao,
    grade_dao: GradeDao,
    attendance_dao: AttendanceDao,
}

impl StudentService {
    pub fn new(student_dao: StudentDao, grade_dao: GradeDao, attendance_dao: AttendanceDao) -> Self {
        Self {
            student_dao,
            grade_dao,
            attendance_dao,
        }
    }

    pub async fn list_students(&self) -> Result<Vec<student::Model>, AppError> {
        CrudService::list(self).await
    }

    pub async fn get_student(&self, student_id: i32) -> Result<student::Model, AppError> {
        CrudService::find_by_id(self, student_id).await
    }

    pub async fn create_student(&self, draft: StudentDraft) -> Result<student::Model, AppError> {
        let valid = draft.validate(validation::today())?;
        if CrudService::exists(self, valid.student_id).await? {
            return Err(AppError::conflict(format!(
                "Student {} already exists",
                valid.student_id
            )));
        }

        let created = CrudService::create(self, valid.into_active_model()).await?;
        tracing::info!(student_id = created.student_id, "student created");
        Ok(created)
    }

    pub async fn update_student(
        &self,
        student_id: i32,
        changes: StudentChanges,
    ) -> Result<student::Model, AppError> {
        let current = self.get_student(student_id).await?;
        let merged = StudentDraft {
            student_id: Some(current.student_id),
            first_name: changes.first_name.or(Some(current.first_name)),
            last_name: changes.last_name.or(Some(current.last_name)),
            dob: changes.dob.or(Some(current.dob)),
            gender: changes.gender.or(Some(current.gender)),
            enrollment_date: changes.enrollment_date.or(Some(current.enrollment_date)),
        }
        .validate(validation::today())?;

        CrudService::update(self, student_id, move |active| {
            active.first_name = Set(merged.first_name);
            active.last_name = Set(merged.last_name);
            active.dob = Set(merged.dob);
            active.gender = Set(merged.gender.as_str().to_string());
            active.enrollment_date = Set(merged.enrollment_date);
        })
        .await
    }

    /// Refuses while grades or attendance still point at the student.
    pub async fn delete_student(&self, student_id: i32) -> Result<(), AppError> {
        self.get_student(student_id).await?;

        let grades = self
            .grade_dao
            .count_with(|query| query.filter(grade::Column::StudentId.eq(student_id)))
            .await?;
        let records = self
            .attendance_dao
            .count_with(|query| query.filter(attendance::Column::StudentId.eq(student_id)))
            .await?;
        if grades > 0 || records > 0 {
            return Err(AppError::conflict(format!(
                "Student {student_id} still has {grades} grade(s) and {records} attendance record(s)"
            )));
        }

        CrudService::delete(self, student_id).await?;
        tracing::info!(student_id, "student deleted");
        Ok(())
    }

    pub async fn student_options(&self) -> Result<Vec<SelectOption>, AppError> {
        Ok(self
            .list_students()
            .await?
            .into_iter()
            .map(|student| SelectOption {
                value: student.student_id,
                label: format!("{} - {}", student.student_id, student.full_name()),
            })
            .collect())
    }
}

impl CrudService for StudentService {
    type Dao = StudentDao;

    fn dao(&self) -> &Self::Dao {
        &self.student_dao
    }

    fn errors(&self) -> CrudErrors {
        CrudErrors {
            duplicate_key: "A student with this ID already exists",
            still_referenced: "The student still has grades or attendance records",
            ..CrudErrors::default()
        }
    }
}
