use chrono::NaiveDate;
use sea_orm::Set;
use serde::Deserialize;

use crate::{
    db::dao::{ClassDao, DaoBase, GradeDao, GradeRow, StudentDao},
    db::entities::grade,
    error::AppError,
    services::{
        crud_service::{CrudErrors, CrudOp, CrudService},
        validation,
    },
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GradeDraft {
    pub student_id: Option<i32>,
    pub class_id: Option<i32>,
    pub grade: Option<String>,
    pub date_assigned: Option<NaiveDate>,
}

/// Only the letter and the date can change once a grade is recorded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GradeChanges {
    pub grade: Option<String>,
    pub date_assigned: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct GradeService {
    grade_dao: GradeDao,
    student_dao: StudentDao,
    class_dao: ClassDao,
}

impl GradeService {
    pub fn new(grade_dao: GradeDao, student_dao: StudentDao, class_dao: ClassDao) -> Self {
        Self {
            grade_dao,
            student_dao,
            class_dao,
        }
    }

    /// Grades with student and class names.
    pub async fn list_grades(&self) -> Result<Vec<GradeRow>, AppError> {
        self.grade_dao
            .list_display()
            .await
            .map_err(|err| self.map_error(CrudOp::List, err))
    }

    pub async fn get_grade(&self, grade_id: i32) -> Result<grade::Model, AppError> {
        CrudService::find_by_id(self, grade_id).await
    }

    pub async fn create_grade(&self, draft: GradeDraft) -> Result<grade::Model, AppError> {
        let today = validation::today();
        let student_id = validation::positive_id(draft.student_id, "Student ID")?;
        let class_id = validation::positive_id(draft.class_id, "Class ID")?;
        let letter = validation::grade_letter(draft.grade.as_deref())?;
        let date_assigned = validation::past_date(draft.date_assigned, "Date assigned", today)?;

        if !self.student_dao.exists(student_id).await? {
            return Err(StudentDao::not_found(student_id).into());
        }
        if !self.class_dao.exists(class_id).await? {
            return Err(ClassDao::not_found(class_id).into());
        }

        let model = grade::ActiveModel {
            student_id: Set(student_id),
            class_id: Set(class_id),
            grade: Set(letter),
            date_assigned: Set(date_assigned),
            ..Default::default()
        };
        let created = CrudService::create(self, model).await?;
        tracing::info!(
            grade_id = created.grade_id,
            student_id,
            class_id,
            "grade recorded"
        );
        Ok(created)
    }

    pub async fn update_grade(
        &self,
        grade_id: i32,
        changes: GradeChanges,
    ) -> Result<grade::Model, AppError> {
        let current = self.get_grade(grade_id).await?;
        let letter =
            validation::grade_letter(Some(changes.grade.as_deref().unwrap_or(&current.grade)))?;
        let date_assigned = validation::past_date(
            changes.date_assigned.or(Some(current.date_assigned)),
            "Date assigned",
            validation::today(),
        )?;

        CrudService::update(self, grade_id, move |active| {
            active.grade = Set(letter);
            active.date_assigned = Set(date_assigned);
        })
        .await
    }

    pub async fn delete_grade(&self, grade_id: i32) -> Result<(), AppError> {
        CrudService::delete(self, grade_id).await
    }
}

impl CrudService for GradeService {
    type Dao = GradeDao;

    fn dao(&self) -> &Self::Dao {
        &self.grade_dao
    }

    fn errors(&self) -> CrudErrors {
        CrudErrors {
            missing_reference: "The selected student or class does not exist",
            ..CrudErrors::default()
        }
    }
}
