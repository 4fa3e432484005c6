use sea_orm::{ColumnTrait, QueryFilter, Set};
use serde::Deserialize;

use crate::{
    db::dao::{AttendanceDao, ClassDao, ClassRow, DaoBase, GradeDao, TeacherDao},
    db::entities::{attendance, grade, school_class},
    error::AppError,
    services::{
        crud_service::{CrudErrors, CrudOp, CrudService, SelectOption},
        validation,
    },
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassDraft {
    pub class_id: Option<i32>,
    pub class_name: Option<String>,
    pub teacher_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassChanges {
    pub class_name: Option<String>,
    pub teacher_id: Option<i32>,
}

#[derive(Clone)]
pub struct ClassService {
    class_dao: ClassDao,
    teacher_dao: TeacherDao,
    grade_dao: GradeDao,
    attendance_dao: AttendanceDao,
}

impl ClassService {
    pub fn new(
        class_dao: ClassDao,
        teacher_dao: TeacherDao,
        grade_dao: GradeDao,
        attendance_dao: AttendanceDao,
    ) -> Self {
        Self {
            class_dao,
            teacher_dao,
            grade_dao,
            attendance_dao,
        }
    }

    /// Classes with their teacher's name.
    pub async fn list_classes(&self) -> Result<Vec<ClassRow>, AppError> {
        self.class_dao
            .list_display()
            .await
            .map_err(|err| self.map_error(CrudOp::List, err))
    }

    pub async fn get_class(&self, class_id: i32) -> Result<school_class::Model, AppError> {
        CrudService::find_by_id(self, class_id).await
    }

    pub async fn create_class(&self, draft: ClassDraft) -> Result<school_class::Model, AppError> {
        let class_id = validation::positive_id(draft.class_id, "Class ID")?;
        let class_name = validation::name(draft.class_name, "Class name")?;
        let teacher_id = validation::positive_id(draft.teacher_id, "Teacher ID")?;
        self.require_teacher(teacher_id).await?;
        if CrudService::exists(self, class_id).await? {
            return Err(AppError::conflict(format!("Class {class_id} already exists")));
        }

        let model = school_class::ActiveModel {
            class_id: Set(class_id),
            class_name: Set(class_name),
            teacher_id: Set(teacher_id),
        };
        let created = CrudService::create(self, model).await?;
        tracing::info!(class_id = created.class_id, teacher_id, "class created");
        Ok(created)
    }

    pub async fn update_class(
        &self,
        class_id: i32,
        changes: ClassChanges,
    ) -> Result<school_class::Model, AppError> {
        let current = self.get_class(class_id).await?;
        let class_name =
            validation::name(changes.class_name.or(Some(current.class_name)), "Class name")?;
        let teacher_id = validation::positive_id(
            changes.teacher_id.or(Some(current.teacher_id)),
            "Teacher ID",
        )?;
        if teacher_id != current.teacher_id {
            self.require_teacher(teacher_id).await?;
        }

        CrudService::update(self, class_id, move |active| {
            active.class_name = Set(class_name);
            active.teacher_id = Set(teacher_id);
        })
        .await
    }

    /// Refuses while grades or attendance still point at the class.
    pub async fn delete_class(&self, class_id: i32) -> Result<(), AppError> {
        self.get_class(class_id).await?;

        let grades = self
            .grade_dao
            .count_with(|query| query.filter(grade::Column::ClassId.eq(class_id)))
            .await?;
        let records = self
            .attendance_dao
            .count_with(|query| query.filter(attendance::Column::ClassId.eq(class_id)))
            .await?;
        if grades > 0 || records > 0 {
            return Err(AppError::conflict(format!(
                "Class {class_id} still has {grades} grade(s) and {records} attendance record(s)"
            )));
        }

        CrudService::delete(self, class_id).await?;
        tracing::info!(class_id, "class deleted");
        Ok(())
    }

    pub async fn class_options(&self) -> Result<Vec<SelectOption>, AppError> {
        Ok(CrudService::list(self)
            .await?
            .into_iter()
            .map(|class| SelectOption {
                value: class.class_id,
                label: class.class_name,
            })
            .collect())
    }

    async fn require_teacher(&self, teacher_id: i32) -> Result<(), AppError> {
        if self.teacher_dao.exists(teacher_id).await? {
            Ok(())
        } else {
            Err(TeacherDao::not_found(teacher_id).into())
        }
    }
}

impl CrudService for ClassService {
    type Dao = ClassDao;

    fn dao(&self) -> &Self::Dao {
        &self.class_dao
    }

    fn errors(&self) -> CrudErrors {
        CrudErrors {
            duplicate_key: "A class with this ID already exists",
            missing_reference: "The selected teacher does not exist",
            still_referenced: "The class still has grades or attendance records",
            ..CrudErrors::default()
        }
    }
}
