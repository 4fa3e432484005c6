use sea_orm::{ColumnTrait, QueryFilter, Set};
use serde::Deserialize;

use crate::{
    db::dao::{ClassDao, DaoBase, TeacherDao},
    db::entities::{school_class, teacher},
    error::AppError,
    services::{
        crud_service::{CrudErrors, CrudService, SelectOption},
        validation,
    },
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeacherDraft {
    pub teacher_id: Option<i32>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeacherChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub subject: Option<String>,
}

struct ValidTeacher {
    teacher_id: i32,
    first_name: String,
    last_name: String,
    subject: String,
}

impl TeacherDraft {
    fn validate(self) -> Result<ValidTeacher, AppError> {
        Ok(ValidTeacher {
            teacher_id: validation::positive_id(self.teacher_id, "Teacher ID")?,
            first_name: validation::name(self.first_name, "First name")?,
            last_name: validation::name(self.last_name, "Last name")?,
            subject: validation::name(self.subject, "Subject")?,
        })
    }
}

#[derive(Clone)]
pub struct TeacherService {
    teacher_dao: TeacherDao,
    class_dao: ClassDao,
}

impl TeacherService {
    pub fn new(teacher_dao: TeacherDao, class_dao: ClassDao) -> Self {
        Self {
            teacher_dao,
            class_dao,
        }
    }

    pub async fn list_teachers(&self) -> Result<Vec<teacher::Model>, AppError> {
        CrudService::list(self).await
    }

    pub async fn get_teacher(&self, teacher_id: i32) -> Result<teacher::Model, AppError> {
        CrudService::find_by_id(self, teacher_id).await
    }

    pub async fn create_teacher(&self, draft: TeacherDraft) -> Result<teacher::Model, AppError> {
        let valid = draft.validate()?;
        if CrudService::exists(self, valid.teacher_id).await? {
            return Err(AppError::conflict(format!(
                "Teacher {} already exists",
                valid.teacher_id
            )));
        }

        let model = teacher::ActiveModel {
            teacher_id: Set(valid.teacher_id),
            first_name: Set(valid.first_name),
            last_name: Set(valid.last_name),
            subject: Set(valid.subject),
        };
        let created = CrudService::create(self, model).await?;
        tracing::info!(teacher_id = created.teacher_id, "teacher created");
        Ok(created)
    }

    pub async fn update_teacher(
        &self,
        teacher_id: i32,
        changes: TeacherChanges,
    ) -> Result<teacher::Model, AppError> {
        let current = self.get_teacher(teacher_id).await?;
        let valid = TeacherDraft {
            teacher_id: Some(current.teacher_id),
            first_name: changes.first_name.or(Some(current.first_name)),
            last_name: changes.last_name.or(Some(current.last_name)),
            subject: changes.subject.or(Some(current.subject)),
        }
        .validate()?;

        CrudService::update(self, teacher_id, move |active| {
            active.first_name = Set(valid.first_name);
            active.last_name = Set(valid.last_name);
            active.subject = Set(valid.subject);
        })
        .await
    }

    /// Refuses while classes are still taught by this teacher.
    pub async fn delete_teacher(&self, teacher_id: i32) -> Result<(), AppError> {
        self.get_teacher(teacher_id).await?;

        let classes = self
            .class_dao
            .count_with(|query| query.filter(school_class::Column::TeacherId.eq(teacher_id)))
            .await?;
        if classes > 0 {
            return Err(AppError::conflict(format!(
                "Teacher {teacher_id} still teaches {classes} class(es)"
            )));
        }

        CrudService::delete(self, teacher_id).await?;
        tracing::info!(teacher_id, "teacher deleted");
        Ok(())
    }

    pub async fn teacher_options(&self) -> Result<Vec<SelectOption>, AppError> {
        Ok(self
            .list_teachers()
            .await?
            .into_iter()
            .map(|teacher| SelectOption {
                value: teacher.teacher_id,
                label: format!("{} ({})", teacher.full_name(), teacher.subject),
            })
            .collect())
    }
}

impl CrudService for TeacherService {
    type Dao = TeacherDao;

    fn dao(&self) -> &Self::Dao {
        &self.teacher_dao
    }

    fn errors(&self) -> CrudErrors {
        CrudErrors {
            duplicate_key: "A teacher with this ID already exists",
            still_referenced: "The teacher still teaches one or more classes",
            ..CrudErrors::default()
        }
    }
}
