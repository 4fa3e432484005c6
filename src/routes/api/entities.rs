use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    routing::{get, post},
};

use crate::{
    db::dao::{AttendanceRow, ClassRow, GradeRow},
    db::entities::{attendance, grade, school_class, student, teacher},
    error::AppError,
    response::{ApiResult, JsonApiResponse},
    services::{
        ServiceContext,
        attendance_service::{AttendanceChanges, AttendanceDraft, AttendanceService},
        class_service::{ClassChanges, ClassDraft, ClassService},
        crud_service::SelectOption,
        grade_service::{GradeChanges, GradeDraft, GradeService},
        import_service::{ColumnMapping, ImportReport},
        student_service::{StudentChanges, StudentDraft, StudentService},
        teacher_service::{TeacherChanges, TeacherDraft, TeacherService},
        validation,
    },
    state::AppState,
};

use super::entity_router::{EntityApi, entity_router};

#[async_trait::async_trait]
impl EntityApi for StudentService {
    type Row = student::Model;
    type Model = student::Model;
    type Draft = StudentDraft;
    type Changes = StudentChanges;

    fn from_context(ctx: &ServiceContext) -> Self {
        ctx.student()
    }

    async fn list_rows(&self) -> Result<Vec<student::Model>, AppError> {
        self.list_students().await
    }

    async fn get_one(&self, id: i32) -> Result<student::Model, AppError> {
        self.get_student(id).await
    }

    async fn create_one(&self, draft: StudentDraft) -> Result<student::Model, AppError> {
        self.create_student(draft).await
    }

    async fn update_one(&self, id: i32, changes: StudentChanges) -> Result<student::Model, AppError> {
        self.update_student(id, changes).await
    }

    async fn delete_one(&self, id: i32) -> Result<(), AppError> {
        self.delete_student(id).await
    }
}

#[async_trait::async_trait]
impl EntityApi for TeacherService {
    type Row = teacher::Model;
    type Model = teacher::Model;
    type Draft = TeacherDraft;
    type Changes = TeacherChanges;

    fn from_context(ctx: &ServiceContext) -> Self {
        ctx.teacher()
    }

    async fn list_rows(&self) -> Result<Vec<teacher::Model>, AppError> {
        self.list_teachers().await
    }

    async fn get_one(&self, id: i32) -> Result<teacher::Model, AppError> {
        self.get_teacher(id).await
    }

    async fn create_one(&self, draft: TeacherDraft) -> Result<teacher::Model, AppError> {
        self.create_teacher(draft).await
    }

    async fn update_one(&self, id: i32, changes: TeacherChanges) -> Result<teacher::Model, AppError> {
        self.update_teacher(id, changes).await
    }

    async fn delete_one(&self, id: i32) -> Result<(), AppError> {
        self.delete_teacher(id).await
    }
}

#[async_trait::async_trait]
impl EntityApi for ClassService {
    type Row = ClassRow;
    type Model = school_class::Model;
    type Draft = ClassDraft;
    type Changes = ClassChanges;

    fn from_context(ctx: &ServiceContext) -> Self {
        ctx.school_class()
    }

    async fn list_rows(&self) -> Result<Vec<ClassRow>, AppError> {
        self.list_classes().await
    }

    async fn get_one(&self, id: i32) -> Result<school_class::Model, AppError> {
        self.get_class(id).await
    }

    async fn create_one(&self, draft: ClassDraft) -> Result<school_class::Model, AppError> {
        self.create_class(draft).await
    }

    async fn update_one(
        &self,
        id: i32,
        changes: ClassChanges,
    ) -> Result<school_class::Model, AppError> {
        self.update_class(id, changes).await
    }

    async fn delete_one(&self, id: i32) -> Result<(), AppError> {
        self.delete_class(id).await
    }
}

#[async_trait::async_trait]
impl EntityApi for GradeService {
    type Row = GradeRow;
    type Model = grade::Model;
    type Draft = GradeDraft;
    type Changes = GradeChanges;

    fn from_context(ctx: &ServiceContext) -> Self {
        ctx.grade()
    }

    async fn list_rows(&self) -> Result<Vec<GradeRow>, AppError> {
        self.list_grades().await
    }

    async fn get_one(&self, id: i32) -> Result<grade::Model, AppError> {
        self.get_grade(id).await
    }

    async fn create_one(&self, draft: GradeDraft) -> Result<grade::Model, AppError> {
        self.create_grade(draft).await
    }

    async fn update_one(&self, id: i32, changes: GradeChanges) -> Result<grade::Model, AppError> {
        self.update_grade(id, changes).await
    }

    async fn delete_one(&self, id: i32) -> Result<(), AppError> {
        self.delete_grade(id).await
    }
}

#[async_trait::async_trait]
impl EntityApi for AttendanceService {
    type Row = AttendanceRow;
    type Model = attendance::Model;
    type Draft = AttendanceDraft;
    type Changes = AttendanceChanges;

    fn from_context(ctx: &ServiceContext) -> Self {
        ctx.attendance()
    }

    async fn list_rows(&self) -> Result<Vec<AttendanceRow>, AppError> {
        self.list_attendance().await
    }

    async fn get_one(&self, id: i32) -> Result<attendance::Model, AppError> {
        self.get_attendance(id).await
    }

    async fn create_one(&self, draft: AttendanceDraft) -> Result<attendance::Model, AppError> {
        self.create_attendance(draft).await
    }

    async fn update_one(
        &self,
        id: i32,
        changes: AttendanceChanges,
    ) -> Result<attendance::Model, AppError> {
        self.update_attendance(id, changes).await
    }

    async fn delete_one(&self, id: i32) -> Result<(), AppError> {
        self.delete_attendance(id).await
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(entity_router::<StudentService>("/students"))
        .merge(entity_router::<TeacherService>("/teachers"))
        .merge(entity_router::<ClassService>("/classes"))
        .merge(entity_router::<GradeService>("/grades"))
        .merge(entity_router::<AttendanceService>("/attendance"))
        .route("/students/options", get(student_options))
        .route("/teachers/options", get(teacher_options))
        .route("/classes/options", get(class_options))
        .route("/students/import", post(import_students))
}

async fn student_options(State(state): State<Arc<AppState>>) -> ApiResult<Vec<SelectOption>> {
    let options = ServiceContext::from_state(&state)
        .student()
        .student_options()
        .await?;
    JsonApiResponse::ok(options)
}

async fn teacher_options(State(state): State<Arc<AppState>>) -> ApiResult<Vec<SelectOption>> {
    let options = ServiceContext::from_state(&state)
        .teacher()
        .teacher_options()
        .await?;
    JsonApiResponse::ok(options)
}

async fn class_options(State(state): State<Arc<AppState>>) -> ApiResult<Vec<SelectOption>> {
    let options = ServiceContext::from_state(&state)
        .school_class()
        .class_options()
        .await?;
    JsonApiResponse::ok(options)
}

/// Body is the raw CSV text; the query string carries the column mapping.
async fn import_students(
    State(state): State<Arc<AppState>>,
    Query(mapping): Query<ColumnMapping>,
    body: String,
) -> ApiResult<ImportReport> {
    let report = ServiceContext::from_state(&state)
        .import()
        .import_students(&body, &mapping, validation::today())
        .await?;
    JsonApiResponse::ok(report)
}
