use sea_orm::DatabaseConnection;

use crate::{
    config::AppConfig,
    db::dao::DaoContext,
    services::{
        attendance_service::AttendanceService, checkin_service::CheckInService,
        class_service::ClassService, grade_service::GradeService, import_service::ImportService,
        report_service::ReportService, student_service::StudentService,
        teacher_service::TeacherService,
    },
    state::AppState,
};

/// Builds per-request services over the shared pool.
#[derive(Clone)]
pub struct ServiceContext {
    daos: DaoContext,
    config: AppConfig,
}

impl ServiceContext {
    pub fn new(db: &DatabaseConnection, config: &AppConfig) -> Self {
        Self {
            daos: DaoContext::new(db),
            config: config.clone(),
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(&state.db, &state.config)
    }

    pub fn student(&self) -> StudentService {
        StudentService::new(
            self.daos.student(),
            self.daos.grade(),
            self.daos.attendance(),
        )
    }

    pub fn teacher(&self) -> TeacherService {
        TeacherService::new(self.daos.teacher(), self.daos.school_class())
    }

    pub fn school_class(&self) -> ClassService {
        ClassService::new(
            self.daos.school_class(),
            self.daos.teacher(),
            self.daos.grade(),
            self.daos.attendance(),
        )
    }

    pub fn grade(&self) -> GradeService {
        GradeService::new(
            self.daos.grade(),
            self.daos.student(),
            self.daos.school_class(),
        )
    }

    pub fn attendance(&self) -> AttendanceService {
        AttendanceService::new(self.daos.attendance())
    }

    pub fn check_in(&self) -> CheckInService {
        CheckInService::new(self.daos.attendance(), self.daos.school_class())
    }

    pub fn report(&self) -> ReportService {
        ReportService::new(self.daos.report(), self.config.reports.clone())
    }

    pub fn import(&self) -> ImportService {
        ImportService::new(self.daos.student(), self.config.import.clone())
    }
}
