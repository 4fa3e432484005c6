use serde::Serialize;

use crate::{
    config::ReportsConfig,
    db::dao::{
        AttendanceCount, AttendanceRate, ClassAverage, DaoLayerError, MonthlyRate, ReportDao,
        StudentAverage,
    },
    error::AppError,
};

/// The canned reports offered on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    TopStudents,
    ClassPerformance,
    AttendanceSummary,
    AttendanceRates,
    AttendanceTrend,
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        ReportKind::TopStudents,
        ReportKind::ClassPerformance,
        ReportKind::AttendanceSummary,
        ReportKind::AttendanceRates,
        ReportKind::AttendanceTrend,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ReportKind::TopStudents => "top-students",
            ReportKind::ClassPerformance => "class-performance",
            ReportKind::AttendanceSummary => "attendance-summary",
            ReportKind::AttendanceRates => "attendance-rates",
            ReportKind::AttendanceTrend => "attendance-trend",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportKind::TopStudents => "Top students by average grade",
            ReportKind::ClassPerformance => "Class performance",
            ReportKind::AttendanceSummary => "Attendance summary",
            ReportKind::AttendanceRates => "Attendance rate per student",
            ReportKind::AttendanceTrend => "Monthly attendance trend",
        }
    }

    /// Whether the report takes a row limit.
    pub fn is_limited(self) -> bool {
        matches!(
            self,
            ReportKind::TopStudents | ReportKind::ClassPerformance | ReportKind::AttendanceSummary
        )
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug() == slug)
    }
}

#[derive(Clone)]
pub struct ReportService {
    report_dao: ReportDao,
    config: ReportsConfig,
}

impl ReportService {
    pub fn new(report_dao: ReportDao, config: ReportsConfig) -> Self {
        Self { report_dao, config }
    }

    /// `None` means the configured default; anything above the maximum is
    /// capped.
    pub fn resolve_limit(&self, requested: Option<u64>) -> Result<u64, AppError> {
        match requested {
            None => Ok(self.config.default_limit),
            Some(0) => Err(AppError::validation("limit must be at least 1")),
            Some(limit) => Ok(limit.min(self.config.max_limit)),
        }
    }

    pub async fn top_students(&self, limit: Option<u64>) -> Result<Vec<StudentAverage>, AppError> {
        let limit = self.resolve_limit(limit)?;
        self.report_dao.top_students(limit).await.map_err(report_error)
    }

    pub async fn class_performance(
        &self,
        limit: Option<u64>,
    ) -> Result<Vec<ClassAverage>, AppError> {
        let limit = self.resolve_limit(limit)?;
        self.report_dao
            .class_performance(limit)
            .await
            .map_err(report_error)
    }

    pub async fn attendance_summary(
        &self,
        limit: Option<u64>,
    ) -> Result<Vec<AttendanceCount>, AppError> {
        let limit = self.resolve_limit(limit)?;
        self.report_dao
            .attendance_summary(limit)
            .await
            .map_err(report_error)
    }

    pub async fn attendance_rates(&self) -> Result<Vec<AttendanceRate>, AppError> {
        self.report_dao.attendance_rates().await.map_err(report_error)
    }

    pub async fn monthly_attendance_trend(&self) -> Result<Vec<MonthlyRate>, AppError> {
        self.report_dao
            .monthly_attendance_trend()
            .await
            .map_err(report_error)
    }
}

fn report_error(err: DaoLayerError) -> AppError {
    match err {
        DaoLayerError::Db(db_err) => AppError::data_access_with_source(
            "Report failed. Please check the logs for more details",
            &db_err,
        ),
        other => other.into(),
    }
}
