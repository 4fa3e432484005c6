pub mod attendance_dao;
pub mod base;
pub mod class_dao;
mod context;
pub mod error;
pub mod grade_dao;
pub mod report_dao;
pub mod student_dao;
pub mod teacher_dao;

pub use attendance_dao::{AttendanceDao, AttendanceRow};
pub use base::DaoBase;
pub use class_dao::{ClassDao, ClassRow};
pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use grade_dao::{GradeDao, GradeRow};
pub use report_dao::{
    AttendanceCount, AttendanceRate, ClassAverage, MonthlyRate, ReportDao, StudentAverage,
};
pub use student_dao::StudentDao;
pub use teacher_dao::TeacherDao;
