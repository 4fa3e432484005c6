pub mod attendance_service;
pub mod checkin_service;
pub mod class_service;
pub mod context;
pub mod crud_service;
pub mod grade_service;
pub mod import_service;
pub mod report_service;
pub mod student_service;
pub mod teacher_service;
pub mod validation;

pub use context::ServiceContext;
