#[allow(unused_imports)]
pub mod prelude {
    pub use super::attendance::Entity as Attendance;
    pub use super::grade::Entity as Grade;
    pub use super::school_class::Entity as SchoolClass;
    pub use super::student::Entity as Student;
    pub use super::teacher::Entity as Teacher;
}

pub mod attendance;
pub mod grade;
pub mod school_class;
pub mod student;
pub mod teacher;
