use sea_orm::{
    ColumnTrait, DatabaseBackend, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    Order, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
    sea_query::{Expr, NullOrdering, SimpleExpr},
};
use serde::Serialize;

use super::{DaoLayerError, DaoResult};
use crate::db::entities::attendance::{self, AttendanceStatus};
use crate::db::entities::grade;
use crate::db::entities::prelude::{Attendance, Grade};
use crate::db::entities::{school_class, student};

/// Letter grade to points by its first letter; anything else is NULL and
/// drops out of the average.
const GRADE_POINTS: &str = r#"CASE UPPER(SUBSTR(TRIM("grades"."grade"), 1, 1)) WHEN 'A' THEN 4.0 WHEN 'B' THEN 3.0 WHEN 'C' THEN 2.0 WHEN 'D' THEN 1.0 WHEN 'F' THEN 0.0 END"#;

const ATTENDANCE_RATE: &str = r#"CAST(100.0 * SUM(CASE WHEN "attendance"."status" = 'Present' THEN 1 ELSE 0 END) / COUNT(*) AS DOUBLE PRECISION)"#;

#[derive(Debug, Clone, PartialEq, Serialize, FromQueryResult)]
pub struct StudentAverage {
    pub student_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub average_grade: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromQueryResult)]
pub struct ClassAverage {
    pub class_id: i32,
    pub class_name: String,
    pub average_grade: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct AttendanceCount {
    pub student_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub present_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromQueryResult)]
pub struct AttendanceRate {
    pub student_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub attendance_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromQueryResult)]
pub struct MonthlyRate {
    pub month: String,
    pub attendance_rate: f64,
}

/// Read-only aggregate queries. Nothing here writes.
#[derive(Clone)]
pub struct ReportDao {
    db: DatabaseConnection,
}

impl ReportDao {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub async fn top_students(&self, limit: u64) -> DaoResult<Vec<StudentAverage>> {
        top_students_query(limit)
            .into_model::<StudentAverage>()
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn class_performance(&self, limit: u64) -> DaoResult<Vec<ClassAverage>> {
        class_performance_query(limit)
            .into_model::<ClassAverage>()
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn attendance_summary(&self, limit: u64) -> DaoResult<Vec<AttendanceCount>> {
        Attendance::find()
            .select_only()
            .column(attendance::Column::StudentId)
            .column(student::Column::FirstName)
            .column(student::Column::LastName)
            .column_as(Expr::cust("COUNT(*)"), "present_count")
            .join(JoinType::InnerJoin, attendance::Relation::Student.def())
            .filter(attendance::Column::Status.eq(AttendanceStatus::Present.as_str()))
            .group_by(attendance::Column::StudentId)
            .group_by(student::Column::FirstName)
            .group_by(student::Column::LastName)
            .order_by(Expr::cust("present_count"), Order::Desc)
            .order_by_asc(attendance::Column::StudentId)
            .limit(limit)
            .into_model::<AttendanceCount>()
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn attendance_rates(&self) -> DaoResult<Vec<AttendanceRate>> {
        Attendance::find()
            .select_only()
            .column(attendance::Column::StudentId)
            .column(student::Column::FirstName)
            .column(student::Column::LastName)
            .column_as(Expr::cust(ATTENDANCE_RATE), "attendance_rate")
            .join(JoinType::InnerJoin, attendance::Relation::Student.def())
            .group_by(attendance::Column::StudentId)
            .group_by(student::Column::FirstName)
            .group_by(student::Column::LastName)
            .order_by(Expr::cust("attendance_rate"), Order::Desc)
            .order_by_asc(attendance::Column::StudentId)
            .into_model::<AttendanceRate>()
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn monthly_attendance_trend(&self) -> DaoResult<Vec<MonthlyRate>> {
        let month = month_expr(self.db.get_database_backend());

        Attendance::find()
            .select_only()
            .column_as(Expr::cust(month), "month")
            .column_as(Expr::cust(ATTENDANCE_RATE), "attendance_rate")
            .group_by(Expr::cust(month))
            .order_by(Expr::cust(month), Order::Asc)
            .into_model::<MonthlyRate>()
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }
}

fn average_points() -> SimpleExpr {
    Expr::cust(format!("CAST(AVG({GRADE_POINTS}) AS DOUBLE PRECISION)"))
}

fn top_students_query(limit: u64) -> Select<Grade> {
    Grade::find()
        .select_only()
        .column(grade::Column::StudentId)
        .column(student::Column::FirstName)
        .column(student::Column::LastName)
        .column_as(average_points(), "average_grade")
        .join(JoinType::InnerJoin, grade::Relation::Student.def())
        .group_by(grade::Column::StudentId)
        .group_by(student::Column::FirstName)
        .group_by(student::Column::LastName)
        .order_by_with_nulls(Expr::cust("average_grade"), Order::Desc, NullOrdering::Last)
        .order_by_asc(grade::Column::StudentId)
        .limit(limit)
}

fn class_performance_query(limit: u64) -> Select<Grade> {
    Grade::find()
        .select_only()
        .column(grade::Column::ClassId)
        .column(school_class::Column::ClassName)
        .column_as(average_points(), "average_grade")
        .join(JoinType::InnerJoin, grade::Relation::SchoolClass.def())
        .group_by(grade::Column::ClassId)
        .group_by(school_class::Column::ClassName)
        .order_by_with_nulls(Expr::cust("average_grade"), Order::Desc, NullOrdering::Last)
        .order_by_asc(grade::Column::ClassId)
        .limit(limit)
}

/// `YYYY-MM` bucket of the attendance date.
fn month_expr(backend: DatabaseBackend) -> &'static str {
    match backend {
        DatabaseBackend::Postgres => r#"to_char("attendance"."date", 'YYYY-MM')"#,
        _ => r#"strftime('%Y-%m', "attendance"."date")"#,
    }
}
