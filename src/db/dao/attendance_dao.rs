use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, IntoActiveModel, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set,
};
use serde::Serialize;

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::prelude::Attendance;
use crate::db::entities::{attendance, school_class, student};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct AttendanceRow {
    pub attendance_id: i32,
    pub student_id: i32,
    pub student_first_name: Option<String>,
    pub student_last_name: Option<String>,
    pub class_id: i32,
    pub class_name: Option<String>,
    pub status: String,
    pub date: NaiveDate,
    pub ip_address: Option<String>,
}

#[derive(Clone)]
pub struct AttendanceDao {
    db: DatabaseConnection,
}

impl DaoBase for AttendanceDao {
    type Entity = Attendance;
    type Model = attendance::Model;
    type ActiveModel = attendance::ActiveModel;
    type PrimaryKey = attendance::PrimaryKey;

    const ENTITY_NAME: &'static str = "Attendance record";

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    fn key_column() -> attendance::Column {
        attendance::Column::AttendanceId
    }
}

impl AttendanceDao {
    pub async fn list_display(&self) -> DaoResult<Vec<AttendanceRow>> {
        Attendance::find()
            .select_only()
            .column(attendance::Column::AttendanceId)
            .column(attendance::Column::StudentId)
            .column_as(student::Column::FirstName, "student_first_name")
            .column_as(student::Column::LastName, "student_last_name")
            .column(attendance::Column::ClassId)
            .column(school_class::Column::ClassName)
            .column(attendance::Column::Status)
            .column(attendance::Column::Date)
            .column(attendance::Column::IpAddress)
            .join(JoinType::LeftJoin, attendance::Relation::Student.def())
            .join(JoinType::LeftJoin, attendance::Relation::SchoolClass.def())
            .order_by_desc(attendance::Column::Date)
            .order_by_asc(attendance::Column::AttendanceId)
            .into_model::<AttendanceRow>()
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    /// Finds the record for one student in one class on `date`, ignoring
    /// `exclude` (the row being edited) when given.
    pub async fn find_for_day<C>(
        conn: &C,
        student_id: i32,
        class_id: i32,
        date: NaiveDate,
        exclude: Option<i32>,
    ) -> DaoResult<Option<attendance::Model>>
    where
        C: ConnectionTrait,
    {
        let mut query = Attendance::find()
            .filter(attendance::Column::StudentId.eq(student_id))
            .filter(attendance::Column::ClassId.eq(class_id))
            .filter(attendance::Column::Date.eq(date));
        if let Some(attendance_id) = exclude {
            query = query.filter(attendance::Column::AttendanceId.ne(attendance_id));
        }

        query.one(conn).await.map_err(DaoLayerError::Db)
    }

    /// Writes back status and date inside `conn`.
    pub async fn update_in<C>(
        conn: &C,
        current: attendance::Model,
        status: String,
        date: NaiveDate,
    ) -> DaoResult<attendance::Model>
    where
        C: ConnectionTrait,
    {
        let mut active = current.into_active_model();
        active.status = Set(status);
        active.date = Set(date);
        active.update(conn).await.map_err(DaoLayerError::Db)
    }
}
