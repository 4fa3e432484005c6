use sea_orm::{
    ConnectionTrait, DbErr, EntityTrait, Schema,
    sea_query::{Index, IndexCreateStatement},
};
use tracing::debug;

use crate::db::entities::{attendance, grade, school_class, student, teacher};

pub const ATTENDANCE_DAY_INDEX: &str = "ux_attendance_student_class_date";

/// Creates any missing table, parents before children, then the unique
/// index that backs the once-per-day check-in rule.
pub async fn ensure_schema<C>(db: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    create_table(db, teacher::Entity).await?;
    create_table(db, student::Entity).await?;
    create_table(db, school_class::Entity).await?;
    create_table(db, grade::Entity).await?;
    create_table(db, attendance::Entity).await?;

    let backend = db.get_database_backend();
    db.execute_unprepared(&backend.build(&attendance_day_index()).sql)
        .await?;
    Ok(())
}

async fn create_table<C, E>(db: &C, entity: E) -> Result<(), DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let mut statement = Schema::new(backend).create_table_from_entity(entity);
    statement.if_not_exists();

    debug!(table = entity.table_name(), "ensuring table");
    db.execute_unprepared(&backend.build(&statement).sql).await?;
    Ok(())
}

fn attendance_day_index() -> IndexCreateStatement {
    Index::create()
        .name(ATTENDANCE_DAY_INDEX)
        .table(attendance::Entity)
        .col(attendance::Column::StudentId)
        .col(attendance::Column::ClassId)
        .col(attendance::Column::Date)
        .unique()
        .if_not_exists()
        .to_owned()
}
