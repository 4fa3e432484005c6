//! Fixtures for router-level tests: an in-memory SQLite database with the
//! full schema, plus seed helpers for the rows most tests need.

use std::sync::Arc;

use axum::Router;
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use crate::{
    config::AppConfig,
    db::{
        connection,
        entities::{attendance, grade, school_class, student, teacher},
    },
    routes,
    state::AppState,
};

pub const MEMORY_DATABASE_URL: &str = "sqlite::memory:";

/// Every pooled SQLite connection would get its own memory database, so the
/// pool is pinned to one.
pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.database.url = MEMORY_DATABASE_URL.to_string();
    cfg.database.max_connections = 1;
    cfg.database.min_idle = 1;
    cfg
}

pub async fn test_state() -> anyhow::Result<Arc<AppState>> {
    test_state_with(test_config()).await
}

pub async fn test_state_with(cfg: AppConfig) -> anyhow::Result<Arc<AppState>> {
    let db = connection::connect(&cfg.database).await?;
    Ok(AppState::new(cfg, db))
}

/// The fully layered application over a fresh database.
pub async fn test_app() -> anyhow::Result<(Router, Arc<AppState>)> {
    test_app_with(test_config()).await
}

pub async fn test_app_with(cfg: AppConfig) -> anyhow::Result<(Router, Arc<AppState>)> {
    let state = test_state_with(cfg).await?;
    Ok((routes::app(Arc::clone(&state)), state))
}

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap_or(NaiveDate::MIN)
}

pub async fn seed_teacher(db: &DatabaseConnection, teacher_id: i32) -> anyhow::Result<teacher::Model> {
    Ok(teacher::ActiveModel {
        teacher_id: Set(teacher_id),
        first_name: Set("Ada".to_string()),
        last_name: Set("Lovelace".to_string()),
        subject: Set("Mathematics".to_string()),
    }
    .insert(db)
    .await?)
}

pub async fn seed_class(
    db: &DatabaseConnection,
    class_id: i32,
    teacher_id: i32,
) -> anyhow::Result<school_class::Model> {
    Ok(school_class::ActiveModel {
        class_id: Set(class_id),
        class_name: Set(format!("Class {class_id}")),
        teacher_id: Set(teacher_id),
    }
    .insert(db)
    .await?)
}

pub async fn seed_student(
    db: &DatabaseConnection,
    student_id: i32,
    first_name: &str,
    last_name: &str,
) -> anyhow::Result<student::Model> {
    Ok(student::ActiveModel {
        student_id: Set(student_id),
        first_name: Set(first_name.to_string()),
        last_name: Set(last_name.to_string()),
        dob: Set(date("2010-05-01")),
        gender: Set("F".to_string()),
        enrollment_date: Set(date("2020-09-01")),
    }
    .insert(db)
    .await?)
}

pub async fn seed_grade(
    db: &DatabaseConnection,
    student_id: i32,
    class_id: i32,
    letter: &str,
) -> anyhow::Result<grade::Model> {
    Ok(grade::ActiveModel {
        student_id: Set(student_id),
        class_id: Set(class_id),
        grade: Set(letter.to_string()),
        date_assigned: Set(date("2024-01-15")),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn seed_attendance(
    db: &DatabaseConnection,
    student_id: i32,
    class_id: i32,
    status: &str,
    day: &str,
) -> anyhow::Result<attendance::Model> {
    Ok(attendance::ActiveModel {
        student_id: Set(student_id),
        class_id: Set(class_id),
        status: Set(status.to_string()),
        date: Set(date(day)),
        ip_address: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

/// Teacher 1, class 10 taught by them, and student 100.
pub async fn seed_school(db: &DatabaseConnection) -> anyhow::Result<()> {
    seed_teacher(db, 1).await?;
    seed_class(db, 10, 1).await?;
    seed_student(db, 100, "Grace", "Hopper").await?;
    Ok(())
}
