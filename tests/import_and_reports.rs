use axum::{
    Router,
    body::{self, Body},
    http::{Request, StatusCode, header},
};
use sea_orm::EntityTrait;
use serde_json::Value;
use tower::ServiceExt;

use school_desk::{
    db::entities::student,
    test_helpers::{
        seed_attendance, seed_class, seed_grade, seed_school, seed_student, test_app,
    },
};

async fn json_response(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

fn import_request(query: &str, csv: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/v1/students/import{query}"))
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(csv.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

#[tokio::test]
async fn import_inserts_new_ids_and_leaves_existing_rows_alone() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");
    let csv = "student_id,first_name,last_name,dob,gender,enrollment_date\n\
               100,Someone,Else,2009-01-01,M,2019-09-01\n\
               101,Alan,Turing,2011-06-23,M,2021-09-01\n";

    let (status, body) = json_response(&app, import_request("", csv)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["inserted"], serde_json::json!([101]));
    assert_eq!(body["data"]["skipped_existing"], serde_json::json!([100]));
    assert_eq!(body["data"]["rejected"], serde_json::json!([]));

    let untouched = student::Entity::find_by_id(100)
        .one(&state.db)
        .await
        .expect("query")
        .expect("student 100");
    assert_eq!(untouched.first_name, "Grace");
    assert_eq!(untouched.last_name, "Hopper");
}

#[tokio::test]
async fn import_follows_column_mapping_and_backfills_defaults() {
    let (app, state) = test_app().await.expect("app");
    let csv = "Roll No,Given Name,Surname\n7,Mary,Jackson\n";

    let (status, body) = json_response(
        &app,
        import_request(
            "?student_id=Roll%20No&first_name=Given%20Name&last_name=Surname",
            csv,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["inserted"], serde_json::json!([7]));

    let stored = student::Entity::find_by_id(7)
        .one(&state.db)
        .await
        .expect("query")
        .expect("student 7");
    assert_eq!(stored.first_name, "Mary");
    assert_eq!(stored.gender, "M");
    assert_eq!(stored.dob.to_string(), "1900-01-01");
}

#[tokio::test]
async fn import_reports_invalid_rows_by_line() {
    let (app, _state) = test_app().await.expect("app");
    let csv = "student_id,first_name,last_name\n8,,Nameless\n9,Dorothy,Vaughan\n";

    let (status, body) = json_response(&app, import_request("", csv)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["inserted"], serde_json::json!([9]));
    assert_eq!(body["data"]["rejected"][0]["line"], 2);
    assert_eq!(body["data"]["rejected"][0]["reason"], "First name is required");
}

#[tokio::test]
async fn import_without_student_id_column_fails_whole() {
    let (app, state) = test_app().await.expect("app");
    let csv = "first_name,last_name\nAda,Lovelace\n";

    let (status, _) = json_response(&app, import_request("", csv)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        student::Entity::find()
            .all(&state.db)
            .await
            .expect("list")
            .is_empty()
    );
}

#[tokio::test]
async fn top_students_ranks_by_grade_points() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");
    seed_student(&state.db, 101, "Alan", "Turing").await.expect("seed");
    seed_grade(&state.db, 100, 10, "B").await.expect("grade");
    seed_grade(&state.db, 100, 10, "A").await.expect("grade");
    seed_grade(&state.db, 101, 10, "C+").await.expect("grade");

    let (status, body) = json_response(&app, get("/api/v1/reports/top-students?limit=5")).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().expect("rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["student_id"], 100);
    assert_eq!(rows[0]["average_grade"], 3.5);
    assert_eq!(rows[1]["student_id"], 101);
    assert_eq!(rows[1]["average_grade"], 2.0);
}

#[tokio::test]
async fn class_performance_averages_per_class() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");
    seed_class(&state.db, 11, 1).await.expect("class");
    seed_grade(&state.db, 100, 10, "D").await.expect("grade");
    seed_grade(&state.db, 100, 11, "A").await.expect("grade");

    let (status, body) = json_response(&app, get("/api/v1/reports/class-performance")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["class_id"], 11);
    assert_eq!(body["data"][0]["average_grade"], 4.0);
    assert_eq!(body["data"][1]["class_id"], 10);
}

#[tokio::test]
async fn attendance_rates_and_summary() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");
    seed_attendance(&state.db, 100, 10, "Present", "2024-01-10")
        .await
        .expect("attendance");
    seed_attendance(&state.db, 100, 10, "Absent", "2024-01-11")
        .await
        .expect("attendance");
    seed_attendance(&state.db, 100, 10, "Present", "2024-02-01")
        .await
        .expect("attendance");
    seed_attendance(&state.db, 100, 10, "Late", "2024-02-02")
        .await
        .expect("attendance");

    let (status, rates) = json_response(&app, get("/api/v1/reports/attendance-rates")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rates["data"][0]["student_id"], 100);
    assert_eq!(rates["data"][0]["attendance_rate"], 50.0);

    let (status, summary) = json_response(&app, get("/api/v1/reports/attendance-summary")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["data"][0]["present_count"], 2);

    let (status, trend) = json_response(&app, get("/api/v1/reports/attendance-trend")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(trend["data"][0]["month"], "2024-01");
    assert_eq!(trend["data"][0]["attendance_rate"], 50.0);
    assert_eq!(trend["data"][1]["month"], "2024-02");
}

#[tokio::test]
async fn zero_limit_is_rejected() {
    let (app, _state) = test_app().await.expect("app");

    let (status, body) = json_response(&app, get("/api/v1/reports/top-students?limit=0")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "limit must be at least 1");
}
