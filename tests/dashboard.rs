use axum::{
    Router,
    body::{self, Body},
    http::{Request, StatusCode, header},
    response::Response,
};
use sea_orm::{EntityTrait, PaginatorTrait};
use tower::ServiceExt;

use school_desk::{
    db::entities::{grade, student, teacher},
    test_helpers::{seed_attendance, seed_school, test_app},
};

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.expect("router is infallible")
}

async fn page(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = send(app, request).await;
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn dashboard_root_redirects_to_students() {
    let (app, _state) = test_app().await.expect("app");

    let response = send(&app, get("/dashboard")).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some("/dashboard/students")
    );
}

#[tokio::test]
async fn students_section_lists_rows() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");

    let (status, html) = page(&app, get("/dashboard/students")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Grace"));
    assert!(html.contains("Hopper"));
    assert!(html.contains("New student"));
}

#[tokio::test]
async fn unknown_section_is_not_found() {
    let (app, _state) = test_app().await.expect("app");

    let (status, _) = page(&app, get("/dashboard/payroll")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_create_rerenders_with_error_and_keeps_input() {
    let (app, state) = test_app().await.expect("app");

    let (status, html) = page(
        &app,
        post_form(
            "/dashboard/teachers",
            "teacher_id=7&first_name=Emmy&last_name=Noether&subject=",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(html.contains("Subject is required"));
    assert!(html.contains(r#"value="Noether""#));
    assert_eq!(teacher::Entity::find().count(&state.db).await.expect("count"), 0);
}

#[tokio::test]
async fn create_shows_notice() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");

    let (status, html) = page(
        &app,
        post_form(
            "/dashboard/grades",
            "student_id=100&class_id=10&grade=A-&date_assigned=2024-02-02",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Grade 1 added"));
    assert_eq!(grade::Entity::find().count(&state.db).await.expect("count"), 1);
}

#[tokio::test]
async fn edit_query_prefills_the_update_form() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");

    let (status, html) = page(&app, get("/dashboard/students?edit=100")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Edit student 100"));
    assert!(html.contains(r#"value="2010-05-01""#));
}

#[tokio::test]
async fn edit_of_a_missing_row_shows_not_found() {
    let (app, _state) = test_app().await.expect("app");

    let (status, html) = page(&app, get("/dashboard/teachers?edit=55")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(html.contains("Teacher 55 not found"));
}

#[tokio::test]
async fn update_changes_the_row() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");

    let (status, html) = page(
        &app,
        post_form(
            "/dashboard/students/100",
            "first_name=Grace&last_name=Murray&dob=2010-05-01&gender=F&enrollment_date=2020-09-01",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Student 100 updated"));
    let stored = student::Entity::find_by_id(100)
        .one(&state.db)
        .await
        .expect("query")
        .expect("student");
    assert_eq!(stored.last_name, "Murray");
}

#[tokio::test]
async fn clearing_a_required_field_fails_the_update() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");

    let (status, html) = page(
        &app,
        post_form(
            "/dashboard/students/100",
            "first_name=&last_name=Murray&dob=2010-05-01&gender=F&enrollment_date=2020-09-01",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(html.contains("First name is required"));
    assert!(!html.contains("Student 100 updated"));
    let stored = student::Entity::find_by_id(100)
        .one(&state.db)
        .await
        .expect("query")
        .expect("student");
    assert_eq!(stored.first_name, "Grace");
    assert_eq!(stored.last_name, "Hopper");
}

#[tokio::test]
async fn clearing_a_date_fails_the_update() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");

    let (status, html) = page(
        &app,
        post_form(
            "/dashboard/students/100",
            "first_name=Grace&last_name=Hopper&dob=&gender=F&enrollment_date=2020-09-01",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(html.contains("Date of birth is required"));
}

#[tokio::test]
async fn malformed_path_id_renders_inline_error() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");

    let (status, html) = page(&app, post_form("/dashboard/students/abc/delete", "")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(html.contains("ID must be a whole number"));
    assert!(html.contains("Grace"));

    let (status, html) = page(&app, post_form("/dashboard/teachers/x1", "first_name=Ada")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(html.contains("ID must be a whole number"));
    assert_eq!(student::Entity::find().count(&state.db).await.expect("count"), 1);
}

#[tokio::test]
async fn referenced_delete_is_refused_inline() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");
    seed_attendance(&state.db, 100, 10, "Absent", "2024-02-01")
        .await
        .expect("seed attendance");

    let (status, html) = page(&app, post_form("/dashboard/students/100/delete", "")).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(html.contains("still has"));
    assert_eq!(student::Entity::find().count(&state.db).await.expect("count"), 1);
}

#[tokio::test]
async fn delete_removes_the_row() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");

    let (status, html) = page(&app, post_form("/dashboard/students/100/delete", "")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Student 100 deleted"));
    assert_eq!(student::Entity::find().count(&state.db).await.expect("count"), 0);
}

#[tokio::test]
async fn csv_import_from_the_dashboard() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");
    let body = "csv=ID%2CGiven%2CFamily%0A100%2CX%2CY%0A101%2CAlan%2CTuring%0A\
                &map_student_id=ID&map_first_name=Given&map_last_name=Family";

    let (status, html) = page(&app, post_form("/dashboard/students/import", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Imported 1 students, skipped 1 existing, rejected 0 rows"));
    assert_eq!(student::Entity::find().count(&state.db).await.expect("count"), 2);
}

#[tokio::test]
async fn reports_section_renders_selected_report() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");
    seed_attendance(&state.db, 100, 10, "Present", "2024-02-01")
        .await
        .expect("seed attendance");

    let (status, html) = page(&app, get("/dashboard/reports?report=attendance-trend")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Monthly attendance trend"));
    assert!(html.contains("2024-02"));
    assert!(html.contains("100.00"));
}

#[tokio::test]
async fn report_limit_must_be_positive() {
    let (app, _state) = test_app().await.expect("app");

    let (status, html) = page(&app, get("/dashboard/reports?report=top-students&limit=0")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(html.contains("limit must be at least 1"));
}
