use axum::{
    Router,
    body::{self, Body},
    http::{Request, StatusCode, header},
    response::Response,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::{Value, json};
use tower::ServiceExt;

use school_desk::{
    db::entities::attendance,
    services::validation,
    test_helpers::{seed_school, test_app, test_app_with, test_config},
};

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.expect("router is infallible")
}

async fn body_text(response: Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8_lossy(&bytes).into_owned()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).expect("json body")
}

fn json_checkin(student_id: i32, class_id: i32) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/checkin")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "student_id": student_id, "class_id": class_id }).to_string(),
        ))
        .expect("request")
}

fn form_submit(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/submit")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn attendance_count(db: &sea_orm::DatabaseConnection) -> u64 {
    attendance::Entity::find()
        .count(db)
        .await
        .expect("count attendance")
}

#[tokio::test]
async fn checking_in_twice_keeps_one_row() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");

    let first = send(&app, json_checkin(100, 10)).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let first = body_json(first).await;
    assert_eq!(first["data"]["status"], "Present");
    assert_eq!(first["data"]["date"], validation::today().to_string());

    let second = send(&app, json_checkin(100, 10)).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let second = body_json(second).await;
    assert_eq!(second["message"], "Attendance already recorded for today");

    assert_eq!(attendance_count(&state.db).await, 1);
}

#[tokio::test]
async fn unknown_student_persists_nothing() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");

    let response = send(&app, json_checkin(999, 10)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Invalid student ID");
    assert_eq!(attendance_count(&state.db).await, 0);
}

#[tokio::test]
async fn unknown_class_persists_nothing() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");

    let response = send(&app, json_checkin(100, 77)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Invalid class ID");
    assert_eq!(attendance_count(&state.db).await, 0);
}

#[tokio::test]
async fn form_submission_redirects_and_records_forwarded_ip() {
    let mut cfg = test_config();
    cfg.general.trust_forwarded_for = true;
    let (app, state) = test_app_with(cfg).await.expect("app");
    seed_school(&state.db).await.expect("seed");

    let response = send(&app, form_submit("student_id=100&class_id=10")).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some("/success")
    );

    let stored = attendance::Entity::find()
        .filter(attendance::Column::StudentId.eq(100))
        .one(&state.db)
        .await
        .expect("query")
        .expect("row recorded");
    assert_eq!(stored.ip_address.as_deref(), Some("203.0.113.7"));
    assert_eq!(stored.class_id, 10);
}

#[tokio::test]
async fn forwarded_header_is_ignored_by_default() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");

    let response = send(&app, form_submit("student_id=100&class_id=10")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let stored = attendance::Entity::find()
        .one(&state.db)
        .await
        .expect("query")
        .expect("row recorded");
    assert_eq!(stored.ip_address, None);
}

#[tokio::test]
async fn duplicate_form_submission_renders_message_with_400() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");

    let first = send(&app, form_submit("student_id=100&class_id=10")).await;
    assert_eq!(first.status(), StatusCode::SEE_OTHER);

    let second = send(&app, form_submit("student_id=100&class_id=10")).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    assert!(
        body_text(second)
            .await
            .contains("Attendance already recorded for today")
    );
    assert_eq!(attendance_count(&state.db).await, 1);
}

#[tokio::test]
async fn form_submission_with_unknown_student_is_a_400_page() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");

    let response = send(&app, form_submit("student_id=5&class_id=10")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Invalid student ID"));
    assert_eq!(attendance_count(&state.db).await, 0);
}

#[tokio::test]
async fn form_submission_without_student_id_is_rejected() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");

    let response = send(&app, form_submit("student_id=&class_id=10")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Student ID is required"));
    assert_eq!(attendance_count(&state.db).await, 0);
}

#[tokio::test]
async fn landing_page_embeds_qr_for_the_form() {
    let (app, _state) = test_app().await.expect("app");

    let response = send(
        &app,
        Request::builder().uri("/").body(Body::empty()).expect("request"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<svg"));
    assert!(html.contains("127.0.0.1:3000"));
}

#[tokio::test]
async fn form_page_offers_existing_classes() {
    let (app, state) = test_app().await.expect("app");
    seed_school(&state.db).await.expect("seed");

    let response = send(
        &app,
        Request::builder()
            .uri("/form")
            .body(Body::empty())
            .expect("request"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"<option value="10">Class 10</option>"#));
}
