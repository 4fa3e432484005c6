use std::sync::Arc;

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use qrcode::{QrCode, render::svg};
use serde::Deserialize;

use crate::{
    error::AppError,
    middleware::ClientIp,
    services::{
        ServiceContext, checkin_service::CheckInRequest, crud_service::SelectOption, validation,
    },
    state::AppState,
};

use super::{HtmlError, error_page, html_error, message_page, project_name, render};

const QR_SIZE: u32 = 240;

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    project_name: String,
    form_url: String,
    qr_svg: String,
}

#[derive(Template)]
#[template(path = "form.html")]
struct FormTemplate {
    project_name: String,
    classes: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "success.html")]
struct SuccessTemplate {
    project_name: String,
}

/// Raw form fields; parsed and checked before the service sees them.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubmitForm {
    pub student_id: String,
    pub class_id: String,
}

impl SubmitForm {
    fn into_request(self, ip_address: Option<String>) -> Result<CheckInRequest, AppError> {
        let student_id = validation::parse_id(&self.student_id, "Student ID")?;
        let class_id = validation::parse_id(&self.class_id, "Class")?;
        Ok(CheckInRequest {
            student_id: validation::positive_id(student_id, "Student ID")?,
            class_id: validation::positive_id(class_id, "Class")?,
            ip_address,
        })
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/form", get(form))
        .route("/submit", post(submit))
        .route("/success", get(success))
}

fn qr_svg(data: &str) -> Result<String, HtmlError> {
    let code = QrCode::new(data.as_bytes()).map_err(|err| {
        tracing::error!(error = %err, "failed to encode qr code");
        html_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to encode qr code")
    })?;
    Ok(code
        .render::<svg::Color<'_>>()
        .min_dimensions(QR_SIZE, QR_SIZE)
        .build())
}

async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, HtmlError> {
    let form_url = format!("{}/form", state.config.public_base_url());
    let qr_svg = qr_svg(&form_url)?;
    render(
        &IndexTemplate {
            project_name: project_name(),
            form_url,
            qr_svg,
        },
        "index",
    )
}

async fn form(State(state): State<Arc<AppState>>) -> Response {
    match ServiceContext::from_state(&state).check_in().classes().await {
        Ok(classes) => render(
            &FormTemplate {
                project_name: project_name(),
                classes,
            },
            "check-in form",
        )
        .into_response(),
        Err(err) => error_page(&err, "/"),
    }
}

async fn submit(
    State(state): State<Arc<AppState>>,
    ClientIp(ip_address): ClientIp,
    Form(form): Form<SubmitForm>,
) -> Response {
    let result = match form.into_request(ip_address) {
        Ok(request) => {
            ServiceContext::from_state(&state)
                .check_in()
                .check_in(request, validation::today())
                .await
        }
        Err(err) => Err(err),
    };

    match result {
        Ok(_) => Redirect::to("/success").into_response(),
        Err(err) => {
            // The check-in page only distinguishes user mistakes from server trouble.
            let status = if err.is_data_access() {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                StatusCode::BAD_REQUEST
            };
            message_page(status, "Check-in failed", err.message(), "/form")
        }
    }
}

async fn success() -> Result<Html<String>, HtmlError> {
    render(
        &SuccessTemplate {
            project_name: project_name(),
        },
        "success page",
    )
}

#[cfg(test)]
mod tests {
    use super::{SubmitForm, qr_svg};
    use crate::error::AppError;

    #[test]
    fn parses_form_ids() {
        let form = SubmitForm {
            student_id: " 12 ".to_string(),
            class_id: "3".to_string(),
        };

        let request = form
            .into_request(Some("10.0.0.1".to_string()))
            .expect("valid form");

        assert_eq!(request.student_id, 12);
        assert_eq!(request.class_id, 3);
        assert_eq!(request.ip_address.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn rejects_missing_and_malformed_ids() {
        let missing = SubmitForm {
            student_id: String::new(),
            class_id: "3".to_string(),
        };
        assert_eq!(
            missing.into_request(None).unwrap_err(),
            AppError::validation("Student ID is required")
        );

        let malformed = SubmitForm {
            student_id: "abc".to_string(),
            class_id: "3".to_string(),
        };
        assert_eq!(
            malformed.into_request(None).unwrap_err(),
            AppError::validation("Student ID must be a whole number")
        );
    }

    #[test]
    fn renders_qr_as_svg() {
        let svg = qr_svg("http://127.0.0.1:3000/form").expect("qr code");

        assert!(svg.contains("<svg"));
    }
}
