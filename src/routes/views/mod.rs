pub mod checkin;
pub mod dashboard;

use std::sync::Arc;

use askama::Template;
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::{error::AppError, state::AppState};

pub type HtmlError = (StatusCode, Html<String>);

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(checkin::router())
        .merge(dashboard::router())
        .with_state(state)
}

#[derive(Template)]
#[template(path = "message.html")]
struct MessageTemplate<'a> {
    project_name: String,
    title: &'a str,
    message: &'a str,
    back_href: &'a str,
}

pub(crate) fn render<T: Template>(template: &T, what: &'static str) -> Result<Html<String>, HtmlError> {
    template.render().map(Html).map_err(|err| {
        tracing::error!(error = %err, "failed to render {what}");
        html_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to render page")
    })
}

/// Inline error page with the given status.
pub(crate) fn message_page(status: StatusCode, title: &str, message: &str, back_href: &str) -> Response {
    let page = MessageTemplate {
        project_name: project_name(),
        title,
        message,
        back_href,
    };
    match render(&page, "message page") {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) fn error_page(err: &AppError, back_href: &str) -> Response {
    message_page(err.status(), "Something went wrong", err.message(), back_href)
}

pub(crate) fn project_name() -> String {
    env!("CARGO_PKG_NAME")
        .split(['_', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn html_error(status: StatusCode, message: &'static str) -> HtmlError {
    (status, Html(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::project_name;

    #[test]
    fn project_name_is_title_cased() {
        assert_eq!(project_name(), "School Desk");
    }
}
