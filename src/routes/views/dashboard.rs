use std::{collections::HashMap, sync::Arc};

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    db::entities::{attendance::AttendanceStatus, student::Gender},
    error::AppError,
    services::{
        ServiceContext,
        attendance_service::{AttendanceChanges, AttendanceDraft},
        class_service::{ClassChanges, ClassDraft},
        crud_service::SelectOption,
        grade_service::{GradeChanges, GradeDraft},
        import_service::{ColumnMapping, ImportReport},
        report_service::{ReportKind, ReportService},
        student_service::{StudentChanges, StudentDraft},
        teacher_service::{TeacherChanges, TeacherDraft},
        validation,
    },
    state::AppState,
};

use super::{message_page, project_name, render};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Students,
    Teachers,
    Classes,
    Grades,
    Attendance,
    Reports,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Students,
        Section::Teachers,
        Section::Classes,
        Section::Grades,
        Section::Attendance,
        Section::Reports,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Section::Students => "students",
            Section::Teachers => "teachers",
            Section::Classes => "classes",
            Section::Grades => "grades",
            Section::Attendance => "attendance",
            Section::Reports => "reports",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Section::Students => "Students",
            Section::Teachers => "Teachers",
            Section::Classes => "Classes",
            Section::Grades => "Grades",
            Section::Attendance => "Attendance",
            Section::Reports => "Reports",
        }
    }

    /// One row of the section, as used in messages.
    pub fn noun(self) -> &'static str {
        match self {
            Section::Students => "Student",
            Section::Teachers => "Teacher",
            Section::Classes => "Class",
            Section::Grades => "Grade",
            Section::Attendance => "Attendance record",
            Section::Reports => "Report",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.slug() == slug)
    }

    fn href(self) -> String {
        format!("/dashboard/{}", self.slug())
    }
}

pub struct NavItem {
    pub href: String,
    pub title: &'static str,
    pub active: bool,
}

pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    /// An `<input>` type, or `select` / `textarea`.
    pub kind: &'static str,
    pub value: String,
    pub options: Vec<OptionView>,
}

impl FieldView {
    fn input(kind: &'static str, name: &'static str, label: &'static str, value: String) -> Self {
        Self {
            name,
            label,
            kind,
            value,
            options: Vec::new(),
        }
    }

    fn text(name: &'static str, label: &'static str, value: String) -> Self {
        Self::input("text", name, label, value)
    }

    fn number(name: &'static str, label: &'static str, value: String) -> Self {
        Self::input("number", name, label, value)
    }

    fn date(name: &'static str, label: &'static str, value: String) -> Self {
        Self::input("date", name, label, value)
    }

    fn textarea(name: &'static str, label: &'static str, value: String) -> Self {
        Self::input("textarea", name, label, value)
    }

    /// Select with a leading empty choice.
    fn select(
        name: &'static str,
        label: &'static str,
        choices: Vec<SelectOption>,
        selected: String,
    ) -> Self {
        let mut options = vec![OptionView {
            value: String::new(),
            label: "Select...".to_string(),
            selected: selected.is_empty(),
        }];
        options.extend(choices.into_iter().map(|choice| {
            let value = choice.value.to_string();
            OptionView {
                selected: value == selected,
                value,
                label: choice.label,
            }
        }));
        Self {
            name,
            label,
            kind: "select",
            value: selected,
            options,
        }
    }

    fn fixed_select(
        name: &'static str,
        label: &'static str,
        values: &[&'static str],
        selected: String,
    ) -> Self {
        let options = values
            .iter()
            .map(|value| OptionView {
                value: value.to_string(),
                label: value.to_string(),
                selected: *value == selected,
            })
            .collect();
        Self {
            name,
            label,
            kind: "select",
            value: selected,
            options,
        }
    }
}

pub struct FormView {
    pub heading: String,
    pub action: String,
    pub method: &'static str,
    pub submit: &'static str,
    pub fields: Vec<FieldView>,
}

pub struct RowView {
    /// Empty for read-only rows.
    pub id: String,
    pub cells: Vec<String>,
}

#[derive(Default)]
pub struct TableView {
    pub columns: Vec<&'static str>,
    pub rows: Vec<RowView>,
}

impl TableView {
    fn new(columns: Vec<&'static str>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    fn push(&mut self, id: i32, cells: Vec<String>) {
        self.rows.push(RowView {
            id: id.to_string(),
            cells,
        });
    }

    fn push_readonly(&mut self, cells: Vec<String>) {
        self.rows.push(RowView {
            id: String::new(),
            cells,
        });
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    project_name: String,
    title: &'static str,
    section_href: String,
    nav: Vec<NavItem>,
    report_links: Vec<NavItem>,
    table_title: String,
    notice: String,
    error: String,
    details: Vec<String>,
    forms: Vec<FormView>,
    table: TableView,
}

/// What the last mutation produced, shown above the section.
#[derive(Default)]
struct Outcome {
    notice: Option<String>,
    error: Option<AppError>,
    details: Vec<String>,
}

impl Outcome {
    fn from_result(result: Result<String, AppError>) -> Self {
        match result {
            Ok(notice) => Self {
                notice: Some(notice),
                ..Self::default()
            },
            Err(err) => Self::failed(err),
        }
    }

    fn failed(err: AppError) -> Self {
        Self {
            error: Some(err),
            ..Self::default()
        }
    }

    /// Keeps the first error; later ones are logged only.
    fn record(&mut self, err: AppError) {
        match &self.error {
            Some(_) => tracing::debug!(error = %err, "dashboard error suppressed"),
            None => self.error = Some(err),
        }
    }

    fn status(&self) -> StatusCode {
        self.error
            .as_ref()
            .map(AppError::status)
            .unwrap_or(StatusCode::OK)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DashboardQuery {
    pub edit: Option<String>,
    pub report: Option<String>,
    pub limit: Option<String>,
}

#[derive(Default)]
struct ViewParams {
    edit: Option<i32>,
    report: Option<ReportKind>,
    limit: Option<u64>,
}

/// Urlencoded form fields by name.
#[derive(Debug, Default)]
pub struct FormFields(HashMap<String, String>);

impl FormFields {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self(fields)
    }

    fn raw(&self, name: &str) -> &str {
        self.0.get(name).map(String::as_str).unwrap_or_default()
    }

    fn text(&self, name: &str) -> Option<String> {
        validation::non_blank(self.raw(name))
    }

    fn id(&self, name: &str, label: &str) -> Result<Option<i32>, AppError> {
        validation::parse_id(self.raw(name), label)
    }

    fn date(&self, name: &str, label: &str) -> Result<Option<NaiveDate>, AppError> {
        validation::parse_date(self.raw(name), label)
    }

    /// Update forms: a field that was submitted replaces the stored value even
    /// when blank, so clearing a required field fails validation. Only a field
    /// missing from the form keeps the stored value.
    fn edited(&self, name: &str) -> Option<String> {
        self.0.get(name).map(|value| value.trim().to_string())
    }

    fn edited_id(&self, name: &str, label: &str) -> Result<Option<i32>, AppError> {
        match self.0.get(name) {
            Some(value) if value.trim().is_empty() => Err(blank(label)),
            _ => self.id(name, label),
        }
    }

    fn edited_date(&self, name: &str, label: &str) -> Result<Option<NaiveDate>, AppError> {
        match self.0.get(name) {
            Some(value) if value.trim().is_empty() => Err(blank(label)),
            _ => self.date(name, label),
        }
    }
}

fn blank(label: &str) -> AppError {
    AppError::validation(format!("{label} is required"))
}

/// Row id from the URL path.
fn path_id(raw: &str) -> Result<i32, AppError> {
    validation::positive_id(validation::parse_id(raw, "ID")?, "ID")
}

/// The submitted value when re-rendering after a failure, otherwise `stored`.
fn pick(submitted: Option<&FormFields>, name: &str, stored: String) -> String {
    match submitted.and_then(|fields| fields.0.get(name)) {
        Some(value) => value.clone(),
        None => stored,
    }
}

fn name_or_dash(first: Option<String>, last: Option<String>) -> String {
    match (first, last) {
        (Some(first), Some(last)) => format!("{first} {last}"),
        _ => "-".to_string(),
    }
}

fn decimal(value: Option<f64>) -> String {
    value
        .map(|value| format!("{value:.2}"))
        .unwrap_or_else(|| "-".to_string())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard", get(|| async { Redirect::to("/dashboard/students") }))
        .route("/dashboard/{section}", get(show).post(create))
        .route("/dashboard/{section}/{id}", post(update))
        .route("/dashboard/{section}/{id}/delete", post(delete))
        .route("/dashboard/students/import", post(import))
}

fn unknown_section() -> Response {
    message_page(
        StatusCode::NOT_FOUND,
        "Not found",
        "Unknown dashboard section",
        "/dashboard",
    )
}

async fn show(
    State(state): State<Arc<AppState>>,
    Path(section): Path<String>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let Some(section) = Section::from_slug(&section) else {
        return unknown_section();
    };

    let mut outcome = Outcome::default();
    let mut params = ViewParams::default();
    match query.edit.as_deref().map(|raw| validation::parse_id(raw, "edit")) {
        Some(Ok(edit)) => params.edit = edit,
        Some(Err(err)) => outcome.record(err),
        None => {}
    }
    params.report = query.report.as_deref().and_then(ReportKind::from_slug);
    if let Some(raw) = query.limit.as_deref().and_then(validation::non_blank) {
        match raw.parse::<u64>() {
            Ok(limit) => params.limit = Some(limit),
            Err(_) => outcome.record(AppError::validation("limit must be a whole number")),
        }
    }

    let ctx = ServiceContext::from_state(&state);
    render_section(&ctx, section, params, outcome, None).await
}

async fn create(
    State(state): State<Arc<AppState>>,
    Path(section): Path<String>,
    Form(raw): Form<HashMap<String, String>>,
) -> Response {
    let Some(section) = Section::from_slug(&section) else {
        return unknown_section();
    };
    let ctx = ServiceContext::from_state(&state);
    let fields = FormFields::new(raw);

    let outcome = Outcome::from_result(create_entity(&ctx, section, &fields).await);
    let submitted = outcome.error.is_some().then_some(&fields);
    render_section(&ctx, section, ViewParams::default(), outcome, submitted).await
}

async fn update(
    State(state): State<Arc<AppState>>,
    Path((section, id)): Path<(String, String)>,
    Form(raw): Form<HashMap<String, String>>,
) -> Response {
    let Some(section) = Section::from_slug(&section) else {
        return unknown_section();
    };
    let ctx = ServiceContext::from_state(&state);
    let id = match path_id(&id) {
        Ok(id) => id,
        Err(err) => {
            return render_section(&ctx, section, ViewParams::default(), Outcome::failed(err), None)
                .await;
        }
    };
    let fields = FormFields::new(raw);

    let outcome = Outcome::from_result(update_entity(&ctx, section, id, &fields).await);
    let (params, submitted) = if outcome.error.is_some() {
        let params = ViewParams {
            edit: Some(id),
            ..ViewParams::default()
        };
        (params, Some(&fields))
    } else {
        (ViewParams::default(), None)
    };
    render_section(&ctx, section, params, outcome, submitted).await
}

async fn delete(
    State(state): State<Arc<AppState>>,
    Path((section, id)): Path<(String, String)>,
) -> Response {
    let Some(section) = Section::from_slug(&section) else {
        return unknown_section();
    };
    let ctx = ServiceContext::from_state(&state);

    let result = match path_id(&id) {
        Ok(id) => delete_entity(&ctx, section, id).await,
        Err(err) => Err(err),
    };
    let outcome = Outcome::from_result(result);
    render_section(&ctx, section, ViewParams::default(), outcome, None).await
}

async fn import(State(state): State<Arc<AppState>>, Form(raw): Form<HashMap<String, String>>) -> Response {
    let ctx = ServiceContext::from_state(&state);
    let fields = FormFields::new(raw);
    let mapping = ColumnMapping {
        student_id: fields.text("map_student_id"),
        first_name: fields.text("map_first_name"),
        last_name: fields.text("map_last_name"),
        dob: fields.text("map_dob"),
        gender: fields.text("map_gender"),
        enrollment_date: fields.text("map_enrollment_date"),
    };

    let outcome = match ctx
        .import()
        .import_students(fields.raw("csv"), &mapping, validation::today())
        .await
    {
        Ok(report) => import_outcome(&report),
        Err(err) => Outcome::failed(err),
    };
    let submitted = outcome.error.is_some().then_some(&fields);
    render_section(&ctx, Section::Students, ViewParams::default(), outcome, submitted).await
}

fn import_outcome(report: &ImportReport) -> Outcome {
    let notice = format!(
        "Imported {} students, skipped {} existing, rejected {} rows",
        report.inserted.len(),
        report.skipped_existing.len(),
        report.rejected.len()
    );
    Outcome {
        notice: Some(notice),
        error: None,
        details: report
            .rejected
            .iter()
            .map(|row| format!("Line {}: {}", row.line, row.reason))
            .collect(),
    }
}

async fn create_entity(
    ctx: &ServiceContext,
    section: Section,
    fields: &FormFields,
) -> Result<String, AppError> {
    match section {
        Section::Students => {
            let draft = StudentDraft {
                student_id: fields.id("student_id", "Student ID")?,
                first_name: fields.text("first_name"),
                last_name: fields.text("last_name"),
                dob: fields.date("dob", "Date of birth")?,
                gender: fields.text("gender"),
                enrollment_date: fields.date("enrollment_date", "Enrollment date")?,
            };
            let created = ctx.student().create_student(draft).await?;
            Ok(format!("Student {} added", created.student_id))
        }
        Section::Teachers => {
            let draft = TeacherDraft {
                teacher_id: fields.id("teacher_id", "Teacher ID")?,
                first_name: fields.text("first_name"),
                last_name: fields.text("last_name"),
                subject: fields.text("subject"),
            };
            let created = ctx.teacher().create_teacher(draft).await?;
            Ok(format!("Teacher {} added", created.teacher_id))
        }
        Section::Classes => {
            let draft = ClassDraft {
                class_id: fields.id("class_id", "Class ID")?,
                class_name: fields.text("class_name"),
                teacher_id: fields.id("teacher_id", "Teacher ID")?,
            };
            let created = ctx.school_class().create_class(draft).await?;
            Ok(format!("Class {} added", created.class_id))
        }
        Section::Grades => {
            let draft = GradeDraft {
                student_id: fields.id("student_id", "Student ID")?,
                class_id: fields.id("class_id", "Class ID")?,
                grade: fields.text("grade"),
                date_assigned: fields.date("date_assigned", "Date assigned")?,
            };
            let created = ctx.grade().create_grade(draft).await?;
            Ok(format!("Grade {} added", created.grade_id))
        }
        Section::Attendance => {
            let draft = AttendanceDraft {
                student_id: fields.id("student_id", "Student ID")?,
                class_id: fields.id("class_id", "Class ID")?,
                status: fields.text("status"),
                date: fields.date("date", "Date")?,
            };
            let created = ctx.attendance().create_attendance(draft).await?;
            Ok(format!("Attendance record {} added", created.attendance_id))
        }
        Section::Reports => Err(AppError::validation("Reports are read-only")),
    }
}

async fn update_entity(
    ctx: &ServiceContext,
    section: Section,
    id: i32,
    fields: &FormFields,
) -> Result<String, AppError> {
    match section {
        Section::Students => {
            let changes = StudentChanges {
                first_name: fields.edited("first_name"),
                last_name: fields.edited("last_name"),
                dob: fields.edited_date("dob", "Date of birth")?,
                gender: fields.edited("gender"),
                enrollment_date: fields.edited_date("enrollment_date", "Enrollment date")?,
            };
            ctx.student().update_student(id, changes).await?;
            Ok(format!("Student {id} updated"))
        }
        Section::Teachers => {
            let changes = TeacherChanges {
                first_name: fields.edited("first_name"),
                last_name: fields.edited("last_name"),
                subject: fields.edited("subject"),
            };
            ctx.teacher().update_teacher(id, changes).await?;
            Ok(format!("Teacher {id} updated"))
        }
        Section::Classes => {
            let changes = ClassChanges {
                class_name: fields.edited("class_name"),
                teacher_id: fields.edited_id("teacher_id", "Teacher ID")?,
            };
            ctx.school_class().update_class(id, changes).await?;
            Ok(format!("Class {id} updated"))
        }
        Section::Grades => {
            let changes = GradeChanges {
                grade: fields.edited("grade"),
                date_assigned: fields.edited_date("date_assigned", "Date assigned")?,
            };
            ctx.grade().update_grade(id, changes).await?;
            Ok(format!("Grade {id} updated"))
        }
        Section::Attendance => {
            let changes = AttendanceChanges {
                status: fields.edited("status"),
                date: fields.edited_date("date", "Date")?,
            };
            ctx.attendance().update_attendance(id, changes).await?;
            Ok(format!("Attendance record {id} updated"))
        }
        Section::Reports => Err(AppError::validation("Reports are read-only")),
    }
}

async fn delete_entity(ctx: &ServiceContext, section: Section, id: i32) -> Result<String, AppError> {
    match section {
        Section::Students => ctx.student().delete_student(id).await?,
        Section::Teachers => ctx.teacher().delete_teacher(id).await?,
        Section::Classes => ctx.school_class().delete_class(id).await?,
        Section::Grades => ctx.grade().delete_grade(id).await?,
        Section::Attendance => ctx.attendance().delete_attendance(id).await?,
        Section::Reports => return Err(AppError::validation("Reports are read-only")),
    }
    Ok(format!("{} {id} deleted", section.noun()))
}

/// Listing, forms and messages for one section.
struct SectionView {
    table_title: String,
    forms: Vec<FormView>,
    table: TableView,
}

async fn render_section(
    ctx: &ServiceContext,
    section: Section,
    params: ViewParams,
    mut outcome: Outcome,
    submitted: Option<&FormFields>,
) -> Response {
    let view = match build_view(ctx, section, &params, &mut outcome, submitted).await {
        Ok(view) => view,
        Err(err) => return super::error_page(&err, "/dashboard"),
    };

    let nav = Section::ALL
        .into_iter()
        .map(|item| NavItem {
            href: item.href(),
            title: item.title(),
            active: item == section,
        })
        .collect();
    let report_links = if section == Section::Reports {
        let current = params.report.unwrap_or(ReportKind::TopStudents);
        ReportKind::ALL
            .into_iter()
            .map(|kind| NavItem {
                href: format!("/dashboard/reports?report={}", kind.slug()),
                title: kind.title(),
                active: kind == current,
            })
            .collect()
    } else {
        Vec::new()
    };

    let status = outcome.status();
    let page = DashboardTemplate {
        project_name: project_name(),
        title: section.title(),
        section_href: section.href(),
        nav,
        report_links,
        table_title: view.table_title,
        notice: outcome.notice.unwrap_or_default(),
        error: outcome
            .error
            .map(|err| err.message().to_string())
            .unwrap_or_default(),
        details: outcome.details,
        forms: view.forms,
        table: view.table,
    };
    match render(&page, "dashboard") {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn build_view(
    ctx: &ServiceContext,
    section: Section,
    params: &ViewParams,
    outcome: &mut Outcome,
    submitted: Option<&FormFields>,
) -> Result<SectionView, AppError> {
    match section {
        Section::Students => students_view(ctx, params.edit, outcome, submitted).await,
        Section::Teachers => teachers_view(ctx, params.edit, outcome, submitted).await,
        Section::Classes => classes_view(ctx, params.edit, outcome, submitted).await,
        Section::Grades => grades_view(ctx, params.edit, outcome, submitted).await,
        Section::Attendance => attendance_view(ctx, params.edit, outcome, submitted).await,
        Section::Reports => reports_view(ctx, params, outcome).await,
    }
}

fn create_form(section: Section, fields: Vec<FieldView>) -> FormView {
    FormView {
        heading: format!("New {}", section.noun().to_lowercase()),
        action: section.href(),
        method: "post",
        submit: "Add",
        fields,
    }
}

fn edit_form(section: Section, id: i32, fields: Vec<FieldView>) -> FormView {
    FormView {
        heading: format!("Edit {} {id}", section.noun().to_lowercase()),
        action: format!("{}/{id}", section.href()),
        method: "post",
        submit: "Save",
        fields,
    }
}

async fn students_view(
    ctx: &ServiceContext,
    edit: Option<i32>,
    outcome: &mut Outcome,
    submitted: Option<&FormFields>,
) -> Result<SectionView, AppError> {
    let service = ctx.student();
    let genders: Vec<&'static str> = Gender::ALL.iter().map(Gender::as_str).collect();
    let mut forms = Vec::new();

    if let Some(id) = edit {
        match service.get_student(id).await {
            Ok(student) => forms.push(edit_form(
                Section::Students,
                id,
                vec![
                    FieldView::text("first_name", "First name", pick(submitted, "first_name", student.first_name)),
                    FieldView::text("last_name", "Last name", pick(submitted, "last_name", student.last_name)),
                    FieldView::date("dob", "Date of birth", pick(submitted, "dob", student.dob.to_string())),
                    FieldView::fixed_select("gender", "Gender", &genders, pick(submitted, "gender", student.gender)),
                    FieldView::date(
                        "enrollment_date",
                        "Enrollment date",
                        pick(submitted, "enrollment_date", student.enrollment_date.to_string()),
                    ),
                ],
            )),
            Err(err) => outcome.record(err),
        }
    }

    let creating = if edit.is_some() { None } else { submitted };
    forms.push(create_form(
        Section::Students,
        vec![
            FieldView::number("student_id", "Student ID", pick(creating, "student_id", String::new())),
            FieldView::text("first_name", "First name", pick(creating, "first_name", String::new())),
            FieldView::text("last_name", "Last name", pick(creating, "last_name", String::new())),
            FieldView::date("dob", "Date of birth", pick(creating, "dob", String::new())),
            FieldView::fixed_select("gender", "Gender", &genders, pick(creating, "gender", "M".to_string())),
            FieldView::date(
                "enrollment_date",
                "Enrollment date",
                pick(creating, "enrollment_date", String::new()),
            ),
        ],
    ));
    forms.push(FormView {
        heading: "Import students from CSV".to_string(),
        action: "/dashboard/students/import".to_string(),
        method: "post",
        submit: "Import",
        fields: vec![
            FieldView::textarea("csv", "CSV with a header row", pick(creating, "csv", String::new())),
            FieldView::text("map_student_id", "Student ID column", pick(creating, "map_student_id", String::new())),
            FieldView::text("map_first_name", "First name column", pick(creating, "map_first_name", String::new())),
            FieldView::text("map_last_name", "Last name column", pick(creating, "map_last_name", String::new())),
            FieldView::text("map_dob", "Date of birth column", pick(creating, "map_dob", String::new())),
            FieldView::text("map_gender", "Gender column", pick(creating, "map_gender", String::new())),
            FieldView::text(
                "map_enrollment_date",
                "Enrollment date column",
                pick(creating, "map_enrollment_date", String::new()),
            ),
        ],
    });

    let mut table = TableView::new(vec!["ID", "First name", "Last name", "Date of birth", "Gender", "Enrolled"]);
    for student in service.list_students().await? {
        table.push(
            student.student_id,
            vec![
                student.student_id.to_string(),
                student.first_name,
                student.last_name,
                student.dob.to_string(),
                student.gender,
                student.enrollment_date.to_string(),
            ],
        );
    }

    Ok(SectionView {
        table_title: "All students".to_string(),
        forms,
        table,
    })
}

async fn teachers_view(
    ctx: &ServiceContext,
    edit: Option<i32>,
    outcome: &mut Outcome,
    submitted: Option<&FormFields>,
) -> Result<SectionView, AppError> {
    let service = ctx.teacher();
    let mut forms = Vec::new();

    if let Some(id) = edit {
        match service.get_teacher(id).await {
            Ok(teacher) => forms.push(edit_form(
                Section::Teachers,
                id,
                vec![
                    FieldView::text("first_name", "First name", pick(submitted, "first_name", teacher.first_name)),
                    FieldView::text("last_name", "Last name", pick(submitted, "last_name", teacher.last_name)),
                    FieldView::text("subject", "Subject", pick(submitted, "subject", teacher.subject)),
                ],
            )),
            Err(err) => outcome.record(err),
        }
    }

    let creating = if edit.is_some() { None } else { submitted };
    forms.push(create_form(
        Section::Teachers,
        vec![
            FieldView::number("teacher_id", "Teacher ID", pick(creating, "teacher_id", String::new())),
            FieldView::text("first_name", "First name", pick(creating, "first_name", String::new())),
            FieldView::text("last_name", "Last name", pick(creating, "last_name", String::new())),
            FieldView::text("subject", "Subject", pick(creating, "subject", String::new())),
        ],
    ));

    let mut table = TableView::new(vec!["ID", "First name", "Last name", "Subject"]);
    for teacher in service.list_teachers().await? {
        table.push(
            teacher.teacher_id,
            vec![
                teacher.teacher_id.to_string(),
                teacher.first_name,
                teacher.last_name,
                teacher.subject,
            ],
        );
    }

    Ok(SectionView {
        table_title: "All teachers".to_string(),
        forms,
        table,
    })
}

async fn classes_view(
    ctx: &ServiceContext,
    edit: Option<i32>,
    outcome: &mut Outcome,
    submitted: Option<&FormFields>,
) -> Result<SectionView, AppError> {
    let service = ctx.school_class();
    let teachers = ctx.teacher().teacher_options().await?;
    let mut forms = Vec::new();

    if let Some(id) = edit {
        match service.get_class(id).await {
            Ok(class) => forms.push(edit_form(
                Section::Classes,
                id,
                vec![
                    FieldView::text("class_name", "Class name", pick(submitted, "class_name", class.class_name)),
                    FieldView::select(
                        "teacher_id",
                        "Teacher",
                        teachers.clone(),
                        pick(submitted, "teacher_id", class.teacher_id.to_string()),
                    ),
                ],
            )),
            Err(err) => outcome.record(err),
        }
    }

    let creating = if edit.is_some() { None } else { submitted };
    forms.push(create_form(
        Section::Classes,
        vec![
            FieldView::number("class_id", "Class ID", pick(creating, "class_id", String::new())),
            FieldView::text("class_name", "Class name", pick(creating, "class_name", String::new())),
            FieldView::select("teacher_id", "Teacher", teachers, pick(creating, "teacher_id", String::new())),
        ],
    ));

    let mut table = TableView::new(vec!["ID", "Class", "Teacher"]);
    for row in service.list_classes().await? {
        table.push(
            row.class_id,
            vec![
                row.class_id.to_string(),
                row.class_name,
                name_or_dash(row.teacher_first_name, row.teacher_last_name),
            ],
        );
    }

    Ok(SectionView {
        table_title: "All classes".to_string(),
        forms,
        table,
    })
}

async fn grades_view(
    ctx: &ServiceContext,
    edit: Option<i32>,
    outcome: &mut Outcome,
    submitted: Option<&FormFields>,
) -> Result<SectionView, AppError> {
    let service = ctx.grade();
    let mut forms = Vec::new();

    if let Some(id) = edit {
        match service.get_grade(id).await {
            Ok(grade) => forms.push(edit_form(
                Section::Grades,
                id,
                vec![
                    FieldView::text("grade", "Grade", pick(submitted, "grade", grade.grade)),
                    FieldView::date(
                        "date_assigned",
                        "Date assigned",
                        pick(submitted, "date_assigned", grade.date_assigned.to_string()),
                    ),
                ],
            )),
            Err(err) => outcome.record(err),
        }
    }

    let creating = if edit.is_some() { None } else { submitted };
    let students = ctx.student().student_options().await?;
    let classes = ctx.school_class().class_options().await?;
    forms.push(create_form(
        Section::Grades,
        vec![
            FieldView::select("student_id", "Student", students, pick(creating, "student_id", String::new())),
            FieldView::select("class_id", "Class", classes, pick(creating, "class_id", String::new())),
            FieldView::text("grade", "Grade", pick(creating, "grade", String::new())),
            FieldView::date("date_assigned", "Date assigned", pick(creating, "date_assigned", String::new())),
        ],
    ));

    let mut table = TableView::new(vec!["ID", "Student", "Class", "Grade", "Date assigned"]);
    for row in service.list_grades().await? {
        table.push(
            row.grade_id,
            vec![
                row.grade_id.to_string(),
                name_or_dash(row.student_first_name, row.student_last_name),
                row.class_name.unwrap_or_else(|| "-".to_string()),
                row.grade,
                row.date_assigned.to_string(),
            ],
        );
    }

    Ok(SectionView {
        table_title: "All grades".to_string(),
        forms,
        table,
    })
}

async fn attendance_view(
    ctx: &ServiceContext,
    edit: Option<i32>,
    outcome: &mut Outcome,
    submitted: Option<&FormFields>,
) -> Result<SectionView, AppError> {
    let service = ctx.attendance();
    let statuses: Vec<&'static str> = AttendanceStatus::ALL
        .iter()
        .map(AttendanceStatus::as_str)
        .collect();
    let mut forms = Vec::new();

    if let Some(id) = edit {
        match service.get_attendance(id).await {
            Ok(record) => forms.push(edit_form(
                Section::Attendance,
                id,
                vec![
                    FieldView::fixed_select("status", "Status", &statuses, pick(submitted, "status", record.status)),
                    FieldView::date("date", "Date", pick(submitted, "date", record.date.to_string())),
                ],
            )),
            Err(err) => outcome.record(err),
        }
    }

    let creating = if edit.is_some() { None } else { submitted };
    let students = ctx.student().student_options().await?;
    let classes = ctx.school_class().class_options().await?;
    forms.push(create_form(
        Section::Attendance,
        vec![
            FieldView::select("student_id", "Student", students, pick(creating, "student_id", String::new())),
            FieldView::select("class_id", "Class", classes, pick(creating, "class_id", String::new())),
            FieldView::fixed_select(
                "status",
                "Status",
                &statuses,
                pick(creating, "status", AttendanceStatus::Present.as_str().to_string()),
            ),
            FieldView::date("date", "Date", pick(creating, "date", validation::today().to_string())),
        ],
    ));

    let mut table = TableView::new(vec!["ID", "Student", "Class", "Status", "Date", "IP address"]);
    for row in service.list_attendance().await? {
        table.push(
            row.attendance_id,
            vec![
                row.attendance_id.to_string(),
                name_or_dash(row.student_first_name, row.student_last_name),
                row.class_name.unwrap_or_else(|| "-".to_string()),
                row.status,
                row.date.to_string(),
                row.ip_address.unwrap_or_else(|| "-".to_string()),
            ],
        );
    }

    Ok(SectionView {
        table_title: "Attendance records".to_string(),
        forms,
        table,
    })
}

async fn reports_view(
    ctx: &ServiceContext,
    params: &ViewParams,
    outcome: &mut Outcome,
) -> Result<SectionView, AppError> {
    let kind = params.report.unwrap_or(ReportKind::TopStudents);
    let service = ctx.report();

    let mut forms = Vec::new();
    if kind.is_limited() {
        let shown = params
            .limit
            .map(|limit| limit.to_string())
            .unwrap_or_default();
        forms.push(FormView {
            heading: "Rows".to_string(),
            action: "/dashboard/reports".to_string(),
            method: "get",
            submit: "Show",
            fields: vec![
                FieldView {
                    name: "report",
                    label: "Report",
                    kind: "hidden",
                    value: kind.slug().to_string(),
                    options: Vec::new(),
                },
                FieldView::number("limit", "Limit", shown),
            ],
        });
    }

    let table = match report_table(&service, kind, params.limit).await {
        Ok(table) => table,
        Err(err) if err.is_data_access() => return Err(err),
        Err(err) => {
            outcome.record(err);
            TableView::default()
        }
    };

    Ok(SectionView {
        table_title: kind.title().to_string(),
        forms,
        table,
    })
}

async fn report_table(
    service: &ReportService,
    kind: ReportKind,
    limit: Option<u64>,
) -> Result<TableView, AppError> {
    let table = match kind {
        ReportKind::TopStudents => {
            let mut table = TableView::new(vec!["Student ID", "Name", "Average grade points"]);
            for row in service.top_students(limit).await? {
                table.push_readonly(vec![
                    row.student_id.to_string(),
                    format!("{} {}", row.first_name, row.last_name),
                    decimal(row.average_grade),
                ]);
            }
            table
        }
        ReportKind::ClassPerformance => {
            let mut table = TableView::new(vec!["Class ID", "Class", "Average grade points"]);
            for row in service.class_performance(limit).await? {
                table.push_readonly(vec![
                    row.class_id.to_string(),
                    row.class_name,
                    decimal(row.average_grade),
                ]);
            }
            table
        }
        ReportKind::AttendanceSummary => {
            let mut table = TableView::new(vec!["Student ID", "Name", "Days present"]);
            for row in service.attendance_summary(limit).await? {
                table.push_readonly(vec![
                    row.student_id.to_string(),
                    format!("{} {}", row.first_name, row.last_name),
                    row.present_count.to_string(),
                ]);
            }
            table
        }
        ReportKind::AttendanceRates => {
            let mut table = TableView::new(vec!["Student ID", "Name", "Attendance rate (%)"]);
            for row in service.attendance_rates().await? {
                table.push_readonly(vec![
                    row.student_id.to_string(),
                    format!("{} {}", row.first_name, row.last_name),
                    decimal(Some(row.attendance_rate)),
                ]);
            }
            table
        }
        ReportKind::AttendanceTrend => {
            let mut table = TableView::new(vec!["Month", "Attendance rate (%)"]);
            for row in service.monthly_attendance_trend().await? {
                table.push_readonly(vec![row.month, decimal(Some(row.attendance_rate))]);
            }
            table
        }
    };
    Ok(table)
}
