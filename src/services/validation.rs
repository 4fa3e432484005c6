//! Field rules shared by every entity service, plus parsers for the raw
//! strings HTML forms submit.

use chrono::{Local, NaiveDate};

use crate::db::entities::attendance::AttendanceStatus;
use crate::db::entities::student::Gender;
use crate::error::AppError;

pub const MAX_NAME_LEN: usize = 100;
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn earliest_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

pub fn required<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::validation(format!("{field} is required")))
}

pub fn positive_id(value: Option<i32>, field: &str) -> Result<i32, AppError> {
    let id = required(value, field)?;
    if id <= 0 {
        return Err(AppError::validation(format!(
            "{field} must be a positive number"
        )));
    }
    Ok(id)
}

/// Trimmed, non-empty, at most [`MAX_NAME_LEN`] characters.
pub fn name(value: Option<String>, field: &str) -> Result<String, AppError> {
    let trimmed = value.as_deref().map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Between 1900-01-01 and `today`, both inclusive.
pub fn past_date(
    value: Option<NaiveDate>,
    field: &str,
    today: NaiveDate,
) -> Result<NaiveDate, AppError> {
    let date = required(value, field)?;
    if date < earliest_date() {
        return Err(AppError::validation(format!(
            "{field} cannot be before 1900-01-01"
        )));
    }
    if date > today {
        return Err(AppError::validation(format!(
            "{field} cannot be in the future"
        )));
    }
    Ok(date)
}

pub fn gender(value: Option<&str>) -> Result<Gender, AppError> {
    let raw = required(value, "Gender")?;
    Gender::try_from(raw).map_err(|_| AppError::validation("Gender must be M or F"))
}

pub fn attendance_status(value: Option<&str>) -> Result<AttendanceStatus, AppError> {
    let raw = required(value, "Status")?;
    AttendanceStatus::try_from(raw)
        .map_err(|_| AppError::validation("Status must be Present, Absent or Late"))
}

/// Letter grades `A`..`D` and `F`, optionally followed by `+` or `-`.
/// Returned uppercase.
pub fn grade_letter(value: Option<&str>) -> Result<String, AppError> {
    let raw = required(value, "Grade")?.trim().to_ascii_uppercase();
    let mut chars = raw.chars();
    let letter_ok = matches!(chars.next(), Some('A' | 'B' | 'C' | 'D' | 'F'));
    let suffix_ok = match (chars.next(), chars.next()) {
        (None, _) => true,
        (Some('+' | '-'), None) => true,
        _ => false,
    };
    if !letter_ok || !suffix_ok {
        return Err(AppError::validation(
            "Grade must be a letter A-D or F, optionally followed by + or -",
        ));
    }
    Ok(raw)
}

/// Empty or whitespace-only form fields count as absent.
pub fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn parse_id(raw: &str, field: &str) -> Result<Option<i32>, AppError> {
    match non_blank(raw) {
        None => Ok(None),
        Some(value) => value.parse::<i32>().map(Some).map_err(|_| {
            AppError::validation(format!("{field} must be a whole number"))
        }),
    }
}

pub fn parse_date(raw: &str, field: &str) -> Result<Option<NaiveDate>, AppError> {
    match non_blank(raw) {
        None => Ok(None),
        Some(value) => NaiveDate::parse_from_str(&value, DATE_FORMAT)
            .map(Some)
            .map_err(|_| AppError::validation(format!("{field} must be a date (YYYY-MM-DD)"))),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(
            name(Some("  Ada ".to_string()), "First name").expect("valid"),
            "Ada"
        );
        assert!(name(Some("   ".to_string()), "First name").is_err());
        assert!(name(None, "First name").is_err());
        assert!(name(Some("x".repeat(MAX_NAME_LEN + 1)), "First name").is_err());
    }

    #[test]
    fn ids_must_be_positive() {
        assert_eq!(positive_id(Some(5), "Student ID").expect("valid"), 5);
        assert_eq!(
            positive_id(Some(0), "Student ID"),
            Err(AppError::validation("Student ID must be a positive number"))
        );
        assert_eq!(
            positive_id(None, "Student ID"),
            Err(AppError::validation("Student ID is required"))
        );
    }

    #[test]
    fn dates_stay_between_1900_and_today() {
        let today = day(2024, 6, 1);

        assert!(past_date(Some(day(1900, 1, 1)), "Date", today).is_ok());
        assert!(past_date(Some(today), "Date", today).is_ok());
        assert!(past_date(Some(day(1899, 12, 31)), "Date", today).is_err());
        assert!(past_date(Some(day(2024, 6, 2)), "Date", today).is_err());
    }

    #[test]
    fn grade_letters_accept_modifiers() {
        assert_eq!(grade_letter(Some("b+")).expect("valid"), "B+");
        assert_eq!(grade_letter(Some(" F ")).expect("valid"), "F");
        assert!(grade_letter(Some("E")).is_err());
        assert!(grade_letter(Some("A++")).is_err());
        assert!(grade_letter(Some("")).is_err());
    }

    #[test]
    fn enum_fields_are_case_insensitive() {
        assert_eq!(gender(Some("f")).expect("valid"), Gender::Female);
        assert!(gender(Some("x")).is_err());
        assert_eq!(
            attendance_status(Some("late")).expect("valid"),
            AttendanceStatus::Late
        );
        assert!(attendance_status(Some("gone")).is_err());
    }

    #[test]
    fn form_parsers_treat_blank_as_absent() {
        assert_eq!(parse_id(" ", "Class ID").expect("blank"), None);
        assert_eq!(parse_id("12", "Class ID").expect("number"), Some(12));
        assert!(parse_id("twelve", "Class ID").is_err());
        assert_eq!(
            parse_date("2020-02-29", "Date").expect("date"),
            Some(day(2020, 2, 29))
        );
        assert!(parse_date("29/02/2020", "Date").is_err());
    }
}
