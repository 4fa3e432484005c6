use std::collections::HashSet;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use sea_orm::TransactionTrait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    config::ImportConfig,
    db::dao::{DaoBase, StudentDao},
    db::entities::student::Gender,
    error::AppError,
    services::{
        student_service::{StudentDraft, ValidStudent},
        validation,
    },
};

/// Failures that stop an import before any row is looked at.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("the CSV input has no header row")]
    Empty,
    #[error("the CSV header could not be read: {0}")]
    Header(#[from] csv::Error),
    #[error("column '{header}' mapped to {field} is not in the CSV header")]
    MissingColumn { field: &'static str, header: String },
    #[error("no CSV column supplies student_id")]
    NoStudentIdColumn,
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        AppError::validation(err.to_string())
    }
}

/// Source header per student field. Unset fields fall back to a header with
/// the field's own name, compared case-insensitively.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub student_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub enrollment_date: Option<String>,
}

/// Values written into fields a row leaves empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDefaults {
    pub gender: Gender,
    pub dob: NaiveDate,
    pub enrollment_date: NaiveDate,
}

impl ImportDefaults {
    pub fn from_config(config: &ImportConfig, today: NaiveDate) -> Result<Self, AppError> {
        Ok(Self {
            gender: validation::gender(Some(config.default_gender.as_str()))?,
            dob: config.default_dob,
            enrollment_date: today,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub inserted: Vec<i32>,
    pub skipped_existing: Vec<i32>,
    pub rejected: Vec<RejectedRow>,
}

#[derive(Debug)]
struct ParsedRow {
    line: u64,
    student_id: Option<i32>,
    outcome: Result<ValidStudent, String>,
}

#[derive(Debug)]
struct ColumnIndexes {
    student_id: usize,
    first_name: Option<usize>,
    last_name: Option<usize>,
    dob: Option<usize>,
    gender: Option<usize>,
    enrollment_date: Option<usize>,
}

fn find_header(headers: &StringRecord, wanted: &str) -> Option<usize> {
    let wanted = wanted.trim();
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(wanted))
}

fn resolve(
    headers: &StringRecord,
    field: &'static str,
    mapped: Option<&str>,
) -> Result<Option<usize>, ImportError> {
    match mapped.map(str::trim).filter(|header| !header.is_empty()) {
        Some(header) => find_header(headers, header)
            .map(Some)
            .ok_or_else(|| ImportError::MissingColumn {
                field,
                header: header.to_string(),
            }),
        None => Ok(find_header(headers, field)),
    }
}

impl ColumnMapping {
    fn indexes(&self, headers: &StringRecord) -> Result<ColumnIndexes, ImportError> {
        Ok(ColumnIndexes {
            student_id: resolve(headers, "student_id", self.student_id.as_deref())?
                .ok_or(ImportError::NoStudentIdColumn)?,
            first_name: resolve(headers, "first_name", self.first_name.as_deref())?,
            last_name: resolve(headers, "last_name", self.last_name.as_deref())?,
            dob: resolve(headers, "dob", self.dob.as_deref())?,
            gender: resolve(headers, "gender", self.gender.as_deref())?,
            enrollment_date: resolve(headers, "enrollment_date", self.enrollment_date.as_deref())?,
        })
    }
}

fn cell(record: &StringRecord, index: Option<usize>) -> Option<String> {
    index
        .and_then(|index| record.get(index))
        .and_then(validation::non_blank)
}

fn parse_row(
    record: &StringRecord,
    columns: &ColumnIndexes,
    defaults: &ImportDefaults,
    today: NaiveDate,
) -> (Option<i32>, Result<ValidStudent, String>) {
    let raw_id = cell(record, Some(columns.student_id)).unwrap_or_default();
    let student_id = match validation::parse_id(&raw_id, "Student ID") {
        Ok(Some(id)) => id,
        Ok(None) => return (None, Err("Student ID is required".to_string())),
        Err(err) => return (None, Err(err.message().to_string())),
    };

    let date = |index: Option<usize>, field: &str, fallback: NaiveDate| {
        validation::parse_date(&cell(record, index).unwrap_or_default(), field)
            .map(|parsed| parsed.unwrap_or(fallback))
    };

    let outcome = (|| {
        let draft = StudentDraft {
            student_id: Some(student_id),
            first_name: cell(record, columns.first_name),
            last_name: cell(record, columns.last_name),
            dob: Some(date(columns.dob, "Date of birth", defaults.dob)?),
            gender: Some(
                cell(record, columns.gender)
                    .unwrap_or_else(|| defaults.gender.as_str().to_string()),
            ),
            enrollment_date: Some(date(
                columns.enrollment_date,
                "Enrollment date",
                defaults.enrollment_date,
            )?),
        };
        draft.validate(today)
    })()
    .map_err(|err| err.message().to_string());

    (Some(student_id), outcome)
}

fn parse_rows(
    csv_text: &str,
    mapping: &ColumnMapping,
    defaults: &ImportDefaults,
    today: NaiveDate,
) -> Result<Vec<ParsedRow>, ImportError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(ImportError::Empty);
    }
    let columns = mapping.indexes(&headers)?;

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        // Header is line 1.
        let fallback_line = index as u64 + 2;
        match record {
            Ok(record) => {
                let line = record
                    .position()
                    .map(|position| position.line())
                    .unwrap_or(fallback_line);
                let (student_id, outcome) = parse_row(&record, &columns, defaults, today);
                rows.push(ParsedRow {
                    line,
                    student_id,
                    outcome,
                });
            }
            Err(err) => rows.push(ParsedRow {
                line: err
                    .position()
                    .map(|position| position.line())
                    .unwrap_or(fallback_line),
                student_id: None,
                outcome: Err(format!("unreadable row: {err}")),
            }),
        }
    }
    Ok(rows)
}

/// Bulk student import from CSV text.
#[derive(Clone)]
pub struct ImportService {
    student_dao: StudentDao,
    config: ImportConfig,
}

impl ImportService {
    pub fn new(student_dao: StudentDao, config: ImportConfig) -> Self {
        Self {
            student_dao,
            config,
        }
    }

    /// Existing ids are skipped, invalid rows are reported by line, the rest
    /// is inserted in one transaction.
    pub async fn import_students(
        &self,
        csv_text: &str,
        mapping: &ColumnMapping,
        today: NaiveDate,
    ) -> Result<ImportReport, AppError> {
        let defaults = ImportDefaults::from_config(&self.config, today)?;
        let rows = parse_rows(csv_text, mapping, &defaults, today)?;

        let ids: Vec<i32> = rows.iter().filter_map(|row| row.student_id).collect();
        let existing = self.student_dao.existing_ids(&ids).await?;

        let mut report = ImportReport::default();
        let mut pending = Vec::new();
        let mut taken: HashSet<i32> = HashSet::new();
        for row in rows {
            if let Some(id) = row
                .student_id
                .filter(|id| existing.contains(id) || taken.contains(id))
            {
                report.skipped_existing.push(id);
                continue;
            }
            match row.outcome {
                Ok(student) => {
                    taken.insert(student.student_id);
                    pending.push(student);
                }
                Err(reason) => report.rejected.push(RejectedRow {
                    line: row.line,
                    reason,
                }),
            }
        }

        if !pending.is_empty() {
            let txn = self.student_dao.db().begin().await?;
            for student in pending {
                let created = StudentDao::create_in(&txn, student.into_active_model()).await?;
                report.inserted.push(created.student_id);
            }
            txn.commit().await?;
        }

        info!(
            inserted = report.inserted.len(),
            skipped = report.skipped_existing.len(),
            rejected = report.rejected.len(),
            "student import finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{ColumnMapping, ImportDefaults, ImportError, parse_rows};
    use crate::db::entities::student::Gender;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn defaults() -> ImportDefaults {
        ImportDefaults {
            gender: Gender::Male,
            dob: day(1900, 1, 1),
            enrollment_date: day(2024, 9, 1),
        }
    }

    #[test]
    fn same_name_headers_map_without_configuration() {
        let csv = "Student_ID,First_Name,Last_Name,DOB,Gender,Enrollment_Date\n\
                   7,Ada,Lovelace,2010-12-10,F,2016-09-01\n";

        let rows = parse_rows(csv, &ColumnMapping::default(), &defaults(), day(2024, 9, 1))
            .expect("header is valid");

        assert_eq!(rows.len(), 1);
        let student = rows[0].outcome.as_ref().expect("row is valid");
        assert_eq!(student.student_id, 7);
        assert_eq!(student.gender, Gender::Female);
        assert_eq!(student.dob, day(2010, 12, 10));
    }

    #[test]
    fn remapped_columns_and_defaults_fill_gaps() {
        let csv = "id,given,family\n12,Alan,Turing\n";
        let mapping = ColumnMapping {
            student_id: Some("ID".to_string()),
            first_name: Some("given".to_string()),
            last_name: Some("family".to_string()),
            ..ColumnMapping::default()
        };

        let rows = parse_rows(csv, &mapping, &defaults(), day(2024, 9, 1)).expect("valid");

        let student = rows[0].outcome.as_ref().expect("row is valid");
        assert_eq!(student.first_name, "Alan");
        assert_eq!(student.gender, Gender::Male);
        assert_eq!(student.dob, day(1900, 1, 1));
        assert_eq!(student.enrollment_date, day(2024, 9, 1));
    }

    #[test]
    fn invalid_rows_carry_their_line_number() {
        let csv = "student_id,first_name,last_name\n1,Ada,Lovelace\nabc,Bad,Id\n3,,Nameless\n";

        let rows = parse_rows(csv, &ColumnMapping::default(), &defaults(), day(2024, 9, 1))
            .expect("valid header");

        assert!(rows[0].outcome.is_ok());
        assert_eq!(rows[1].line, 3);
        assert_eq!(rows[1].student_id, None);
        assert_eq!(
            rows[1].outcome.as_ref().expect_err("bad id"),
            "Student ID must be a whole number"
        );
        assert_eq!(rows[2].line, 4);
        assert_eq!(rows[2].student_id, Some(3));
        assert_eq!(
            rows[2].outcome.as_ref().expect_err("missing name"),
            "First name is required"
        );
    }

    #[test]
    fn mapped_header_must_exist() {
        let mapping = ColumnMapping {
            last_name: Some("surname".to_string()),
            ..ColumnMapping::default()
        };

        let err = parse_rows("student_id,last_name\n1,X\n", &mapping, &defaults(), day(2024, 1, 1))
            .expect_err("surname is not a column");

        assert!(matches!(
            err,
            ImportError::MissingColumn { field: "last_name", .. }
        ));
    }

    #[test]
    fn student_id_column_is_mandatory() {
        let err = parse_rows("first_name\nAda\n", &ColumnMapping::default(), &defaults(), day(2024, 1, 1))
            .expect_err("no id column");

        assert!(matches!(err, ImportError::NoStudentIdColumn));
    }
}
