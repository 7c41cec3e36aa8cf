//! Student import
//!
//! Rows are processed one by one and independently: a bad row is counted
//! as skipped and reported, never aborting the rest of the sheet.

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::student::{StudentInput, StudentRepository};
use crate::domain::UpsertOutcome;
use crate::infrastructure::spreadsheet::SheetRow;
use crate::shared::{int_from_text, to_date_only};

const NAME: &[&str] = &["Name", "name"];
const FATHER_NAME: &[&str] = &["FatherName", "father_name"];
const LAST_NAME: &[&str] = &["LastName", "last_name"];
const ADDRESS: &[&str] = &["Address", "address"];
const PHONE: &[&str] = &["Phone", "phone"];
const BIRTHDATE: &[&str] = &["Birthdate", "birthdate"];
const GENDER: &[&str] = &["Gender", "gender"];
const SOURCE: &[&str] = &["Source", "source"];
const GRADUATION_YEAR: &[&str] = &["GraduationYear", "graduation_year", "graduationYear"];
const NOTES: &[&str] = &["Notes", "notes"];

/// Outcome counters of one import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub inserted: u32,
    pub updated: u32,
    pub skipped: u32,
    pub errors: Vec<String>,
}

impl ImportReport {
    fn skip(&mut self, message: String) {
        self.skipped += 1;
        self.errors.push(message);
    }
}

/// Build a student from one sheet row. The error is the message reported
/// for the row.
pub fn student_input_from_row(row: &SheetRow) -> Result<StudentInput, String> {
    let owned = |aliases: &[&str]| row.get(aliases).map(str::to_string);

    let (Some(name), Some(phone)) = (owned(NAME), owned(PHONE)) else {
        return Err(format!("Row {}: missing name or phone", row.number));
    };

    Ok(StudentInput {
        name,
        father_name: owned(FATHER_NAME),
        last_name: owned(LAST_NAME),
        address: owned(ADDRESS),
        phone,
        birthdate: to_date_only(row.get(BIRTHDATE)),
        gender: owned(GENDER),
        source: owned(SOURCE),
        graduation_year: row.get(GRADUATION_YEAR).and_then(int_from_text),
        notes: owned(NOTES),
    })
}

/// Upsert every row by phone and tally the results.
pub async fn import_students(students: &dyn StudentRepository, rows: &[SheetRow]) -> ImportReport {
    let mut report = ImportReport::default();

    for row in rows {
        let input = match student_input_from_row(row) {
            Ok(input) => input,
            Err(message) => {
                report.skip(message);
                continue;
            }
        };

        match students.upsert_by_phone(input).await {
            Ok(UpsertOutcome::Inserted(_)) => report.inserted += 1,
            Ok(UpsertOutcome::Updated(_)) => report.updated += 1,
            Err(e) => {
                if e.is_fault() {
                    warn!(row = row.number, error = %e, "Import row failed");
                }
                report.skip(format!("Row {}: {}", row.number, e));
            }
        }
    }

    info!(
        inserted = report.inserted,
        updated = report.updated,
        skipped = report.skipped,
        "Student import finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::student::StudentRepository;
    use crate::infrastructure::database::repositories::student_repository::SeaOrmStudentRepository;
    use crate::test_support::test_db;
    use chrono::NaiveDate;

    #[test]
    fn aliases_and_normalisation() {
        let row = SheetRow::from_pairs(
            3,
            &[
                ("name", " Rami "),
                ("Phone", "0791"),
                ("Birthdate", "2001-04-09T00:00:00Z"),
                ("graduationYear", "2026"),
                ("Gender", ""),
            ],
        );
        let input = student_input_from_row(&row).unwrap();
        assert_eq!(input.name, "Rami");
        assert_eq!(input.birthdate, NaiveDate::from_ymd_opt(2001, 4, 9));
        assert_eq!(input.graduation_year, Some(2026));
        assert_eq!(input.gender, None);
    }

    #[test]
    fn missing_phone_reports_sheet_row() {
        let row = SheetRow::from_pairs(5, &[("Name", "Only name")]);
        assert_eq!(
            student_input_from_row(&row).unwrap_err(),
            "Row 5: missing name or phone"
        );
    }

    #[tokio::test]
    async fn import_counts_inserts_updates_and_skips() {
        let repo = SeaOrmStudentRepository::new(test_db().await);
        repo.create(StudentInput {
            name: "Existing".into(),
            phone: "111".into(),
            ..Default::default()
        })
        .await
        .unwrap();

        let rows = vec![
            SheetRow::from_pairs(2, &[("Name", "Renamed"), ("Phone", "111")]),
            SheetRow::from_pairs(3, &[("Name", "Fresh"), ("Phone", "222")]),
            SheetRow::from_pairs(4, &[("Name", ""), ("Phone", "333")]),
        ];
        let report = import_students(&repo, &rows).await;

        assert_eq!(
            report,
            ImportReport {
                inserted: 1,
                updated: 1,
                skipped: 1,
                errors: vec!["Row 4: missing name or phone".to_string()],
            }
        );
        let existing = repo.find_by_phone("111").await.unwrap().unwrap();
        assert_eq!(existing.name, "Renamed");
    }
}
