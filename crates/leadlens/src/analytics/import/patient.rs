use super::cell::{parse_date, parse_number, CellValue};
use super::{rows_from_csv, SheetRow};
use crate::analytics::domain::{ConversionOutcome, Patient};
use std::io::Read;
use std::path::Path;

/// Columns the ops export must carry. Validated against the first row's
/// keys before any row is transformed; a miss aborts the whole import.
pub const REQUIRED_PATIENT_COLUMNS: &[&str] = &[
    "lead id",
    "date of receiving ticket",
    "name of patient",
    "category",
    "status",
    "total expected payment",
    "currency of expected payment",
    "operation center",
    "operation date",
];

const MMS_ID_COLUMNS: &[&str] = &["mms id", "record id"];
const CRM_ID_COLUMNS: &[&str] = &["lead id"];
const NAME_COLUMNS: &[&str] = &["name of patient"];
const CATEGORY_COLUMNS: &[&str] = &["category"];
const STATUS_COLUMNS: &[&str] = &["status"];
const CENTER_COLUMNS: &[&str] = &["operation center"];
const TICKET_COLUMNS: &[&str] = &["date of receiving ticket"];
const OPERATION_COLUMNS: &[&str] = &["operation date"];
const HOTEL_ENTER_COLUMNS: &[&str] = &["hotel enter date"];
const HOTEL_LEAVE_COLUMNS: &[&str] = &["hotel leave date"];
const PICKUP_COLUMNS: &[&str] = &["airport pickup date"];
const EXPECTED_COLUMNS: &[&str] = &["total expected payment"];
const EXPECTED_CURRENCY_COLUMNS: &[&str] = &["currency of expected payment"];
const ACTUAL_COLUMNS: &[&str] = &["actual received payment", "received payment"];
const ACTUAL_CURRENCY_COLUMNS: &[&str] = &["currency of received payment"];

#[derive(Debug, thiserror::Error)]
pub enum PatientImportError {
    #[error("failed to read patient export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid patient CSV data: {0}")]
    Csv(#[from] csv::Error),
    /// The export is missing required columns; nothing was imported.
    #[error("patient export is missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

impl From<super::ImportError> for PatientImportError {
    fn from(err: super::ImportError) -> Self {
        match err {
            super::ImportError::Io(err) => Self::Io(err),
            super::ImportError::Csv(err) => Self::Csv(err),
        }
    }
}

/// Strict importer for the back-office patient/operations export. This is
/// the one place an import can fail validation; callers must branch before
/// using the result.
pub struct PatientImporter;

impl PatientImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Patient>, PatientImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Patient>, PatientImportError> {
        let rows = rows_from_csv(reader)?;
        Self::from_rows(&rows)
    }

    pub fn from_rows(rows: &[SheetRow]) -> Result<Vec<Patient>, PatientImportError> {
        let Some(first) = rows.first() else {
            return Ok(Vec::new());
        };

        let missing: Vec<String> = REQUIRED_PATIENT_COLUMNS
            .iter()
            .filter(|column| !first.has_column(column))
            .map(|column| (*column).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(PatientImportError::MissingColumns(missing));
        }

        Ok(rows.iter().enumerate().map(patient_from_row).collect())
    }
}

fn patient_from_row((index, row): (usize, &SheetRow)) -> Patient {
    let ticket_date = date_field(row, TICKET_COLUMNS);
    let operation_date = date_field(row, OPERATION_COLUMNS);
    let hotel_enter_date = date_field(row, HOTEL_ENTER_COLUMNS);
    let hotel_leave_date = date_field(row, HOTEL_LEAVE_COLUMNS);
    let airport_pickup_date = date_field(row, PICKUP_COLUMNS);

    let expected_total_eur = euro_amount(row, EXPECTED_COLUMNS, EXPECTED_CURRENCY_COLUMNS);
    let actual_received_eur = euro_amount(row, ACTUAL_COLUMNS, ACTUAL_CURRENCY_COLUMNS);

    let original_status = row.text(STATUS_COLUMNS).unwrap_or_default();

    Patient {
        mms_id: row
            .text(MMS_ID_COLUMNS)
            .unwrap_or_else(|| format!("MMS-{index}")),
        crm_id: row.text(CRM_ID_COLUMNS).unwrap_or_default(),
        patient_name: row.text(NAME_COLUMNS).unwrap_or_default(),
        category: row.text(CATEGORY_COLUMNS).unwrap_or_default(),
        outcome: outcome_of(&original_status),
        original_status,
        operation_center: row.text(CENTER_COLUMNS).unwrap_or_default(),
        arrival_anchor_date: Patient::arrival_anchor(
            airport_pickup_date,
            hotel_enter_date,
            operation_date,
            ticket_date,
        ),
        ticket_date,
        operation_date,
        hotel_enter_date,
        hotel_leave_date,
        airport_pickup_date,
        upsale_eur: Patient::upsale(expected_total_eur, actual_received_eur),
        expected_total_eur,
        actual_received_eur,
    }
}

fn date_field(row: &SheetRow, candidates: &[&str]) -> Option<chrono::NaiveDate> {
    row.get(candidates).and_then(parse_date).map(|dt| dt.date())
}

/// An amount is Euro-denominated when the currency cell lower-cases to
/// contain "euro" or is exactly the "€" glyph. "EUR" is deliberately not
/// recognized; the upstream export never abbreviates.
fn euro_amount(row: &SheetRow, amount: &[&str], currency: &[&str]) -> Option<f64> {
    let currency_cell = row.text(currency)?;
    if !is_euro(&currency_cell) {
        return None;
    }
    row.get(amount).map(parse_number)
}

fn is_euro(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.to_lowercase().contains("euro") || trimmed == "€"
}

/// Conversion outcome from substring match on the raw ops status.
pub fn outcome_of(status: &str) -> ConversionOutcome {
    let canonical = status.trim().to_lowercase();
    if canonical.contains("cancel") {
        ConversionOutcome::Cancelled
    } else if canonical.contains("postpon") {
        ConversionOutcome::Postponed
    } else if canonical.contains("complete") || canonical.contains("done") {
        ConversionOutcome::Completed
    } else {
        ConversionOutcome::Planned
    }
}
