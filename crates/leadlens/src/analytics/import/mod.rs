pub mod cell;
mod lead;
mod patient;
mod spend;

pub use cell::CellValue;
pub use lead::LeadImporter;
pub use patient::{PatientImportError, PatientImporter, REQUIRED_PATIENT_COLUMNS};
pub use spend::SpendImporter;

use std::collections::HashMap;
use std::io::Read;

/// One worksheet row: column name (any case/spacing) mapped to a raw cell.
/// Keys are lower-cased and trimmed at construction so header variance never
/// causes a lookup miss.
#[derive(Debug, Clone, Default)]
pub struct SheetRow {
    cells: HashMap<String, CellValue>,
}

impl SheetRow {
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, CellValue)>,
        K: AsRef<str>,
    {
        let cells = pairs
            .into_iter()
            .map(|(key, value)| (key.as_ref().trim().to_ascii_lowercase(), value))
            .collect();
        Self { cells }
    }

    /// First candidate key that resolves to a non-blank cell.
    pub fn get(&self, candidates: &[&str]) -> Option<&CellValue> {
        candidates
            .iter()
            .filter_map(|key| self.cells.get(*key))
            .find(|cell| !cell.is_empty())
    }

    /// Cell content rendered as text. Numeric cells are formatted so id-like
    /// columns survive spreadsheet type coercion.
    pub fn text(&self, candidates: &[&str]) -> Option<String> {
        self.get(candidates).and_then(|cell| match cell {
            CellValue::Text(_) => cell.text().map(str::to_string),
            CellValue::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                Some(format!("{}", *value as i64))
            }
            CellValue::Number(value) => Some(value.to_string()),
            CellValue::Empty => None,
        })
    }

    pub fn has_column(&self, key: &str) -> bool {
        self.cells.contains_key(key)
    }
}

/// Import failure for the lenient importers (leads, spend). Malformed cells
/// never land here; only the transport can fail.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Read a whole worksheet from CSV text into [`SheetRow`]s. Cells that parse
/// fully as numbers surface as `Number`, matching what a spreadsheet reader
/// hands over for typed columns; blank cells become `Empty`.
pub fn rows_from_csv<R: Read>(reader: R) -> Result<Vec<SheetRow>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let pairs = headers.iter().zip(record.iter()).map(|(header, raw)| {
            let cell = if raw.trim().is_empty() {
                CellValue::Empty
            } else if let Ok(number) = raw.trim().parse::<f64>() {
                CellValue::Number(number)
            } else {
                CellValue::Text(raw.to_string())
            };
            (header, cell)
        });
        rows.push(SheetRow::from_pairs(pairs));
    }

    Ok(rows)
}
