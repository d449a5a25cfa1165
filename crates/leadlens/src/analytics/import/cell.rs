use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Raw cell as handed over by the spreadsheet reader. Readers fill blank
/// cells with `Empty`, never omit them.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    /// Trimmed text content, `None` for blank or numeric cells.
    pub fn text(&self) -> Option<&str> {
        match self {
            CellValue::Text(value) => {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            }
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(value) => value.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

/// Offset between the Unix epoch and the spreadsheet serial-date epoch
/// (1899-12-30), in days.
const SERIAL_UNIX_OFFSET_DAYS: f64 = 25569.0;
const SECONDS_PER_DAY: f64 = 86400.0;

/// Uniform date policy: numeric cells are spreadsheet serials, `DD.MM.YYYY`
/// strings are day-first, everything else runs through a fixed format list.
/// Unparseable cells yield `None`; call sites supply the fallback.
pub fn parse_date(cell: &CellValue) -> Option<NaiveDateTime> {
    match cell {
        CellValue::Number(serial) => serial_to_datetime(*serial),
        CellValue::Text(value) => parse_date_text(value),
        CellValue::Empty => None,
    }
}

fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let seconds = (serial - SERIAL_UNIX_OFFSET_DAYS) * SECONDS_PER_DAY;
    DateTime::from_timestamp(seconds.round() as i64, 0).map(|dt| dt.naive_utc())
}

fn parse_date_text(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Day-first locale dates take precedence over everything generic.
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%d.%m.%Y") {
        return date.and_hms_opt(0, 0, 0);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    for format in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Currency/numeric policy: strip everything but digits, dot, and minus
/// before parsing. A cell that still fails to parse becomes 0.
pub fn parse_number(cell: &CellValue) -> f64 {
    match cell {
        CellValue::Number(value) if value.is_finite() => *value,
        CellValue::Number(_) => 0.0,
        CellValue::Text(value) => {
            let cleaned: String = value
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            cleaned.parse::<f64>().unwrap_or(0.0)
        }
        CellValue::Empty => 0.0,
    }
}

/// Non-negative integer counter (e.g. the NR counter column).
pub fn parse_count(cell: &CellValue) -> u32 {
    parse_number(cell).max(0.0).round() as u32
}
