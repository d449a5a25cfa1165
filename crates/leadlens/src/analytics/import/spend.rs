use super::cell::{parse_date, parse_number};
use super::{rows_from_csv, ImportError, SheetRow};
use crate::analytics::domain::SpendRecord;
use chrono::NaiveDate;
use std::io::Read;
use std::path::Path;

const CAMPAIGN_COLUMNS: &[&str] = &["campaign name", "campaign"];
const ADSET_COLUMNS: &[&str] = &["adset name", "ad set name", "adset"];
const AD_COLUMNS: &[&str] = &["ad name", "ad"];
const DATE_COLUMNS: &[&str] = &["date", "day", "reporting starts"];
const SPEND_COLUMNS: &[&str] = &["amount spent (try)", "amount spent", "spend"];
const IMPRESSIONS_COLUMNS: &[&str] = &["impressions"];
const RESULTS_COLUMNS: &[&str] = &["results", "leads"];

/// Lenient importer for daily ad-spend exports. Rows without a parseable
/// date are kept with the fallback date so spend totals never silently drop.
pub struct SpendImporter;

impl SpendImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        fallback_date: NaiveDate,
    ) -> Result<Vec<SpendRecord>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, fallback_date)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        fallback_date: NaiveDate,
    ) -> Result<Vec<SpendRecord>, ImportError> {
        let rows = rows_from_csv(reader)?;
        Ok(Self::from_rows(&rows, fallback_date))
    }

    pub fn from_rows(rows: &[SheetRow], fallback_date: NaiveDate) -> Vec<SpendRecord> {
        rows.iter()
            .map(|row| spend_from_row(row, fallback_date))
            .collect()
    }
}

fn spend_from_row(row: &SheetRow, fallback_date: NaiveDate) -> SpendRecord {
    let date = row
        .get(DATE_COLUMNS)
        .and_then(parse_date)
        .map(|dt| dt.date())
        .unwrap_or(fallback_date);

    SpendRecord {
        campaign: row.text(CAMPAIGN_COLUMNS).unwrap_or_default(),
        adset: row.text(ADSET_COLUMNS).unwrap_or_default(),
        ad: row.text(AD_COLUMNS).unwrap_or_default(),
        date,
        spend_try: row.get(SPEND_COLUMNS).map(parse_number).unwrap_or(0.0),
        impressions: row
            .get(IMPRESSIONS_COLUMNS)
            .map(parse_number)
            .unwrap_or(0.0)
            .max(0.0) as u64,
        results: row
            .get(RESULTS_COLUMNS)
            .map(parse_number)
            .unwrap_or(0.0)
            .max(0.0) as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn fallback() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn spend_rows_parse_names_dates_and_amounts() {
        let csv = "Campaign Name,Adset Name,Ad Name,Date,Amount Spent (TRY),Impressions,Results\n\
Summer Smiles,DE Broad,Video A,02.06.2024,1500.50,12000,45\n";
        let records = SpendImporter::from_reader(Cursor::new(csv), fallback()).expect("import");

        let record = &records[0];
        assert_eq!(record.campaign, "Summer Smiles");
        assert_eq!(record.adset, "DE Broad");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
        assert_eq!(record.spend_try, 1500.50);
        assert_eq!(record.impressions, 12000);
        assert_eq!(record.results, 45);
    }

    #[test]
    fn malformed_cells_resolve_to_zero_and_fallback_date() {
        let csv = "Campaign Name,Date,Amount Spent (TRY)\nSummer Smiles,garbage,n/a\n";
        let records = SpendImporter::from_reader(Cursor::new(csv), fallback()).expect("import");

        assert_eq!(records[0].date, fallback());
        assert_eq!(records[0].spend_try, 0.0);
        assert_eq!(records[0].impressions, 0);
    }
}
