use super::cell::{parse_count, parse_date};
use super::{rows_from_csv, ImportError, SheetRow};
use crate::analytics::domain::{
    FunnelStage, Lead, SUCCESS_REVENUE_EUR, UNASSIGNED, UNKNOWN, UNKNOWN_AD, UNKNOWN_ADSET,
    UNKNOWN_CAMPAIGN,
};
use crate::analytics::status::{score_of, stage_of, treatment_of};
use chrono::NaiveDateTime;
use std::io::Read;
use std::path::Path;

const ID_COLUMNS: &[&str] = &["lead id", "record id", "id"];
const CREATE_COLUMNS: &[&str] = &["create date", "created", "created at"];
const UPDATE_COLUMNS: &[&str] = &["last update", "last activity date", "updated", "updated at"];
const STATUS_COLUMNS: &[&str] = &["lead status", "status"];
const NR_COUNT_COLUMNS: &[&str] = &["nr count", "no reply count"];
const REP_COLUMNS: &[&str] = &["lead owner", "owner", "sales rep"];
const COUNTRY_COLUMNS: &[&str] = &["country", "country/region"];
const LANGUAGE_COLUMNS: &[&str] = &["language", "preferred language"];
const SOURCE_COLUMNS: &[&str] = &["lead source", "source", "original source"];
const CAMPAIGN_COLUMNS: &[&str] = &["campaign", "campaign name", "utm campaign"];
const ADSET_COLUMNS: &[&str] = &["adset", "ad set", "adset name", "utm adset"];
const AD_COLUMNS: &[&str] = &["ad", "ad name", "utm content"];
const PROCEDURE_COLUMNS: &[&str] = &["procedure choice", "treatment", "interested in"];

/// Lenient importer for CRM lead exports. Absent columns fall back to the
/// sentinel defaults, so this importer never rejects a sheet.
pub struct LeadImporter;

impl LeadImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        now: NaiveDateTime,
    ) -> Result<Vec<Lead>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, now)
    }

    pub fn from_reader<R: Read>(reader: R, now: NaiveDateTime) -> Result<Vec<Lead>, ImportError> {
        let rows = rows_from_csv(reader)?;
        Ok(Self::from_rows(&rows, now))
    }

    /// Normalize raw worksheet rows into canonical leads. `now` is the
    /// import instant; `diff_days` and `lead_score` are snapshots of it.
    pub fn from_rows(rows: &[SheetRow], now: NaiveDateTime) -> Vec<Lead> {
        rows.iter()
            .enumerate()
            .map(|(index, row)| lead_from_row(row, index, now))
            .collect()
    }
}

fn lead_from_row(row: &SheetRow, index: usize, now: NaiveDateTime) -> Lead {
    let id = row
        .text(ID_COLUMNS)
        .unwrap_or_else(|| format!("IMP-{}-{}", now.and_utc().timestamp(), index));

    let create_date = row
        .get(CREATE_COLUMNS)
        .and_then(parse_date)
        .unwrap_or(now);
    let update_date = row
        .get(UPDATE_COLUMNS)
        .and_then(parse_date)
        .unwrap_or(create_date);
    let diff_days = (now - update_date).num_days();

    let original_status = row.text(STATUS_COLUMNS).unwrap_or_else(|| "New Lead".to_string());
    let status = stage_of(&original_status);
    let lead_score = score_of(&original_status);
    let nr_count = row.get(NR_COUNT_COLUMNS).map(parse_count).unwrap_or(0);

    let treatment = treatment_of(&row.text(PROCEDURE_COLUMNS).unwrap_or_default());

    let revenue = if status == FunnelStage::Success {
        SUCCESS_REVENUE_EUR
    } else {
        0.0
    };

    Lead {
        id,
        create_date,
        update_date,
        diff_days,
        original_status,
        status,
        lead_score,
        treatment,
        nr_count,
        rep_name: row.text(REP_COLUMNS).unwrap_or_else(|| UNASSIGNED.to_string()),
        country: row.text(COUNTRY_COLUMNS).unwrap_or_else(|| UNKNOWN.to_string()),
        language: row.text(LANGUAGE_COLUMNS).unwrap_or_else(|| UNKNOWN.to_string()),
        source: row.text(SOURCE_COLUMNS).unwrap_or_else(|| UNKNOWN.to_string()),
        campaign: row
            .text(CAMPAIGN_COLUMNS)
            .unwrap_or_else(|| UNKNOWN_CAMPAIGN.to_string()),
        adset: row
            .text(ADSET_COLUMNS)
            .unwrap_or_else(|| UNKNOWN_ADSET.to_string()),
        ad: row.text(AD_COLUMNS).unwrap_or_else(|| UNKNOWN_AD.to_string()),
        revenue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::domain::Treatment;
    use chrono::NaiveDate;
    use std::io::Cursor;

    fn import_instant() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn full_row_normalizes_every_field() {
        let csv = "Lead ID,Create Date,Last Update,Lead Status,NR Count,Lead Owner,Country,Language,Lead Source,Campaign,Adset,Ad,Procedure Choice\n\
L-1,01.06.2024,10.06.2024,Offer Sent,0,Ayse,Germany,German,Facebook,Summer Smiles,DE Broad,Video A,Zircon Crowns\n";
        let leads = LeadImporter::from_reader(Cursor::new(csv), import_instant()).expect("import");

        let lead = &leads[0];
        assert_eq!(lead.id, "L-1");
        assert_eq!(lead.status, FunnelStage::OfferSent);
        assert_eq!(lead.lead_score, 7.0);
        assert_eq!(lead.treatment, Treatment::Dental);
        assert_eq!(lead.diff_days, 5);
        assert_eq!(lead.rep_name, "Ayse");
        assert_eq!(lead.campaign, "Summer Smiles");
        assert_eq!(lead.revenue, 0.0);
    }

    #[test]
    fn missing_columns_fall_back_to_sentinels() {
        let csv = "Lead Status\nTicket Received\n";
        let leads = LeadImporter::from_reader(Cursor::new(csv), import_instant()).expect("import");

        let lead = &leads[0];
        assert!(lead.id.starts_with("IMP-"));
        assert_eq!(lead.create_date, import_instant());
        assert_eq!(lead.update_date, import_instant());
        assert_eq!(lead.diff_days, 0);
        assert_eq!(lead.rep_name, UNASSIGNED);
        assert_eq!(lead.country, UNKNOWN);
        assert_eq!(lead.campaign, UNKNOWN_CAMPAIGN);
        assert_eq!(lead.adset, UNKNOWN_ADSET);
        assert_eq!(lead.ad, UNKNOWN_AD);
        assert_eq!(lead.revenue, SUCCESS_REVENUE_EUR);
    }

    #[test]
    fn unparseable_dates_never_surface_downstream() {
        let csv = "Create Date,Last Update,Lead Status\ngarbage,also garbage,New Lead\n";
        let leads = LeadImporter::from_reader(Cursor::new(csv), import_instant()).expect("import");

        assert_eq!(leads[0].create_date, import_instant());
        assert_eq!(leads[0].update_date, import_instant());
    }

    #[test]
    fn synthesized_ids_carry_row_index() {
        let csv = "Lead Status\nNew Lead\nNew Lead\n";
        let leads = LeadImporter::from_reader(Cursor::new(csv), import_instant()).expect("import");
        assert_ne!(leads[0].id, leads[1].id);
        assert!(leads[1].id.ends_with("-1"));
    }
}
