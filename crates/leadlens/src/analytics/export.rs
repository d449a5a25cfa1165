use super::domain::Lead;
use super::status::bucket_of;
use serde::Serialize;
use std::io::Write;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Flat projection of one lead for tabular export. Every column is derived
/// from the record alone, no lookups, so a filtered subset can be exported
/// without carrying the rest of the dataset along.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadExportRow {
    pub id: String,
    pub created: String,
    pub updated: String,
    pub days_since_update: i64,
    pub status: String,
    pub stage: &'static str,
    pub bucket: &'static str,
    pub lead_score: f32,
    pub treatment: &'static str,
    pub rep: String,
    pub country: String,
    pub language: String,
    pub source: String,
    pub campaign: String,
    pub adset: String,
    pub ad: String,
    pub revenue_eur: f64,
}

impl LeadExportRow {
    pub fn from_lead(lead: &Lead) -> Self {
        Self {
            id: lead.id.clone(),
            created: lead.create_date.format(DATE_FORMAT).to_string(),
            updated: lead.update_date.format(DATE_FORMAT).to_string(),
            days_since_update: lead.diff_days,
            status: lead.original_status.clone(),
            stage: lead.status.label(),
            bucket: bucket_of(&lead.original_status, lead.nr_count).label(),
            lead_score: lead.lead_score,
            treatment: lead.treatment.label(),
            rep: lead.rep_name.clone(),
            country: lead.country.clone(),
            language: lead.language.clone(),
            source: lead.source.clone(),
            campaign: lead.campaign.clone(),
            adset: lead.adset.clone(),
            ad: lead.ad.clone(),
            revenue_eur: lead.revenue,
        }
    }
}

/// Serialize a lead subset as CSV, header row included, input order kept.
pub fn write_csv<W: Write>(leads: &[Lead], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for lead in leads {
        csv_writer.serialize(LeadExportRow::from_lead(lead))?;
    }
    csv_writer.flush().map_err(csv::Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::domain::Treatment;
    use crate::analytics::status::{score_of, stage_of};
    use chrono::NaiveDate;

    fn lead(id: &str, status: &str) -> Lead {
        let created = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        Lead {
            id: id.to_string(),
            create_date: created,
            update_date: created,
            diff_days: 3,
            original_status: status.to_string(),
            status: stage_of(status),
            lead_score: score_of(status),
            treatment: Treatment::Hair,
            nr_count: 0,
            rep_name: "Deniz".to_string(),
            country: "UK".to_string(),
            language: "English".to_string(),
            source: "Facebook".to_string(),
            campaign: "Summer Smiles".to_string(),
            adset: "UK Broad".to_string(),
            ad: "Video A".to_string(),
            revenue: 0.0,
        }
    }

    #[test]
    fn row_is_derivable_from_the_lead_alone() {
        let row = LeadExportRow::from_lead(&lead("L-1", "offer sent"));
        assert_eq!(row.id, "L-1");
        assert_eq!(row.created, "2024-06-01 09:30:00");
        assert_eq!(row.stage, "Offer Sent");
        assert_eq!(row.bucket, "Active");
        assert_eq!(row.lead_score, 7.0);
        assert_eq!(row.treatment, "Hair");
    }

    #[test]
    fn csv_output_has_header_and_one_line_per_lead() {
        let leads = vec![lead("L-1", "new lead"), lead("L-2", "interested")];
        let mut buffer = Vec::new();
        write_csv(&leads, &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,created,updated"));
        assert!(lines[1].starts_with("L-1,"));
        assert!(lines[2].contains("interested"));
    }

    #[test]
    fn empty_subset_writes_nothing() {
        let mut buffer = Vec::new();
        write_csv(&[], &mut buffer).unwrap();
        assert!(buffer.is_empty());
    }
}
