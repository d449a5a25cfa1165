use super::domain::{ConversionOutcome, Lead, Patient};
use serde::Serialize;

/// Loose join from a patient back to the lead collection. CRM exports and
/// the operations sheet disagree on casing and padding, so the match trims
/// and ignores ASCII case. A miss is an answer, not an error.
pub fn find_lead_for<'a>(patient: &Patient, leads: &'a [Lead]) -> Option<&'a Lead> {
    let wanted = patient.crm_id.trim();
    if wanted.is_empty() {
        return None;
    }
    leads
        .iter()
        .find(|lead| lead.id.trim().eq_ignore_ascii_case(wanted))
}

/// Operations roll-up over the patient collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatientSummary {
    pub total: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub postponed: usize,
    pub planned: usize,
    /// Euro-denominated amounts only; patients billed in other currencies
    /// contribute to the counts but not to the money totals.
    pub expected_total_eur: f64,
    pub actual_received_eur: f64,
    pub upsale_total_eur: f64,
    pub linked_to_crm: usize,
}

pub fn patient_summary(patients: &[Patient], leads: &[Lead]) -> PatientSummary {
    let mut summary = PatientSummary::default();

    for patient in patients {
        summary.total += 1;
        match patient.outcome {
            ConversionOutcome::Completed => summary.completed += 1,
            ConversionOutcome::Cancelled => summary.cancelled += 1,
            ConversionOutcome::Postponed => summary.postponed += 1,
            ConversionOutcome::Planned => summary.planned += 1,
        }
        if let Some(expected) = patient.expected_total_eur {
            summary.expected_total_eur += expected;
        }
        if let Some(actual) = patient.actual_received_eur {
            summary.actual_received_eur += actual;
        }
        summary.upsale_total_eur += patient.upsale_eur;
        if find_lead_for(patient, leads).is_some() {
            summary.linked_to_crm += 1;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::domain::{FunnelStage, Treatment};
    use chrono::NaiveDate;

    fn lead(id: &str) -> Lead {
        let created = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Lead {
            id: id.to_string(),
            create_date: created,
            update_date: created,
            diff_days: 0,
            original_status: "operation done".to_string(),
            status: FunnelStage::Success,
            lead_score: 10.0,
            treatment: Treatment::Dental,
            nr_count: 0,
            rep_name: "Ayse".to_string(),
            country: "Germany".to_string(),
            language: "German".to_string(),
            source: "Facebook".to_string(),
            campaign: "C".to_string(),
            adset: "A".to_string(),
            ad: "Ad".to_string(),
            revenue: 3000.0,
        }
    }

    fn patient(crm_id: &str, outcome: ConversionOutcome) -> Patient {
        Patient {
            mms_id: "MMS-1".to_string(),
            crm_id: crm_id.to_string(),
            patient_name: "Jane Roe".to_string(),
            category: "Dental".to_string(),
            original_status: "Completed".to_string(),
            outcome,
            operation_center: "Istanbul".to_string(),
            ticket_date: None,
            operation_date: None,
            hotel_enter_date: None,
            hotel_leave_date: None,
            airport_pickup_date: None,
            arrival_anchor_date: None,
            expected_total_eur: Some(4000.0),
            actual_received_eur: Some(4500.0),
            upsale_eur: 500.0,
        }
    }

    #[test]
    fn join_ignores_case_and_padding() {
        let leads = vec![lead("CRM-1001")];
        let found = find_lead_for(&patient("  crm-1001 ", ConversionOutcome::Completed), &leads);
        assert_eq!(found.map(|l| l.id.as_str()), Some("CRM-1001"));
    }

    #[test]
    fn join_misses_return_none() {
        let leads = vec![lead("CRM-1001")];
        assert!(find_lead_for(&patient("CRM-9999", ConversionOutcome::Planned), &leads).is_none());
        assert!(find_lead_for(&patient("   ", ConversionOutcome::Planned), &leads).is_none());
    }

    #[test]
    fn summary_rolls_up_outcomes_and_euro_totals() {
        let leads = vec![lead("CRM-1001")];
        let mut unlinked = patient("CRM-2", ConversionOutcome::Cancelled);
        unlinked.expected_total_eur = None;
        unlinked.actual_received_eur = None;
        unlinked.upsale_eur = 0.0;

        let patients = vec![patient("CRM-1001", ConversionOutcome::Completed), unlinked];
        let summary = patient_summary(&patients, &leads);

        assert_eq!(summary.total, 2);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.expected_total_eur, 4000.0);
        assert_eq!(summary.actual_received_eur, 4500.0);
        assert_eq!(summary.upsale_total_eur, 500.0);
        assert_eq!(summary.linked_to_crm, 1);
    }
}
