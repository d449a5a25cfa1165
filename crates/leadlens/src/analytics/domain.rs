use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Revenue attributed to a closed lead. The CRM export carries no deal
/// value, so success revenue is a flat figure rather than actual billing.
pub const SUCCESS_REVENUE_EUR: f64 = 3000.0;

pub const UNKNOWN: &str = "Unknown";
pub const UNASSIGNED: &str = "Unassigned";
pub const UNKNOWN_CAMPAIGN: &str = "Unknown Campaign";
pub const UNKNOWN_ADSET: &str = "Unknown Adset";
pub const UNKNOWN_AD: &str = "Unknown Ad";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStage {
    New,
    Interested,
    WaitingEval,
    OfferSent,
    Success,
}

impl FunnelStage {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::New,
            Self::Interested,
            Self::WaitingEval,
            Self::OfferSent,
            Self::Success,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Interested => "Interested",
            Self::WaitingEval => "Waiting for Evaluation",
            Self::OfferSent => "Offer Sent",
            Self::Success => "Success",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBucket {
    Open,
    Active,
    Success,
    Negative,
}

impl StatusBucket {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Active => "Active",
            Self::Success => "Success",
            Self::Negative => "Negative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Treatment {
    Dental,
    Hair,
    Other,
}

impl Treatment {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dental => "Dental",
            Self::Hair => "Hair",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionOutcome {
    Completed,
    Cancelled,
    Postponed,
    Planned,
}

impl ConversionOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Postponed => "Postponed",
            Self::Planned => "Planned",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    Green,
    Orange,
    Red,
}

impl HealthBand {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Green => "Green",
            Self::Orange => "Orange",
            Self::Red => "Red",
        }
    }
}

/// One CRM contact/opportunity, canonicalized at import time.
///
/// `diff_days` and `lead_score` are snapshots taken during normalization;
/// they do not move as wall-clock time passes unless the row is re-imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub create_date: NaiveDateTime,
    pub update_date: NaiveDateTime,
    pub diff_days: i64,
    pub original_status: String,
    pub status: FunnelStage,
    pub lead_score: f32,
    pub treatment: Treatment,
    pub nr_count: u32,
    pub rep_name: String,
    pub country: String,
    pub language: String,
    pub source: String,
    pub campaign: String,
    pub adset: String,
    pub ad: String,
    pub revenue: f64,
}

/// One daily ad-spend line for a (campaign, adset, ad) tuple. Never
/// referenced individually; always filtered and summed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendRecord {
    pub campaign: String,
    pub adset: String,
    pub ad: String,
    pub date: NaiveDate,
    pub spend_try: f64,
    pub impressions: u64,
    pub results: u64,
}

/// One patient/operation tracked by the back-office system, loosely linked
/// to a lead through `crm_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub mms_id: String,
    pub crm_id: String,
    pub patient_name: String,
    pub category: String,
    pub original_status: String,
    pub outcome: ConversionOutcome,
    pub operation_center: String,
    pub ticket_date: Option<NaiveDate>,
    pub operation_date: Option<NaiveDate>,
    pub hotel_enter_date: Option<NaiveDate>,
    pub hotel_leave_date: Option<NaiveDate>,
    pub airport_pickup_date: Option<NaiveDate>,
    /// First known date the patient is physically in motion:
    /// pickup > hotel enter > operation > ticket.
    pub arrival_anchor_date: Option<NaiveDate>,
    /// Euro-denominated amounts only; non-Euro source currencies are left
    /// `None` and must not be assumed convertible.
    pub expected_total_eur: Option<f64>,
    pub actual_received_eur: Option<f64>,
    pub upsale_eur: f64,
}

impl Patient {
    pub fn arrival_anchor(
        airport_pickup: Option<NaiveDate>,
        hotel_enter: Option<NaiveDate>,
        operation: Option<NaiveDate>,
        ticket: Option<NaiveDate>,
    ) -> Option<NaiveDate> {
        airport_pickup.or(hotel_enter).or(operation).or(ticket)
    }

    pub fn upsale(expected_eur: Option<f64>, actual_eur: Option<f64>) -> f64 {
        match (expected_eur, actual_eur) {
            (Some(expected), Some(actual)) if actual > expected => actual - expected,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrival_anchor_prefers_pickup_over_everything() {
        let pickup = NaiveDate::from_ymd_opt(2024, 5, 1);
        let hotel = NaiveDate::from_ymd_opt(2024, 5, 2);
        let operation = NaiveDate::from_ymd_opt(2024, 5, 3);
        let ticket = NaiveDate::from_ymd_opt(2024, 4, 20);

        assert_eq!(
            Patient::arrival_anchor(pickup, hotel, operation, ticket),
            pickup
        );
        assert_eq!(
            Patient::arrival_anchor(None, hotel, operation, ticket),
            hotel
        );
        assert_eq!(Patient::arrival_anchor(None, None, None, ticket), ticket);
        assert_eq!(Patient::arrival_anchor(None, None, None, None), None);
    }

    #[test]
    fn upsale_requires_euro_amounts_on_both_sides() {
        assert_eq!(Patient::upsale(Some(4000.0), Some(4500.0)), 500.0);
        assert_eq!(Patient::upsale(Some(4000.0), Some(3500.0)), 0.0);
        assert_eq!(Patient::upsale(None, Some(4500.0)), 0.0);
        assert_eq!(Patient::upsale(Some(4000.0), None), 0.0);
    }
}
