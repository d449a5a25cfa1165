use super::domain::{Lead, Treatment};
use super::teams::TeamRoster;
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Reporting window selector. Custom bounds are interpreted as naive local
/// midnight-to-end-of-day, never converted through UTC; that is what keeps a
/// lead created at 00:00 on the end date inside the window regardless of the
/// host timezone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateRange {
    ThisMonth,
    LastMonth,
    SixMonths,
    #[default]
    AllTime,
    Custom {
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl DateRange {
    /// Closed window `[start, end]` for the given reporting day, or `None`
    /// when the range is unbounded.
    pub fn resolve(&self, today: NaiveDate) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let window = match self {
            DateRange::AllTime => return None,
            DateRange::ThisMonth => {
                let start = first_of_month(today);
                (start, end_of_month(start))
            }
            DateRange::LastMonth => {
                let start = first_of_month(today) - Months::new(1);
                (start, end_of_month(start))
            }
            DateRange::SixMonths => (today - Months::new(6), today),
            DateRange::Custom { start, end } => (*start, *end),
        };

        let (start, end) = window;
        Some((start_of_day(start), end_of_day(end)))
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn end_of_month(first: NaiveDate) -> NaiveDate {
    (first + Months::new(1)).pred_opt().unwrap_or(first)
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN))
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(23, 59, 59)
        .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN))
}

/// Dashboard filter specification. Every allow-list is optional; empty means
/// match-all, and all active filters are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadFilter {
    pub date_range: DateRange,
    pub treatments: Vec<Treatment>,
    pub countries: Vec<String>,
    pub reps: Vec<String>,
    pub languages: Vec<String>,
    pub sources: Vec<String>,
    pub campaigns: Vec<String>,
    pub adsets: Vec<String>,
    pub ads: Vec<String>,
    pub teams: Vec<String>,
}

impl LeadFilter {
    pub fn matches(&self, lead: &Lead, roster: &TeamRoster, today: NaiveDate) -> bool {
        if let Some((start, end)) = self.date_range.resolve(today) {
            if lead.create_date < start || lead.create_date > end {
                return false;
            }
        }

        if !self.teams.is_empty() {
            let allowed = roster.members_of(&self.teams);
            if !allowed.contains(lead.rep_name.as_str()) {
                return false;
            }
        }

        allow(&self.treatments, &lead.treatment)
            && allow(&self.countries, &lead.country)
            && allow(&self.reps, &lead.rep_name)
            && allow(&self.languages, &lead.language)
            && allow(&self.sources, &lead.source)
            && allow(&self.campaigns, &lead.campaign)
            && allow(&self.adsets, &lead.adset)
            && allow(&self.ads, &lead.ad)
    }
}

fn allow<T: PartialEq>(list: &[T], value: &T) -> bool {
    list.is_empty() || list.contains(value)
}

/// Pure subset selection: same inputs, same output, relative order kept,
/// input untouched.
pub fn filter_leads(
    leads: &[Lead],
    filter: &LeadFilter,
    roster: &TeamRoster,
    today: NaiveDate,
) -> Vec<Lead> {
    leads
        .iter()
        .filter(|lead| filter.matches(lead, roster, today))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::domain::FunnelStage;
    use chrono::NaiveDate;

    fn lead(id: &str, create: NaiveDate, rep: &str, country: &str) -> Lead {
        let create_date = create.and_hms_opt(0, 0, 0).unwrap();
        Lead {
            id: id.to_string(),
            create_date,
            update_date: create_date,
            diff_days: 0,
            original_status: "new lead".to_string(),
            status: FunnelStage::New,
            lead_score: 1.0,
            treatment: Treatment::Dental,
            nr_count: 0,
            rep_name: rep.to_string(),
            country: country.to_string(),
            language: "English".to_string(),
            source: "Facebook".to_string(),
            campaign: "C1".to_string(),
            adset: "A1".to_string(),
            ad: "Ad1".to_string(),
            revenue: 0.0,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn sample() -> Vec<Lead> {
        vec![
            lead("1", NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(), "Ayse", "Germany"),
            lead("2", NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(), "Deniz", "UK"),
            lead("3", NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(), "Sofia", "Germany"),
        ]
    }

    #[test]
    fn all_time_returns_input_unchanged() {
        let leads = sample();
        let filtered = filter_leads(&leads, &LeadFilter::default(), &TeamRoster::standard(), today());
        assert_eq!(filtered, leads);
    }

    #[test]
    fn custom_range_spanning_input_is_idempotent() {
        let leads = sample();
        let filter = LeadFilter {
            date_range: DateRange::Custom {
                start: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            },
            ..Default::default()
        };
        let filtered = filter_leads(&leads, &filter, &TeamRoster::standard(), today());
        assert_eq!(filtered, leads);
    }

    #[test]
    fn custom_range_boundaries_are_inclusive_start_exclusive_after_end() {
        let leads = sample();
        let filter = LeadFilter {
            date_range: DateRange::Custom {
                start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            },
            ..Default::default()
        };
        let filtered = filter_leads(&leads, &filter, &TeamRoster::standard(), today());
        // Midnight on Jan 31 is in; midnight on Feb 1 is out.
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "1");
    }

    #[test]
    fn this_month_and_six_months_resolve_against_today() {
        let leads = sample();
        let this_month = LeadFilter {
            date_range: DateRange::ThisMonth,
            ..Default::default()
        };
        let filtered = filter_leads(&leads, &this_month, &TeamRoster::standard(), today());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "3");

        let six_months = LeadFilter {
            date_range: DateRange::SixMonths,
            ..Default::default()
        };
        // Rolling window starts 2023-12-15, so every sample lead is inside.
        let filtered = filter_leads(&leads, &six_months, &TeamRoster::standard(), today());
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn last_month_pins_previous_calendar_month_across_year_boundary() {
        let leads = vec![
            lead("nov", NaiveDate::from_ymd_opt(2024, 11, 30).unwrap(), "Ayse", "Germany"),
            lead("dec-first", NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(), "Ayse", "Germany"),
            lead("dec-last", NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(), "Ayse", "Germany"),
            lead("jan", NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), "Ayse", "Germany"),
        ];
        let filter = LeadFilter {
            date_range: DateRange::LastMonth,
            ..Default::default()
        };

        // Seen from mid-January, "last month" is December of the prior year.
        let january = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let filtered = filter_leads(&leads, &filter, &TeamRoster::standard(), january);
        let ids: Vec<&str> = filtered.iter().map(|lead| lead.id.as_str()).collect();
        assert_eq!(ids, ["dec-first", "dec-last"]);
    }

    #[test]
    fn team_filter_excludes_reps_outside_selected_rosters() {
        let leads = sample();
        let filter = LeadFilter {
            teams: vec!["Team Bosphorus".to_string()],
            countries: vec!["Germany".to_string()],
            ..Default::default()
        };
        let filtered = filter_leads(&leads, &filter, &TeamRoster::standard(), today());
        // Sofia is German-market but not on Team Bosphorus.
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].rep_name, "Ayse");
    }

    #[test]
    fn attribute_filters_are_anded() {
        let leads = sample();
        let filter = LeadFilter {
            countries: vec!["Germany".to_string()],
            reps: vec!["Sofia".to_string()],
            ..Default::default()
        };
        let filtered = filter_leads(&leads, &filter, &TeamRoster::standard(), today());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "3");
    }
}
