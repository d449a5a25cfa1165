use super::domain::{HealthBand, Lead, StatusBucket};
use super::status::{bucket_of, is_nr5};
use serde::Serialize;
use std::collections::BTreeMap;

/// The five KPIs behind the 100-point health score. Each one is computed
/// over its own status-filtered subset and contributes an independently
/// capped deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiKind {
    Velocity,
    Discipline,
    Process,
    Closing,
    Hygiene,
}

impl KpiKind {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Velocity,
            Self::Discipline,
            Self::Process,
            Self::Closing,
            Self::Hygiene,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Velocity => "New-Lead Velocity",
            Self::Discipline => "Follow-Up Discipline",
            Self::Process => "Evaluation Process",
            Self::Closing => "Offer Closing",
            Self::Hygiene => "Pipeline Hygiene",
        }
    }

    /// Maximum points this KPI can remove from the 100-point baseline.
    pub const fn max_deduction(self) -> f64 {
        match self {
            Self::Velocity => 30.0,
            Self::Discipline => 15.0,
            Self::Process => 20.0,
            Self::Closing => 20.0,
            Self::Hygiene => 15.0,
        }
    }

    /// Per-KPI (red, orange) thresholds against the overdue percentage.
    pub const fn band_thresholds(self) -> (f64, f64) {
        match self {
            Self::Velocity => (25.0, 10.0),
            Self::Discipline => (30.0, 15.0),
            Self::Process => (20.0, 10.0),
            Self::Closing => (35.0, 20.0),
            Self::Hygiene => (40.0, 25.0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KpiScore {
    pub kind: KpiKind,
    pub label: &'static str,
    pub total: usize,
    pub overdue: usize,
    pub overdue_pct: f64,
    pub deduction: f64,
    pub band: HealthBand,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScopeHealth {
    pub score: u8,
    pub band: HealthBand,
    pub kpis: Vec<KpiScore>,
}

/// Health of one rep within a team board.
#[derive(Debug, Clone, Serialize)]
pub struct RepHealth {
    pub rep_name: String,
    pub lead_count: usize,
    pub health: ScopeHealth,
}

/// Team view. `team_score` is the arithmetic mean of each rep's own health
/// score; `aggregate` is the score over the pooled lead set. They are
/// different numbers on purpose: the mean keeps one high-volume rep from
/// drowning out the rest, the aggregate is shown for reference.
#[derive(Debug, Clone, Serialize)]
pub struct TeamHealth {
    pub team_score: u8,
    pub team_band: HealthBand,
    pub aggregate: ScopeHealth,
    pub reps: Vec<RepHealth>,
}

pub fn score_band(score: f64) -> HealthBand {
    if score < 60.0 {
        HealthBand::Red
    } else if score < 85.0 {
        HealthBand::Orange
    } else {
        HealthBand::Green
    }
}

fn kpi_band(kind: KpiKind, overdue_pct: f64) -> HealthBand {
    let (red, orange) = kind.band_thresholds();
    if overdue_pct > red {
        HealthBand::Red
    } else if overdue_pct > orange {
        HealthBand::Orange
    } else {
        HealthBand::Green
    }
}

fn canonical(status: &str) -> String {
    status.trim().to_ascii_lowercase()
}

/// Days since the lead was created, reconstructed from the snapshot values
/// taken at import time.
fn age_days(lead: &Lead) -> i64 {
    lead.diff_days + (lead.update_date - lead.create_date).num_days()
}

/// Step function for how long an offer may idle before it counts as stuck:
/// young offers get chased fast, old ones are allowed longer gaps.
fn closing_threshold(age_days: i64) -> i64 {
    if age_days < 14 {
        7
    } else if age_days < 30 {
        10
    } else if age_days < 60 {
        20
    } else {
        30
    }
}

struct KpiAccumulator {
    total: usize,
    overdue: usize,
}

impl KpiAccumulator {
    fn new() -> Self {
        Self { total: 0, overdue: 0 }
    }

    fn observe(&mut self, overdue: bool) {
        self.total += 1;
        if overdue {
            self.overdue += 1;
        }
    }

    fn finish(self, kind: KpiKind) -> KpiScore {
        let overdue_pct = if self.total == 0 {
            0.0
        } else {
            self.overdue as f64 / self.total as f64 * 100.0
        };
        let deduction = if self.total == 0 {
            0.0
        } else {
            kind.max_deduction() * self.overdue as f64 / self.total as f64
        };

        KpiScore {
            kind,
            label: kind.label(),
            total: self.total,
            overdue: self.overdue,
            overdue_pct,
            deduction,
            band: kpi_band(kind, overdue_pct),
        }
    }
}

/// Weighted 100-point health score for any scope (company, team, rep,
/// treatment): five capped deductions, never below zero.
pub fn calculate_health(leads: &[Lead]) -> ScopeHealth {
    let mut velocity = KpiAccumulator::new();
    let mut discipline = KpiAccumulator::new();
    let mut process = KpiAccumulator::new();
    let mut closing = KpiAccumulator::new();
    let mut hygiene = KpiAccumulator::new();

    for lead in leads {
        let status = canonical(&lead.original_status);

        if status == "new lead" {
            velocity.observe(lead.diff_days >= 1);
        }

        // NR5 is the graveyard: terminal, nothing left to follow up on.
        if status.starts_with("nr") && !is_nr5(&status, lead.nr_count) {
            discipline.observe(lead.diff_days > 7);
        }

        if status == "waiting for evaluation" || status == "evaluation done" {
            process.observe(lead.diff_days > 1);
        }

        if status == "offer sent" {
            closing.observe(lead.diff_days > closing_threshold(age_days(lead)));
        }

        if bucket_of(&status, lead.nr_count) == StatusBucket::Active && status != "offer sent" {
            hygiene.observe(lead.diff_days > 7);
        }
    }

    let kpis = vec![
        velocity.finish(KpiKind::Velocity),
        discipline.finish(KpiKind::Discipline),
        process.finish(KpiKind::Process),
        closing.finish(KpiKind::Closing),
        hygiene.finish(KpiKind::Hygiene),
    ];

    let total_deduction: f64 = kpis.iter().map(|kpi| kpi.deduction).sum();
    let score = (100.0 - total_deduction).round().max(0.0) as u8;

    ScopeHealth {
        score,
        band: score_band(score as f64),
        kpis,
    }
}

/// Per-rep board plus the two team figures. Reps are ranked by score
/// descending with name ascending as the stable tie-break.
pub fn team_health(leads: &[Lead]) -> TeamHealth {
    let mut by_rep: BTreeMap<&str, Vec<Lead>> = BTreeMap::new();
    for lead in leads {
        by_rep.entry(lead.rep_name.as_str()).or_default().push(lead.clone());
    }

    let mut reps: Vec<RepHealth> = by_rep
        .into_iter()
        .map(|(rep_name, rep_leads)| RepHealth {
            rep_name: rep_name.to_string(),
            lead_count: rep_leads.len(),
            health: calculate_health(&rep_leads),
        })
        .collect();
    reps.sort_by(|a, b| {
        b.health
            .score
            .cmp(&a.health.score)
            .then_with(|| a.rep_name.cmp(&b.rep_name))
    });

    let aggregate = calculate_health(leads);
    let team_score = if reps.is_empty() {
        aggregate.score
    } else {
        let sum: u32 = reps.iter().map(|rep| rep.health.score as u32).sum();
        (sum as f64 / reps.len() as f64).round() as u8
    };

    TeamHealth {
        team_score,
        team_band: score_band(team_score as f64),
        aggregate,
        reps,
    }
}
