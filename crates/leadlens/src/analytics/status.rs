use super::domain::{FunnelStage, StatusBucket, Treatment};

/// Canonical status vocabulary, checked top to bottom. One table feeds the
/// stage lookup, the score ladder, and the funnel membership sets so the
/// cumulative nesting of stages survives vocabulary changes.
///
/// Every classifier here is total: arbitrary free text from a CRM export
/// resolves to the documented default and never panics.
const STATUS_TABLE: &[(&str, FunnelStage, f32)] = &[
    ("operation done", FunnelStage::Success, 10.0),
    ("ticket received", FunnelStage::Success, 9.0),
    ("deposit received", FunnelStage::Success, 8.5),
    ("offer accepted", FunnelStage::OfferSent, 8.0),
    ("negotiation", FunnelStage::OfferSent, 7.5),
    ("offer sent", FunnelStage::OfferSent, 7.0),
    ("evaluation done", FunnelStage::WaitingEval, 6.5),
    ("waiting for evaluation", FunnelStage::WaitingEval, 6.0),
    ("interested", FunnelStage::Interested, 5.0),
    ("info given", FunnelStage::Interested, 4.5),
    ("follow up", FunnelStage::Interested, 4.0),
    ("new lead", FunnelStage::New, 1.0),
];

/// Lost/dead statuses. Independent of the funnel sets: a lead can count
/// toward Negative without affecting the staged counters.
const NEGATIVE_STATUSES: &[&str] = &[
    "not interested",
    "wrong number",
    "unreachable",
    "price too high",
    "dead lead",
];

/// Score assigned to any no-reply follow-up status (`nr1`..`nr5` and
/// separator variants like `nr 3`).
const NR_SCORE: f32 = 2.0;

fn canonical(status: &str) -> String {
    status.trim().to_ascii_lowercase()
}

fn is_nr_status(canonical: &str) -> bool {
    let Some(rest) = canonical.strip_prefix("nr") else {
        return false;
    };
    let rest = rest.trim_start_matches([' ', '-', '_']);
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}

/// Coarse funnel stage for a raw status string. Unrecognized text is `New`.
pub fn stage_of(status: &str) -> FunnelStage {
    let canonical = canonical(status);
    STATUS_TABLE
        .iter()
        .find(|(name, _, _)| *name == canonical)
        .map(|(_, stage, _)| *stage)
        .unwrap_or(FunnelStage::New)
}

/// Numeric lead score in [0, 10]. Exact matches first, then the `nr` prefix
/// rule; anything else scores 0.
pub fn score_of(status: &str) -> f32 {
    let canonical = canonical(status);
    if let Some((_, _, score)) = STATUS_TABLE.iter().find(|(name, _, _)| *name == canonical) {
        return *score;
    }
    if is_nr_status(&canonical) {
        return NR_SCORE;
    }
    0.0
}

/// Coarse pipeline bucket. Unrecognized text lands in `Active`: an operator
/// typed something, so the lead is being worked.
pub fn bucket_of(status: &str, nr_count: u32) -> StatusBucket {
    let canonical = canonical(status);
    if NEGATIVE_STATUSES.contains(&canonical.as_str()) || is_nr5(&canonical, nr_count) {
        return StatusBucket::Negative;
    }
    if canonical == "new lead" || is_nr_status(&canonical) {
        return StatusBucket::Open;
    }
    match stage_of(&canonical) {
        FunnelStage::Success => StatusBucket::Success,
        _ => StatusBucket::Active,
    }
}

/// Terminal no-reply state. Either the status string itself says NR5
/// (`nr5`, `nr 5`, `nr-5`, `nr_5`) or the counter column reached 5.
pub fn is_nr5(status: &str, nr_count: u32) -> bool {
    if nr_count == 5 {
        return true;
    }
    let canonical = canonical(status);
    let Some(rest) = canonical.strip_prefix("nr") else {
        return false;
    };
    let rest = match rest.as_bytes().first() {
        Some(b' ') | Some(b'-') | Some(b'_') => &rest[1..],
        _ => rest,
    };
    rest == "5"
}

pub fn is_negative(status: &str) -> bool {
    NEGATIVE_STATUSES.contains(&canonical(status).as_str())
}

/// Treatment classification from the free-text procedure-choice field.
pub fn treatment_of(procedure_choice: &str) -> Treatment {
    let canonical = canonical(procedure_choice);
    const DENTAL_KEYWORDS: &[&str] = &["dental", "zircon", "crown"];
    const HAIR_KEYWORDS: &[&str] = &["hair", "fue", "dhi"];

    if DENTAL_KEYWORDS.iter().any(|kw| canonical.contains(kw)) {
        return Treatment::Dental;
    }
    if HAIR_KEYWORDS.iter().any(|kw| canonical.contains(kw)) {
        return Treatment::Hair;
    }
    Treatment::Other
}

/// Membership test behind the cumulative funnel counters: true when the
/// status sits at `stage` or later in the pipeline.
pub fn at_or_past(status: &str, stage: FunnelStage) -> bool {
    stage_of(status) >= stage
}
