use super::domain::{FunnelStage, Lead};
use super::status::{at_or_past, is_negative, is_nr5};
use serde::Serialize;

/// Cumulative funnel counters. Each staged counter uses "at-least"
/// semantics: `interested` counts every lead at or past that stage, not the
/// leads currently sitting there. That is what lets the funnel bars render
/// percentage-of-previous-stage math directly. `negative` is independent of
/// the staged counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FunnelStats {
    pub new: usize,
    pub interested: usize,
    pub waiting_eval: usize,
    pub offer_sent: usize,
    pub success: usize,
    pub negative: usize,
}

impl FunnelStats {
    /// Conversion from one stage to the previous one, in percent, 0 when the
    /// previous stage is empty.
    pub fn conversion_pct(count: usize, previous: usize) -> f64 {
        if previous == 0 {
            0.0
        } else {
            count as f64 / previous as f64 * 100.0
        }
    }
}

/// Single-pass reduction of a lead collection into funnel counters.
pub fn funnel_stats(leads: &[Lead]) -> FunnelStats {
    let mut stats = FunnelStats::default();

    for lead in leads {
        stats.new += 1;
        if at_or_past(&lead.original_status, FunnelStage::Interested) {
            stats.interested += 1;
        }
        if at_or_past(&lead.original_status, FunnelStage::WaitingEval) {
            stats.waiting_eval += 1;
        }
        if at_or_past(&lead.original_status, FunnelStage::OfferSent) {
            stats.offer_sent += 1;
        }
        if at_or_past(&lead.original_status, FunnelStage::Success) {
            stats.success += 1;
        }
        if is_negative(&lead.original_status) || is_nr5(&lead.original_status, lead.nr_count) {
            stats.negative += 1;
        }
    }

    stats
}
