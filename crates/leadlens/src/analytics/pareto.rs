use super::domain::{
    FunnelStage, Lead, SpendRecord, UNASSIGNED, UNKNOWN, UNKNOWN_AD, UNKNOWN_ADSET,
    UNKNOWN_CAMPAIGN,
};
use super::filter::DateRange;
use super::marketing::{dominant, group_by, spend_in_context, try_to_eur, SpendContext};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which attribute the Pareto ranking groups leads by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParetoDimension {
    Campaign,
    Adset,
    Ad,
    Source,
    Rep,
}

impl ParetoDimension {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Campaign => "Campaign",
            Self::Adset => "Adset",
            Self::Ad => "Ad",
            Self::Source => "Source",
            Self::Rep => "Rep",
        }
    }

    fn key(self, lead: &Lead) -> &str {
        match self {
            Self::Campaign => &lead.campaign,
            Self::Adset => &lead.adset,
            Self::Ad => &lead.ad,
            Self::Source => &lead.source,
            Self::Rep => &lead.rep_name,
        }
    }

    /// Sentinel value for unattributed leads in this dimension; such
    /// entities are excluded before ranking.
    const fn sentinel(self) -> &'static str {
        match self {
            Self::Campaign => UNKNOWN_CAMPAIGN,
            Self::Adset => UNKNOWN_ADSET,
            Self::Ad => UNKNOWN_AD,
            Self::Source => UNKNOWN,
            Self::Rep => UNASSIGNED,
        }
    }
}

/// Value metric summed per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParetoMetric {
    /// Attributed revenue (flat per success lead).
    Revenue,
    /// Count of leads at offer stage or later.
    Acquisition,
}

impl ParetoMetric {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Revenue => "Revenue",
            Self::Acquisition => "Acquisition",
        }
    }

    fn value(self, leads: &[&Lead]) -> f64 {
        match self {
            Self::Revenue => leads.iter().map(|lead| lead.revenue).sum(),
            Self::Acquisition => leads
                .iter()
                .filter(|lead| lead.status >= FunnelStage::OfferSent)
                .count() as f64,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParetoEntry {
    pub name: String,
    pub lead_count: usize,
    pub value: f64,
    pub share_pct: f64,
    pub cumulative_pct: f64,
    pub vital: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParetoAnalysis {
    pub entries: Vec<ParetoEntry>,
    pub vital_few_count: usize,
    pub vital_few_pct: f64,
}

/// Rank entities of one dimension by a value metric and mark the "vital
/// few": every entity up to and including the first index where the
/// cumulative share reaches 80%.
pub fn pareto_analysis(
    leads: &[Lead],
    dimension: ParetoDimension,
    metric: ParetoMetric,
) -> ParetoAnalysis {
    let eligible: Vec<&Lead> = leads
        .iter()
        .filter(|lead| {
            let name = dimension.key(lead);
            !name.trim().is_empty() && name != dimension.sentinel()
        })
        .collect();

    let mut ranked: Vec<(String, usize, f64)> = group_by(&eligible, |lead| dimension.key(lead))
        .into_iter()
        .map(|(name, members)| {
            let value = metric.value(&members);
            (name, members.len(), value)
        })
        .collect();
    ranked.sort_by(|a, b| b.2.total_cmp(&a.2).then_with(|| a.0.cmp(&b.0)));

    let total: f64 = ranked.iter().map(|(_, _, value)| value).sum();

    let mut cumulative = 0.0;
    let mut cutoff: Option<usize> = None;
    let mut entries: Vec<ParetoEntry> = ranked
        .into_iter()
        .enumerate()
        .map(|(index, (name, lead_count, value))| {
            let share_pct = if total > 0.0 { value / total * 100.0 } else { 0.0 };
            cumulative += share_pct;
            if cutoff.is_none() && cumulative >= 80.0 && total > 0.0 {
                cutoff = Some(index);
            }
            ParetoEntry {
                name,
                lead_count,
                value,
                share_pct,
                cumulative_pct: cumulative,
                vital: false,
            }
        })
        .collect();

    let vital_few_count = cutoff.map(|index| index + 1).unwrap_or(0);
    for entry in entries.iter_mut().take(vital_few_count) {
        entry.vital = true;
    }
    let vital_few_pct = if entries.is_empty() {
        0.0
    } else {
        vital_few_count as f64 / entries.len() as f64 * 100.0
    };

    ParetoAnalysis {
        entries,
        vital_few_count,
        vital_few_pct,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EfficiencyClass {
    Star,
    Steady,
    Bottleneck,
}

impl EfficiencyClass {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Star => "Star Performer",
            Self::Steady => "Steady",
            Self::Bottleneck => "Bottleneck",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EfficiencyEntry {
    pub name: String,
    pub lead_count: usize,
    pub offer_count: usize,
    pub volume_share_pct: f64,
    pub offer_share_pct: f64,
    /// Offer share over volume share; above 1 means the entity converts
    /// disproportionately well for its size.
    pub ratio: f64,
    pub class: EfficiencyClass,
}

const STAR_RATIO: f64 = 1.2;
const BOTTLENECK_RATIO: f64 = 0.8;

/// Volume-share vs offer-share efficiency per entity of a dimension,
/// sorted by ratio descending.
pub fn efficiency_ratios(leads: &[Lead], dimension: ParetoDimension) -> Vec<EfficiencyEntry> {
    let eligible: Vec<&Lead> = leads
        .iter()
        .filter(|lead| {
            let name = dimension.key(lead);
            !name.trim().is_empty() && name != dimension.sentinel()
        })
        .collect();

    let total_volume = eligible.len();
    let total_offers = eligible
        .iter()
        .filter(|lead| lead.status >= FunnelStage::OfferSent)
        .count();

    let mut entries: Vec<EfficiencyEntry> = group_by(&eligible, |lead| dimension.key(lead))
        .into_iter()
        .map(|(name, members)| {
            let offers = members
                .iter()
                .filter(|lead| lead.status >= FunnelStage::OfferSent)
                .count();
            let volume_share_pct = if total_volume == 0 {
                0.0
            } else {
                members.len() as f64 / total_volume as f64 * 100.0
            };
            let offer_share_pct = if total_offers == 0 {
                0.0
            } else {
                offers as f64 / total_offers as f64 * 100.0
            };
            let ratio = if volume_share_pct == 0.0 {
                0.0
            } else {
                offer_share_pct / volume_share_pct
            };
            let class = if ratio > STAR_RATIO {
                EfficiencyClass::Star
            } else if ratio < BOTTLENECK_RATIO {
                EfficiencyClass::Bottleneck
            } else {
                EfficiencyClass::Steady
            };

            EfficiencyEntry {
                name,
                lead_count: members.len(),
                offer_count: offers,
                volume_share_pct,
                offer_share_pct,
                ratio,
                class,
            }
        })
        .collect();

    entries.sort_by(|a, b| b.ratio.total_cmp(&a.ratio).then_with(|| a.name.cmp(&b.name)));
    entries
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityTier {
    /// Rotate budget between creatives inside one adset.
    IntraAdset,
    /// Scale budget between adsets sharing a (country, treatment) context.
    InterAdset,
}

impl OpportunityTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::IntraAdset => "Creative Rotation",
            Self::InterAdset => "Adset Scaling",
        }
    }
}

/// One accepted budget-shift proposal with its projected effect.
#[derive(Debug, Clone, Serialize)]
pub struct Opportunity {
    pub tier: OpportunityTier,
    pub scope: String,
    pub from_name: String,
    pub to_name: String,
    pub shift_eur: f64,
    pub from_cpl_eur: f64,
    pub to_cpl_eur: f64,
    pub leads_lost: f64,
    pub leads_gained: f64,
    pub net_lift: f64,
    pub new_blended_cpl_eur: f64,
}

const INTRA_MIN_LEADS: usize = 5;
const INTRA_MIN_SPEND_EUR: f64 = 20.0;
const INTRA_CPL_GAP: f64 = 1.4;
const INTRA_SHIFT_SHARE: f64 = 0.3;
const INTRA_SHIFT_FLOOR_EUR: f64 = 10.0;

const INTER_MIN_LEADS: usize = 10;
const INTER_MIN_SPEND_EUR: f64 = 100.0;
const INTER_CPL_GAP: f64 = 1.3;
const INTER_SHIFT_SHARE: f64 = 0.2;
const INTER_SHIFT_FLOOR_EUR: f64 = 50.0;

const MAX_OPPORTUNITIES: usize = 6;

#[derive(Debug, Clone)]
struct NodeEconomics {
    name: String,
    lead_count: usize,
    spend_eur: f64,
    cpl_eur: f64,
}

fn economics(name: String, lead_count: usize, spend_eur: f64) -> NodeEconomics {
    let cpl_eur = if lead_count == 0 {
        0.0
    } else {
        spend_eur / lead_count as f64
    };
    NodeEconomics {
        name,
        lead_count,
        spend_eur,
        cpl_eur,
    }
}

/// Greedy best-vs-worst pairing within a pool of comparable nodes. Single
/// pair, single pass: the heuristic deliberately ignores diminishing
/// returns and three-way reallocations because its output is directional
/// guidance, not a solver result.
fn pair_proposal(
    pool: &[NodeEconomics],
    tier: OpportunityTier,
    scope: &str,
    gap: f64,
    shift_share: f64,
    floor_eur: f64,
) -> Option<Opportunity> {
    if pool.len() < 2 {
        return None;
    }

    let mut sorted: Vec<&NodeEconomics> = pool.iter().collect();
    sorted.sort_by(|a, b| a.cpl_eur.total_cmp(&b.cpl_eur).then_with(|| a.name.cmp(&b.name)));
    let best = sorted[0];
    let worst = sorted[sorted.len() - 1];

    if best.cpl_eur <= 0.0 || worst.cpl_eur <= best.cpl_eur * gap {
        return None;
    }

    let shift_eur = worst.spend_eur * shift_share;
    if shift_eur < floor_eur {
        return None;
    }

    let leads_lost = shift_eur / worst.cpl_eur;
    let leads_gained = shift_eur / best.cpl_eur;
    let net_lift = leads_gained - leads_lost;
    let blended_volume = best.lead_count as f64 + worst.lead_count as f64 + net_lift;
    let new_blended_cpl_eur = if blended_volume > 0.0 {
        (best.spend_eur + worst.spend_eur) / blended_volume
    } else {
        0.0
    };

    Some(Opportunity {
        tier,
        scope: scope.to_string(),
        from_name: worst.name.clone(),
        to_name: best.name.clone(),
        shift_eur,
        from_cpl_eur: worst.cpl_eur,
        to_cpl_eur: best.cpl_eur,
        leads_lost,
        leads_gained,
        net_lift,
        new_blended_cpl_eur,
    })
}

/// Two-tier budget-reallocation heuristic: creative rotation inside each
/// adset, then adset scaling inside each (country, treatment) context.
/// Proposals are ranked by projected lead lift; only the top six surface.
pub fn optimization_plan(
    leads: &[Lead],
    spend: &[SpendRecord],
    eur_try_rate: f64,
    range: &DateRange,
    today: NaiveDate,
) -> Vec<Opportunity> {
    let attributed: Vec<&Lead> = leads
        .iter()
        .filter(|lead| lead.adset != UNKNOWN_ADSET)
        .collect();

    let adset_groups = group_by(&attributed, |lead| &lead.adset);
    let mut proposals: Vec<Opportunity> = Vec::new();

    // Tier 1: creative rotation within each adset.
    for (adset_name, adset_leads) in &adset_groups {
        let with_ads: Vec<&Lead> = adset_leads
            .iter()
            .copied()
            .filter(|lead| lead.ad != UNKNOWN_AD)
            .collect();

        let ads: Vec<NodeEconomics> = group_by(&with_ads, |lead| &lead.ad)
            .into_iter()
            .map(|(ad_name, ad_leads)| {
                let spend_eur = try_to_eur(
                    spend_in_context(
                        spend,
                        SpendContext {
                            adset: Some(adset_name),
                            ad: Some(&ad_name),
                            campaign: None,
                        },
                        range,
                        today,
                    ),
                    eur_try_rate,
                );
                economics(ad_name, ad_leads.len(), spend_eur)
            })
            .filter(|node| node.lead_count >= INTRA_MIN_LEADS && node.spend_eur > INTRA_MIN_SPEND_EUR)
            .collect();

        if let Some(proposal) = pair_proposal(
            &ads,
            OpportunityTier::IntraAdset,
            adset_name,
            INTRA_CPL_GAP,
            INTRA_SHIFT_SHARE,
            INTRA_SHIFT_FLOOR_EUR,
        ) {
            proposals.push(proposal);
        }
    }

    // Tier 2: adset scaling within each (country, treatment) context.
    let mut contexts: Vec<(String, Vec<NodeEconomics>)> = Vec::new();
    for (adset_name, adset_leads) in &adset_groups {
        let country = dominant(adset_leads, |lead| &lead.country).unwrap_or_default();
        let treatment = dominant(adset_leads, |lead| lead.treatment.label()).unwrap_or_default();
        let context = format!("{country} / {treatment}");

        let spend_eur = try_to_eur(
            spend_in_context(
                spend,
                SpendContext {
                    adset: Some(adset_name),
                    ..Default::default()
                },
                range,
                today,
            ),
            eur_try_rate,
        );
        let node = economics(adset_name.clone(), adset_leads.len(), spend_eur);
        if node.lead_count < INTER_MIN_LEADS || node.spend_eur <= INTER_MIN_SPEND_EUR {
            continue;
        }

        match contexts.iter_mut().find(|(existing, _)| *existing == context) {
            Some((_, pool)) => pool.push(node),
            None => contexts.push((context, vec![node])),
        }
    }

    for (context, pool) in &contexts {
        if let Some(proposal) = pair_proposal(
            pool,
            OpportunityTier::InterAdset,
            context,
            INTER_CPL_GAP,
            INTER_SHIFT_SHARE,
            INTER_SHIFT_FLOOR_EUR,
        ) {
            proposals.push(proposal);
        }
    }

    proposals.sort_by(|a, b| b.net_lift.total_cmp(&a.net_lift));
    proposals.truncate(MAX_OPPORTUNITIES);
    proposals
}
