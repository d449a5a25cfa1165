use super::domain::{
    FunnelStage, Lead, SpendRecord, Treatment, UNKNOWN_AD, UNKNOWN_ADSET, UNKNOWN_CAMPAIGN,
};
use super::filter::DateRange;
use super::funnel::{funnel_stats, FunnelStats};
use crate::config::AnalyticsConfig;
use chrono::NaiveDate;
use serde::Serialize;

/// Minimum lead volume before a campaign is worth an insight card.
const MIN_INSIGHT_LEADS: usize = 15;

/// Convert raw TRY spend to EUR. A zero/negative/non-finite rate falls back
/// to the shipped default so a blank rate field can never produce infinity.
pub fn try_to_eur(spend_try: f64, eur_try_rate: f64) -> f64 {
    let rate = if eur_try_rate.is_finite() && eur_try_rate > 0.0 {
        eur_try_rate
    } else {
        AnalyticsConfig::DEFAULT_EUR_TRY_RATE
    };
    spend_try / rate
}

/// Which node of the campaign → adset → ad hierarchy spend is summed for.
/// Unset levels match every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpendContext<'a> {
    pub campaign: Option<&'a str>,
    pub adset: Option<&'a str>,
    pub ad: Option<&'a str>,
}

fn name_matches(selected: Option<&str>, recorded: &str) -> bool {
    match selected {
        None => true,
        Some(name) => name.trim().eq_ignore_ascii_case(recorded.trim()),
    }
}

/// Sum raw TRY spend for a hierarchy node over the same date window the
/// filter engine would apply to leads, so spend and leads always cover
/// matching periods.
pub fn spend_in_context(
    records: &[SpendRecord],
    context: SpendContext<'_>,
    range: &DateRange,
    today: NaiveDate,
) -> f64 {
    let window = range.resolve(today);

    records
        .iter()
        .filter(|record| {
            name_matches(context.campaign, &record.campaign)
                && name_matches(context.adset, &record.adset)
                && name_matches(context.ad, &record.ad)
        })
        .filter(|record| match window {
            None => true,
            Some((start, end)) => record.date >= start.date() && record.date <= end.date(),
        })
        .map(|record| record.spend_try)
        .sum()
}

/// Funnel stats enriched with the marketing economics of one node.
#[derive(Debug, Clone, Serialize)]
pub struct MarketingFunnel {
    pub leads: usize,
    pub stats: FunnelStats,
    pub spend_eur: f64,
    pub cpl_eur: f64,
    pub avg_lead_score: f64,
}

pub fn marketing_funnel(leads: &[Lead], spend_eur: f64) -> MarketingFunnel {
    let stats = funnel_stats(leads);
    let count = leads.len();
    let cpl_eur = if count == 0 {
        0.0
    } else {
        spend_eur / count as f64
    };
    let avg_lead_score = if count == 0 {
        0.0
    } else {
        leads.iter().map(|lead| f64::from(lead.lead_score)).sum::<f64>() / count as f64
    };

    MarketingFunnel {
        leads: count,
        stats,
        spend_eur,
        cpl_eur,
        avg_lead_score,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdNode {
    pub name: String,
    pub metrics: MarketingFunnel,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdsetNode {
    pub name: String,
    pub metrics: MarketingFunnel,
    pub ads: Vec<AdNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignNode {
    pub name: String,
    pub metrics: MarketingFunnel,
    pub adsets: Vec<AdsetNode>,
}

pub(crate) fn group_by<'a, F>(leads: &[&'a Lead], key: F) -> Vec<(String, Vec<&'a Lead>)>
where
    F: Fn(&Lead) -> &str,
{
    let mut groups: Vec<(String, Vec<&'a Lead>)> = Vec::new();
    for lead in leads {
        let name = key(lead);
        match groups.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, members)) => members.push(lead),
            None => groups.push((name.to_string(), vec![lead])),
        }
    }
    groups
}

fn owned(leads: &[&Lead]) -> Vec<Lead> {
    leads.iter().map(|lead| (*lead).clone()).collect()
}

/// Build the campaign → adset → ad attribution tree. Unattributed leads
/// (sentinel node names) are dropped from the tree entirely; they still
/// exist in the flat collection.
pub fn attribution_tree(
    leads: &[Lead],
    spend: &[SpendRecord],
    eur_try_rate: f64,
    range: &DateRange,
    today: NaiveDate,
) -> Vec<CampaignNode> {
    let attributed: Vec<&Lead> = leads
        .iter()
        .filter(|lead| lead.campaign != UNKNOWN_CAMPAIGN)
        .collect();

    let mut campaigns: Vec<CampaignNode> = group_by(&attributed, |lead| &lead.campaign)
        .into_iter()
        .map(|(campaign_name, campaign_leads)| {
            let campaign_spend = try_to_eur(
                spend_in_context(
                    spend,
                    SpendContext {
                        campaign: Some(&campaign_name),
                        ..Default::default()
                    },
                    range,
                    today,
                ),
                eur_try_rate,
            );

            let with_adsets: Vec<&Lead> = campaign_leads
                .iter()
                .copied()
                .filter(|lead| lead.adset != UNKNOWN_ADSET)
                .collect();

            let adsets = group_by(&with_adsets, |lead| &lead.adset)
                .into_iter()
                .map(|(adset_name, adset_leads)| {
                    let adset_spend = try_to_eur(
                        spend_in_context(
                            spend,
                            SpendContext {
                                campaign: Some(&campaign_name),
                                adset: Some(&adset_name),
                                ad: None,
                            },
                            range,
                            today,
                        ),
                        eur_try_rate,
                    );

                    let with_ads: Vec<&Lead> = adset_leads
                        .iter()
                        .copied()
                        .filter(|lead| lead.ad != UNKNOWN_AD)
                        .collect();

                    let ads = group_by(&with_ads, |lead| &lead.ad)
                        .into_iter()
                        .map(|(ad_name, ad_leads)| {
                            let ad_spend = try_to_eur(
                                spend_in_context(
                                    spend,
                                    SpendContext {
                                        campaign: Some(&campaign_name),
                                        adset: Some(&adset_name),
                                        ad: Some(&ad_name),
                                    },
                                    range,
                                    today,
                                ),
                                eur_try_rate,
                            );
                            AdNode {
                                metrics: marketing_funnel(&owned(&ad_leads), ad_spend),
                                name: ad_name,
                            }
                        })
                        .collect();

                    AdsetNode {
                        metrics: marketing_funnel(&owned(&adset_leads), adset_spend),
                        name: adset_name,
                        ads,
                    }
                })
                .collect();

            CampaignNode {
                metrics: marketing_funnel(&owned(&campaign_leads), campaign_spend),
                name: campaign_name,
                adsets,
            }
        })
        .collect();

    campaigns.sort_by(|a, b| {
        b.metrics
            .leads
            .cmp(&a.metrics.leads)
            .then_with(|| a.name.cmp(&b.name))
    });
    campaigns
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    EfficientQuality,
    TopPerformer,
    CostAnomaly,
    LowQuality,
    HighBurn,
}

impl InsightKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::EfficientQuality => "Efficient Quality",
            Self::TopPerformer => "Top Performer",
            Self::CostAnomaly => "Cost Anomaly",
            Self::LowQuality => "Low Quality",
            Self::HighBurn => "High Burn",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignInsight {
    pub campaign: String,
    pub kind: InsightKind,
    pub detail: String,
    pub cpl_eur: f64,
    pub baseline_cpl_eur: f64,
    pub offer_rate_pct: f64,
    pub peer_offer_rate_pct: f64,
    pub avg_lead_score: f64,
    pub peer_avg_score: f64,
    pub dominant_country: String,
    pub dominant_treatment: Treatment,
}

/// Plurality winner over an attribute; the first-encountered value keeps a
/// tie, which pins down the dashboard's accepted non-determinism.
pub(crate) fn dominant<F>(leads: &[&Lead], key: F) -> Option<String>
where
    F: Fn(&Lead) -> &str,
{
    let counted = group_by(leads, key);
    let mut best: Option<&(String, Vec<&Lead>)> = None;
    for group in &counted {
        match best {
            Some(current) if group.1.len() <= current.1.len() => {}
            _ => best = Some(group),
        }
    }
    best.map(|(name, _)| name.clone())
}

fn offer_rate_pct(leads: &[&Lead]) -> f64 {
    if leads.is_empty() {
        return 0.0;
    }
    let offers = leads
        .iter()
        .filter(|lead| lead.status >= FunnelStage::OfferSent)
        .count();
    offers as f64 / leads.len() as f64 * 100.0
}

fn avg_score(leads: &[&Lead]) -> f64 {
    if leads.is_empty() {
        return 0.0;
    }
    leads.iter().map(|lead| f64::from(lead.lead_score)).sum::<f64>() / leads.len() as f64
}

/// Derive per-campaign insight cards from the attribution tree. One card per
/// qualifying campaign at most: the template chain is priority-ordered and
/// the first matching rule wins.
pub fn campaign_insights(leads: &[Lead], tree: &[CampaignNode]) -> Vec<CampaignInsight> {
    let total_spend: f64 = tree.iter().map(|node| node.metrics.spend_eur).sum();
    let total_leads: usize = tree.iter().map(|node| node.metrics.leads).sum();
    let baseline_cpl = if total_leads == 0 {
        0.0
    } else {
        total_spend / total_leads as f64
    };

    let mut insights = Vec::new();

    for node in tree {
        if node.metrics.leads < MIN_INSIGHT_LEADS {
            continue;
        }

        let node_leads: Vec<&Lead> = leads
            .iter()
            .filter(|lead| lead.campaign == node.name)
            .collect();

        let Some(dominant_country) = dominant(&node_leads, |lead| &lead.country) else {
            continue;
        };
        let dominant_treatment = dominant(&node_leads, |lead| lead.treatment.label())
            .map(|name| match name.as_str() {
                "Dental" => Treatment::Dental,
                "Hair" => Treatment::Hair,
                _ => Treatment::Other,
            })
            .unwrap_or(Treatment::Other);

        let country_peers: Vec<&Lead> = leads
            .iter()
            .filter(|lead| lead.country == dominant_country)
            .collect();
        let treatment_peers: Vec<&Lead> = leads
            .iter()
            .filter(|lead| lead.treatment == dominant_treatment)
            .collect();

        let cpl = node.metrics.cpl_eur;
        let offer_rate = offer_rate_pct(&node_leads);
        let peer_offer_rate = offer_rate_pct(&country_peers);
        let node_score = node.metrics.avg_lead_score;
        let peer_score = avg_score(&treatment_peers);

        let kind = classify_campaign(cpl, baseline_cpl, offer_rate, peer_offer_rate, node_score, peer_score);
        let Some(kind) = kind else { continue };

        let detail = match kind {
            InsightKind::EfficientQuality => format!(
                "CPL €{cpl:.2} runs below the €{baseline_cpl:.2} baseline while holding the {dominant_country} offer rate"
            ),
            InsightKind::TopPerformer => format!(
                "Offer rate {offer_rate:.1}% clears the {dominant_country} baseline of {peer_offer_rate:.1}%"
            ),
            InsightKind::CostAnomaly => format!(
                "CPL €{cpl:.2} is far above the €{baseline_cpl:.2} account baseline"
            ),
            InsightKind::LowQuality => format!(
                "Lead quality trails the {} benchmark (score {node_score:.1} vs {peer_score:.1})",
                dominant_treatment.label()
            ),
            InsightKind::HighBurn => format!(
                "Spending over baseline CPL with an offer rate of only {offer_rate:.1}%"
            ),
        };

        insights.push(CampaignInsight {
            campaign: node.name.clone(),
            kind,
            detail,
            cpl_eur: cpl,
            baseline_cpl_eur: baseline_cpl,
            offer_rate_pct: offer_rate,
            peer_offer_rate_pct: peer_offer_rate,
            avg_lead_score: node_score,
            peer_avg_score: peer_score,
            dominant_country,
            dominant_treatment,
        });
    }

    insights
}

fn classify_campaign(
    cpl: f64,
    baseline_cpl: f64,
    offer_rate: f64,
    peer_offer_rate: f64,
    avg_score: f64,
    peer_score: f64,
) -> Option<InsightKind> {
    let has_baseline = baseline_cpl > 0.0;

    if has_baseline && cpl > 0.0 && cpl <= baseline_cpl * 0.8 && offer_rate >= peer_offer_rate {
        return Some(InsightKind::EfficientQuality);
    }
    if peer_offer_rate > 0.0 && offer_rate >= peer_offer_rate * 1.2 && avg_score >= peer_score {
        return Some(InsightKind::TopPerformer);
    }
    if has_baseline && cpl >= baseline_cpl * 1.5 {
        return Some(InsightKind::CostAnomaly);
    }
    if (peer_score > 0.0 && avg_score <= peer_score * 0.7)
        || (peer_offer_rate > 0.0 && offer_rate <= peer_offer_rate * 0.5)
    {
        return Some(InsightKind::LowQuality);
    }
    if has_baseline && cpl >= baseline_cpl * 1.3 && offer_rate < peer_offer_rate * 0.8 {
        return Some(InsightKind::HighBurn);
    }
    None
}
