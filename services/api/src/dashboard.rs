use chrono::NaiveDate;
use leadlens::analytics::domain::{Lead, SpendRecord};
use leadlens::analytics::filter::{filter_leads, LeadFilter};
use leadlens::analytics::funnel::{funnel_stats, FunnelStats};
use leadlens::analytics::health::{calculate_health, team_health, ScopeHealth, TeamHealth};
use leadlens::analytics::marketing::{
    attribution_tree, campaign_insights, CampaignInsight, CampaignNode,
};
use leadlens::analytics::pareto::{
    efficiency_ratios, optimization_plan, pareto_analysis, EfficiencyEntry, Opportunity,
    ParetoAnalysis, ParetoDimension, ParetoMetric,
};
use leadlens::analytics::teams::TeamRoster;
use serde::Serialize;

/// Everything a dashboard render needs, computed in one pass over the
/// filtered subset. Recomputing the whole thing on every filter change is
/// deliberate; the engine is cheap relative to any caching scheme.
#[derive(Debug, Serialize)]
pub(crate) struct DashboardReport {
    pub(crate) today: NaiveDate,
    pub(crate) total_leads: usize,
    pub(crate) filtered_leads: usize,
    pub(crate) funnel: FunnelStats,
    pub(crate) company_health: ScopeHealth,
    pub(crate) team_board: TeamHealth,
    pub(crate) campaigns: Vec<CampaignNode>,
    pub(crate) insights: Vec<CampaignInsight>,
    pub(crate) revenue_pareto: ParetoAnalysis,
    pub(crate) rep_efficiency: Vec<EfficiencyEntry>,
    pub(crate) opportunities: Vec<Opportunity>,
}

pub(crate) fn build_dashboard_report(
    leads: &[Lead],
    spend: &[SpendRecord],
    eur_try_rate: f64,
    filter: &LeadFilter,
    today: NaiveDate,
) -> DashboardReport {
    let roster = TeamRoster::standard();
    let filtered = filter_leads(leads, filter, &roster, today);

    let campaigns = attribution_tree(&filtered, spend, eur_try_rate, &filter.date_range, today);
    let insights = campaign_insights(&filtered, &campaigns);

    DashboardReport {
        today,
        total_leads: leads.len(),
        filtered_leads: filtered.len(),
        funnel: funnel_stats(&filtered),
        company_health: calculate_health(&filtered),
        team_board: team_health(&filtered),
        revenue_pareto: pareto_analysis(&filtered, ParetoDimension::Campaign, ParetoMetric::Revenue),
        rep_efficiency: efficiency_ratios(&filtered, ParetoDimension::Rep),
        opportunities: optimization_plan(&filtered, spend, eur_try_rate, &filter.date_range, today),
        campaigns,
        insights,
    }
}
