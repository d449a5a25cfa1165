use crate::dashboard::{build_dashboard_report, DashboardReport};
use chrono::{Duration, Local, NaiveDate, NaiveTime};
use clap::Args;
use leadlens::analytics::domain::{FunnelStage, Lead, SpendRecord, SUCCESS_REVENUE_EUR};
use leadlens::analytics::filter::{DateRange, LeadFilter};
use leadlens::analytics::funnel::FunnelStats;
use leadlens::analytics::import::{LeadImporter, SpendImporter};
use leadlens::analytics::status::{score_of, stage_of, treatment_of};
use leadlens::config::AnalyticsConfig;
use leadlens::error::AppError;
use std::path::PathBuf;

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default)]
pub(crate) enum RangeArg {
    ThisMonth,
    LastMonth,
    SixMonths,
    #[default]
    AllTime,
}

impl RangeArg {
    fn to_date_range(self) -> DateRange {
        match self {
            Self::ThisMonth => DateRange::ThisMonth,
            Self::LastMonth => DateRange::LastMonth,
            Self::SixMonths => DateRange::SixMonths,
            Self::AllTime => DateRange::AllTime,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct DashboardReportArgs {
    /// CRM lead export (CSV)
    #[arg(long)]
    pub(crate) leads_csv: PathBuf,
    /// Ad-spend export (CSV)
    #[arg(long)]
    pub(crate) spend_csv: Option<PathBuf>,
    /// Reporting date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// "1 EUR = N TRY" conversion rate
    #[arg(long)]
    pub(crate) eur_try_rate: Option<f64>,
    /// Reporting window
    #[arg(long, value_enum, default_value_t = RangeArg::AllTime)]
    pub(crate) range: RangeArg,
    /// Restrict to these countries (repeatable)
    #[arg(long = "country")]
    pub(crate) countries: Vec<String>,
    /// Restrict to these reps (repeatable)
    #[arg(long = "rep")]
    pub(crate) reps: Vec<String>,
    /// Restrict to these teams (repeatable)
    #[arg(long = "team")]
    pub(crate) teams: Vec<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reporting date (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_dashboard_report(args: DashboardReportArgs) -> Result<(), AppError> {
    let DashboardReportArgs {
        leads_csv,
        spend_csv,
        today,
        eur_try_rate,
        range,
        countries,
        reps,
        teams,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let now = today.and_time(NaiveTime::MIN);

    let leads = LeadImporter::from_path(leads_csv, now)?;
    let spend = match spend_csv {
        Some(path) => SpendImporter::from_path(path, today)?,
        None => Vec::new(),
    };
    let rate = eur_try_rate.unwrap_or(AnalyticsConfig::DEFAULT_EUR_TRY_RATE);

    let filter = LeadFilter {
        date_range: range.to_date_range(),
        countries,
        reps,
        teams,
        ..Default::default()
    };

    let report = build_dashboard_report(&leads, &spend, rate, &filter, today);
    render_report(&report);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    println!("LeadLens demo (synthetic dataset)");
    let (leads, spend) = synthetic_dataset(today);
    let report = build_dashboard_report(
        &leads,
        &spend,
        AnalyticsConfig::DEFAULT_EUR_TRY_RATE,
        &LeadFilter::default(),
        today,
    );
    render_report(&report);
    Ok(())
}

pub(crate) fn render_report(report: &DashboardReport) {
    println!(
        "Reporting date {} | {} of {} leads in scope",
        report.today, report.filtered_leads, report.total_leads
    );

    println!("\nFunnel");
    let funnel = &report.funnel;
    println!("- New: {}", funnel.new);
    println!(
        "- Interested: {} ({:.0}%)",
        funnel.interested,
        FunnelStats::conversion_pct(funnel.interested, funnel.new)
    );
    println!(
        "- Waiting for Evaluation: {} ({:.0}%)",
        funnel.waiting_eval,
        FunnelStats::conversion_pct(funnel.waiting_eval, funnel.interested)
    );
    println!(
        "- Offer Sent: {} ({:.0}%)",
        funnel.offer_sent,
        FunnelStats::conversion_pct(funnel.offer_sent, funnel.waiting_eval)
    );
    println!(
        "- Success: {} ({:.0}%)",
        funnel.success,
        FunnelStats::conversion_pct(funnel.success, funnel.offer_sent)
    );
    println!("- Negative: {}", funnel.negative);

    println!(
        "\nCompany health: {} ({})",
        report.company_health.score,
        report.company_health.band.label()
    );
    for kpi in &report.company_health.kpis {
        println!(
            "- {}: {}/{} overdue ({:.0}%), -{:.0} points [{}]",
            kpi.label,
            kpi.overdue,
            kpi.total,
            kpi.overdue_pct,
            kpi.deduction,
            kpi.band.label()
        );
    }

    println!(
        "\nTeam board: {} ({})",
        report.team_board.team_score,
        report.team_board.team_band.label()
    );
    for rep in &report.team_board.reps {
        println!(
            "- {}: {} ({}) over {} leads",
            rep.rep_name,
            rep.health.score,
            rep.health.band.label(),
            rep.lead_count
        );
    }

    println!("\nCampaigns");
    for campaign in &report.campaigns {
        println!(
            "- {}: {} leads | €{:.2} spend | €{:.2} CPL | avg score {:.1}",
            campaign.name,
            campaign.metrics.leads,
            campaign.metrics.spend_eur,
            campaign.metrics.cpl_eur,
            campaign.metrics.avg_lead_score
        );
    }

    if report.insights.is_empty() {
        println!("\nCampaign insights: none at current volume");
    } else {
        println!("\nCampaign insights");
        for insight in &report.insights {
            println!("- [{}] {}: {}", insight.kind.label(), insight.campaign, insight.detail);
        }
    }

    println!(
        "\nRevenue Pareto (vital few: {} of {} campaigns)",
        report.revenue_pareto.vital_few_count,
        report.revenue_pareto.entries.len()
    );
    for entry in &report.revenue_pareto.entries {
        let marker = if entry.vital { "*" } else { " " };
        println!(
            "{} {}: €{:.0} ({:.1}%, cumulative {:.1}%)",
            marker, entry.name, entry.value, entry.share_pct, entry.cumulative_pct
        );
    }

    println!("\nRep efficiency");
    for entry in &report.rep_efficiency {
        println!(
            "- {}: {} leads, {} offers, ratio {:.2} [{}]",
            entry.name,
            entry.lead_count,
            entry.offer_count,
            entry.ratio,
            entry.class.label()
        );
    }

    if report.opportunities.is_empty() {
        println!("\nBudget opportunities: none above the noise floor");
    } else {
        println!("\nBudget opportunities");
        for opp in &report.opportunities {
            println!(
                "- [{}] {}: move €{:.0} from '{}' (€{:.2} CPL) to '{}' (€{:.2} CPL) -> +{:.1} leads",
                opp.tier.label(),
                opp.scope,
                opp.shift_eur,
                opp.from_name,
                opp.from_cpl_eur,
                opp.to_name,
                opp.to_cpl_eur,
                opp.net_lift
            );
        }
    }
}

const DEMO_STATUSES: &[&str] = &[
    "New Lead",
    "New Lead",
    "Interested",
    "Follow Up",
    "NR1",
    "NR2",
    "Waiting for Evaluation",
    "Evaluation Done",
    "Offer Sent",
    "Offer Sent",
    "Negotiation",
    "Deposit Received",
    "Ticket Received",
    "Operation Done",
    "Not Interested",
    "NR 5",
];

const DEMO_REPS: &[&str] = &["Ayse", "Mehmet", "Elif", "Deniz", "Can", "Zeynep"];
const DEMO_COUNTRIES: &[(&str, &str)] = &[
    ("Germany", "German"),
    ("UK", "English"),
    ("France", "French"),
];
const DEMO_CAMPAIGNS: &[(&str, &str, &[&str])] = &[
    ("Summer Smiles", "DE Broad", &["Video A", "Video B"]),
    ("Summer Smiles", "UK Broad", &["Video C", "Carousel A"]),
    ("Hair Restore", "DE Lookalike", &["Video D", "Static A"]),
];

/// Deterministic synthetic dataset covering every stage, both treatments,
/// every demo rep, and a spend profile uneven enough to trigger at least one
/// budget-shift proposal.
fn synthetic_dataset(today: NaiveDate) -> (Vec<Lead>, Vec<SpendRecord>) {
    let mut leads = Vec::new();
    let now = today.and_time(NaiveTime::MIN);

    for index in 0..96 {
        let status = DEMO_STATUSES[index % DEMO_STATUSES.len()];
        let rep = DEMO_REPS[index % DEMO_REPS.len()];
        let (country, language) = DEMO_COUNTRIES[index % DEMO_COUNTRIES.len()];
        let (campaign, adset, ads) = DEMO_CAMPAIGNS[index % DEMO_CAMPAIGNS.len()];
        let ad = ads[(index / DEMO_CAMPAIGNS.len()) % ads.len()];
        let treatment_hint = if campaign == "Hair Restore" { "Hair FUE" } else { "Dental Implants" };

        let create = now - Duration::days(((index % 60) + 1) as i64);
        let update = create + Duration::days((index % 5) as i64);
        let stage = stage_of(status);

        leads.push(Lead {
            id: format!("DEMO-{index}"),
            create_date: create,
            update_date: update,
            diff_days: (now - update).num_days(),
            original_status: status.to_string(),
            status: stage,
            lead_score: score_of(status),
            treatment: treatment_of(treatment_hint),
            nr_count: if status.starts_with("NR") { (index % 5) as u32 } else { 0 },
            rep_name: rep.to_string(),
            country: country.to_string(),
            language: language.to_string(),
            source: "Facebook".to_string(),
            campaign: campaign.to_string(),
            adset: adset.to_string(),
            ad: ad.to_string(),
            revenue: if stage == FunnelStage::Success {
                SUCCESS_REVENUE_EUR
            } else {
                0.0
            },
        });
    }

    let mut spend = Vec::new();
    for (campaign, adset, ads) in DEMO_CAMPAIGNS {
        for (ad_index, ad) in ads.iter().enumerate() {
            for week in 0..4i64 {
                // The second creative in each adset burns triple the budget.
                let weekly_try = if ad_index == 0 { 1800.0 } else { 5400.0 };
                spend.push(SpendRecord {
                    campaign: campaign.to_string(),
                    adset: adset.to_string(),
                    ad: ad.to_string(),
                    date: today - Duration::days(7 * week + 3),
                    spend_try: weekly_try,
                    impressions: 10_000,
                    results: 40,
                });
            }
        }
    }

    (leads, spend)
}
