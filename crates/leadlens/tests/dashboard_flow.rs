use chrono::NaiveDate;
use leadlens::analytics::domain::FunnelStage;
use leadlens::analytics::export::write_csv;
use leadlens::analytics::filter::{filter_leads, DateRange, LeadFilter};
use leadlens::analytics::funnel::funnel_stats;
use leadlens::analytics::health::{calculate_health, team_health};
use leadlens::analytics::import::{LeadImporter, SpendImporter};
use leadlens::analytics::marketing::attribution_tree;
use leadlens::analytics::pareto::{
    optimization_plan, pareto_analysis, OpportunityTier, ParetoDimension, ParetoMetric,
};
use leadlens::analytics::teams::TeamRoster;
use std::io::Cursor;

const LEADS_CSV: &str = "\
Lead ID,Create Date,Last Update,Lead Status,NR Count,Lead Owner,Country,Language,Lead Source,Campaign,Adset,Ad,Procedure Choice
L-1,45444,14.06.2024,Operation Done,0,Ayse,Germany,German,Facebook,Summer Smiles,DE Broad,Video A,Dental Implants
L-2,02.06.2024,13.06.2024,Offer Sent,0,Ayse,Germany,German,Facebook,Summer Smiles,DE Broad,Video A,Dental Implants
L-3,03.06.2024,12.06.2024,Interested,0,Mehmet,Germany,German,Facebook,Summer Smiles,DE Broad,Video B,Zircon Crowns
L-4,04.06.2024,10.06.2024,New Lead,0,Deniz,UK,English,Facebook,Hair Restore,UK Broad,Video C,Hair FUE
L-5,05.06.2024,09.06.2024,NR 5,5,Deniz,UK,English,Facebook,Hair Restore,UK Broad,Video C,Hair FUE
L-6,06.06.2024,08.06.2024,Not Interested,0,Can,UK,English,Facebook,Hair Restore,UK Broad,Video D,Hair DHI
";

const SPEND_CSV: &str = "\
Campaign Name,Adset Name,Ad Name,Date,Amount Spent (TRY),Impressions,Results
Summer Smiles,DE Broad,Video A,05.06.2024,3600,12000,10
Summer Smiles,DE Broad,Video B,06.06.2024,7200,15000,8
Hair Restore,UK Broad,Video C,05.06.2024,1800,8000,6
Hair Restore,UK Broad,Video D,06.06.2024,1800,8000,4
";

fn import_instant() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

#[test]
fn csv_exports_flow_through_the_whole_engine() {
    let leads = LeadImporter::from_reader(Cursor::new(LEADS_CSV), import_instant())
        .expect("lead import succeeds");
    let spend = SpendImporter::from_reader(Cursor::new(SPEND_CSV), today())
        .expect("spend import succeeds");
    assert_eq!(leads.len(), 6);
    assert_eq!(spend.len(), 4);

    // The serial-date cell lands on the same day as the literal one below it.
    assert_eq!(
        leads[0].create_date.date(),
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    );

    let funnel = funnel_stats(&leads);
    assert_eq!(funnel.new, 6);
    assert_eq!(funnel.interested, 3);
    assert_eq!(funnel.waiting_eval, 2);
    assert_eq!(funnel.offer_sent, 2);
    assert_eq!(funnel.success, 1);
    assert_eq!(funnel.negative, 2);
    assert!(funnel.success <= funnel.offer_sent);
    assert!(funnel.offer_sent <= funnel.waiting_eval);
    assert!(funnel.waiting_eval <= funnel.interested);
    assert!(funnel.interested <= funnel.new);

    let health = calculate_health(&leads);
    assert!(health.score <= 100);
    assert_eq!(health.kpis.len(), 5);

    let board = team_health(&leads);
    assert_eq!(board.reps.len(), 4);
    assert!(board
        .reps
        .windows(2)
        .all(|pair| pair[0].health.score >= pair[1].health.score));

    let tree = attribution_tree(&leads, &spend, 36.0, &DateRange::AllTime, today());
    assert_eq!(tree.len(), 2);
    let summer = tree
        .iter()
        .find(|node| node.name == "Summer Smiles")
        .expect("campaign present");
    assert_eq!(summer.metrics.leads, 3);
    assert_eq!(summer.metrics.spend_eur, 300.0);
    assert_eq!(summer.metrics.cpl_eur, 100.0);

    let pareto = pareto_analysis(&leads, ParetoDimension::Campaign, ParetoMetric::Revenue);
    assert_eq!(pareto.entries[0].name, "Summer Smiles");
    assert_eq!(pareto.entries[0].value, 3000.0);
    assert_eq!(pareto.vital_few_count, 1);
}

#[test]
fn filters_compose_before_aggregation() {
    let leads = LeadImporter::from_reader(Cursor::new(LEADS_CSV), import_instant())
        .expect("lead import succeeds");
    let roster = TeamRoster::standard();

    let all_time = filter_leads(&leads, &LeadFilter::default(), &roster, today());
    assert_eq!(all_time, leads);

    let germany = LeadFilter {
        countries: vec!["Germany".to_string()],
        ..Default::default()
    };
    let subset = filter_leads(&leads, &germany, &roster, today());
    assert_eq!(subset.len(), 3);
    assert_eq!(funnel_stats(&subset).success, 1);

    // Team Bosphorus holds Ayse, Mehmet, and Elif.
    let bosphorus = LeadFilter {
        teams: vec!["Team Bosphorus".to_string()],
        ..Default::default()
    };
    let subset = filter_leads(&leads, &bosphorus, &roster, today());
    assert_eq!(subset.len(), 3);
    assert!(subset.iter().all(|lead| lead.rep_name != "Deniz"));

    let covering = LeadFilter {
        date_range: DateRange::Custom {
            start: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 6, 6).unwrap(),
        },
        ..Default::default()
    };
    let subset = filter_leads(&leads, &covering, &roster, today());
    assert_eq!(subset, leads);
}

#[test]
fn spend_imbalance_surfaces_a_creative_rotation() {
    let mut csv = String::from(
        "Lead ID,Create Date,Last Update,Lead Status,Lead Owner,Country,Campaign,Adset,Ad,Procedure Choice\n",
    );
    // Ten leads per creative; Video B burns double the budget of Video A.
    for index in 0..10 {
        csv.push_str(&format!(
            "A-{index},01.06.2024,10.06.2024,New Lead,Ayse,Germany,Summer Smiles,DE Broad,Video A,Dental Implants\n"
        ));
        csv.push_str(&format!(
            "B-{index},01.06.2024,10.06.2024,New Lead,Ayse,Germany,Summer Smiles,DE Broad,Video B,Dental Implants\n"
        ));
    }
    let spend_csv = "\
Campaign Name,Adset Name,Ad Name,Date,Amount Spent (TRY)
Summer Smiles,DE Broad,Video A,05.06.2024,3600
Summer Smiles,DE Broad,Video B,05.06.2024,14400
";

    let leads = LeadImporter::from_reader(Cursor::new(csv.as_bytes()), import_instant())
        .expect("lead import succeeds");
    let spend = SpendImporter::from_reader(Cursor::new(spend_csv), today())
        .expect("spend import succeeds");

    let plan = optimization_plan(&leads, &spend, 36.0, &DateRange::AllTime, today());
    let rotation = plan
        .iter()
        .find(|opp| opp.tier == OpportunityTier::IntraAdset)
        .expect("rotation proposed");
    assert_eq!(rotation.from_name, "Video B");
    assert_eq!(rotation.to_name, "Video A");
    assert!(rotation.net_lift > 0.0);
}

#[test]
fn filtered_subsets_export_as_flat_rows() {
    let leads = LeadImporter::from_reader(Cursor::new(LEADS_CSV), import_instant())
        .expect("lead import succeeds");
    let roster = TeamRoster::standard();
    let filter = LeadFilter {
        countries: vec!["UK".to_string()],
        ..Default::default()
    };
    let subset = filter_leads(&leads, &filter, &roster, today());
    assert_eq!(subset.len(), 3);

    let mut buffer = Vec::new();
    write_csv(&subset, &mut buffer).expect("export succeeds");
    let text = String::from_utf8(buffer).expect("utf8 output");
    assert_eq!(text.lines().count(), 4);
    assert!(text.contains("L-4"));
    assert!(!text.contains("L-1,"));
}

#[test]
fn successful_leads_carry_flat_revenue() {
    let leads = LeadImporter::from_reader(Cursor::new(LEADS_CSV), import_instant())
        .expect("lead import succeeds");
    for lead in &leads {
        if lead.status == FunnelStage::Success {
            assert_eq!(lead.revenue, 3000.0);
        } else {
            assert_eq!(lead.revenue, 0.0);
        }
    }
}
