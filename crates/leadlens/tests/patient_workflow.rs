use chrono::NaiveDate;
use leadlens::analytics::import::{LeadImporter, PatientImportError, PatientImporter};
use leadlens::analytics::patients::{find_lead_for, patient_summary};
use std::io::Cursor;

const LEADS_CSV: &str = "\
Lead ID,Create Date,Last Update,Lead Status,Lead Owner,Country
CRM-1001,01.05.2024,20.05.2024,Operation Done,Ayse,Germany
CRM-1002,03.05.2024,18.05.2024,Offer Sent,Deniz,UK
";

const PATIENTS_CSV: &str = "\
Lead ID,Date of Receiving Ticket,Name of Patient,Category,Status,Total Expected Payment,Currency of Expected Payment,Operation Center,Operation Date,Actual Received Payment,Currency of Received Payment
crm-1001 ,05.05.2024,Jane Roe,Dental,Operation Completed,4000,Euro,Istanbul,20.05.2024,4500,Euro
CRM-9999,06.05.2024,Omar Ali,Hair,Cancelled,120000,TRY,Izmir,,,
";

fn import_instant() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

#[test]
fn ops_export_joins_loosely_back_to_the_crm() {
    let leads = LeadImporter::from_reader(Cursor::new(LEADS_CSV), import_instant())
        .expect("lead import succeeds");
    let patients =
        PatientImporter::from_reader(Cursor::new(PATIENTS_CSV)).expect("patient import succeeds");
    assert_eq!(patients.len(), 2);

    let linked = find_lead_for(&patients[0], &leads).expect("case-insensitive match");
    assert_eq!(linked.id, "CRM-1001");
    assert!(find_lead_for(&patients[1], &leads).is_none());

    let summary = patient_summary(&patients, &leads);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.cancelled, 1);
    assert_eq!(summary.expected_total_eur, 4000.0);
    assert_eq!(summary.actual_received_eur, 4500.0);
    assert_eq!(summary.upsale_total_eur, 500.0);
    assert_eq!(summary.linked_to_crm, 1);
}

#[test]
fn validation_failure_imports_nothing() {
    let csv = "Lead ID,Name of Patient,Category\nCRM-1,Jane,Dental\n";
    let error = PatientImporter::from_reader(Cursor::new(csv)).expect_err("must fail validation");

    match error {
        PatientImportError::MissingColumns(columns) => {
            assert!(columns.contains(&"status".to_string()));
            assert!(columns.contains(&"operation date".to_string()));
        }
        other => panic!("expected missing-column validation, got {other:?}"),
    }
}
