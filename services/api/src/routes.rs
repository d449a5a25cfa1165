use crate::dashboard::{build_dashboard_report, DashboardReport};
use crate::infra::{deserialize_optional_date, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{Local, NaiveDate, NaiveTime};
use leadlens::analytics::domain::Patient;
use leadlens::analytics::filter::LeadFilter;
use leadlens::analytics::import::{LeadImporter, PatientImporter, SpendImporter};
use leadlens::analytics::patients::{patient_summary, PatientSummary};
use leadlens::config::AnalyticsConfig;
use leadlens::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;

#[derive(Debug, Deserialize)]
pub(crate) struct DashboardReportRequest {
    /// Raw CRM lead export, CSV text.
    pub(crate) leads_csv: String,
    /// Optional ad-spend export, CSV text.
    #[serde(default)]
    pub(crate) spend_csv: Option<String>,
    /// "1 EUR = N TRY"; omitted or non-positive falls back to the default.
    #[serde(default)]
    pub(crate) eur_try_rate: Option<f64>,
    #[serde(default)]
    pub(crate) filter: LeadFilter,
    /// Reporting date override, YYYY-MM-DD. Defaults to the local date.
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PatientImportRequest {
    /// Raw patient-operations export, CSV text.
    pub(crate) patients_csv: String,
    /// Optional lead export; when present the summary reports CRM linkage.
    #[serde(default)]
    pub(crate) leads_csv: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PatientImportResponse {
    pub(crate) imported: usize,
    pub(crate) summary: PatientSummary,
    pub(crate) patients: Vec<Patient>,
}

pub(crate) fn router() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/dashboard/report",
            axum::routing::post(dashboard_report_endpoint),
        )
        .route(
            "/api/v1/patients/import",
            axum::routing::post(patients_import_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn dashboard_report_endpoint(
    Json(payload): Json<DashboardReportRequest>,
) -> Result<Json<DashboardReport>, AppError> {
    let DashboardReportRequest {
        leads_csv,
        spend_csv,
        eur_try_rate,
        filter,
        today,
    } = payload;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let now = today.and_time(NaiveTime::MIN);

    let leads = LeadImporter::from_reader(Cursor::new(leads_csv.into_bytes()), now)?;
    let spend = match spend_csv {
        Some(csv) => SpendImporter::from_reader(Cursor::new(csv.into_bytes()), today)?,
        None => Vec::new(),
    };
    let rate = eur_try_rate.unwrap_or(AnalyticsConfig::DEFAULT_EUR_TRY_RATE);

    Ok(Json(build_dashboard_report(
        &leads, &spend, rate, &filter, today,
    )))
}

pub(crate) async fn patients_import_endpoint(
    Json(payload): Json<PatientImportRequest>,
) -> Result<Json<PatientImportResponse>, AppError> {
    let PatientImportRequest {
        patients_csv,
        leads_csv,
    } = payload;

    let patients = PatientImporter::from_reader(Cursor::new(patients_csv.into_bytes()))?;
    let leads = match leads_csv {
        Some(csv) => {
            let now = Local::now().naive_local();
            LeadImporter::from_reader(Cursor::new(csv.into_bytes()), now)?
        }
        None => Vec::new(),
    };

    let summary = patient_summary(&patients, &leads);

    Ok(Json(PatientImportResponse {
        imported: patients.len(),
        summary,
        patients,
    }))
}
