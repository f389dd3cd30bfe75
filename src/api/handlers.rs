use crate::api::AppState;
use crate::billing::total_secondary;
use crate::error::AppError;
use crate::models::{CostLineItem, CostQuery, ExportFormat, ExportRequest};
use crate::render::html::{render_index, FormDefaults, IndexPage, ReportView};
use crate::render;
use crate::validate::{parse_date_range, validate_credentials};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use chrono::Local;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Default, Deserialize)]
pub struct AnalyzeForm {
    pub key_id: Option<String>,
    pub secret_key: Option<String>,
    pub region: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl fmt::Debug for AnalyzeForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzeForm")
            .field("key_id", &self.key_id)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("region", &self.region)
            .field("start_date", &self.start_date)
            .field("end_date", &self.end_date)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DownloadForm {
    pub report_data_json: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub total_secondary: Option<String>,
    pub format: Option<String>,
}

fn form_defaults(state: &AppState) -> FormDefaults {
    FormDefaults::month_to_date(Local::now().date_naive(), &state.config.default_region)
}

fn page_response(status: StatusCode, page: &IndexPage) -> Response {
    match render_index(page) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "cost-analyzer",
    }))
}

pub async fn index(State(state): State<AppState>) -> Response {
    let page = IndexPage {
        form: form_defaults(&state),
        error: None,
        report: None,
    };
    page_response(StatusCode::OK, &page)
}

async fn run_analysis(state: &AppState, form: &AnalyzeForm) -> Result<ReportView, AppError> {
    let range = parse_date_range(form.start_date.as_deref(), form.end_date.as_deref())?;
    let (credentials, region) = validate_credentials(
        form.key_id.as_deref(),
        form.secret_key.as_deref(),
        form.region.as_deref(),
    )?;

    let query = CostQuery {
        credentials,
        region,
        range,
    };
    let report = state.service.fetch(&query).await?;
    ReportView::from_report(&report, &state.config.currency)
}

pub async fn analyze(State(state): State<AppState>, Form(form): Form<AnalyzeForm>) -> Response {
    let mut defaults = form_defaults(&state);
    if let Some(region) = form.region.as_deref().filter(|r| !r.trim().is_empty()) {
        defaults.region = region.trim().to_string();
    }

    match run_analysis(&state, &form).await {
        Ok(view) => {
            defaults.start_date = view.start_date.clone();
            defaults.end_date = view.end_date.clone();
            let page = IndexPage {
                form: defaults,
                error: None,
                report: Some(view),
            };
            page_response(StatusCode::OK, &page)
        }
        Err(e) => {
            warn!(error = %e, "cost analysis failed");
            let page = IndexPage {
                form: defaults,
                error: Some(e.to_string()),
                report: None,
            };
            page_response(e.status_code(), &page)
        }
    }
}

fn parse_line_items(raw: Option<&str>) -> Result<Vec<CostLineItem>, AppError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    let items: Vec<CostLineItem> = serde_json::from_str(raw)?;
    if let Some(bad) = items
        .iter()
        .find(|i| i.amount_primary < Decimal::ZERO || i.amount_secondary < Decimal::ZERO)
    {
        return Err(AppError::InvalidInput(format!(
            "negative amount for service '{}'",
            bad.service
        )));
    }
    Ok(items)
}

pub async fn download(
    State(state): State<AppState>,
    Form(form): Form<DownloadForm>,
) -> Result<Response, AppError> {
    let line_items = parse_line_items(form.report_data_json.as_deref())?;
    if line_items.is_empty() {
        return Err(AppError::EmptyReport);
    }

    let range = parse_date_range(form.start_date.as_deref(), form.end_date.as_deref())?;
    let format = match form.format.as_deref().map(str::trim) {
        None | Some("") => ExportFormat::Spreadsheet,
        Some(raw) => ExportFormat::parse(raw)
            .ok_or_else(|| AppError::InvalidInput(format!("unsupported export format '{raw}'")))?,
    };
    let total = match form.total_secondary.as_deref().map(str::trim) {
        None | Some("") => total_secondary(&line_items),
        Some(raw) => Decimal::from_str(raw)
            .map_err(|_| AppError::InvalidInput(format!("total '{raw}' is not a decimal")))?,
    };

    let request = ExportRequest {
        line_items,
        range,
        total_secondary: total,
    };
    let file = render::export(format, &request, &state.config.currency)?;
    info!(filename = %file.filename, "serving export");

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.bytes,
    )
        .into_response())
}
