use crate::config::CurrencySettings;
use crate::currency::format_for;
use crate::error::AppError;
use crate::models::CostReport;
use crate::render::chart::chart_data_uri;
use crate::render::{column_headers, table_rows, SymbolSet, TableRow};
use askama::Template;
use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone)]
pub struct FormDefaults {
    pub start_date: String,
    pub end_date: String,
    pub region: String,
}

impl FormDefaults {
    /// First day of the month containing `today`, through `today`.
    pub fn month_to_date(today: NaiveDate, region: &str) -> Self {
        let first = today.with_day(1).unwrap_or(today);
        Self {
            start_date: first.to_string(),
            end_date: today.to_string(),
            region: region.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportView {
    pub start_date: String,
    pub end_date: String,
    pub total_display: String,
    pub total_secondary: String,
    pub status_message: String,
    pub is_alert: bool,
    pub notification_sent: bool,
    pub chart_uri: Option<String>,
    pub headers: [String; 3],
    pub rows: Vec<TableRow>,
    pub export_json: String,
}

impl ReportView {
    pub fn from_report(report: &CostReport, currency: &CurrencySettings) -> Result<Self, AppError> {
        let total_display = format_for(report.total_secondary, &currency.secondary);
        let status_message = if report.alert_triggered {
            format!("ALERT: {total_display}")
        } else {
            format!("Good Job! Total: {total_display}")
        };

        Ok(Self {
            start_date: report.range.start.to_string(),
            end_date: report.range.end.to_string(),
            total_secondary: report.total_secondary.to_string(),
            total_display,
            status_message,
            is_alert: report.alert_triggered,
            notification_sent: report.notification.sent,
            chart_uri: report.chart.as_deref().map(chart_data_uri),
            headers: column_headers(currency),
            rows: table_rows(&report.line_items, currency, SymbolSet::Unicode),
            export_json: serde_json::to_string(&report.line_items)?,
        })
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub form: FormDefaults,
    pub error: Option<String>,
    pub report: Option<ReportView>,
}

pub fn render_index(page: &IndexPage) -> Result<String, AppError> {
    Ok(page.render()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CostLineItem, DateRange, NotificationOutcome};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn defaults() -> FormDefaults {
        FormDefaults::month_to_date(
            NaiveDate::from_ymd_opt(2024, 3, 18).expect("date"),
            "us-east-1",
        )
    }

    fn report(alert: bool, sent: bool) -> CostReport {
        CostReport {
            range: DateRange {
                start: NaiveDate::from_ymd_opt(2024, 3, 1).expect("date"),
                end: NaiveDate::from_ymd_opt(2024, 3, 18).expect("date"),
            },
            region: "us-east-1".into(),
            line_items: vec![CostLineItem {
                service: "Amazon EC2".into(),
                amount_primary: dec!(10.00),
                amount_secondary: dec!(830.00),
            }],
            total_primary: dec!(10.00),
            total_secondary: dec!(830.00),
            alert_triggered: alert,
            notification: NotificationOutcome { sent },
            chart: Some(b"<svg/>".to_vec()),
        }
    }

    #[test]
    fn form_defaults_cover_month_to_date() {
        let form = defaults();
        assert_eq!(form.start_date, "2024-03-01");
        assert_eq!(form.end_date, "2024-03-18");
    }

    #[test]
    fn empty_page_shows_only_the_form() {
        let html = render_index(&IndexPage {
            form: defaults(),
            error: None,
            report: None,
        })
        .expect("render");
        assert!(html.contains("name=\"start_date\""));
        assert!(html.contains("value=\"2024-03-01\""));
        assert!(!html.contains("class=\"total-display\""));
    }

    #[test]
    fn error_is_shown_escaped() {
        let html = render_index(&IndexPage {
            form: defaults(),
            error: Some("invalid date: <2024-13-40>".into()),
            report: None,
        })
        .expect("render");
        assert!(html.contains("class=\"card error\""));
        assert!(html.contains("&#60;2024-13-40&#62;"));
        assert!(!html.contains("<2024-13-40>"));
    }

    #[test]
    fn empty_report_hides_table_and_download() {
        let mut empty = report(false, true);
        empty.line_items.clear();
        empty.total_primary = Decimal::ZERO;
        empty.total_secondary = Decimal::ZERO;
        empty.chart = None;
        let view = ReportView::from_report(&empty, &CurrencySettings::default()).expect("view");

        let html = render_index(&IndexPage {
            form: defaults(),
            error: None,
            report: Some(view),
        })
        .expect("render");
        assert!(html.contains("class=\"total-display\""));
        assert!(!html.contains("<table>"));
        assert!(!html.contains("name=\"report_data_json\""));
    }

    #[test]
    fn alert_report_uses_alert_styling() {
        let view = ReportView::from_report(&report(true, true), &CurrencySettings::default())
            .expect("view");
        assert_eq!(view.status_message, "ALERT: \u{20b9}830.00");

        let html = render_index(&IndexPage {
            form: defaults(),
            error: None,
            report: Some(view),
        })
        .expect("render");
        assert!(html.contains("class=\"status alert\""));
        assert!(html.contains("Email Report Sent"));
        assert!(html.contains("Amazon EC2"));
        assert!(html.contains("data:image/svg+xml;base64,"));
        assert!(html.contains("name=\"report_data_json\""));
    }

    #[test]
    fn normal_report_shows_not_sent_indicator() {
        let view = ReportView::from_report(&report(false, false), &CurrencySettings::default())
            .expect("view");
        assert!(view.status_message.starts_with("Good Job!"));

        let html = render_index(&IndexPage {
            form: defaults(),
            error: None,
            report: Some(view),
        })
        .expect("render");
        assert!(html.contains("class=\"status normal\""));
        assert!(html.contains("Email Not Sent"));
    }

    #[test]
    fn export_json_round_trips_line_items() {
        let view = ReportView::from_report(&report(false, true), &CurrencySettings::default())
            .expect("view");
        let items: Vec<CostLineItem> = serde_json::from_str(&view.export_json).expect("json");
        assert_eq!(items, report(false, true).line_items);
    }
}
