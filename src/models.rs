use crate::error::AppError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Inclusive calendar date range. `start <= end` is enforced by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Billing APIs take half-open periods, so the upper bound is the day after `end`.
    pub fn exclusive_end(&self) -> Result<NaiveDate, AppError> {
        self.end.succ_opt().ok_or_else(|| {
            AppError::InvalidDate(format!("end_date {} has no following day", self.end))
        })
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

#[derive(Debug, Clone)]
pub struct CostQuery {
    pub credentials: Credentials,
    pub region: String,
    pub range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostLineItem {
    pub service: String,
    pub amount_primary: Decimal,
    pub amount_secondary: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOutcome {
    pub sent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    High,
    Normal,
}

impl AlertLevel {
    pub fn classify(total_secondary: Decimal, threshold: Decimal) -> Self {
        if total_secondary > threshold {
            AlertLevel::High
        } else {
            AlertLevel::Normal
        }
    }
}

#[derive(Debug, Clone)]
pub struct CostReport {
    pub range: DateRange,
    pub region: String,
    pub line_items: Vec<CostLineItem>,
    pub total_primary: Decimal,
    pub total_secondary: Decimal,
    pub alert_triggered: bool,
    pub notification: NotificationOutcome,
    pub chart: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Spreadsheet,
    Document,
}

impl ExportFormat {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "spreadsheet" | "xlsx" | "excel" => Some(ExportFormat::Spreadsheet),
            "document" | "pdf" => Some(ExportFormat::Document),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Spreadsheet => "xlsx",
            ExportFormat::Document => "pdf",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Document => "application/pdf",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub line_items: Vec<CostLineItem>,
    pub range: DateRange,
    pub total_secondary: Decimal,
}

#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid date")
    }

    #[test]
    fn exclusive_end_is_the_following_day() {
        let range = DateRange {
            start: date("2024-03-01"),
            end: date("2024-03-01"),
        };
        assert_eq!(range.exclusive_end().expect("next day"), date("2024-03-02"));

        let year_end = DateRange {
            start: date("2023-12-01"),
            end: date("2023-12-31"),
        };
        assert_eq!(year_end.exclusive_end().expect("next day"), date("2024-01-01"));
    }

    #[test]
    fn exclusive_end_fails_on_last_representable_date() {
        let range = DateRange {
            start: NaiveDate::MAX,
            end: NaiveDate::MAX,
        };
        assert!(matches!(range.exclusive_end(), Err(AppError::InvalidDate(_))));
    }

    #[test]
    fn credentials_debug_redacts_secret() {
        let creds = Credentials {
            access_key_id: "AKIDEXAMPLE".into(),
            secret_access_key: "wJalrXUtnFEMI".into(),
        };
        let printed = format!("{creds:?}");
        assert!(printed.contains("AKIDEXAMPLE"));
        assert!(!printed.contains("wJalrXUtnFEMI"));
    }

    #[test]
    fn alert_level_uses_strict_inequality() {
        assert_eq!(AlertLevel::classify(dec!(600.00), dec!(500.00)), AlertLevel::High);
        assert_eq!(AlertLevel::classify(dec!(500.00), dec!(500.00)), AlertLevel::Normal);
    }

    #[test]
    fn export_format_accepts_aliases() {
        assert_eq!(ExportFormat::parse("xlsx"), Some(ExportFormat::Spreadsheet));
        assert_eq!(ExportFormat::parse("Spreadsheet"), Some(ExportFormat::Spreadsheet));
        assert_eq!(ExportFormat::parse("pdf"), Some(ExportFormat::Document));
        assert_eq!(ExportFormat::parse("csv"), None);
    }

    #[test]
    fn line_item_serializes_plain_decimal_strings() {
        let item = CostLineItem {
            service: "Amazon EC2".into(),
            amount_primary: dec!(10.00),
            amount_secondary: dec!(830.00),
        };
        let json = serde_json::to_string(&item).expect("serialize");
        assert_eq!(
            json,
            r#"{"service":"Amazon EC2","amount_primary":"10.00","amount_secondary":"830.00"}"#
        );
    }
}
