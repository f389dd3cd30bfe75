use crate::currency::{round_cents, Converter};
use crate::error::AppError;
use crate::models::{CostLineItem, Credentials};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

pub mod aws;

pub const COST_METRIC: &str = "UnblendedCost";
pub const GROUP_BY_DIMENSION: &str = "SERVICE";

#[derive(Debug, Clone)]
pub struct CostRequest {
    pub credentials: Credentials,
    pub region: String,
    pub start: NaiveDate,
    /// Exclusive upper bound of the billing period.
    pub end: NaiveDate,
}

/// One group of a time bucket: the service key and its metric amount as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostGroup {
    pub keys: Vec<String>,
    pub amount: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostBucket {
    pub groups: Vec<CostGroup>,
}

#[async_trait]
pub trait BillingApi: Send + Sync {
    fn name(&self) -> &'static str;

    /// Monthly unblended cost grouped by service for `[start, end)`.
    async fn cost_by_service(&self, request: &CostRequest) -> Result<Vec<CostBucket>, AppError>;
}

fn parse_amount(service: &str, raw: &str) -> Result<Decimal, AppError> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| {
            AppError::Fetch(format!(
                "malformed {COST_METRIC} amount '{raw}' for service '{service}'"
            ))
        })
}

/// Keeps services with a strictly positive cost, in response order. A service
/// reported in several monthly buckets is merged into its first position.
pub fn aggregate(buckets: &[CostBucket], converter: &Converter) -> Result<Vec<CostLineItem>, AppError> {
    let mut totals: Vec<(String, Decimal)> = Vec::new();

    for bucket in buckets {
        for group in &bucket.groups {
            let service = group
                .keys
                .first()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .unwrap_or_else(|| "Unknown".to_string());
            let raw = group.amount.as_deref().ok_or_else(|| {
                AppError::Fetch(format!("missing {COST_METRIC} for service '{service}'"))
            })?;
            let amount = parse_amount(&service, raw)?;
            if amount <= Decimal::ZERO {
                continue;
            }

            match totals.iter_mut().find(|(name, _)| *name == service) {
                Some((_, total)) => *total += amount,
                None => totals.push((service, amount)),
            }
        }
    }

    Ok(totals
        .into_iter()
        .map(|(service, amount)| CostLineItem {
            service,
            amount_primary: amount,
            amount_secondary: converter.convert(amount),
        })
        .collect())
}

pub fn total_primary(items: &[CostLineItem]) -> Decimal {
    items.iter().map(|i| i.amount_primary).sum()
}

pub fn total_secondary(items: &[CostLineItem]) -> Decimal {
    round_cents(items.iter().map(|i| i.amount_secondary).sum())
}
