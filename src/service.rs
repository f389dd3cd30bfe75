use crate::billing::{self, BillingApi, CostRequest};
use crate::config::AppConfig;
use crate::currency::Converter;
use crate::error::AppError;
use crate::models::{CostQuery, CostReport};
use crate::notify::Notifier;
use crate::render::chart::render_bar_chart;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

pub struct CostService {
    billing: Arc<dyn BillingApi>,
    notifier: Notifier,
    config: Arc<AppConfig>,
    converter: Converter,
}

impl CostService {
    pub fn new(billing: Arc<dyn BillingApi>, notifier: Notifier, config: Arc<AppConfig>) -> Self {
        let converter = Converter::new(config.currency.exchange_rate);
        Self {
            billing,
            notifier,
            config,
            converter,
        }
    }

    /// Single billing call, no retry. Every successful fetch publishes a status
    /// notification, whether or not the alert threshold was crossed.
    pub async fn fetch(&self, query: &CostQuery) -> Result<CostReport, AppError> {
        let request = CostRequest {
            credentials: query.credentials.clone(),
            region: query.region.clone(),
            start: query.range.start,
            end: query.range.exclusive_end()?,
        };

        let started = Instant::now();
        let buckets = self.billing.cost_by_service(&request).await?;
        let line_items = billing::aggregate(&buckets, &self.converter)?;

        let total_primary = billing::total_primary(&line_items);
        let total_secondary = self.converter.convert(total_primary);
        let alert_triggered = total_secondary > self.config.alerts.threshold;

        info!(
            backend = self.billing.name(),
            region = %query.region,
            range = %query.range,
            services = line_items.len(),
            %total_secondary,
            alert_triggered,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "cost data fetched"
        );

        let notification = self
            .notifier
            .notify(&query.credentials, &query.region, total_secondary, &query.range)
            .await;

        let chart = match render_bar_chart(&line_items, &self.config.currency.secondary) {
            Ok(chart) => chart,
            Err(e) => {
                warn!(error = %e, "chart rendering failed; report continues without chart");
                None
            }
        };

        Ok(CostReport {
            range: query.range,
            region: query.region.clone(),
            line_items,
            total_primary,
            total_secondary,
            alert_triggered,
            notification,
            chart,
        })
    }
}
