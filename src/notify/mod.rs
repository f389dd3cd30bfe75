use crate::config::{AlertSettings, CurrencySettings};
use crate::currency::{format_ascii, format_for};
use crate::error::AppError;
use crate::models::{AlertLevel, Credentials, DateRange, NotificationOutcome};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

pub mod sns;

#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub credentials: Credentials,
    pub region: String,
    pub topic_arn: String,
    pub subject: String,
    pub message: String,
}

#[async_trait]
pub trait NotificationApi: Send + Sync {
    fn name(&self) -> &'static str;

    async fn publish(&self, request: &PublishRequest) -> Result<(), AppError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

pub fn compose_alert(
    level: AlertLevel,
    total_secondary: Decimal,
    range: &DateRange,
    currency: &CurrencySettings,
) -> AlertMessage {
    let subject_total = format_ascii(total_secondary, &currency.secondary);
    let body_total = format_for(total_secondary, &currency.secondary);

    let (subject, status) = match level {
        AlertLevel::High => (
            format!("HIGH COST ALERT: {subject_total}"),
            "WARNING: Usage is high.",
        ),
        AlertLevel::Normal => (
            format!("AWS Cost Update: {subject_total}"),
            "Good Job! Usage is under control.",
        ),
    };

    let body = format!(
        "AWS Cost Analyzer Report\n\
         ------------------------\n\
         Date Range: {} to {}\n\
         Total Cost: {body_total}\n\n\
         Status: {status}\n",
        range.start, range.end
    );

    AlertMessage { subject, body }
}

pub struct Notifier {
    api: Arc<dyn NotificationApi>,
    alerts: AlertSettings,
    currency: CurrencySettings,
}

impl Notifier {
    pub fn new(api: Arc<dyn NotificationApi>, alerts: AlertSettings, currency: CurrencySettings) -> Self {
        Self {
            api,
            alerts,
            currency,
        }
    }

    /// Publishes the status message. Never fails: problems are logged and reported as `sent = false`.
    pub async fn notify(
        &self,
        credentials: &Credentials,
        region: &str,
        total_secondary: Decimal,
        range: &DateRange,
    ) -> NotificationOutcome {
        if !self.alerts.topic_configured() {
            warn!(
                "notification topic is not configured; set alerts.topic_arn to enable cost emails"
            );
            return NotificationOutcome { sent: false };
        }

        let level = AlertLevel::classify(total_secondary, self.alerts.threshold);
        let message = compose_alert(level, total_secondary, range, &self.currency);
        let request = PublishRequest {
            credentials: credentials.clone(),
            region: region.to_string(),
            topic_arn: self.alerts.topic_arn.clone(),
            subject: message.subject,
            message: message.body,
        };

        match self.api.publish(&request).await {
            Ok(()) => {
                info!(backend = self.api.name(), ?level, "cost notification published");
                NotificationOutcome { sent: true }
            }
            Err(e) => {
                warn!(backend = self.api.name(), error = %e, "cost notification failed");
                NotificationOutcome { sent: false }
            }
        }
    }
}
