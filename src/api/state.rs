use crate::billing::aws::CostExplorerApi;
use crate::billing::BillingApi;
use crate::config::AppConfig;
use crate::notify::sns::SnsApi;
use crate::notify::{NotificationApi, Notifier};
use crate::service::CostService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub service: Arc<CostService>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        billing: Arc<dyn BillingApi>,
        notifications: Arc<dyn NotificationApi>,
    ) -> Self {
        let config = Arc::new(config);
        let notifier = Notifier::new(
            notifications,
            config.alerts.clone(),
            config.currency.clone(),
        );
        let service = Arc::new(CostService::new(billing, notifier, config.clone()));
        Self { config, service }
    }

    /// Production wiring: Cost Explorer for billing data, SNS for notifications.
    pub fn with_aws(config: AppConfig) -> Self {
        Self::new(config, Arc::new(CostExplorerApi), Arc::new(SnsApi))
    }
}
