use crate::billing::{BillingApi, CostBucket, CostGroup, CostRequest, COST_METRIC, GROUP_BY_DIMENSION};
use crate::error::AppError;
use crate::validate::DATE_FORMAT;
use async_trait::async_trait;
use aws_sdk_costexplorer::config::retry::RetryConfig;
use aws_sdk_costexplorer::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_costexplorer::error::DisplayErrorContext;
use aws_sdk_costexplorer::types::{DateInterval, Granularity, GroupDefinition, GroupDefinitionType};
use aws_sdk_costexplorer::Client;
use tracing::debug;

/// Cost Explorer backed billing API. A client is built per request from the
/// caller's credentials, with SDK retries disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct CostExplorerApi;

impl CostExplorerApi {
    fn client(request: &CostRequest) -> Client {
        let credentials = Credentials::new(
            request.credentials.access_key_id.clone(),
            request.credentials.secret_access_key.clone(),
            None,
            None,
            "cost-analyzer-request",
        );
        let config = aws_sdk_costexplorer::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(request.region.clone()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled())
            .build();
        Client::from_conf(config)
    }
}

#[async_trait]
impl BillingApi for CostExplorerApi {
    fn name(&self) -> &'static str {
        "aws-cost-explorer"
    }

    async fn cost_by_service(&self, request: &CostRequest) -> Result<Vec<CostBucket>, AppError> {
        let period = DateInterval::builder()
            .start(request.start.format(DATE_FORMAT).to_string())
            .end(request.end.format(DATE_FORMAT).to_string())
            .build()
            .map_err(|e| AppError::Fetch(format!("invalid time period: {e}")))?;

        debug!(
            region = %request.region,
            start = %request.start,
            end = %request.end,
            "GetCostAndUsage"
        );

        let response = Self::client(request)
            .get_cost_and_usage()
            .time_period(period)
            .granularity(Granularity::Monthly)
            .metrics(COST_METRIC)
            .group_by(
                GroupDefinition::builder()
                    .r#type(GroupDefinitionType::Dimension)
                    .key(GROUP_BY_DIMENSION)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| AppError::Fetch(DisplayErrorContext(&e).to_string()))?;

        let buckets = response
            .results_by_time()
            .iter()
            .map(|result| CostBucket {
                groups: result
                    .groups()
                    .iter()
                    .map(|group| CostGroup {
                        keys: group.keys().to_vec(),
                        amount: group
                            .metrics()
                            .and_then(|m| m.get(COST_METRIC))
                            .and_then(|v| v.amount())
                            .map(ToString::to_string),
                    })
                    .collect(),
            })
            .collect();

        Ok(buckets)
    }
}
