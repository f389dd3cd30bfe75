use crate::error::AppError;
use crate::notify::{NotificationApi, PublishRequest};
use async_trait::async_trait;
use aws_sdk_sns::config::retry::RetryConfig;
use aws_sdk_sns::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_sns::error::DisplayErrorContext;
use aws_sdk_sns::Client;

#[derive(Debug, Default, Clone, Copy)]
pub struct SnsApi;

impl SnsApi {
    fn client(request: &PublishRequest) -> Client {
        let credentials = Credentials::new(
            request.credentials.access_key_id.clone(),
            request.credentials.secret_access_key.clone(),
            None,
            None,
            "cost-analyzer-request",
        );
        let config = aws_sdk_sns::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(request.region.clone()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled())
            .build();
        Client::from_conf(config)
    }
}

#[async_trait]
impl NotificationApi for SnsApi {
    fn name(&self) -> &'static str {
        "aws-sns"
    }

    async fn publish(&self, request: &PublishRequest) -> Result<(), AppError> {
        Self::client(request)
            .publish()
            .topic_arn(&request.topic_arn)
            .subject(&request.subject)
            .message(&request.message)
            .send()
            .await
            .map_err(|e| AppError::Notification(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }
}
