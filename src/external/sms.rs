use crate::config::SmsConfig;
use crate::error::{AppError, AppResult};
use crate::external::http_client;
use crate::utils::mask_phone;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send_sms(&self, to: &str, body: &str) -> AppResult<()>;
}

#[derive(Debug, Serialize)]
struct SendSmsRequest<'a> {
    to: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<&'a str>,
}

/// BulkSMS JSON API client, authenticated with basic auth.
#[derive(Clone)]
pub struct BulkSmsService {
    client: Client,
    config: SmsConfig,
}

impl BulkSmsService {
    pub fn new(config: SmsConfig) -> AppResult<Self> {
        Ok(Self {
            client: http_client("groovefund-backend/sms")?,
            config,
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.config.username.is_empty() && !self.config.password.is_empty()
    }
}

#[async_trait]
impl SmsGateway for BulkSmsService {
    async fn send_sms(&self, to: &str, body: &str) -> AppResult<()> {
        if !self.is_configured() {
            return Err(AppError::ConfigError(
                "SMS gateway credentials are not configured".to_string(),
            ));
        }

        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));
        let request = SendSmsRequest {
            to,
            body,
            from: self.config.sender.as_deref(),
        };

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            log::info!("SMS dispatched to {}", mask_phone(to));
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!(
                "SMS gateway rejected message to {}: HTTP {}, {}",
                mask_phone(to),
                status.as_u16(),
                error_text
            );
            Err(AppError::ExternalApiError(format!(
                "SMS gateway returned HTTP {}",
                status.as_u16()
            )))
        }
    }
}
