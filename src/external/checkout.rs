use crate::config::StripeConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use std::collections::HashMap;
use stripe::{
    CheckoutSession, CheckoutSessionMode, Client, CreateCheckoutSession,
    CreateCheckoutSessionLineItems, CreateCheckoutSessionLineItemsPriceData,
    CreateCheckoutSessionLineItemsPriceDataProductData, Currency,
};

/// A hosted checkout for a single fixed amount in cents (ZAR).
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub amount: i64,
    pub description: String,
    pub client_reference_id: String,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSessionInfo {
    pub id: String,
    pub url: String,
}

#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn create_checkout(&self, request: CheckoutRequest) -> AppResult<CheckoutSessionInfo>;
}

#[derive(Clone)]
pub struct StripeService {
    client: Client,
    config: StripeConfig,
}

impl StripeService {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            client: Client::new(config.secret_key.clone()),
            config,
        }
    }

    fn ensure_configured(&self) -> AppResult<()> {
        if self.config.secret_key.is_empty() {
            return Err(AppError::ConfigError("Stripe secret key is not set".to_string()));
        }
        if self.config.success_url.is_empty() || self.config.cancel_url.is_empty() {
            return Err(AppError::ConfigError(
                "Stripe success/cancel URLs are not set".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CheckoutGateway for StripeService {
    async fn create_checkout(&self, request: CheckoutRequest) -> AppResult<CheckoutSessionInfo> {
        self.ensure_configured()?;

        let mut params = CreateCheckoutSession::new();
        params.success_url = Some(&self.config.success_url);
        params.cancel_url = Some(&self.config.cancel_url);
        params.mode = Some(CheckoutSessionMode::Payment);
        params.client_reference_id = Some(&request.client_reference_id);
        params.metadata = Some(request.metadata.clone());
        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            quantity: Some(1),
            price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                currency: Currency::ZAR,
                unit_amount: Some(request.amount),
                product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: request.description.clone(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }]);

        let session = CheckoutSession::create(&self.client, params).await?;
        let url = session.url.ok_or_else(|| {
            AppError::ExternalApiError("Checkout session was created without a URL".to_string())
        })?;

        log::info!(
            "Checkout session {} created for {} ({} cents)",
            session.id,
            request.client_reference_id,
            request.amount
        );

        Ok(CheckoutSessionInfo {
            id: session.id.to_string(),
            url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_stripe_fails_closed() {
        let service = StripeService::new(StripeConfig::default());
        let err = service
            .create_checkout(CheckoutRequest {
                amount: 5000,
                description: "Top-up".to_string(),
                client_reference_id: "user-1".to_string(),
                metadata: HashMap::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn test_missing_urls_detected() {
        let service = StripeService::new(StripeConfig {
            secret_key: "sk_test_123".to_string(),
            success_url: String::new(),
            cancel_url: String::new(),
        });
        assert!(service.ensure_configured().is_err());
    }
}
