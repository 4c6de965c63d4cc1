use crate::error::{AppError, AppResult};
use crate::external::{Backend, CheckoutGateway, CheckoutRequest};
use crate::models::{
    ApplyPaymentRequest, CheckoutResponse, CreateCheckoutRequest, CreateTopupRequest,
    FreeUpSlotRequest, OkResponse, required_amount, required_id,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// Top-up bounds in cents (R20 to R10 000).
pub const MIN_TOPUP_CENTS: i64 = 2_000;
pub const MAX_TOPUP_CENTS: i64 = 1_000_000;
/// Upper bound for a single event checkout (R100 000).
pub const MAX_CHECKOUT_CENTS: i64 = 10_000_000;

#[derive(Clone)]
pub struct PaymentService {
    backend: Arc<dyn Backend>,
    checkout: Arc<dyn CheckoutGateway>,
}

impl PaymentService {
    pub fn new(backend: Arc<dyn Backend>, checkout: Arc<dyn CheckoutGateway>) -> Self {
        Self { backend, checkout }
    }

    /// Settle an event contribution from the caller's balance via `apply_payment`.
    pub async fn apply_payment(
        &self,
        user_id: &str,
        request: ApplyPaymentRequest,
    ) -> AppResult<OkResponse> {
        let event_id = required_id(request.event_id, "eventId")?;
        let amount = required_amount(request.amount, "amount")?;

        self.backend
            .call_procedure(
                "apply_payment",
                json!({
                    "p_user_id": user_id,
                    "p_event_id": event_id.to_param(),
                    "p_amount": amount,
                }),
            )
            .await?;

        log::info!("Payment of {amount} cents applied for user {user_id} on event {event_id}");
        Ok(OkResponse::ok())
    }

    /// Release the caller's reservation via `free_up_slot`.
    pub async fn free_up_slot(
        &self,
        user_id: &str,
        request: FreeUpSlotRequest,
    ) -> AppResult<OkResponse> {
        let slot_id = required_id(request.slot_id, "slotId")?;

        self.backend
            .call_procedure(
                "free_up_slot",
                json!({
                    "p_user_id": user_id,
                    "p_slot_id": slot_id.to_param(),
                }),
            )
            .await?;

        log::info!("Slot {slot_id} released by user {user_id}");
        Ok(OkResponse::ok())
    }

    pub async fn create_checkout(
        &self,
        user_id: &str,
        request: CreateCheckoutRequest,
    ) -> AppResult<CheckoutResponse> {
        let event_id = required_id(request.event_id, "eventId")?;
        let amount = required_amount(request.amount, "amount")?;
        if amount > MAX_CHECKOUT_CENTS {
            return Err(AppError::ValidationError(
                "amount exceeds the checkout limit".to_string(),
            ));
        }

        let mut metadata = HashMap::new();
        metadata.insert("kind".to_string(), "event".to_string());
        metadata.insert("user_id".to_string(), user_id.to_string());
        metadata.insert("event_id".to_string(), event_id.to_string());

        self.start_checkout(CheckoutRequest {
            amount,
            description: format!("GrooveFund event {event_id}"),
            client_reference_id: user_id.to_string(),
            metadata,
        })
        .await
    }

    pub async fn create_topup(
        &self,
        user_id: &str,
        request: CreateTopupRequest,
    ) -> AppResult<CheckoutResponse> {
        let amount = required_amount(request.amount, "amount")?;
        if !(MIN_TOPUP_CENTS..=MAX_TOPUP_CENTS).contains(&amount) {
            return Err(AppError::ValidationError(format!(
                "Top-up amount must be between R{} and R{}",
                MIN_TOPUP_CENTS / 100,
                MAX_TOPUP_CENTS / 100
            )));
        }

        let mut metadata = HashMap::new();
        metadata.insert("kind".to_string(), "topup".to_string());
        metadata.insert("user_id".to_string(), user_id.to_string());

        self.start_checkout(CheckoutRequest {
            amount,
            description: "GrooveFund balance top-up".to_string(),
            client_reference_id: user_id.to_string(),
            metadata,
        })
        .await
    }

    async fn start_checkout(&self, request: CheckoutRequest) -> AppResult<CheckoutResponse> {
        let session = self.checkout.create_checkout(request).await?;
        Ok(CheckoutResponse {
            checkout_url: session.url,
            checkout_id: session.id,
        })
    }
}
