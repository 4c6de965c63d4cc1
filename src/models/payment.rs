use crate::models::RecordId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyPaymentRequest {
    pub event_id: Option<RecordId>,
    /// Cents
    #[schema(example = 25000)]
    pub amount: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    pub event_id: Option<RecordId>,
    /// Cents
    #[schema(example = 25000)]
    pub amount: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTopupRequest {
    /// Cents
    #[schema(example = 10000)]
    pub amount: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub checkout_url: String,
    pub checkout_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FreeUpSlotRequest {
    pub slot_id: Option<RecordId>,
}
