use crate::models::RecordId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveTicketUrlRequest {
    pub slot_id: Option<RecordId>,
    #[schema(example = "https://tickets.example.com/t/abc123")]
    pub ticket_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicketPdfRequest {
    pub slot_id: Option<RecordId>,
    /// Base64 PDF, optionally as a data URL.
    pub file_data: Option<String>,
    #[schema(example = "ticket.pdf")]
    pub file_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicketPdfResponse {
    pub success: bool,
    pub ticket_url: String,
    pub file_name: String,
}
