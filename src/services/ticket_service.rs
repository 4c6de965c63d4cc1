use crate::error::{AppError, AppResult};
use crate::external::Backend;
use crate::models::{
    OkResponse, RecordId, SaveTicketUrlRequest, UploadTicketPdfRequest, UploadTicketPdfResponse,
    required_id, required_text,
};
use crate::utils::{decode_upload, object_path, sanitize_file_name};
use serde_json::json;
use std::sync::Arc;

/// Remote table holding one row per reservable event slot.
pub const SLOTS_TABLE: &str = "event_slots";
const SLOT_KEY_COLUMN: &str = "id";
const TICKET_URL_COLUMN: &str = "ticket_url";

const PDF_MIME: &str = "application/pdf";
const MAX_PDF_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone)]
pub struct TicketService {
    backend: Arc<dyn Backend>,
    tickets_bucket: String,
}

impl TicketService {
    pub fn new(backend: Arc<dyn Backend>, tickets_bucket: String) -> Self {
        Self {
            backend,
            tickets_bucket,
        }
    }

    /// Point a slot at an externally hosted ticket.
    pub async fn save_ticket_url(&self, request: SaveTicketUrlRequest) -> AppResult<OkResponse> {
        let slot_id = required_id(request.slot_id, "slotId")?;
        let ticket_url = required_text(request.ticket_url, "ticketUrl")?;
        validate_ticket_url(&ticket_url)?;

        self.set_ticket_url(&slot_id, &ticket_url).await?;
        log::info!("Ticket URL saved for slot {slot_id}");
        Ok(OkResponse::ok())
    }

    /// Store a ticket PDF, then link it to its slot.
    ///
    /// The slot is only touched once the upload succeeded, and the upload is
    /// removed again if linking it to the slot fails.
    pub async fn upload_ticket_pdf(
        &self,
        request: UploadTicketPdfRequest,
    ) -> AppResult<UploadTicketPdfResponse> {
        let slot_id = required_id(request.slot_id, "slotId")?;
        let file_data = required_text(request.file_data, "fileData")?;

        let payload = decode_upload(&file_data)?;
        if let Some(mime) = payload.content_type.as_deref()
            && mime != PDF_MIME
        {
            return Err(AppError::ValidationError("Ticket must be a PDF".to_string()));
        }
        if !payload.bytes.starts_with(b"%PDF") {
            return Err(AppError::ValidationError("Ticket must be a PDF".to_string()));
        }
        if payload.bytes.len() > MAX_PDF_BYTES {
            return Err(AppError::ValidationError(
                "Ticket PDF must be 5 MB or smaller".to_string(),
            ));
        }

        let file_name = pdf_file_name(request.file_name.as_deref());
        let prefix = format!("slots/{}", sanitize_file_name(&slot_id.to_string()));
        let path = object_path(&prefix, &file_name);

        let ticket_url = self
            .backend
            .upload_object(&self.tickets_bucket, &path, payload.bytes, PDF_MIME)
            .await?;
        if let Err(err) = self.set_ticket_url(&slot_id, &ticket_url).await {
            // The stored PDF must not outlive a failed link
            if let Err(cleanup) = self
                .backend
                .delete_object(&self.tickets_bucket, &path)
                .await
            {
                log::error!("Failed to remove orphaned ticket {path}: {cleanup}");
            }
            return Err(err);
        }

        log::info!("Ticket PDF uploaded for slot {slot_id}");
        Ok(UploadTicketPdfResponse {
            success: true,
            ticket_url,
            file_name: path,
        })
    }

    async fn set_ticket_url(&self, slot_id: &RecordId, url: &str) -> AppResult<()> {
        self.backend
            .update_row(
                SLOTS_TABLE,
                SLOT_KEY_COLUMN,
                &slot_id.to_string(),
                json!({ TICKET_URL_COLUMN: url }),
            )
            .await
    }
}

fn validate_ticket_url(url: &str) -> AppResult<()> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|_| AppError::ValidationError("ticketUrl must be a valid URL".to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(AppError::ValidationError(
            "ticketUrl must be an http(s) URL".to_string(),
        ));
    }
    Ok(())
}

fn pdf_file_name(name: Option<&str>) -> String {
    let name = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or("ticket.pdf");
    if name.to_ascii_lowercase().ends_with(".pdf") {
        name.to_string()
    } else {
        format!("{name}.pdf")
    }
}
