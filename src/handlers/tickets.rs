use super::{post_resource, respond};
use crate::middlewares::require_admin;
use crate::models::*;
use crate::services::TicketService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/save-ticket-url",
    tag = "tickets",
    request_body = SaveTicketUrlRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Ticket link stored on the slot", body = OkResponse),
        (status = 400, description = "Missing slotId or invalid ticketUrl", body = ErrorResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
        (status = 405, description = "Only POST is allowed", body = ErrorResponse),
        (status = 500, description = "Backend update failed", body = ErrorResponse)
    )
)]
pub async fn save_ticket_url(
    req: HttpRequest,
    ticket_service: web::Data<TicketService>,
    request: web::Json<SaveTicketUrlRequest>,
) -> Result<HttpResponse> {
    let admin = match require_admin(&req) {
        Ok(session) => session,
        Err(e) => return Ok(e.error_response()),
    };
    log::info!("Ticket link update requested by {}", admin.user_id);
    respond(ticket_service.save_ticket_url(request.into_inner()).await)
}

#[utoipa::path(
    post,
    path = "/upload-ticket-pdf",
    tag = "tickets",
    request_body = UploadTicketPdfRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "PDF stored and linked to the slot", body = UploadTicketPdfResponse),
        (status = 400, description = "Missing fields or not a PDF", body = ErrorResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
        (status = 405, description = "Only POST is allowed", body = ErrorResponse),
        (status = 500, description = "Storage or backend failure", body = ErrorResponse)
    )
)]
pub async fn upload_ticket_pdf(
    req: HttpRequest,
    ticket_service: web::Data<TicketService>,
    request: web::Json<UploadTicketPdfRequest>,
) -> Result<HttpResponse> {
    let admin = match require_admin(&req) {
        Ok(session) => session,
        Err(e) => return Ok(e.error_response()),
    };
    log::info!("Ticket PDF upload requested by {}", admin.user_id);
    respond(ticket_service.upload_ticket_pdf(request.into_inner()).await)
}

pub fn tickets_config(cfg: &mut web::ServiceConfig) {
    cfg.service(post_resource("/save-ticket-url", save_ticket_url))
        .service(post_resource("/upload-ticket-pdf", upload_ticket_pdf));
}

#[cfg(test)]
mod tests {
    use crate::testing::{BackendCall, Mocks, MockBackend, admin_token, user_token};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_save_ticket_url_requires_admin() {
        let mocks = Mocks::default();
        let app = test_app!(mocks);
        let payload = json!({ "slotId": 12, "ticketUrl": "https://tickets.example.com/12" });

        let req = test::TestRequest::post()
            .uri("/api/save-ticket-url")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/save-ticket-url")
            .insert_header(("Authorization", format!("Bearer {}", user_token())))
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Admin access required");
        assert!(mocks.backend.calls().is_empty());

        let req = test::TestRequest::post()
            .uri("/api/save-ticket-url")
            .insert_header(("Authorization", format!("Bearer {}", admin_token())))
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "ok": true }));
        assert_eq!(mocks.backend.calls().len(), 1);
    }

    #[actix_web::test]
    async fn test_missing_slot_is_400() {
        let mocks = Mocks::default();
        let app = test_app!(mocks);
        let req = test::TestRequest::post()
            .uri("/api/save-ticket-url")
            .insert_header(("Authorization", format!("Bearer {}", admin_token())))
            .set_json(json!({ "ticketUrl": "https://tickets.example.com/12" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "slotId is required");
    }

    #[actix_web::test]
    async fn test_upload_ticket_pdf_success_envelope() {
        let mocks = Mocks::default();
        let app = test_app!(mocks);
        let req = test::TestRequest::post()
            .uri("/api/upload-ticket-pdf")
            .insert_header(("Authorization", format!("Bearer {}", admin_token())))
            // "%PDF-1.4"
            .set_json(json!({ "slotId": 12, "fileData": "JVBERi0xLjQ=", "fileName": "vip.pdf" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        let file_name = body["fileName"].as_str().unwrap();
        assert!(file_name.ends_with("-vip.pdf"));
        assert!(body["ticketUrl"].as_str().unwrap().ends_with(file_name));
        assert_eq!(mocks.backend.calls().len(), 2);
    }

    #[actix_web::test]
    async fn test_failed_upload_is_500_without_update() {
        let mocks = Mocks {
            backend: Arc::new(MockBackend::new().failing_uploads("Bucket not found")),
            ..Mocks::default()
        };
        let app = test_app!(mocks);
        let req = test::TestRequest::post()
            .uri("/api/upload-ticket-pdf")
            .insert_header(("Authorization", format!("Bearer {}", admin_token())))
            .set_json(json!({ "slotId": 12, "fileData": "JVBERi0xLjQ=" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Bucket not found");

        let calls = mocks.backend.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(calls[0], BackendCall::Upload { .. }));
    }
}
