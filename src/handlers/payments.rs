use super::{post_resource, respond};
use crate::middlewares::require_session;
use crate::models::*;
use crate::services::PaymentService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/apply-payment",
    tag = "payments",
    request_body = ApplyPaymentRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Payment applied from balance", body = OkResponse),
        (status = 400, description = "Missing eventId or amount", body = ErrorResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
        (status = 405, description = "Only POST is allowed", body = ErrorResponse),
        (status = 500, description = "Procedure failed", body = ErrorResponse)
    )
)]
pub async fn apply_payment(
    req: HttpRequest,
    payment_service: web::Data<PaymentService>,
    request: web::Json<ApplyPaymentRequest>,
) -> Result<HttpResponse> {
    let session = match require_session(&req) {
        Ok(session) => session,
        Err(e) => return Ok(e.error_response()),
    };
    respond(
        payment_service
            .apply_payment(&session.user_id, request.into_inner())
            .await,
    )
}

#[utoipa::path(
    post,
    path = "/create-checkout",
    tag = "payments",
    request_body = CreateCheckoutRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Hosted checkout created", body = CheckoutResponse),
        (status = 400, description = "Missing eventId or invalid amount", body = ErrorResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
        (status = 405, description = "Only POST is allowed", body = ErrorResponse),
        (status = 500, description = "Payment provider failure", body = ErrorResponse)
    )
)]
pub async fn create_checkout(
    req: HttpRequest,
    payment_service: web::Data<PaymentService>,
    request: web::Json<CreateCheckoutRequest>,
) -> Result<HttpResponse> {
    let session = match require_session(&req) {
        Ok(session) => session,
        Err(e) => return Ok(e.error_response()),
    };
    respond(
        payment_service
            .create_checkout(&session.user_id, request.into_inner())
            .await,
    )
}

#[utoipa::path(
    post,
    path = "/create-topup",
    tag = "payments",
    request_body = CreateTopupRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Top-up checkout created", body = CheckoutResponse),
        (status = 400, description = "Amount outside top-up bounds", body = ErrorResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
        (status = 405, description = "Only POST is allowed", body = ErrorResponse),
        (status = 500, description = "Payment provider failure", body = ErrorResponse)
    )
)]
pub async fn create_topup(
    req: HttpRequest,
    payment_service: web::Data<PaymentService>,
    request: web::Json<CreateTopupRequest>,
) -> Result<HttpResponse> {
    let session = match require_session(&req) {
        Ok(session) => session,
        Err(e) => return Ok(e.error_response()),
    };
    respond(
        payment_service
            .create_topup(&session.user_id, request.into_inner())
            .await,
    )
}

#[utoipa::path(
    post,
    path = "/free-up-slot",
    tag = "payments",
    request_body = FreeUpSlotRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Slot released", body = OkResponse),
        (status = 400, description = "Missing slotId", body = ErrorResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
        (status = 405, description = "Only POST is allowed", body = ErrorResponse),
        (status = 500, description = "Procedure failed", body = ErrorResponse)
    )
)]
pub async fn free_up_slot(
    req: HttpRequest,
    payment_service: web::Data<PaymentService>,
    request: web::Json<FreeUpSlotRequest>,
) -> Result<HttpResponse> {
    let session = match require_session(&req) {
        Ok(session) => session,
        Err(e) => return Ok(e.error_response()),
    };
    respond(
        payment_service
            .free_up_slot(&session.user_id, request.into_inner())
            .await,
    )
}

pub fn payments_config(cfg: &mut web::ServiceConfig) {
    cfg.service(post_resource("/apply-payment", apply_payment))
        .service(post_resource("/create-checkout", create_checkout))
        .service(post_resource("/create-topup", create_topup))
        .service(post_resource("/free-up-slot", free_up_slot));
}
