use super::{post_resource, respond};
use crate::models::*;
use crate::services::OtpService;
use actix_web::{HttpResponse, Result, web};

#[utoipa::path(
    post,
    path = "/send-otp",
    tag = "otp",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "Code sent by SMS", body = SendOtpResponse),
        (status = 400, description = "Missing or invalid phone number", body = ErrorResponse),
        (status = 405, description = "Only POST is allowed", body = ErrorResponse),
        (status = 429, description = "A code was requested less than a minute ago", body = ErrorResponse),
        (status = 500, description = "Storage or SMS failure", body = ErrorResponse)
    )
)]
pub async fn send_otp(
    otp_service: web::Data<OtpService>,
    request: web::Json<SendOtpRequest>,
) -> Result<HttpResponse> {
    respond(otp_service.send_otp(request.phone.as_deref()).await)
}

#[utoipa::path(
    post,
    path = "/verify-otp",
    tag = "otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Phone number verified", body = VerifyOtpResponse),
        (status = 400, description = "Wrong, expired or already used code", body = ErrorResponse),
        (status = 405, description = "Only POST is allowed", body = ErrorResponse),
        (status = 429, description = "Attempt budget exhausted", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn verify_otp(
    otp_service: web::Data<OtpService>,
    request: web::Json<VerifyOtpRequest>,
) -> Result<HttpResponse> {
    respond(
        otp_service
            .verify_otp(request.phone.as_deref(), request.code.as_deref())
            .await,
    )
}

pub fn otp_config(cfg: &mut web::ServiceConfig) {
    cfg.service(post_resource("/send-otp", send_otp))
        .service(post_resource("/verify-otp", verify_otp));
}
