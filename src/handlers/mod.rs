#[cfg(test)]
macro_rules! test_app {
    ($mocks:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(crate::middlewares::SessionMiddleware::new(
                    crate::testing::test_verifier(),
                ))
                .configure(|cfg| crate::handlers::configure_with_mocks(cfg, &$mocks)),
        )
        .await
    };
}

pub mod blog;
pub mod otp;
pub mod payments;
pub mod tickets;

pub use blog::blog_config;
pub use otp::otp_config;
pub use payments::payments_config;
pub use tickets::tickets_config;

use crate::error::{AppError, AppResult};
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde::Serialize;
use serde_json::json;

/// Every endpoint under `/api`.
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.configure(otp_config)
        .configure(tickets_config)
        .configure(blog_config)
        .configure(payments_config);
}

/// POST-only resource, other methods get the JSON 405 envelope.
pub(crate) fn post_resource<F, Args>(path: &str, handler: F) -> actix_web::Resource
where
    F: actix_web::Handler<Args>,
    Args: actix_web::FromRequest + 'static,
    F::Output: actix_web::Responder + 'static,
{
    web::resource(path)
        .route(web::post().to(handler))
        .default_service(web::to(method_not_allowed))
}

pub async fn method_not_allowed() -> HttpResponse {
    AppError::MethodNotAllowed.error_response()
}

pub(crate) fn respond<T: Serialize>(result: AppResult<T>) -> Result<HttpResponse> {
    match result {
        Ok(body) => Ok(HttpResponse::Ok().json(body)),
        Err(e) => Ok(e.error_response()),
    }
}

/// Body extractor settings, malformed or oversized JSON becomes a 400 envelope.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            let message = match &err {
                JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                    "Request body is too large".to_string()
                }
                JsonPayloadError::ContentType => {
                    "Content-Type must be application/json".to_string()
                }
                _ => "Request body is not valid JSON".to_string(),
            };
            let response = AppError::ValidationError(message).error_response();
            InternalError::from_response(err, response).into()
        })
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

#[cfg(test)]
pub(crate) fn configure_with_mocks(cfg: &mut web::ServiceConfig, mocks: &crate::testing::Mocks) {
    use crate::services::{BlogService, OtpService, PaymentService, TicketService};

    cfg.app_data(web::Data::new(OtpService::new(
        mocks.store.clone(),
        mocks.sms.clone(),
    )))
    .app_data(web::Data::new(TicketService::new(
        mocks.backend.clone(),
        "tickets".to_string(),
    )))
    .app_data(web::Data::new(BlogService::new(
        mocks.backend.clone(),
        "blog-images".to_string(),
    )))
    .app_data(web::Data::new(PaymentService::new(
        mocks.backend.clone(),
        mocks.checkout.clone(),
    )))
    .app_data(json_config(1024 * 1024))
    .route("/health", web::get().to(health))
    .service(web::scope("/api").configure(api_config));
}
