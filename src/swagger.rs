use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::otp::send_otp,
        handlers::otp::verify_otp,
        handlers::tickets::save_ticket_url,
        handlers::tickets::upload_ticket_pdf,
        handlers::blog::upload_blog_image,
        handlers::payments::apply_payment,
        handlers::payments::create_checkout,
        handlers::payments::create_topup,
        handlers::payments::free_up_slot,
    ),
    components(
        schemas(
            ErrorResponse,
            OkResponse,
            RecordId,
            SendOtpRequest,
            SendOtpResponse,
            VerifyOtpRequest,
            VerifyOtpResponse,
            SaveTicketUrlRequest,
            UploadTicketPdfRequest,
            UploadTicketPdfResponse,
            UploadBlogImageRequest,
            UploadBlogImageResponse,
            ApplyPaymentRequest,
            CreateCheckoutRequest,
            CreateTopupRequest,
            CheckoutResponse,
            FreeUpSlotRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "otp", description = "Phone verification API"),
        (name = "tickets", description = "Event slot ticket API"),
        (name = "blog", description = "Blog media API"),
        (name = "payments", description = "Contribution and checkout API"),
    ),
    info(
        title = "GrooveFund Backend API",
        version = "1.0.0",
        description = "GrooveFund Backend REST API documentation"
    ),
    servers(
        (url = "/api", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
