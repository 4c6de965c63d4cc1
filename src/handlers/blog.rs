use super::{post_resource, respond};
use crate::middlewares::require_admin;
use crate::models::*;
use crate::services::BlogService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/upload-blog-image",
    tag = "blog",
    request_body = UploadBlogImageRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Image stored in the blog bucket", body = UploadBlogImageResponse),
        (status = 400, description = "Missing fields or unsupported image type", body = ErrorResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
        (status = 405, description = "Only POST is allowed", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn upload_blog_image(
    req: HttpRequest,
    blog_service: web::Data<BlogService>,
    request: web::Json<UploadBlogImageRequest>,
) -> Result<HttpResponse> {
    let admin = match require_admin(&req) {
        Ok(session) => session,
        Err(e) => return Ok(e.error_response()),
    };
    log::info!("Blog image upload requested by {}", admin.user_id);
    respond(blog_service.upload_blog_image(request.into_inner()).await)
}

pub fn blog_config(cfg: &mut web::ServiceConfig) {
    cfg.service(post_resource("/upload-blog-image", upload_blog_image));
}

#[cfg(test)]
mod tests {
    use crate::testing::{Mocks, admin_token, user_token};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn test_upload_blog_image() {
        let mocks = Mocks::default();
        let app = test_app!(mocks);
        let req = test::TestRequest::post()
            .uri("/api/upload-blog-image")
            .insert_header(("Authorization", format!("Bearer {}", admin_token())))
            .set_json(json!({
                "fileName": "lineup.png",
                "fileData": "data:image/png;base64,aGVsbG8=",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        let file_name = body["fileName"].as_str().unwrap();
        assert!(file_name.starts_with("posts/"));
        assert!(body["imageUrl"].as_str().unwrap().contains("/blog-images/posts/"));
    }

    #[actix_web::test]
    async fn test_regular_users_cannot_upload() {
        let mocks = Mocks::default();
        let app = test_app!(mocks);
        let req = test::TestRequest::post()
            .uri("/api/upload-blog-image")
            .insert_header(("Authorization", format!("Bearer {}", user_token())))
            .set_json(json!({ "fileName": "lineup.png", "fileData": "aGVsbG8=" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(mocks.backend.calls().is_empty());
    }

    #[actix_web::test]
    async fn test_tampered_token_is_401() {
        let mocks = Mocks::default();
        let app = test_app!(mocks);
        let token = format!("{}x", admin_token());
        let req = test::TestRequest::post()
            .uri("/api/upload-blog-image")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({ "fileName": "lineup.png", "fileData": "aGVsbG8=" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "AUTH_ERROR");
    }
}
