use crate::error::{AppError, AppResult};
use crate::external::Backend;
use crate::models::{UploadBlogImageRequest, UploadBlogImageResponse, required_text};
use crate::utils::{decode_upload, object_path};
use std::sync::Arc;

const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/webp", "image/gif"];
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone)]
pub struct BlogService {
    backend: Arc<dyn Backend>,
    blog_bucket: String,
}

impl BlogService {
    pub fn new(backend: Arc<dyn Backend>, blog_bucket: String) -> Self {
        Self {
            backend,
            blog_bucket,
        }
    }

    pub async fn upload_blog_image(
        &self,
        request: UploadBlogImageRequest,
    ) -> AppResult<UploadBlogImageResponse> {
        let file_name = required_text(request.file_name, "fileName")?;
        let file_data = required_text(request.file_data, "fileData")?;

        let payload = decode_upload(&file_data)?;
        let content_type = request
            .content_type
            .map(|c| c.trim().to_ascii_lowercase())
            .filter(|c| !c.is_empty())
            .or(payload.content_type)
            .or_else(|| guess_image_type(&file_name).map(str::to_string))
            .ok_or_else(|| {
                AppError::ValidationError("contentType is required".to_string())
            })?;

        if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
            return Err(AppError::ValidationError(format!(
                "Unsupported image type {content_type}"
            )));
        }
        if payload.bytes.len() > MAX_IMAGE_BYTES {
            return Err(AppError::ValidationError(
                "Image must be 5 MB or smaller".to_string(),
            ));
        }

        let path = object_path("posts", &file_name);
        let image_url = self
            .backend
            .upload_object(&self.blog_bucket, &path, payload.bytes, &content_type)
            .await?;

        log::info!("Blog image stored at {path}");
        Ok(UploadBlogImageResponse {
            success: true,
            image_url,
            file_name: path,
        })
    }
}

fn guess_image_type(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
