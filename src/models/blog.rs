use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadBlogImageRequest {
    #[schema(example = "summer-jam.png")]
    pub file_name: Option<String>,
    /// Base64 image, optionally as a data URL.
    pub file_data: Option<String>,
    #[schema(example = "image/png")]
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadBlogImageResponse {
    pub success: bool,
    pub image_url: String,
    pub file_name: String,
}
