use crate::error::{AppError, AppResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Decoded upload body together with the MIME type from a data URL, if any.
#[derive(Debug)]
pub struct UploadPayload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Accepts plain base64 or a `data:<mime>;base64,<data>` URL.
pub fn decode_upload(data: &str) -> AppResult<UploadPayload> {
    let data = data.trim();
    let (content_type, encoded) = match data.strip_prefix("data:") {
        Some(rest) => {
            let (meta, encoded) = rest.split_once(',').ok_or_else(|| {
                AppError::ValidationError("Malformed data URL in fileData".to_string())
            })?;
            let mime = meta.strip_suffix(";base64").ok_or_else(|| {
                AppError::ValidationError("fileData must be base64 encoded".to_string())
            })?;
            (Some(mime.to_ascii_lowercase()), encoded)
        }
        None => (None, data),
    };

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|_| AppError::ValidationError("fileData is not valid base64".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::ValidationError("fileData is empty".to_string()));
    }

    Ok(UploadPayload {
        bytes,
        content_type,
    })
}

/// Storage-safe file name: keeps ASCII alphanumerics, `-`, `_` and `.`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '-' || c == '.').to_string();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// Unique object path under `prefix`.
pub fn object_path(prefix: &str, file_name: &str) -> String {
    format!(
        "{}/{}-{}",
        prefix.trim_matches('/'),
        uuid::Uuid::new_v4(),
        sanitize_file_name(file_name)
    )
}
