use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::LazyLock;

/// South African mobile numbers: +27 followed by a 6, 7 or 8 prefix and eight digits.
static SA_MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+27[6-8]\d{8}$").expect("valid phone pattern"));

/// Normalize user input into `+27XXXXXXXXX` form.
///
/// Whitespace is removed, a single leading `0` is dropped and `+27` is
/// prepended when no country code is present. Already normalized numbers
/// pass through unchanged.
pub fn normalize_sa_phone(phone: &str) -> String {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    let local = compact.strip_prefix('0').unwrap_or(&compact);

    if local.starts_with('+') {
        local.to_string()
    } else if local.len() == 11 && local.starts_with("27") {
        format!("+{local}")
    } else {
        format!("+27{local}")
    }
}

pub fn is_sa_mobile(phone: &str) -> bool {
    SA_MOBILE.is_match(phone)
}

/// Normalize and validate a phone number taken from a request body.
pub fn parse_sa_mobile(phone: Option<&str>) -> AppResult<String> {
    let raw = phone
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::ValidationError("Phone number is required".to_string()))?;

    let normalized = normalize_sa_phone(raw);
    if !is_sa_mobile(&normalized) {
        return Err(AppError::ValidationError(
            "Invalid South African mobile number".to_string(),
        ));
    }
    Ok(normalized)
}

/// Phone number safe for log lines.
pub fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() <= 7 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..5].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 7))
}
