use crate::database::VerificationStore;
use crate::entities::phone_verification_entity as pv;
use crate::error::{AppError, AppResult};
use crate::external::SmsGateway;
use crate::models::{SendOtpResponse, VerifyOtpResponse};
use crate::utils::{generate_otp_code, mask_phone, parse_sa_mobile};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use std::sync::Arc;

/// Validity of an issued code.
pub const OTP_TTL_SECS: i64 = 300;
/// Minimum gap between two codes sent to the same phone.
pub const OTP_RESEND_INTERVAL_SECS: i64 = 60;
/// Verification attempts allowed per issued code.
pub const OTP_MAX_ATTEMPTS: i32 = 3;

#[derive(Clone)]
pub struct OtpService {
    store: Arc<dyn VerificationStore>,
    sms: Arc<dyn SmsGateway>,
}

impl OtpService {
    pub fn new(store: Arc<dyn VerificationStore>, sms: Arc<dyn SmsGateway>) -> Self {
        Self { store, sms }
    }

    /// Issue a new code for `phone` and text it out.
    ///
    /// 1. Normalize and validate the number
    /// 2. Refuse if the previous code was issued less than 60 seconds ago
    /// 3. Upsert the new record conditionally on the same 60 second window
    /// 4. Send exactly one SMS, releasing the record if that fails
    pub async fn send_otp(&self, phone: Option<&str>) -> AppResult<SendOtpResponse> {
        let phone = parse_sa_mobile(phone)?;
        // Postgres keeps microseconds, later lookups compare created_at exactly
        let now = Utc::now().trunc_subsecs(6);

        let previous = self.store.find(&phone).await.map_err(storage_failure)?;
        if let Some(previous) = &previous {
            ensure_resend_allowed(previous.created_at, now)?;
        }

        let code = generate_otp_code();
        let record = pv::Model {
            phone: phone.clone(),
            otp_code: code.clone(),
            expires_at: now + Duration::seconds(OTP_TTL_SECS),
            attempts: OTP_MAX_ATTEMPTS,
            verified: false,
            created_at: now,
        };

        let window_start = now - Duration::seconds(OTP_RESEND_INTERVAL_SECS);
        let issued = self
            .store
            .issue(record, window_start)
            .await
            .map_err(storage_failure)?;

        if !issued {
            // A concurrent request for the same phone got there first
            let latest = self.store.find(&phone).await.map_err(storage_failure)?;
            let created_at = latest.map(|r| r.created_at).unwrap_or(now);
            return Err(rate_limited(retry_after_secs(created_at, now)));
        }

        if let Err(err) = self.sms.send_sms(&phone, &otp_message(&code)).await {
            // An unsent code must not hold the resend window
            if let Err(e) = self.store.discard(&phone, now).await {
                log::error!("Failed to release OTP for {}: {e}", mask_phone(&phone));
            }
            return Err(sms_failure(err));
        }

        log::info!("OTP issued for {}", mask_phone(&phone));

        Ok(SendOtpResponse {
            success: true,
            message: "OTP sent successfully".to_string(),
        })
    }

    /// Check a submitted code against the stored record.
    pub async fn verify_otp(
        &self,
        phone: Option<&str>,
        code: Option<&str>,
    ) -> AppResult<VerifyOtpResponse> {
        let phone = parse_sa_mobile(phone)?;
        let code = code.map(str::trim).unwrap_or_default();
        if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::ValidationError(
                "Code must be 6 digits".to_string(),
            ));
        }

        let now = Utc::now();
        let record = self
            .store
            .find(&phone)
            .await
            .map_err(storage_failure)?
            .ok_or_else(|| {
                AppError::ValidationError("No code was requested for this number".to_string())
            })?;

        if record.verified {
            return Err(AppError::ValidationError(
                "This code has already been used".to_string(),
            ));
        }
        if record.is_expired(now) {
            return Err(AppError::ValidationError(
                "Code has expired, request a new one".to_string(),
            ));
        }
        if record.attempts <= 0 {
            return Err(too_many_attempts(&record, now));
        }

        if record.otp_code == code {
            let verified = self
                .store
                .mark_verified(&phone, code, now)
                .await
                .map_err(storage_failure)?;
            if !verified {
                return Err(AppError::ValidationError(
                    "Code is no longer valid, request a new one".to_string(),
                ));
            }
            log::info!("Phone {} verified", mask_phone(&phone));
            return Ok(VerifyOtpResponse {
                success: true,
                verified: true,
            });
        }

        let consumed = self
            .store
            .consume_attempt(&phone, record.created_at)
            .await
            .map_err(storage_failure)?;
        if !consumed {
            return Err(too_many_attempts(&record, now));
        }

        let remaining = record.attempts - 1;
        log::warn!(
            "Wrong OTP for {}, {} attempts left",
            mask_phone(&phone),
            remaining
        );
        if remaining <= 0 {
            return Err(too_many_attempts(&record, now));
        }
        Err(AppError::ValidationError(format!(
            "Incorrect code, {remaining} attempt{} remaining",
            if remaining == 1 { "" } else { "s" }
        )))
    }
}

fn otp_message(code: &str) -> String {
    format!("Your GrooveFund verification code is {code}. It expires in 5 minutes.")
}

fn ensure_resend_allowed(created_at: DateTime<Utc>, now: DateTime<Utc>) -> AppResult<()> {
    if now - created_at < Duration::seconds(OTP_RESEND_INTERVAL_SECS) {
        return Err(rate_limited(retry_after_secs(created_at, now)));
    }
    Ok(())
}

/// Whole seconds left in the resend window, rounded up, between 1 and 60.
fn retry_after_secs(created_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let window_ms = OTP_RESEND_INTERVAL_SECS * 1000;
    let elapsed_ms = (now - created_at).num_milliseconds().max(0);
    let remaining_ms = (window_ms - elapsed_ms).max(0);
    ((remaining_ms + 999) / 1000).clamp(1, OTP_RESEND_INTERVAL_SECS) as u64
}

fn rate_limited(retry_after: u64) -> AppError {
    AppError::RateLimited {
        message: format!("Please wait {retry_after} seconds before requesting a new code"),
        retry_after,
    }
}

fn too_many_attempts(record: &pv::Model, now: DateTime<Utc>) -> AppError {
    AppError::RateLimited {
        message: "Too many attempts, request a new code".to_string(),
        retry_after: retry_after_secs(record.created_at, now),
    }
}

fn storage_failure(err: AppError) -> AppError {
    log::error!("Phone verification storage failed: {err}");
    AppError::ExternalApiError("Could not process the request, please try again".to_string())
}

fn sms_failure(err: AppError) -> AppError {
    match err {
        AppError::ConfigError(msg) => AppError::ConfigError(msg),
        other => {
            log::error!("OTP SMS dispatch failed: {other}");
            AppError::ExternalApiError("Failed to send OTP, please try again".to_string())
        }
    }
}
