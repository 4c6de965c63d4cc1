// Test doubles for the external seams.
//
// Each mock records the calls it receives and can be told to fail, so
// services and handlers are exercised without a database or network.

use crate::database::VerificationStore;
use crate::entities::phone_verification_entity as pv;
use crate::error::{AppError, AppResult};
use crate::external::{Backend, CheckoutGateway, CheckoutRequest, CheckoutSessionInfo, SmsGateway};
use crate::utils::{SESSION_AUDIENCE, SessionVerifier};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const TEST_JWT_SECRET: &str = "test-session-secret";

/// Sign a session token the way the backend does.
pub fn sign_token(sub: &str, email: Option<&str>, role: Option<&str>, ttl_secs: i64) -> String {
    let claims = json!({
        "sub": sub,
        "email": email,
        "aud": SESSION_AUDIENCE,
        "exp": Utc::now().timestamp() + ttl_secs,
        "app_metadata": { "role": role },
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn user_token() -> String {
    sign_token("user-1", Some("fan@example.com"), None, 3600)
}

pub fn admin_token() -> String {
    sign_token("admin-1", Some("admin@groovefund.co.za"), Some("admin"), 3600)
}

pub fn test_verifier() -> SessionVerifier {
    SessionVerifier::new(TEST_JWT_SECRET, vec![])
}

// =============================================================================
// Verification store
// =============================================================================

#[derive(Default)]
pub struct MockVerificationStore {
    records: Mutex<HashMap<String, pv::Model>>,
    fail_writes: Mutex<bool>,
    lose_issue_race: Mutex<bool>,
    writes: Mutex<usize>,
}

impl MockVerificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, record: pv::Model) -> Self {
        self.records
            .lock()
            .unwrap()
            .insert(record.phone.clone(), record);
        self
    }

    pub fn failing(self) -> Self {
        *self.fail_writes.lock().unwrap() = true;
        self
    }

    /// `issue` behaves as if a concurrent request stored a fresh code first.
    pub fn losing_issue_race(self) -> Self {
        *self.lose_issue_race.lock().unwrap() = true;
        self
    }

    pub fn get(&self, phone: &str) -> Option<pv::Model> {
        self.records.lock().unwrap().get(phone).cloned()
    }

    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    fn check_writable(&self) -> AppResult<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(AppError::DatabaseError(sea_orm::DbErr::Custom(
                "connection refused".to_string(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl VerificationStore for MockVerificationStore {
    async fn find(&self, phone: &str) -> AppResult<Option<pv::Model>> {
        Ok(self.get(phone))
    }

    async fn issue(&self, record: pv::Model, not_after: DateTime<Utc>) -> AppResult<bool> {
        self.check_writable()?;
        let mut records = self.records.lock().unwrap();
        if *self.lose_issue_race.lock().unwrap() {
            let winner = pv::Model {
                otp_code: "111111".to_string(),
                created_at: Utc::now(),
                ..record
            };
            records.insert(winner.phone.clone(), winner);
            return Ok(false);
        }
        if let Some(existing) = records.get(&record.phone)
            && existing.created_at > not_after
        {
            return Ok(false);
        }
        *self.writes.lock().unwrap() += 1;
        records.insert(record.phone.clone(), record);
        Ok(true)
    }

    async fn consume_attempt(&self, phone: &str, issued_at: DateTime<Utc>) -> AppResult<bool> {
        self.check_writable()?;
        let mut records = self.records.lock().unwrap();
        match records.get_mut(phone) {
            Some(r) if r.created_at == issued_at && !r.verified && r.attempts > 0 => {
                r.attempts -= 1;
                *self.writes.lock().unwrap() += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn discard(&self, phone: &str, issued_at: DateTime<Utc>) -> AppResult<()> {
        self.check_writable()?;
        let mut records = self.records.lock().unwrap();
        if records.get(phone).is_some_and(|r| r.created_at == issued_at) {
            records.remove(phone);
            *self.writes.lock().unwrap() += 1;
        }
        Ok(())
    }

    async fn mark_verified(
        &self,
        phone: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.check_writable()?;
        let mut records = self.records.lock().unwrap();
        match records.get_mut(phone) {
            Some(r) if r.otp_code == code && !r.verified && r.attempts > 0 && r.expires_at > now => {
                r.verified = true;
                *self.writes.lock().unwrap() += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// =============================================================================
// SMS gateway
// =============================================================================

#[derive(Default)]
pub struct MockSmsGateway {
    sent: Mutex<Vec<(String, String)>>,
    error: Mutex<Option<fn() -> AppError>>,
}

impl MockSmsGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_with(self, error: fn() -> AppError) -> Self {
        *self.error.lock().unwrap() = Some(error);
        self
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsGateway for MockSmsGateway {
    async fn send_sms(&self, to: &str, body: &str) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        match *self.error.lock().unwrap() {
            Some(make_error) => Err(make_error()),
            None => Ok(()),
        }
    }
}

// =============================================================================
// Backend-as-a-service
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Procedure {
        name: String,
        params: Value,
    },
    Upload {
        bucket: String,
        path: String,
        size: usize,
        content_type: String,
    },
    Delete {
        bucket: String,
        path: String,
    },
    Update {
        table: String,
        key_column: String,
        key: String,
        values: Value,
    },
}

#[derive(Default)]
pub struct MockBackend {
    calls: Mutex<Vec<BackendCall>>,
    fail_procedures: Mutex<Option<String>>,
    fail_uploads: Mutex<Option<String>>,
    fail_updates: Mutex<Option<String>>,
    fail_deletes: Mutex<Option<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_procedures(self, message: &str) -> Self {
        *self.fail_procedures.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn failing_uploads(self, message: &str) -> Self {
        *self.fail_uploads.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn failing_updates(self, message: &str) -> Self {
        *self.fail_updates.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn failing_deletes(self, message: &str) -> Self {
        *self.fail_deletes.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn call_procedure(&self, name: &str, params: Value) -> AppResult<Value> {
        self.calls.lock().unwrap().push(BackendCall::Procedure {
            name: name.to_string(),
            params,
        });
        match self.fail_procedures.lock().unwrap().clone() {
            Some(message) => Err(AppError::ExternalApiError(message)),
            None => Ok(Value::Null),
        }
    }

    async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> AppResult<String> {
        self.calls.lock().unwrap().push(BackendCall::Upload {
            bucket: bucket.to_string(),
            path: path.to_string(),
            size: bytes.len(),
            content_type: content_type.to_string(),
        });
        match self.fail_uploads.lock().unwrap().clone() {
            Some(message) => Err(AppError::ExternalApiError(message)),
            None => Ok(format!(
                "https://project.supabase.co/storage/v1/object/public/{bucket}/{path}"
            )),
        }
    }

    async fn delete_object(&self, bucket: &str, path: &str) -> AppResult<()> {
        self.calls.lock().unwrap().push(BackendCall::Delete {
            bucket: bucket.to_string(),
            path: path.to_string(),
        });
        match self.fail_deletes.lock().unwrap().clone() {
            Some(message) => Err(AppError::ExternalApiError(message)),
            None => Ok(()),
        }
    }

    async fn update_row(
        &self,
        table: &str,
        key_column: &str,
        key: &str,
        values: Value,
    ) -> AppResult<()> {
        self.calls.lock().unwrap().push(BackendCall::Update {
            table: table.to_string(),
            key_column: key_column.to_string(),
            key: key.to_string(),
            values,
        });
        match self.fail_updates.lock().unwrap().clone() {
            Some(message) => Err(AppError::ExternalApiError(message)),
            None => Ok(()),
        }
    }
}

// =============================================================================
// Checkout gateway
// =============================================================================

#[derive(Default)]
pub struct MockCheckoutGateway {
    requests: Mutex<Vec<CheckoutRequest>>,
    fail_with: Mutex<Option<String>>,
}

impl MockCheckoutGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(self, message: &str) -> Self {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn requests(&self) -> Vec<CheckoutRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CheckoutGateway for MockCheckoutGateway {
    async fn create_checkout(&self, request: CheckoutRequest) -> AppResult<CheckoutSessionInfo> {
        self.requests.lock().unwrap().push(request);
        match self.fail_with.lock().unwrap().clone() {
            Some(message) => Err(AppError::ExternalApiError(message)),
            None => Ok(CheckoutSessionInfo {
                id: "cs_test_123".to_string(),
                url: "https://checkout.stripe.com/c/pay/cs_test_123".to_string(),
            }),
        }
    }
}

/// Shared handles so tests can inspect a mock after handing it to a service.
pub struct Mocks {
    pub store: Arc<MockVerificationStore>,
    pub sms: Arc<MockSmsGateway>,
    pub backend: Arc<MockBackend>,
    pub checkout: Arc<MockCheckoutGateway>,
}

impl Default for Mocks {
    fn default() -> Self {
        Self {
            store: Arc::new(MockVerificationStore::new()),
            sms: Arc::new(MockSmsGateway::new()),
            backend: Arc::new(MockBackend::new()),
            checkout: Arc::new(MockCheckoutGateway::new()),
        }
    }
}
