use crate::error::{AppError, AppResult};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

/// Audience the backend stamps on signed-in user tokens.
pub const SESSION_AUDIENCE: &str = "authenticated";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppMetadata {
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user uuid
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub aud: Option<String>,
    #[serde(default)]
    pub app_metadata: AppMetadata,
}

/// Authenticated caller resolved from a bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    pub is_admin: bool,
}

#[derive(Clone)]
pub struct SessionVerifier {
    decoding_key: DecodingKey,
    admin_emails: Vec<String>,
}

impl SessionVerifier {
    pub fn new(secret: &str, admin_emails: Vec<String>) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            admin_emails: admin_emails
                .into_iter()
                .map(|e| e.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[SESSION_AUDIENCE]);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)
    }

    pub fn resolve(&self, token: &str) -> AppResult<Session> {
        let claims = self.verify_token(token)?;
        if claims.sub.is_empty() {
            return Err(AppError::AuthError("Session token has no subject".to_string()));
        }

        let is_admin = claims.app_metadata.role.as_deref() == Some("admin")
            || claims
                .email
                .as_deref()
                .map(|e| self.admin_emails.contains(&e.to_ascii_lowercase()))
                .unwrap_or(false);

        Ok(Session {
            user_id: claims.sub,
            email: claims.email,
            is_admin,
        })
    }
}
