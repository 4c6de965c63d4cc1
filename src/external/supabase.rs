use crate::config::BackendConfig;
use crate::error::{AppError, AppResult};
use crate::external::http_client;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

/// Operations delegated to the backend-as-a-service.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Invoke a stored procedure by name with named parameters.
    async fn call_procedure(&self, name: &str, params: Value) -> AppResult<Value>;

    /// Store an object and return its public URL.
    async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> AppResult<String>;

    /// Remove a stored object.
    async fn delete_object(&self, bucket: &str, path: &str) -> AppResult<()>;

    /// Patch the row of `table` whose `key_column` equals `key`.
    async fn update_row(
        &self,
        table: &str,
        key_column: &str,
        key: &str,
        values: Value,
    ) -> AppResult<()>;
}

/// Supabase REST client (PostgREST + Storage) using the service key.
#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    config: BackendConfig,
}

impl SupabaseClient {
    pub fn new(config: BackendConfig) -> AppResult<Self> {
        Ok(Self {
            client: http_client("groovefund-backend/supabase")?,
            config,
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.config.url.is_empty() && !self.config.service_key.is_empty()
    }

    fn ensure_configured(&self) -> AppResult<()> {
        if !self.is_configured() {
            return Err(AppError::ConfigError(
                "Backend URL or service key is not configured".to_string(),
            ));
        }
        Ok(())
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
    }

    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url(),
            bucket,
            path
        )
    }

    async fn error_from(response: Response, context: &str) -> AppError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = extract_error_message(&text)
            .unwrap_or_else(|| format!("{context} failed with HTTP {}", status.as_u16()));
        log::error!("{context} failed: HTTP {}, {}", status.as_u16(), text);
        AppError::ExternalApiError(message)
    }
}

/// Pulls the human readable message out of PostgREST / Storage error bodies.
fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

#[async_trait]
impl Backend for SupabaseClient {
    async fn call_procedure(&self, name: &str, params: Value) -> AppResult<Value> {
        self.ensure_configured()?;
        let url = format!("{}/rest/v1/rpc/{}", self.base_url(), name);
        let response = self
            .authorized(self.client.post(&url))
            .json(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, &format!("Procedure {name}")).await);
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> AppResult<String> {
        self.ensure_configured()?;
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url(), bucket, path);
        let response = self
            .authorized(self.client.post(&url))
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, "Storage upload").await);
        }

        log::info!("Stored object {bucket}/{path}");
        Ok(self.public_url(bucket, path))
    }

    async fn delete_object(&self, bucket: &str, path: &str) -> AppResult<()> {
        self.ensure_configured()?;
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url(), bucket, path);
        let response = self.authorized(self.client.delete(&url)).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, "Storage delete").await);
        }

        log::info!("Removed object {bucket}/{path}");
        Ok(())
    }

    async fn update_row(
        &self,
        table: &str,
        key_column: &str,
        key: &str,
        values: Value,
    ) -> AppResult<()> {
        self.ensure_configured()?;
        let url = format!("{}/rest/v1/{}", self.base_url(), table);
        let response = self
            .authorized(self.client.patch(&url))
            .query(&[(key_column, format!("eq.{key}"))])
            .header("Prefer", "return=representation")
            .json(&values)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, &format!("Update of {table}")).await);
        }

        let rows: Vec<Value> = response.json().await?;
        if rows.is_empty() {
            return Err(AppError::NotFound(format!("No {table} record with id {key}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BackendConfig {
        BackendConfig {
            url: "https://project.supabase.co/".to_string(),
            service_key: "service-key".to_string(),
            blog_bucket: "blog-images".to_string(),
            tickets_bucket: "tickets".to_string(),
        }
    }

    #[test]
    fn test_public_url() {
        let client = SupabaseClient::new(config()).unwrap();
        assert_eq!(
            client.public_url("blog-images", "blog/abc-cover.png"),
            "https://project.supabase.co/storage/v1/object/public/blog-images/blog/abc-cover.png"
        );
    }

    #[tokio::test]
    async fn test_missing_service_key_fails_per_call() {
        let mut cfg = config();
        cfg.service_key.clear();
        let client = SupabaseClient::new(cfg).unwrap();
        assert!(!client.is_configured());

        let err = client
            .call_procedure("apply_payment", Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));

        let err = client.delete_object("tickets", "a.pdf").await.unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(r#"{"code":"P0001","message":"Insufficient balance"}"#),
            Some("Insufficient balance".to_string())
        );
        assert_eq!(
            extract_error_message(r#"{"statusCode":"409","error":"Duplicate"}"#),
            Some("Duplicate".to_string())
        );
        assert_eq!(extract_error_message("<html>"), None);
    }
}
