use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub sms: SmsConfig,
    #[serde(default)]
    pub stripe: StripeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted JSON body, uploads arrive base64-encoded.
    #[serde(default = "default_json_limit")]
    pub json_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// HS256 secret the backend signs access tokens with.
    pub jwt_secret: String,
    #[serde(default)]
    pub admin_emails: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub service_key: String,
    #[serde(default = "default_blog_bucket")]
    pub blog_bucket: String,
    #[serde(default = "default_tickets_bucket")]
    pub tickets_bucket: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsConfig {
    #[serde(default = "default_sms_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub sender: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StripeConfig {
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub success_url: String,
    #[serde(default)]
    pub cancel_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            service_key: String::new(),
            blog_bucket: default_blog_bucket(),
            tickets_bucket: default_tickets_bucket(),
        }
    }
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            base_url: default_sms_base_url(),
            username: String::new(),
            password: String::new(),
            sender: None,
        }
    }
}

fn default_json_limit() -> usize {
    10 * 1024 * 1024
}

fn default_blog_bucket() -> String {
    "blog-images".to_string()
}

fn default_tickets_bucket() -> String {
    "tickets".to_string()
}

fn default_sms_base_url() -> String {
    "https://api.bulksms.com".to_string()
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // A missing file means the environment carries everything
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => toml::from_str(&config_str)
                .map_err(|e| format!("Failed to parse config file {config_path}: {e}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and no config.toml was found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                        json_limit: get_env_parse("SERVER_JSON_LIMIT", default_json_limit()),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    session: SessionConfig {
                        jwt_secret: get_env("SESSION_JWT_SECRET").unwrap_or_default(),
                        admin_emails: get_env("ADMIN_EMAILS")
                            .map(|v| split_list(&v))
                            .unwrap_or_default(),
                    },
                    backend: BackendConfig {
                        url: get_env("BACKEND_URL").unwrap_or_default(),
                        service_key: get_env("BACKEND_SERVICE_KEY").unwrap_or_default(),
                        blog_bucket: get_env("BACKEND_BLOG_BUCKET")
                            .unwrap_or_else(default_blog_bucket),
                        tickets_bucket: get_env("BACKEND_TICKETS_BUCKET")
                            .unwrap_or_else(default_tickets_bucket),
                    },
                    sms: SmsConfig {
                        base_url: get_env("SMS_BASE_URL").unwrap_or_else(default_sms_base_url),
                        username: get_env("SMS_USERNAME").unwrap_or_default(),
                        password: get_env("SMS_PASSWORD").unwrap_or_default(),
                        sender: get_env("SMS_SENDER"),
                    },
                    stripe: StripeConfig {
                        secret_key: get_env("STRIPE_SECRET_KEY").unwrap_or_default(),
                        success_url: get_env("STRIPE_SUCCESS_URL").unwrap_or_default(),
                        cancel_url: get_env("STRIPE_CANCEL_URL").unwrap_or_default(),
                    },
                }
            }
            Err(e) => {
                return Err(format!("Unable to read config file {config_path}: {e}").into());
            }
        };

        // Environment always wins over the file
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("SERVER_JSON_LIMIT")
            && let Ok(n) = v.parse()
        {
            config.server.json_limit = n;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("SESSION_JWT_SECRET") {
            config.session.jwt_secret = v;
        }
        if let Ok(v) = env::var("ADMIN_EMAILS") {
            config.session.admin_emails = split_list(&v);
        }
        if let Ok(v) = env::var("BACKEND_URL") {
            config.backend.url = v;
        }
        if let Ok(v) = env::var("BACKEND_SERVICE_KEY") {
            config.backend.service_key = v;
        }
        if let Ok(v) = env::var("BACKEND_BLOG_BUCKET") {
            config.backend.blog_bucket = v;
        }
        if let Ok(v) = env::var("BACKEND_TICKETS_BUCKET") {
            config.backend.tickets_bucket = v;
        }
        if let Ok(v) = env::var("SMS_BASE_URL") {
            config.sms.base_url = v;
        }
        if let Ok(v) = env::var("SMS_USERNAME") {
            config.sms.username = v;
        }
        if let Ok(v) = env::var("SMS_PASSWORD") {
            config.sms.password = v;
        }
        if let Ok(v) = env::var("SMS_SENDER") {
            config.sms.sender = Some(v);
        }
        if let Ok(v) = env::var("STRIPE_SECRET_KEY") {
            config.stripe.secret_key = v;
        }
        if let Ok(v) = env::var("STRIPE_SUCCESS_URL") {
            config.stripe.success_url = v;
        }
        if let Ok(v) = env::var("STRIPE_CANCEL_URL") {
            config.stripe.cancel_url = v;
        }

        if config.session.jwt_secret.is_empty() {
            return Err("SESSION_JWT_SECRET must be configured".into());
        }

        Ok(config)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
