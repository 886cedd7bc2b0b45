//! Configuration module
//!
//! All settings are read once at startup from the process environment (after
//! loading `.env` if present) and are immutable afterwards.

use std::env;
use std::time::Duration;

use crate::storage_types::StorageBackend;
use crate::validation::is_sql_identifier;

// Common constants
const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const SUBMISSIONS_TABLE: &str = "submissions";
const DEFAULT_S3_REGION: &str = "us-east-1";
const RABBITMQ_TLS_PORT: u16 = 5671;
const RABBITMQ_TIMEOUT_SECS: u64 = 10;
const FETCH_TIMEOUT_SECS: u64 = 30;
const MAX_IMAGE_SIZE_MB: usize = 10;

/// Object store settings
#[derive(Clone, Debug)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: String,
    /// Custom endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, etc.)
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
}

/// Queue connection settings
#[derive(Clone)]
pub struct AmqpSettings {
    pub host: String,
    pub port: u16,
    pub virtual_host: String,
    pub username: String,
    pub password: String,
    pub queue: String,
    pub use_tls: bool,
    pub timeout: Duration,
}

// Keep the password out of logs
impl std::fmt::Debug for AmqpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmqpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("virtual_host", &self.virtual_host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("queue", &self.queue)
            .field("use_tls", &self.use_tls)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Remote image fetch settings
#[derive(Clone, Debug)]
pub struct FetchSettings {
    pub timeout: Duration,
    pub max_image_size_bytes: usize,
    /// If set, only these hosts (and their subdomains) may be fetched from
    pub url_allowlist: Option<Vec<String>>,
    pub allow_private_urls: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(FETCH_TIMEOUT_SECS),
            max_image_size_bytes: MAX_IMAGE_SIZE_MB * 1024 * 1024,
            url_allowlist: None,
            allow_private_urls: false,
        }
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub submissions_table: String,
    pub storage: StorageSettings,
    pub amqp: AmqpSettings,
    pub fetch: FetchSettings,
    /// Delete the stored artifact when the record cannot be persisted
    pub cleanup_orphaned_artifacts: bool,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("{} must be set", key))
        };

        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let backend = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>()?,
            None => StorageBackend::S3,
        };

        let storage = StorageSettings {
            backend,
            s3_bucket: lookup("S3_BUCKET"),
            s3_region: lookup("S3_REGION")
                .or_else(|| lookup("AWS_REGION"))
                .unwrap_or_else(|| DEFAULT_S3_REGION.to_string()),
            s3_endpoint: lookup("S3_ENDPOINT"),
            local_storage_path: lookup("LOCAL_STORAGE_PATH"),
            local_storage_base_url: lookup("LOCAL_STORAGE_BASE_URL"),
        };

        let amqp = AmqpSettings {
            host: required("RABBITMQ_HOST")?,
            port: parse_or("RABBITMQ_PORT", lookup("RABBITMQ_PORT"), RABBITMQ_TLS_PORT)?,
            virtual_host: lookup("RABBITMQ_VIRTUAL_HOST").unwrap_or_else(|| "/".to_string()),
            username: required("RABBITMQ_USERNAME")?,
            password: required("RABBITMQ_PASSWORD")?,
            queue: required("RABBITMQ_QUEUE")?,
            use_tls: parse_bool(lookup("RABBITMQ_USE_TLS"), true),
            timeout: Duration::from_secs(parse_or(
                "RABBITMQ_TIMEOUT_SECONDS",
                lookup("RABBITMQ_TIMEOUT_SECONDS"),
                RABBITMQ_TIMEOUT_SECS,
            )?),
        };

        let max_image_size_mb: usize =
            parse_or("MAX_IMAGE_SIZE_MB", lookup("MAX_IMAGE_SIZE_MB"), MAX_IMAGE_SIZE_MB)?;
        let max_image_size_bytes = max_image_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("MAX_IMAGE_SIZE_MB is too large"))?;

        let url_allowlist = lookup("URL_UPLOAD_ALLOWLIST").and_then(|s| {
            let hosts: Vec<String> = s
                .split(',')
                .map(|h| h.trim().to_lowercase())
                .filter(|h| !h.is_empty())
                .collect();
            if hosts.is_empty() {
                None
            } else {
                Some(hosts)
            }
        });

        let fetch = FetchSettings {
            timeout: Duration::from_secs(parse_or(
                "FETCH_TIMEOUT_SECONDS",
                lookup("FETCH_TIMEOUT_SECONDS"),
                FETCH_TIMEOUT_SECS,
            )?),
            max_image_size_bytes,
            url_allowlist,
            allow_private_urls: parse_bool(lookup("ALLOW_PRIVATE_URLS"), false),
        };

        let config = Config {
            server_port: parse_or("PORT", lookup("PORT"), SERVER_PORT)?,
            environment,
            cors_origins,
            database_url: required("DATABASE_URL")?,
            db_max_connections: parse_or(
                "DB_MAX_CONNECTIONS",
                lookup("DB_MAX_CONNECTIONS"),
                MAX_CONNECTIONS,
            )?,
            db_timeout_seconds: parse_or(
                "DB_TIMEOUT_SECONDS",
                lookup("DB_TIMEOUT_SECONDS"),
                CONNECTION_TIMEOUT_SECS,
            )?,
            submissions_table: lookup("SUBMISSIONS_TABLE")
                .unwrap_or_else(|| SUBMISSIONS_TABLE.to_string()),
            storage,
            amqp,
            fetch,
            cleanup_orphaned_artifacts: parse_bool(lookup("CLEANUP_ORPHANED_ARTIFACTS"), true),
            log_format: lookup("LOG_FORMAT").unwrap_or_else(|| "text".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if !is_sql_identifier(&self.submissions_table) {
            return Err(anyhow::anyhow!(
                "SUBMISSIONS_TABLE must be a plain SQL identifier, got '{}'",
                self.submissions_table
            ));
        }

        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none()
                    || self.storage.local_storage_base_url.is_none()
                {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        if self.fetch.max_image_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_IMAGE_SIZE_MB cannot be 0"));
        }

        if self.fetch.timeout.is_zero() || self.amqp.timeout.is_zero() {
            return Err(anyhow::anyhow!("Timeouts cannot be 0"));
        }

        Ok(())
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &str,
    value: Option<String>,
    default: T,
) -> Result<T, anyhow::Error> {
    match value {
        Some(v) => v
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number", key)),
        None => Ok(default),
    }
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    value
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
