//! Startup configuration checks
//!
//! `Config::from_env` already rejects invalid values; this adds the checks that
//! only matter for a running server.

use anyhow::Result;
use artfolio_core::Config;

pub fn validate_config(config: &Config) -> Result<()> {
    if config.db_max_connections == 0 {
        return Err(anyhow::anyhow!("Database max connections cannot be 0"));
    }

    if config.db_timeout_seconds == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }

    if config.fetch.allow_private_urls {
        if config.is_production() {
            return Err(anyhow::anyhow!(
                "ALLOW_PRIVATE_URLS must not be enabled in production"
            ));
        }
        tracing::warn!("ALLOW_PRIVATE_URLS is enabled - image URLs may target internal hosts");
    }

    if !config.amqp.use_tls {
        tracing::warn!(
            host = %config.amqp.host,
            "RABBITMQ_USE_TLS is disabled - broker credentials are sent in clear text"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(extra: &[(&str, &str)]) -> Config {
        let mut vars: HashMap<String, String> = [
            ("DATABASE_URL", "postgresql://localhost/artfolio"),
            ("S3_BUCKET", "art-bucket"),
            ("RABBITMQ_HOST", "rabbit.example.com"),
            ("RABBITMQ_USERNAME", "artfolio"),
            ("RABBITMQ_PASSWORD", "secret"),
            ("RABBITMQ_QUEUE", "submissions"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in extra {
            vars.insert(k.to_string(), v.to_string());
        }
        Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    #[test]
    fn test_defaults_pass() {
        assert!(validate_config(&config(&[])).is_ok());
    }

    #[test]
    fn test_private_urls_forbidden_in_production() {
        let cfg = config(&[
            ("ALLOW_PRIVATE_URLS", "true"),
            ("ENVIRONMENT", "production"),
            ("CORS_ORIGINS", "https://school.example.com"),
        ]);
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn test_zero_pool_size_rejected() {
        assert!(validate_config(&config(&[("DB_MAX_CONNECTIONS", "0")])).is_err());
    }
}
