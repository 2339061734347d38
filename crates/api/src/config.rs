//! Environment-driven process configuration.

use chrono::Duration;
use thiserror::Error;
use tracing::warn;

use stockroom_auth::DEFAULT_BCRYPT_COST;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEV_JWT_SECRET: &str = "development_secret";
pub const DEFAULT_TOKEN_TTL: &str = "1d";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a port number, got {0:?}")]
    InvalidPort(String),

    #[error("JWT_SECRET must not be empty")]
    EmptySecret,

    #[error("JWT_EXPIRES_IN must look like 90, 30s, 15m, 12h or 1d, got {0:?}")]
    InvalidTokenTtl(String),

    #[error("BCRYPT_COST must be an integer between 4 and 31, got {0:?}")]
    InvalidBcryptCost(String),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
    /// Postgres connection string; the in-memory store is used when unset.
    pub database_url: Option<String>,
}

impl ApiConfig {
    /// Read `HOST`, `PORT`, `JWT_SECRET`, `JWT_EXPIRES_IN`, `BCRYPT_COST` and
    /// `DATABASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ApiConfig::from_env`] over an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            None => DEFAULT_PORT,
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
        };

        let jwt_secret = match lookup("JWT_SECRET") {
            None => {
                warn!("JWT_SECRET not set; using insecure development default");
                DEV_JWT_SECRET.to_string()
            }
            Some(secret) if secret.is_empty() => return Err(ConfigError::EmptySecret),
            Some(secret) => secret,
        };

        let raw_ttl = lookup("JWT_EXPIRES_IN").unwrap_or_else(|| DEFAULT_TOKEN_TTL.to_string());
        let token_ttl =
            parse_ttl(&raw_ttl).ok_or_else(|| ConfigError::InvalidTokenTtl(raw_ttl.clone()))?;

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            None => DEFAULT_BCRYPT_COST,
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|cost| (4..=31).contains(cost))
                .ok_or_else(|| ConfigError::InvalidBcryptCost(raw.clone()))?,
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        Ok(Self {
            host,
            port,
            jwt_secret,
            token_ttl,
            bcrypt_cost,
            database_url,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `<n>` (seconds) or `<n>s|m|h|d`; must be positive.
pub fn parse_ttl(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last()? {
        (i, c) if c.is_ascii_alphabetic() => (&raw[..i], c.to_ascii_lowercase()),
        _ => (raw, 's'),
    };
    let n: i64 = digits.trim().parse().ok().filter(|n| *n > 0)?;
    match unit {
        's' => Duration::try_seconds(n),
        'm' => Duration::try_minutes(n),
        'h' => Duration::try_hours(n),
        'd' => Duration::try_days(n),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr(), "0.0.0.0:5000");
        assert_eq!(cfg.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(cfg.token_ttl, Duration::days(1));
        assert_eq!(cfg.bcrypt_cost, 10);
        assert_eq!(cfg.database_url, None);
    }

    #[test]
    fn overrides() {
        let cfg = config(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_EXPIRES_IN", "12h"),
            ("BCRYPT_COST", "4"),
            ("DATABASE_URL", "postgres://stockroom@localhost/stockroom"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr(), "127.0.0.1:8080");
        assert_eq!(cfg.jwt_secret, "s3cret");
        assert_eq!(cfg.token_ttl, Duration::hours(12));
        assert_eq!(cfg.bcrypt_cost, 4);
        assert_eq!(
            cfg.database_url.as_deref(),
            Some("postgres://stockroom@localhost/stockroom")
        );
        assert_eq!(config(&[("DATABASE_URL", " ")]).unwrap().database_url, None);
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            config(&[("PORT", "http")]).unwrap_err(),
            ConfigError::InvalidPort("http".into())
        );
        assert_eq!(config(&[("JWT_SECRET", "")]).unwrap_err(), ConfigError::EmptySecret);
        assert!(matches!(
            config(&[("JWT_EXPIRES_IN", "1w")]),
            Err(ConfigError::InvalidTokenTtl(_))
        ));
        assert!(matches!(
            config(&[("BCRYPT_COST", "3")]),
            Err(ConfigError::InvalidBcryptCost(_))
        ));
    }

    #[test]
    fn ttl_units() {
        assert_eq!(parse_ttl("90"), Some(Duration::seconds(90)));
        assert_eq!(parse_ttl("30s"), Some(Duration::seconds(30)));
        assert_eq!(parse_ttl("15m"), Some(Duration::minutes(15)));
        assert_eq!(parse_ttl(" 2D "), Some(Duration::days(2)));
        assert_eq!(parse_ttl("0"), None);
        assert_eq!(parse_ttl("-5m"), None);
        assert_eq!(parse_ttl("d"), None);
        assert_eq!(parse_ttl(""), None);
    }
}
