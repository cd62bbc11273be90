//! Environment configuration.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use catalog_observability::{LogFormat, UnknownLogFormat};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Used when `JWT_SECRET` is unset. Never deploy with it.
pub const DEV_JWT_SECRET: &str = "dev-secret";

pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("CATALOG_BIND_ADDR '{value}' is not a socket address")]
    BindAddr { value: String },

    #[error("CATALOG_LOG_FORMAT: {0}")]
    LogFormat(#[from] UnknownLogFormat),

    #[error("JWT_SECRET is set but empty")]
    EmptySecret,

    #[error("CATALOG_TOKEN_TTL_MINUTES '{value}' is not a positive number of minutes")]
    TokenTtl { value: String },

    #[error("CATALOG_ADMIN_EMAIL and CATALOG_ADMIN_PASSWORD must be set together")]
    AdminAccount,
}

/// Staff account created at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminAccount {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminAccount")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub log_format: LogFormat,
    /// Lifetime of tokens issued by `POST /users/token`.
    pub token_ttl: Duration,
    pub admin: Option<AdminAccount>,
}

impl ApiConfig {
    /// Read `CATALOG_BIND_ADDR`, `JWT_SECRET`, `CATALOG_LOG_FORMAT`,
    /// `CATALOG_TOKEN_TTL_MINUTES` and the `CATALOG_ADMIN_*` pair.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_addr = lookup("CATALOG_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse()
            .map_err(|_| ConfigError::BindAddr { value: raw_addr.clone() })?;

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if secret.is_empty() => return Err(ConfigError::EmptySecret),
            Some(secret) => secret,
            None => DEV_JWT_SECRET.to_string(),
        };

        let log_format = match lookup("CATALOG_LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        let token_ttl = match lookup("CATALOG_TOKEN_TTL_MINUTES") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(minutes) if minutes > 0 => Duration::minutes(minutes),
                _ => return Err(ConfigError::TokenTtl { value: raw }),
            },
            None => Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        };

        let admin = match (lookup("CATALOG_ADMIN_EMAIL"), lookup("CATALOG_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminAccount { email, password }),
            (None, None) => None,
            _ => return Err(ConfigError::AdminAccount),
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            log_format,
            token_ttl,
            admin,
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert!(cfg.uses_dev_secret());
        assert_eq!(cfg.token_ttl, Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES));
        assert_eq!(cfg.admin, None);
    }

    #[test]
    fn explicit_values_win() {
        let cfg = config(&[
            ("CATALOG_BIND_ADDR", "127.0.0.1:9000"),
            ("JWT_SECRET", "prod"),
            ("CATALOG_LOG_FORMAT", "pretty"),
            ("CATALOG_TOKEN_TTL_MINUTES", "15"),
            ("CATALOG_ADMIN_EMAIL", "root@example.com"),
            ("CATALOG_ADMIN_PASSWORD", "root_pass_1"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert!(!cfg.uses_dev_secret());
        assert_eq!(cfg.token_ttl, Duration::minutes(15));
        let admin = cfg.admin.unwrap();
        assert_eq!(admin.email, "root@example.com");
        assert!(!format!("{admin:?}").contains("root_pass_1"));
    }

    #[test]
    fn invalid_values_are_typed_errors() {
        assert!(matches!(config(&[("CATALOG_BIND_ADDR", "nowhere")]), Err(ConfigError::BindAddr { .. })));
        assert!(matches!(config(&[("CATALOG_LOG_FORMAT", "xml")]), Err(ConfigError::LogFormat(_))));
        assert_eq!(config(&[("JWT_SECRET", "")]), Err(ConfigError::EmptySecret));
        for ttl in ["0", "-5", "soon"] {
            assert!(matches!(config(&[("CATALOG_TOKEN_TTL_MINUTES", ttl)]), Err(ConfigError::TokenTtl { .. })));
        }
        assert_eq!(config(&[("CATALOG_ADMIN_EMAIL", "root@example.com")]), Err(ConfigError::AdminAccount));
        assert_eq!(config(&[("CATALOG_ADMIN_PASSWORD", "root_pass_1")]), Err(ConfigError::AdminAccount));
    }
}
