//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_DATABASE_URL, DEFAULT_PAGE_LIMIT,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, MAX_PAGE_LIMIT, MIN_JWT_SECRET_LENGTH,
};
use crate::domain::TransitionPolicy;
use crate::errors::{AppError, AppResult};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    identity_secret: String,
    pub server_host: String,
    pub server_port: u16,
    pub transition_policy: TransitionPolicy,
    pub default_page_limit: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("database_max_connections", &self.database_max_connections)
            .field("identity_secret", &"[REDACTED]")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("transition_policy", &self.transition_policy)
            .field("default_page_limit", &self.default_page_limit)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Fails when `IDENTITY_JWT_SECRET` is missing in a release build or is
    /// shorter than the minimum length.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let identity_secret = match env::var("IDENTITY_JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("IDENTITY_JWT_SECRET not set, using insecure default for development");
                "dev-identity-secret-minimum-32-chars!".to_string()
            }
            Err(_) => {
                return Err(AppError::internal(
                    "IDENTITY_JWT_SECRET environment variable must be set in production",
                ))
            }
        };

        let transition_policy = match env::var("POOL_TRANSITION_POLICY") {
            Ok(raw) => raw
                .parse::<TransitionPolicy>()
                .map_err(AppError::validation)?,
            Err(_) => TransitionPolicy::default(),
        };

        Self::builder(identity_secret)
            .database_url(
                env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            )
            .database_max_connections(
                env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
            )
            .server(
                env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                env::var("SERVER_PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_SERVER_PORT),
            )
            .transition_policy(transition_policy)
            .default_page_limit(
                env::var("DEFAULT_PAGE_LIMIT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_PAGE_LIMIT),
            )
            .build()
    }

    /// Start a configuration from defaults with the given identity secret.
    pub fn builder(identity_secret: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder {
            config: Config {
                database_url: DEFAULT_DATABASE_URL.to_string(),
                database_max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                identity_secret: identity_secret.into(),
                server_host: DEFAULT_SERVER_HOST.to_string(),
                server_port: DEFAULT_SERVER_PORT,
                transition_policy: TransitionPolicy::default(),
                default_page_limit: DEFAULT_PAGE_LIMIT,
            },
        }
    }

    /// Get identity secret bytes for token verification.
    pub fn identity_secret_bytes(&self) -> &[u8] {
        self.identity_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Incremental construction of [`Config`], validated on `build`.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = url.into();
        self
    }

    pub fn database_max_connections(mut self, max: u32) -> Self {
        self.config.database_max_connections = max;
        self
    }

    pub fn server(mut self, host: impl Into<String>, port: u16) -> Self {
        self.config.server_host = host.into();
        self.config.server_port = port;
        self
    }

    pub fn transition_policy(mut self, policy: TransitionPolicy) -> Self {
        self.config.transition_policy = policy;
        self
    }

    pub fn default_page_limit(mut self, limit: u64) -> Self {
        self.config.default_page_limit = limit.clamp(1, MAX_PAGE_LIMIT);
        self
    }

    pub fn build(self) -> AppResult<Config> {
        if self.config.identity_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::validation(format!(
                "IDENTITY_JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secret_is_rejected() {
        let result = Config::builder("too-short").build();
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = Config::builder("a-very-long-identity-secret-for-tests!!")
            .build()
            .unwrap();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("a-very-long-identity-secret"));
    }

    #[test]
    fn page_limit_is_clamped() {
        let config = Config::builder("a-very-long-identity-secret-for-tests!!")
            .default_page_limit(10_000)
            .build()
            .unwrap();
        assert_eq!(config.default_page_limit, MAX_PAGE_LIMIT);
        assert_eq!(config.transition_policy, TransitionPolicy::Permissive);
    }
}
