use crate::types::{AppError, Result};
use serde::Deserialize;
use std::env;

/// Known placeholder signing secrets shipped in example configuration.
/// Seeing one of these in production means the operator forgot to rotate.
const WEAK_JWT_SECRETS: [&str; 2] = [
    "your_super_secret_jwt_key_here",
    "changeme_supersecret",
];

const WEAK_ENCRYPTION_KEYS: [&str; 3] = [
    "your_32_character_encryption_key_",
    "changethis32charkey1234567890123",
    "default_32_char_key_replace_this!",
];

/// Default session validity: 7 days.
const DEFAULT_TOKEN_EXPIRY_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub crypto: CryptoConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// "development" or "production"; controls cookie hardening.
    pub environment: String,
    /// Extra CORS origin for a deployed frontend.
    pub client_url: Option<String>,
}

impl ServerConfig {
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `libsql://` remote URL or a local file path / `:memory:`.
    pub url: String,
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Session token validity window in seconds.
    pub token_expiry: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CryptoConfig {
    /// Shared secret for the payload envelope cipher.
    pub encryption_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()
                    .map_err(|e| AppError::Internal(format!("Invalid PORT: {e}")))?,
                environment: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                client_url: env::var("CLIENT_URL").ok(),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "taskvault.db".to_string()),
                auth_token: env::var("DATABASE_AUTH_TOKEN").ok(),
            },
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET").unwrap_or_default(),
                token_expiry: env::var("JWT_EXPIRY")
                    .unwrap_or_else(|_| DEFAULT_TOKEN_EXPIRY_SECS.to_string())
                    .parse()
                    .map_err(|e| AppError::Internal(format!("Invalid JWT_EXPIRY: {e}")))?,
            },
            crypto: CryptoConfig {
                encryption_key: env::var("ENCRYPTION_KEY").unwrap_or_default(),
            },
        })
    }

    /// Logs a warning for every missing or placeholder secret. The server
    /// stays up: availability wins over forced rotation, but operators must
    /// be able to see the problem in the startup log.
    pub fn warn_on_weak_secrets(&self) {
        let jwt = self.auth.jwt_secret.as_str();
        if jwt.is_empty() || WEAK_JWT_SECRETS.contains(&jwt) {
            tracing::warn!("JWT_SECRET is missing or using a default/weak value");
        }

        let key = self.crypto.encryption_key.as_str();
        if key.is_empty() || WEAK_ENCRYPTION_KEYS.contains(&key) {
            tracing::warn!("ENCRYPTION_KEY is missing or using a default/weak value");
        }
    }

    /// Returns true when either secret would trigger a startup warning.
    pub fn has_weak_secrets(&self) -> bool {
        let jwt = self.auth.jwt_secret.as_str();
        let key = self.crypto.encryption_key.as_str();

        jwt.is_empty()
            || WEAK_JWT_SECRETS.contains(&jwt)
            || key.is_empty()
            || WEAK_ENCRYPTION_KEYS.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(jwt: &str, key: &str) -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 5000,
                environment: "development".into(),
                client_url: None,
            },
            database: DatabaseConfig {
                url: ":memory:".into(),
                auth_token: None,
            },
            auth: AuthConfig {
                jwt_secret: jwt.into(),
                token_expiry: DEFAULT_TOKEN_EXPIRY_SECS,
            },
            crypto: CryptoConfig {
                encryption_key: key.into(),
            },
        }
    }

    #[test]
    fn placeholder_secrets_are_flagged() {
        assert!(test_config("", "some-strong-key-0123456789abcdef").has_weak_secrets());
        assert!(
            test_config("your_super_secret_jwt_key_here", "some-strong-key").has_weak_secrets()
        );
        assert!(
            test_config("strong-secret", "default_32_char_key_replace_this!").has_weak_secrets()
        );
    }

    #[test]
    fn strong_secrets_pass() {
        let config = test_config(
            "db0b2c2de4bc4e0ba1d4d2a0b6e9c8f1",
            "f3a1c9e7d5b24f80a6c4e2d0b8a69784",
        );
        assert!(!config.has_weak_secrets());
    }

    #[test]
    fn production_flag() {
        let mut config = test_config("a", "b");
        assert!(!config.server.is_production());
        config.server.environment = "production".into();
        assert!(config.server.is_production());
    }
}
