//! # TaskVault
//!
//! A multi-user task-tracking API server. Clients register, authenticate,
//! and manage personal to-do items scoped strictly to their own account.
//!
//! ## Overview
//!
//! TaskVault can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `taskvault-server` binary
//! 2. **As a library** - Mount the router inside your own Rust service
//!
//! Three mechanisms make up the security core:
//!
//! - **Session authentication**: every protected request carries a signed,
//!   time-bounded HS256 token in an HTTP-only cookie. Sessions are
//!   stateless; logout clears the client cookie but a leaked token stays
//!   valid until its natural expiry.
//! - **Ownership enforcement**: every task query is constrained by
//!   `(task id, owner)` together, so another user's task is
//!   indistinguishable from a missing one.
//! - **Payload envelope encryption**: task endpoints accept and emit
//!   `{encrypted, data}` bodies sealed with AES-256-GCM under a shared key.
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use taskvault::{api::routes::create_router, db::Store, utils::config::Config, AppState};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let store = Store::new(&config.database.url, config.database.auth_token.as_deref()).await?;
//!     let app = create_router(AppState::new(config, store));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers, routes, and validation
//! - [`auth`] - Session tokens, password hashing, and the auth middleware
//! - [`crypto`] - Payload envelope cipher and its pipeline stages
//! - [`db`] - libsql-backed user and task store
//! - [`types`] - Common types and error handling
//! - [`utils`] - Configuration

/// HTTP API handlers and routes.
pub mod api;
/// Session authentication and middleware.
pub mod auth;
/// Payload envelope encryption.
pub mod crypto;
/// Database store.
pub mod db;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use api::routes::create_router;
pub use crypto::EnvelopeCipher;
pub use db::Store;
pub use types::{AppError, Result};
pub use utils::config::Config;

use crate::auth::jwt::AuthService;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Immutable configuration loaded at process start
    pub config: Arc<Config>,
    /// User and task store
    pub store: Arc<Store>,
    /// Session token and password hashing service
    pub auth_service: Arc<AuthService>,
    /// Payload envelope cipher
    pub cipher: Arc<EnvelopeCipher>,
}

impl AppState {
    /// Wires the services from configuration. Keys are read once here and
    /// injected; nothing reads the environment after startup.
    pub fn new(config: Config, store: Store) -> Self {
        let auth_service = AuthService::new(
            config.auth.jwt_secret.clone(),
            config.auth.token_expiry,
        );
        let cipher = EnvelopeCipher::new(&config.crypto.encryption_key);

        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            auth_service: Arc::new(auth_service),
            cipher: Arc::new(cipher),
        }
    }
}
