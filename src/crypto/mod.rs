//! Payload Envelope Encryption
//!
//! Task endpoints can carry their request and response bodies as an
//! encrypted envelope: `{"encrypted": true, "data": "<base64 ciphertext>"}`.
//! Activation is opt-in per message via the `encrypted` flag; unflagged
//! bodies pass through the pipeline byte-identical.
//!
//! # Module Structure
//!
//! - [`crypto::envelope`](crate::crypto::envelope) - AES-256-GCM cipher over a shared key
//! - [`crypto::middleware`](crate::crypto::middleware) - request/response pipeline stages
//!
//! Validation and business logic always operate on plaintext; only the wire
//! representation is opaque. A decryption failure answers 400 before any
//! handler runs.

/// AES-256-GCM envelope cipher.
pub mod envelope;
/// Axum pipeline stages for envelope decryption and encryption.
pub mod middleware;

pub use envelope::EnvelopeCipher;
pub use middleware::{decrypt_request, encrypt_response, EncryptedExchange, EnvelopeFlag};
