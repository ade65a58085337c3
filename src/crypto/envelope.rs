use crate::types::{AppError, Result};
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64ct::{Base64, Encoding};
use sha2::{Digest, Sha256};

/// AES-256-GCM nonce length in bytes.
const NONCE_LEN: usize = 12;

/// Symmetric cipher for the request/response payload envelope.
///
/// The 256-bit key is derived as SHA-256 of the configured key string, so a
/// passphrase of any length yields a fixed-length key. Ciphertexts are
/// self-contained: `base64(nonce || ciphertext-with-tag)` with a fresh
/// random nonce per call.
pub struct EnvelopeCipher {
    key: [u8; 32],
}

impl EnvelopeCipher {
    pub fn new(key: &str) -> Self {
        Self {
            key: Sha256::digest(key.as_bytes()).into(),
        }
    }

    /// Encrypts a plaintext string into its opaque wire form.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let cipher = Aes256Gcm::new((&self.key).into());
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| AppError::Internal("Envelope encryption failed".to_string()))?;

        let mut wire = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        wire.extend_from_slice(&nonce);
        wire.extend_from_slice(&ciphertext);

        Ok(Base64::encode_string(&wire))
    }

    /// Decrypts a wire-form ciphertext back into its plaintext string.
    ///
    /// Every failure mode (bad base64, truncated input, authentication
    /// failure, non-UTF-8 plaintext) is a client error, never a server
    /// fault.
    pub fn decrypt(&self, wire: &str) -> Result<String> {
        let bytes = Base64::decode_vec(wire)
            .map_err(|_| AppError::InvalidPayload("Invalid encrypted payload".to_string()))?;

        if bytes.len() <= NONCE_LEN {
            return Err(AppError::InvalidPayload(
                "Invalid encrypted payload".to_string(),
            ));
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let cipher = Aes256Gcm::new((&self.key).into());

        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| AppError::InvalidPayload("Invalid encrypted payload".to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|_| AppError::InvalidPayload("Invalid encrypted payload".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cipher() -> EnvelopeCipher {
        EnvelopeCipher::new("f3a1c9e7d5b24f80a6c4e2d0b8a69784")
    }

    #[test]
    fn round_trip() {
        let cipher = test_cipher();
        let plaintext = r#"{"title":"Buy milk","status":"todo"}"#;

        let wire = cipher.encrypt(plaintext).expect("should encrypt");
        assert_ne!(wire, plaintext);

        let decrypted = cipher.decrypt(&wire).expect("should decrypt");
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn fresh_nonce_per_encryption() {
        let cipher = test_cipher();

        let a = cipher.encrypt("same payload").unwrap();
        let b = cipher.encrypt("same payload").unwrap();

        assert_ne!(a, b, "identical plaintexts must not share ciphertext");
    }

    #[test]
    fn garbage_fails_cleanly() {
        let cipher = test_cipher();

        assert!(matches!(
            cipher.decrypt("not base64 at all!!"),
            Err(AppError::InvalidPayload(_))
        ));
        assert!(matches!(
            cipher.decrypt("aGVsbG8="),
            Err(AppError::InvalidPayload(_))
        ));
        assert!(matches!(
            cipher.decrypt(""),
            Err(AppError::InvalidPayload(_))
        ));
    }

    #[test]
    fn wrong_key_fails() {
        let wire = test_cipher().encrypt("secret contents").unwrap();
        let other = EnvelopeCipher::new("a-completely-different-key");

        assert!(matches!(
            other.decrypt(&wire),
            Err(AppError::InvalidPayload(_))
        ));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let cipher = test_cipher();
        let wire = cipher.encrypt("secret contents").unwrap();

        let mut bytes = Base64::decode_vec(&wire).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = Base64::encode_string(&bytes);

        assert!(matches!(
            cipher.decrypt(&tampered),
            Err(AppError::InvalidPayload(_))
        ));
    }
}
