use crate::types::{AppError, Claims, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

/// Authentication service for session token management and password hashing.
///
/// Provides secure password hashing using Argon2id and signed session
/// tokens using HS256. Pure over its injected key and the clock: the same
/// service with the same secret can be constructed in tests with a
/// deterministic outcome.
pub struct AuthService {
    jwt_secret: String,
    token_expiry: i64,
}

impl AuthService {
    /// Creates a new AuthService with the given configuration.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for signing tokens
    /// * `token_expiry` - Session token validity in seconds
    pub fn new(jwt_secret: String, token_expiry: i64) -> Self {
        Self {
            jwt_secret,
            token_expiry,
        }
    }

    /// Hashes a password using Argon2id with a fresh random salt.
    ///
    /// Returns a PHC-formatted hash string. The plaintext is not retained.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
    }

    /// Verifies a password against an Argon2 hash.
    ///
    /// Uses the argon2 verifier rather than string comparison, so a mismatch
    /// costs the same as a match.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {e}")))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Mints a signed session token for a user.
    ///
    /// The token embeds `{sub, iat, exp}` and nothing else; it is stateless
    /// and cannot be revoked before `exp`.
    pub fn issue_token(&self, user_id: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::seconds(self.token_expiry)).timestamp() as usize,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to issue token: {e}")))
    }

    /// Verifies a session token and returns its claims.
    ///
    /// All-or-nothing: a malformed token, a bad signature, and an expired
    /// token are indistinguishable to the caller.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| AppError::Unauthenticated(format!("Invalid token: {e}")))
    }

    /// Session validity window in seconds; the cookie Max-Age mirrors this.
    pub fn token_expiry(&self) -> i64 {
        self.token_expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> AuthService {
        AuthService::new(
            "test-secret-key-that-is-at-least-32-chars".to_string(),
            604800, // 7 days
        )
    }

    #[test]
    fn test_password_hashing() {
        let service = create_test_service();
        let password = "test_password_123";

        let hash = service
            .hash_password(password)
            .expect("should hash password");

        // Hash should not equal the original password
        assert_ne!(hash, password);

        // Hash should be in PHC format (starts with $argon2)
        assert!(hash.starts_with("$argon2"), "hash should be in PHC format");
    }

    #[test]
    fn test_password_verification_success() {
        let service = create_test_service();
        let password = "secure_password_456";

        let hash = service
            .hash_password(password)
            .expect("should hash password");
        let is_valid = service
            .verify_password(password, &hash)
            .expect("should verify");

        assert!(is_valid, "correct password should verify successfully");
    }

    #[test]
    fn test_password_verification_failure() {
        let service = create_test_service();
        let password = "correct_password";
        let wrong_password = "wrong_password";

        let hash = service
            .hash_password(password)
            .expect("should hash password");
        let is_valid = service
            .verify_password(wrong_password, &hash)
            .expect("should verify");

        assert!(!is_valid, "wrong password should fail verification");
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let service = create_test_service();

        let hash1 = service.hash_password("hunter2hunter2").unwrap();
        let hash2 = service.hash_password("hunter2hunter2").unwrap();

        assert_ne!(hash1, hash2, "each hash should use a fresh salt");
    }

    #[test]
    fn test_token_verification_success() {
        let service = create_test_service();
        let user_id = "user-456";

        let token = service.issue_token(user_id).expect("should issue token");
        let claims = service.verify_token(&token).expect("should verify token");

        assert_eq!(claims.sub, user_id, "subject should match user_id");
    }

    #[test]
    fn test_token_verification_invalid_token() {
        let service = create_test_service();

        let result = service.verify_token("invalid.token.here");

        assert!(result.is_err(), "invalid token should fail verification");
    }

    #[test]
    fn test_token_verification_wrong_secret() {
        let service1 = AuthService::new("secret-one-that-is-32-chars-long".to_string(), 604800);
        let service2 = AuthService::new("secret-two-that-is-32-chars-long".to_string(), 604800);

        let token = service1.issue_token("user-789").expect("should issue");
        let result = service2.verify_token(&token);

        assert!(result.is_err(), "token from different secret should fail");
    }

    #[test]
    fn test_expired_token_fails() {
        // A service whose tokens are born expired.
        let service = AuthService::new("secret-one-that-is-32-chars-long".to_string(), -3600);

        let token = service.issue_token("user-1").expect("should issue");
        let result = service.verify_token(&token);

        assert!(
            result.is_err(),
            "token past its expiry should fail even with a valid signature"
        );
    }

    #[test]
    fn test_tampered_token_fails() {
        let service = create_test_service();
        let token = service.issue_token("user-1").expect("should issue");

        // Flip a character in the payload segment.
        let mut chars: Vec<char> = token.chars().collect();
        let mid = chars.len() / 2;
        chars[mid] = if chars[mid] == 'a' { 'b' } else { 'a' };
        let tampered: String = chars.into_iter().collect();

        assert!(service.verify_token(&tampered).is_err());
    }

    #[test]
    fn test_claims_expiration() {
        let service = create_test_service();
        let token = service.issue_token("user").expect("should issue");
        let claims = service.verify_token(&token).expect("should verify");

        let now = chrono::Utc::now().timestamp() as usize;

        // iat should be around now
        assert!(
            claims.iat <= now && claims.iat >= now - 5,
            "iat should be current timestamp"
        );

        // exp should be iat + token_expiry (7 days)
        let expected_exp = claims.iat + 604800;
        assert!(
            claims.exp >= expected_exp - 5 && claims.exp <= expected_exp + 5,
            "exp should be iat + 7 days"
        );
    }
}
