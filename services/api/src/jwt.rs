//! JWT service for token generation and validation
//!
//! This module provides functionality for creating and validating JWT tokens
//! using the HS256 algorithm with a shared secret. Validation is total:
//! every malformed, tampered, or expired token maps to `None` rather than an
//! error, since callers only branch on presence.

use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::login::Authenticator;
use crate::password;

/// Issuer claim embedded in every token minted by this service
pub const TOKEN_ISSUER: &str = "gestor-fincas-api";

/// Fallback signing secret, kept for parity with existing deployments.
/// Override with `JWT_SECRET` in any real environment.
const DEFAULT_SECRET: &str = "your-super-secret-jwt-key";

/// Default token lifetime: 24 hours
const DEFAULT_TOKEN_EXPIRY: u64 = 86_400;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret for signing and verifying tokens
    pub secret: String,
    /// Token expiration time in seconds
    pub token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: Shared signing secret (default: built-in constant)
    /// - `JWT_TOKEN_EXPIRY`: Token expiry in seconds (default: 86400)
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_SECRET.to_string());

        let token_expiry = std::env::var("JWT_TOKEN_EXPIRY")
            .unwrap_or_else(|_| DEFAULT_TOKEN_EXPIRY.to_string())
            .parse()
            .unwrap_or(DEFAULT_TOKEN_EXPIRY);

        JwtConfig {
            secret,
            token_expiry,
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            token_expiry: DEFAULT_TOKEN_EXPIRY,
        }
    }
}

/// JWT claims structure
///
/// `exp` and `iss` are mandatory: a token missing either fails
/// deserialization and therefore fails validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    #[serde(rename = "userId")]
    pub user_id: i64,
    /// Username
    pub username: String,
    /// Issued at time (seconds since epoch)
    pub iat: u64,
    /// Expiration time (seconds since epoch)
    pub exp: u64,
    /// Issuer
    pub iss: String,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_expiry: u64,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: &JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        // No clock leeway: a token is invalid the second its expiry passes
        validation.leeway = 0;

        JwtService {
            encoding_key,
            decoding_key,
            validation,
            token_expiry: config.token_expiry,
        }
    }

    /// Generate a signed token for a user
    ///
    /// Claims carry the user identity plus `iat`, `exp` (issue time +
    /// configured lifetime), and the service issuer constant.
    pub fn generate_token(&self, user_id: i64, username: &str) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs();

        let claims = Claims {
            user_id,
            username: username.to_string(),
            iat: now,
            exp: now + self.token_expiry,
            iss: TOKEN_ISSUER.to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a token and return its claims
    ///
    /// Returns `None` for any invalid input: wrong segment count, bad
    /// signature, tampered payload, missing required claims, or an elapsed
    /// expiry. Never panics or propagates an error.
    pub fn validate_token(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .ok()
            .map(|data| data.claims)
    }
}

impl Authenticator for JwtService {
    fn verify_password(&self, candidate: &str, stored: &str) -> bool {
        password::verify_password(candidate, stored)
    }

    fn hash_password(&self, plain: &str) -> String {
        password::hash_password(plain)
    }

    fn issue_token(&self, user_id: i64, username: &str) -> Result<String> {
        self.generate_token(user_id, username)
    }

    fn verify_token(&self, token: &str) -> Option<Claims> {
        self.validate_token(token)
    }
}
