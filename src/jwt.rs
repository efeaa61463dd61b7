//! Session token minting and verification.
//!
//! Tokens are compact HS256 JWTs carrying the identity claim set. The header
//! `kid` names the secret version so a rotated secret never accepts tokens
//! minted under a previous one.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default session lifetime: 7 days.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Identity claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user resource id)
    pub sub: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// A freshly minted token together with the claims it encodes.
#[derive(Debug, Clone)]
pub struct MintedToken {
    pub token: String,
    pub claims: SessionClaims,
    /// Token lifetime in seconds
    pub ttl: u64,
}

/// Signing configuration. Built once at startup and shared read-only.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    key_id: String,
    ttl: Duration,
}

impl JwtConfig {
    /// Create a configuration for the given secret and session lifetime.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            key_id: key_id(1),
            ttl,
        }
    }

    /// Tag minted tokens with a secret version. Tokens carrying any other
    /// version are rejected.
    pub fn with_key_version(mut self, version: u32) -> Self {
        self.key_id = key_id(version);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token for a user, issued now.
    pub fn mint(
        &self,
        subject: &str,
        email: &str,
        name: Option<&str>,
    ) -> Result<MintedToken, JwtError> {
        self.mint_at(subject, email, name, unix_now()?)
    }

    /// Mint a token as if issued at `now` (Unix seconds).
    pub fn mint_at(
        &self,
        subject: &str,
        email: &str,
        name: Option<&str>,
        now: u64,
    ) -> Result<MintedToken, JwtError> {
        let ttl = self.ttl.as_secs();
        let exp = now.checked_add(ttl).ok_or(JwtError::ExpiryOverflow)?;
        let claims = SessionClaims {
            sub: subject.to_string(),
            email: email.to_string(),
            name: name.map(str::to_string),
            iat: now,
            exp,
        };

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(self.key_id.clone());

        let token = jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)?;

        Ok(MintedToken { token, claims, ttl })
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, JwtError> {
        self.verify_at(token, unix_now()?)
    }

    /// Verify a token as of `now` (Unix seconds).
    ///
    /// Expiry is inclusive: a token is still accepted at exactly `exp` and
    /// rejected from `exp + 1` on.
    pub fn verify_at(&self, token: &str, now: u64) -> Result<SessionClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // Expiry is checked below against the caller's clock.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(JwtError::Decoding)?;

        if data.header.kid.as_deref() != Some(self.key_id.as_str()) {
            return Err(JwtError::WrongKeyVersion);
        }

        if now > data.claims.exp {
            return Err(JwtError::Expired);
        }

        Ok(data.claims)
    }
}

fn key_id(version: u32) -> String {
    format!("v{}", version)
}

/// Current Unix time in seconds.
pub fn unix_now() -> Result<u64, JwtError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| JwtError::TimeError)
}

/// Errors that can occur during token operations.
///
/// Verification failures are only distinguished here for logging; the HTTP
/// layer reports all of them the same way.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("failed to encode token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
    #[error("failed to decode token: {0}")]
    Decoding(#[source] jsonwebtoken::errors::Error),
    #[error("token expired")]
    Expired,
    #[error("token signed with a different key version")]
    WrongKeyVersion,
    #[error("system time error")]
    TimeError,
    #[error("session lifetime too large")]
    ExpiryOverflow,
}
