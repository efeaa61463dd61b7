//! Password hashing with bcrypt.

use std::sync::{Arc, OnceLock};

/// Default bcrypt cost factor.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Secret behind the stand-in digest used when an account has none.
const DUMMY_SECRET: &str = "strength-tracker-unknown-account";

/// Hashes and verifies password digests.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    /// Digest at `cost`, computed on first use.
    dummy: Arc<OnceLock<String>>,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            dummy: Arc::new(OnceLock::new()),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a secret into a salted digest.
    pub fn hash(&self, secret: &str) -> Result<String, PasswordError> {
        bcrypt::hash(secret, self.cost).map_err(PasswordError::Hash)
    }

    /// Check a secret against a stored digest.
    ///
    /// An empty or malformed digest never matches.
    pub fn verify(&self, secret: &str, digest: &str) -> bool {
        if digest.is_empty() {
            return false;
        }
        bcrypt::verify(secret, digest).unwrap_or(false)
    }

    /// Check a secret against an account's digest, if it has one.
    ///
    /// Without a digest the secret is still run through bcrypt against a
    /// stand-in digest of the same cost, and the result is always `false`.
    /// Unknown accounts then take as long to reject as wrong passwords.
    pub fn verify_account(
        &self,
        secret: &str,
        digest: Option<&str>,
    ) -> Result<bool, PasswordError> {
        match digest {
            Some(digest) if !digest.is_empty() => Ok(self.verify(secret, digest)),
            _ => {
                let dummy = self.dummy_digest()?;
                let _ = bcrypt::verify(secret, dummy);
                Ok(false)
            }
        }
    }

    fn dummy_digest(&self) -> Result<&str, PasswordError> {
        if let Some(digest) = self.dummy.get() {
            return Ok(digest);
        }
        let digest = self.hash(DUMMY_SECRET)?;
        Ok(self.dummy.get_or_init(|| digest))
    }

    /// Hash on the blocking thread pool.
    pub async fn hash_blocking(&self, secret: String) -> Result<String, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&secret)).await?
    }

    /// [`verify_account`](Self::verify_account) on the blocking thread pool.
    pub async fn verify_account_blocking(
        &self,
        secret: String,
        digest: Option<String>,
    ) -> Result<bool, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify_account(&secret, digest.as_deref()))
            .await?
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(#[source] bcrypt::BcryptError),
    #[error("password task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
