//! Observable client session state.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use tokio::sync::watch;
use tracing::debug;

use crate::auth::CallerIdentity;
use crate::jwt::unix_now;

/// Current identity of the client, or `None` when signed out.
///
/// Always holds a value: the initial one is supplied at construction, so a
/// read before any round trip sees "signed out" rather than blocking.
#[derive(Clone)]
pub struct SessionState {
    tx: Arc<watch::Sender<Option<CallerIdentity>>>,
}

/// Claims read from a stored token without verifying it.
#[derive(Deserialize)]
struct UnverifiedClaims {
    sub: String,
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    exp: Option<u64>,
}

impl SessionState {
    pub fn new(initial: Option<CallerIdentity>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn signed_out() -> Self {
        Self::new(None)
    }

    /// Seed the state from a token persisted by a previous run.
    ///
    /// The payload is only decoded, not verified: the server stays the
    /// authority and rejects the token on the first protected call if it is
    /// bad. Unreadable or expired tokens start signed out.
    pub fn from_stored_token(token: &str) -> Self {
        match unix_now() {
            Ok(now) => Self::from_stored_token_at(token, now),
            Err(_) => Self::signed_out(),
        }
    }

    pub fn from_stored_token_at(token: &str, now: u64) -> Self {
        let identity = decode_payload(token).and_then(|claims| {
            if claims.exp.is_some_and(|exp| now > exp) {
                debug!("Stored session token has expired");
                return None;
            }
            if claims.sub.is_empty() || claims.email.is_empty() {
                return None;
            }
            Some(CallerIdentity {
                subject_id: claims.sub,
                email: claims.email,
                name: claims.name,
            })
        });
        Self::new(identity)
    }

    /// Latest identity. Sees every write made before the call.
    pub fn current(&self) -> Option<CallerIdentity> {
        self.tx.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Receiver notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<Option<CallerIdentity>> {
        self.tx.subscribe()
    }

    pub fn sign_in(&self, identity: CallerIdentity) {
        self.tx.send_replace(Some(identity));
    }

    pub fn sign_out(&self) {
        self.tx.send_replace(None);
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::signed_out()
    }
}

fn decode_payload(token: &str) -> Option<UnverifiedClaims> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}
