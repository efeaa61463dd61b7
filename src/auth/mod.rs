//! Session authentication.
//!
//! Stateless signed session tokens carried in an HttpOnly cookie, with an
//! `Authorization: Bearer` fallback. Routes are classified public or
//! protected when registered; protected routes never run their handler
//! without a verified identity.

mod cookie;
mod errors;
mod identity;
mod middleware;
mod policy;
pub mod transport;

pub use cookie::{CookieSettings, SESSION_COOKIE_NAME, get_cookie};
pub use errors::{AuthError, AuthErrorKind};
pub use identity::{Caller, CallerIdentity, MaybeCaller};
pub use middleware::{GuardedRouter, RouteAccess, enforce_access};
pub use policy::{Access, AccessDecision, SessionGuard};
