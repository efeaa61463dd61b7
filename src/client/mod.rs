//! Client side of the session: observable state, navigation guards and an
//! HTTP client that keeps both in step with the server.

mod api;
mod guards;
mod session;

pub use api::{ApiClient, ClientError, RegisterRequest};
pub use guards::{HOME_PATH, LOGIN_PATH, Navigation, auth_guard, public_guard};
pub use session::SessionState;
