//! Navigation guards for client-side routes.

use url::form_urlencoded;

use super::session::SessionState;

/// Where unauthenticated users are sent.
pub const LOGIN_PATH: &str = "/login";
/// Where signed-in users land when opening a public-only page.
pub const HOME_PATH: &str = "/workouts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    Redirect {
        to: &'static str,
        /// Page to return to after logging in.
        return_url: Option<String>,
    },
}

impl Navigation {
    /// Full redirect target including the query string, if any.
    pub fn target(&self) -> Option<String> {
        match self {
            Navigation::Allow => None,
            Navigation::Redirect {
                to,
                return_url: None,
            } => Some(to.to_string()),
            Navigation::Redirect {
                to,
                return_url: Some(url),
            } => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("returnUrl", url)
                    .finish();
                Some(format!("{}?{}", to, query))
            }
        }
    }
}

/// Guard for pages that need a signed-in user.
pub fn auth_guard(session: &SessionState, url: &str) -> Navigation {
    if session.is_logged_in() {
        return Navigation::Allow;
    }
    Navigation::Redirect {
        to: LOGIN_PATH,
        return_url: Some(url.to_string()),
    }
}

/// Guard for login and registration pages.
pub fn public_guard(session: &SessionState) -> Navigation {
    if session.is_logged_in() {
        return Navigation::Redirect {
            to: HOME_PATH,
            return_url: None,
        };
    }
    Navigation::Allow
}
