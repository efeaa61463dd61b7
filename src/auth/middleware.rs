//! Access enforcement middleware and the routing table that applies it.

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use tracing::error;

use super::policy::{Access, AccessDecision, SessionGuard};

/// Middleware state: the guard plus the classification of one route.
#[derive(Clone)]
pub struct RouteAccess {
    guard: SessionGuard,
    access: Access,
}

impl RouteAccess {
    pub fn new(guard: SessionGuard, access: Access) -> Self {
        Self { guard, access }
    }
}

/// Judge the request before it reaches the handler. On success the caller
/// identity is inserted into the request extensions.
pub async fn enforce_access(
    State(route): State<RouteAccess>,
    mut request: Request,
    next: Next,
) -> Response {
    let decision = match route.guard.evaluate(route.access, request.headers()) {
        Ok(decision) => decision,
        Err(e) => {
            error!(error = %e, "Failed to evaluate session");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match decision {
        AccessDecision::Allowed(Some(identity)) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        AccessDecision::Allowed(None) => next.run(request).await,
        AccessDecision::Rejected(e) => e.into_response(),
    }
}

/// Router whose routes are classified when they are registered.
///
/// `route` registers a protected route; `public` opts a route out.
pub struct GuardedRouter<S = ()> {
    router: Router<S>,
    guard: SessionGuard,
}

impl<S> GuardedRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(guard: SessionGuard) -> Self {
        Self {
            router: Router::new(),
            guard,
        }
    }

    /// Register a protected route.
    pub fn route(self, path: &str, method_router: MethodRouter<S>) -> Self {
        self.route_with(path, Access::default(), method_router)
    }

    /// Register a public route.
    pub fn public(self, path: &str, method_router: MethodRouter<S>) -> Self {
        self.route_with(path, Access::Public, method_router)
    }

    pub fn route_with(
        mut self,
        path: &str,
        access: Access,
        method_router: MethodRouter<S>,
    ) -> Self {
        let layer = middleware::from_fn_with_state(
            RouteAccess::new(self.guard.clone(), access),
            enforce_access,
        );
        self.router = self.router.route(path, method_router.route_layer(layer));
        self
    }

    pub fn with_state<S2>(self, state: S) -> Router<S2> {
        self.router.with_state(state)
    }
}
