//! Per-route authorization middleware
//!
//! Every protected route is wrapped with [`gated`], which runs the
//! authorization gate before any extractor of the handler, so body parsing and
//! other validation never happen for rejected requests. The authorized
//! [`Account`] is placed in the request extensions.

use crate::auth::{AuthorizationGate, Role};
use crate::model::Account;
use axum::extract::{Query, Request, State};
use axum::http::Uri;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::MethodRouter;
use std::collections::HashMap;
use std::sync::Arc;

/// Role requirement of one route
#[derive(Clone)]
pub struct RequireRole {
    gate: AuthorizationGate,
    role: &'static str,
    key_param: Arc<str>,
}

impl RequireRole {
    /// Requirement of the most privileged role
    pub fn new(gate: AuthorizationGate, key_param: Arc<str>) -> Self {
        Self {
            gate,
            role: Role::MOST_PRIVILEGED.as_str(),
            key_param,
        }
    }

    /// Require `role` instead, given by name
    pub fn with_role(mut self, role: &'static str) -> Self {
        self.role = role;
        self
    }
}

/// Middleware function run by [`gated`] routes
pub async fn require_role(
    State(guard): State<RequireRole>,
    mut request: Request,
    next: Next,
) -> Response {
    let presented = presented_key(request.uri(), &guard.key_param);
    match guard.gate.authorize(presented.as_deref(), guard.role).await {
        Ok(account) => {
            request.extensions_mut().insert::<Account>(account);
            next.run(request).await
        }
        Err(rejection) => rejection.into_response(),
    }
}

/// Wrap every method of `route` with the role requirement
pub fn gated<S>(route: MethodRouter<S>, guard: &RequireRole) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(middleware::from_fn_with_state(guard.clone(), require_role))
}

fn presented_key(uri: &Uri, param: &str) -> Option<String> {
    Query::<HashMap<String, String>>::try_from_uri(uri)
        .ok()
        .and_then(|Query(mut params)| params.remove(param))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presented_key_from_query() {
        let uri: Uri = "/api/User?id=1&apiKey=%7Babc%7D".parse().unwrap();
        assert_eq!(presented_key(&uri, "apiKey").as_deref(), Some("{abc}"));
        assert_eq!(presented_key(&uri, "key"), None);

        let uri: Uri = "/api/User".parse().unwrap();
        assert_eq!(presented_key(&uri, "apiKey"), None);
    }
}
