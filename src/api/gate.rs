//! Page-level access control. Protected pages redirect instead of rendering
//! when the session check fails; JSON routes are left to the service guards.

use crate::{
    api::SharedState,
    auth::guard::{GuardError, verify_session},
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

pub const LOGIN_PATH: &str = "/login";
pub const FORBIDDEN_PATH: &str = "/forbidden";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    Authenticated,
    Admin,
}

fn under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

pub fn classify(path: &str) -> RouteClass {
    if under(path, "/admin") {
        RouteClass::Admin
    } else if path == "/" || under(path, "/user") || under(path, "/group") {
        RouteClass::Authenticated
    } else {
        RouteClass::Public
    }
}

pub async fn request_gate(State(state): State<SharedState>, req: Request, next: Next) -> Response {
    let class = classify(req.uri().path());
    if class == RouteClass::Public {
        return next.run(req).await;
    }

    let (mut parts, body) = req.into_parts();
    let session = verify_session(&mut parts, &state.cookie, state.service.codec());
    let verdict = match class {
        RouteClass::Admin => session.verify_admin().map(|_| ()),
        _ => session.verify().map(|_| ()),
    };

    match verdict {
        Ok(()) => next.run(Request::from_parts(parts, body)).await,
        Err(GuardError::NotAdmin) => {
            debug!(path = %parts.uri.path(), "non-admin redirected");
            Redirect::to(FORBIDDEN_PATH).into_response()
        }
        Err(err) => {
            debug!(path = %parts.uri.path(), reason = err.code(), "redirecting to login");
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_page_paths() {
        assert_eq!(classify("/"), RouteClass::Authenticated);
        assert_eq!(classify("/user"), RouteClass::Authenticated);
        assert_eq!(classify("/group/abc"), RouteClass::Authenticated);
        assert_eq!(classify("/admin"), RouteClass::Admin);
        assert_eq!(classify("/admin/users"), RouteClass::Admin);
    }

    #[test]
    fn api_and_entry_pages_are_public() {
        for path in ["/login", "/register", "/invite/abc", "/forbidden", "/health", "/api/admin/users", "/users", "/groups"] {
            assert_eq!(classify(path), RouteClass::Public, "{}", path);
        }
    }
}
