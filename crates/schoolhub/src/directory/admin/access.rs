use std::sync::Arc;

use axum::http::{header, HeaderMap};
use tracing::warn;

use crate::directory::backend::SessionDirectory;
use crate::directory::domain::{Role, SessionUser};

/// Outcome of checking a request against the admin role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Granted(SessionUser),
    /// No session, or the token does not resolve to a user.
    Unauthenticated,
    /// Signed in, but the admin role is missing or could not be confirmed.
    Forbidden,
}

pub struct AdminGate<S> {
    sessions: Arc<S>,
}

impl<S> AdminGate<S>
where
    S: SessionDirectory + 'static,
{
    pub fn new(sessions: Arc<S>) -> Self {
        Self { sessions }
    }

    pub fn check(&self, token: Option<&str>) -> AccessDecision {
        let Some(token) = token.map(str::trim).filter(|token| !token.is_empty()) else {
            return AccessDecision::Unauthenticated;
        };

        let user = match self.sessions.current_user(token) {
            Ok(Some(user)) => user,
            Ok(None) => return AccessDecision::Unauthenticated,
            Err(err) => {
                warn!(error = %err, "session lookup failed");
                return AccessDecision::Unauthenticated;
            }
        };

        match self.sessions.has_role(&user.id, Role::Admin) {
            Ok(true) => AccessDecision::Granted(user),
            Ok(false) => AccessDecision::Forbidden,
            Err(err) => {
                warn!(user_id = %user.id.0, error = %err, "admin role lookup failed");
                AccessDecision::Forbidden
            }
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(token.trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_requires_scheme() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert_eq!(bearer_token(&headers), None);
    }
}
