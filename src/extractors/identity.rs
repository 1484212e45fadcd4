//! Caller identity resolved from gateway headers.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

/// Header carrying the caller's user id, set by the authenticating gateway.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the caller's role.
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Role of the resolved caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Plays in rooms.
    Participant,
    /// Creates and runs rooms.
    Host,
}

impl Role {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "participant" => Some(Role::Participant),
            "host" => Some(Role::Host),
            _ => None,
        }
    }
}

/// Identity resolved from the `X-User-Id` and `X-User-Role` headers.
///
/// Add this as a handler parameter to require an identity. A missing role header
/// resolves to [`Role::Participant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    /// Positive user id.
    pub user_id: i64,
    /// Role claimed by the gateway.
    pub role: Role,
}

impl Identity {
    /// Whether the caller may manage rooms.
    pub fn is_host(&self) -> bool {
        self.role == Role::Host
    }

    fn from_parts(parts: &Parts) -> Result<Self, AppError> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing user identity".into()))?
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| AppError::Unauthorized("invalid user identity".into()))?;

        let role = match parts.headers.get(USER_ROLE_HEADER) {
            None => Role::Participant,
            Some(value) => value
                .to_str()
                .ok()
                .and_then(Role::parse)
                .ok_or_else(|| AppError::Unauthorized("invalid user role".into()))?,
        };

        Ok(Self { user_id, role })
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_parts(parts)
    }
}
