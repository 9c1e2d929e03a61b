//! Request authentication. Tokens are minted by an external issuer; this
//! module only verifies them and resolves the caller to a `Requester`.

mod jwt;

#[cfg(test)]
pub use jwt::issue;
pub use jwt::{JwtVerifier, TokenVerifier};

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use thiserror::Error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Role;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization header is not a bearer token")]
    MalformedHeader,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("token subject {0} does not exist")]
    UnknownIdentity(Uuid),

    #[error("identity {0} is deactivated")]
    Inactive(Uuid),
}

/// An authenticated caller. `role` is the stored role, not the token claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requester {
    Anonymous,
    Authenticated(Principal),
}

impl Requester {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Requester::Anonymous => None,
            Requester::Authenticated(principal) => Some(principal),
        }
    }

    pub fn id(&self) -> Option<Uuid> {
        self.principal().map(|p| p.id)
    }

    /// The principal, or `AUTH_REQUIRED` for anonymous callers.
    pub fn require(&self) -> Result<&Principal, AppError> {
        self.principal().ok_or(AppError::AuthRequired)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Requester {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Requester::Anonymous);
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MalformedHeader)?;

        let claims = state.verifier.verify(token)?;

        let identity = state
            .store
            .identity(claims.sub)
            .await?
            .ok_or(AuthError::UnknownIdentity(claims.sub))?;
        if !identity.is_active {
            return Err(AuthError::Inactive(identity.id).into());
        }

        Ok(Requester::Authenticated(Principal {
            id: identity.id,
            role: identity.role,
        }))
    }
}
