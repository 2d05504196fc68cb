//! Caller identity and tenancy scope extraction
//!
//! Authentication happens upstream; this server trusts the `x-user-id` and
//! `x-user-role` headers set by the gateway.

use crate::error::{ApiError, Result};
use atelier::UserId;
use atelier_registry::{AccessDecision, Scope};
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;
use tracing::debug;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

const ADMIN_ROLE: &str = "admin";

/// The authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl Caller {
    pub fn access_decision(&self) -> AccessDecision {
        if self.is_admin {
            AccessDecision::Allowed
        } else {
            AccessDecision::Denied
        }
    }

    fn from_parts(parts: &Parts) -> Result<Self> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::unauthorized("missing x-user-id header"))?;
        let user_id = raw
            .to_str()
            .ok()
            .and_then(|value| value.trim().parse::<i64>().ok())
            .ok_or_else(|| ApiError::unauthorized("malformed x-user-id header"))?;

        let is_admin = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|role| role.trim().eq_ignore_ascii_case(ADMIN_ROLE));

        Ok(Self {
            user_id: UserId(user_id),
            is_admin,
        })
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        Self::from_parts(parts)
    }
}

/// `?owner=` selector; absent means the caller's own works
#[derive(Debug, Default, Deserialize)]
pub struct OwnerQuery {
    pub owner: Option<String>,
}

/// Tenancy scope for the request
#[derive(Debug, Clone, Copy)]
pub struct RequestScope {
    pub caller: Caller,
    pub scope: Scope,
}

impl RequestScope {
    pub fn resolve(caller: Caller, query: &OwnerQuery) -> Result<Self> {
        let scope = match query.owner.as_deref().map(str::trim) {
            None | Some("") | Some("user") => Scope::user(caller.user_id),
            Some("system") => Scope::system(caller.access_decision())?,
            Some(other) => {
                return Err(ApiError::bad_request(&format!("Unknown owner: {}", other)));
            }
        };
        debug!(user = %caller.user_id, owner = %scope.kind(), "Resolved request scope");
        Ok(Self { caller, scope })
    }
}

impl<S> FromRequestParts<S> for RequestScope
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let caller = Caller::from_parts(parts)?;
        let Query(query) = Query::<OwnerQuery>::try_from_uri(&parts.uri)
            .map_err(|e| ApiError::bad_request(&format!("Invalid query string: {}", e)))?;
        Self::resolve(caller, &query)
    }
}
