//! Caller identity forwarded by the authenticating proxy in front of the server.

use axum::{extract::FromRequestParts, http::request::Parts};
use dues_core::{Caller, Role};

use crate::error::ApiError;

pub const MEMBER_ID_HEADER: &str = "x-member-id";
pub const MEMBER_ROLE_HEADER: &str = "x-member-role";

/// Extracts the [`Caller`] from the identity headers.
///
/// A missing member id is rejected; a missing role means a plain member.
pub struct CallerIdentity(pub Caller);

fn header<'a>(parts: &'a Parts, name: &str) -> Result<Option<&'a str>, ApiError> {
    match parts.headers.get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|v| Some(v.trim()).filter(|v| !v.is_empty()))
            .map_err(|_| ApiError::BadRequest(format!("Header '{}' is not valid text", name))),
    }
}

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let member_id = header(parts, MEMBER_ID_HEADER)?.ok_or_else(|| {
            ApiError::Unauthorized(format!("Missing '{}' header", MEMBER_ID_HEADER))
        })?;
        let role = match header(parts, MEMBER_ROLE_HEADER)? {
            Some(raw) => raw
                .parse::<Role>()
                .map_err(|e| ApiError::Unauthorized(e.to_string()))?,
            None => Role::Member,
        };
        Ok(CallerIdentity(Caller::new(member_id, role)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(builder: axum::http::request::Builder) -> Result<Caller, ApiError> {
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        CallerIdentity::from_request_parts(&mut parts, &())
            .await
            .map(|c| c.0)
    }

    #[tokio::test]
    async fn test_admin_header_is_parsed() {
        let caller = extract(
            Request::builder()
                .header(MEMBER_ID_HEADER, "a1")
                .header(MEMBER_ROLE_HEADER, "admin"),
        )
        .await
        .unwrap();
        assert_eq!(caller, Caller::admin("a1"));
    }

    #[tokio::test]
    async fn test_role_defaults_to_member() {
        let caller = extract(Request::builder().header(MEMBER_ID_HEADER, "m1"))
            .await
            .unwrap();
        assert_eq!(caller, Caller::member("m1"));
    }

    #[tokio::test]
    async fn test_missing_or_unknown_identity_is_rejected() {
        assert!(matches!(
            extract(Request::builder()).await,
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            extract(
                Request::builder()
                    .header(MEMBER_ID_HEADER, "m1")
                    .header(MEMBER_ROLE_HEADER, "treasurer")
            )
            .await,
            Err(ApiError::Unauthorized(_))
        ));
    }
}
