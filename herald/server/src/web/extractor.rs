use std::result::Result;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};

use crate::web::middleware::AuthClient as AuthClientData;

/// Extractor for the authenticated client application.
///
/// Retrieves the [`AuthClientData`] the JWT middleware stashed into the
/// request extensions; a missing entry means the route was reached without
/// authentication and yields 401.
#[derive(Debug, Clone)]
pub struct AuthClient(pub AuthClientData);

#[async_trait]
impl<S> FromRequestParts<S> for AuthClient
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_client = parts
            .extensions
            .get::<AuthClientData>()
            .ok_or((StatusCode::UNAUTHORIZED, "Missing authentication"))?
            .clone();

        Ok(Self(auth_client))
    }
}
