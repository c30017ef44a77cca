use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use super::jwks::JwksClient;
use herald_core::config::{TokenVerification, UaaConfig};

/// JWT claims issued by the identity provider to client applications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Client application the token was issued to.
    pub client_id: String,
    /// Granted authorization scopes.
    #[serde(default)]
    pub scope: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
}

/// Authenticated client application extracted from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthClient {
    pub client_id: String,
    pub scopes: Vec<String>,
}

impl AuthClient {
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|held| held == scope)
    }
}

/// Verifies inbound bearer tokens either against the identity provider's
/// published signing keys or a configured shared secret.
#[derive(Clone)]
pub enum TokenVerifier {
    Jwks(JwksClient),
    SharedSecret { key: String },
}

impl TokenVerifier {
    /// Builds the verifier matching the UAA configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the JWKS client cannot be constructed.
    pub fn from_config(config: &UaaConfig) -> Result<Self, super::jwks::JwksError> {
        match &config.token_verification {
            TokenVerification::Jwks => Ok(Self::Jwks(JwksClient::new(&config.host)?)),
            TokenVerification::SharedSecret { key } => {
                Ok(Self::SharedSecret { key: key.clone() })
            }
        }
    }
}

/// JWT authentication middleware.
///
/// Validates the bearer token and stashes the calling client's identity and
/// scopes into the request extensions for the handlers.
pub async fn jwt_auth_middleware(
    axum::extract::State(verifier): axum::extract::State<TokenVerifier>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_token_from_headers(&headers)?;

    let claims = validate_token(token, &verifier).await?;

    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        let ip = herald_axum::get_request_ip(&headers, addr);
        tracing::debug!(client_id = %claims.client_id, %ip, "authenticated dispatch request");
    } else {
        tracing::debug!(client_id = %claims.client_id, "authenticated dispatch request");
    }

    let auth_client = AuthClient { client_id: claims.client_id, scopes: claims.scope };

    drop(request.extensions_mut().insert(auth_client));

    Ok(next.run(request).await)
}

/// Extract bearer token from Authorization header
fn extract_token_from_headers(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid header encoding".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidToken("Missing Bearer prefix".to_string()))
}

/// Validate a JWT with signature verification, via JWKS lookup or the
/// shared secret, plus the standard expiry check.
async fn validate_token(token: &str, verifier: &TokenVerifier) -> Result<Claims, AuthError> {
    let header = decode_header(token)
        .map_err(|e| AuthError::InvalidToken(format!("Failed to decode header: {e}")))?;

    let (decoding_key, algorithm) = match verifier {
        TokenVerifier::Jwks(jwks_client) => {
            let kid = header.kid.ok_or_else(|| {
                AuthError::InvalidToken("Token missing 'kid' (key ID) in header".to_string())
            })?;

            let jwk =
                jwks_client.get_jwk(&kid).await.map_err(|e| AuthError::JwksError(e.to_string()))?;

            let key = DecodingKey::from_jwk(&jwk)
                .map_err(|e| AuthError::InvalidToken(format!("Failed to parse JWK: {e}")))?;

            (key, header.alg)
        }
        TokenVerifier::SharedSecret { key } => {
            (DecodingKey::from_secret(key.as_bytes()), Algorithm::HS256)
        }
    };

    let mut validation = Validation::new(algorithm);
    validation.validate_exp = true;
    // UAA audiences vary per client; the scope claims carry the authority.
    validation.validate_aud = false;

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| AuthError::InvalidToken(format!("Token validation failed: {e}")))?;

    tracing::debug!("Token successfully validated for client: {}", token_data.claims.client_id);

    Ok(token_data.claims)
}

/// Authentication errors
#[derive(Debug)]
pub enum AuthError {
    /// Missing authentication token
    MissingToken,
    /// Invalid or expired token
    InvalidToken(String),
    /// JWKS fetch error
    JwksError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        use herald_axum::{json_response, response, response::EncapsulatedJsonError};

        let (status, type_, message) = match self {
            Self::MissingToken => (
                StatusCode::UNAUTHORIZED,
                response::ErrorType::Unauthorized,
                "Missing authentication token".to_string(),
            ),
            Self::InvalidToken(msg) => (
                StatusCode::UNAUTHORIZED,
                response::ErrorType::Unauthorized,
                format!("Invalid token: {msg}"),
            ),
            Self::JwksError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                response::ErrorType::Internal,
                format!("Authentication service error: {msg}"),
            ),
        };

        json_response! {
            status: status,
            error: response::Error {
                type_,
                message,
                errors: Vec::new(),
                additional_fields: indexmap::IndexMap::default(),
            }
        }
    }
}
