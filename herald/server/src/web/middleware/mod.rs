pub mod auth;
pub mod jwks;

pub use auth::{jwt_auth_middleware, AuthClient, TokenVerifier};
pub use jwks::JwksClient;
