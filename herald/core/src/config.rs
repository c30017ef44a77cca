use std::net::SocketAddr;

use sqlx::postgres::PgSslMode;

#[derive(Clone, Debug)]
pub struct Config {
    pub web: WebConfig,

    pub postgres: PostgresConfig,

    pub uaa: UaaConfig,

    pub cloud_controller: CloudControllerConfig,

    pub smtp: herald_mail::smtp::Config,

    pub mail: MailConfig,
}

/// Identity provider (UAA) endpoint and the service credentials used to read
/// directory data on behalf of the platform.
#[derive(Clone, Debug)]
pub struct UaaConfig {
    pub host: String,
    pub client_id: String,
    pub client_secret: String,
    pub verify_ssl: bool,
    pub token_verification: TokenVerification,
}

/// How inbound bearer tokens are verified.
#[derive(Clone, Debug)]
pub enum TokenVerification {
    /// Fetch signing keys from the identity provider's JWKS endpoint.
    Jwks,
    /// Verify with a shared symmetric key (HS256).
    SharedSecret { key: String },
}

#[derive(Clone, Debug)]
pub struct CloudControllerConfig {
    pub host: String,
    pub verify_ssl: bool,
}

/// Process-wide mail identity and fan-out tuning.
#[derive(Clone, Debug)]
pub struct MailConfig {
    /// Sender address stamped on every outgoing message.
    pub sender: String,

    /// Upper bound on concurrently in-flight deliveries per dispatch.
    pub delivery_concurrency: usize,
}

#[derive(Clone, Debug)]
pub struct WebConfig {
    pub listen_address: SocketAddr,
}

#[derive(Clone, Debug)]
pub struct PostgresConfig {
    pub host: String,

    pub port: u16,

    pub database: String,

    pub username: String,

    pub password: String,

    pub ssl_mode: PgSslMode,

    pub max_connections: u32,

    pub application_name: Option<String>,
}
