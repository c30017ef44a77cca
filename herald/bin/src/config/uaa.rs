use serde::{Deserialize, Serialize};

/// How inbound bearer tokens are verified.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenVerification {
    /// Verify against the identity provider's published signing keys.
    #[default]
    Jwks,
    /// Verify with a shared symmetric key.
    SharedSecret,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UaaConfig {
    /// Identity provider base URL (e.g. <https://uaa.example.com>)
    #[serde(default = "UaaConfig::default_host")]
    pub host: String,

    /// Client ID holding permission to read directory data
    #[serde(default = "UaaConfig::default_client_id")]
    pub client_id: String,

    /// Client secret for the directory-reader client
    #[serde(default = "UaaConfig::default_client_secret")]
    pub client_secret: String,

    /// Enable TLS certificate verification
    #[serde(default = "UaaConfig::default_verify_ssl")]
    pub verify_ssl: bool,

    /// JWT verification method
    #[serde(default)]
    pub token_verification: TokenVerification,

    /// Shared symmetric key, only read when `token_verification` is
    /// `sharedsecret`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_secret: Option<String>,
}

impl UaaConfig {
    #[inline]
    pub fn default_host() -> String { "https://uaa.example.com".to_string() }

    #[inline]
    pub fn default_client_id() -> String { "notifications".to_string() }

    #[inline]
    pub fn default_client_secret() -> String { "changeme".to_string() }

    #[inline]
    pub const fn default_verify_ssl() -> bool { true }
}

impl Default for UaaConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            client_id: Self::default_client_id(),
            client_secret: Self::default_client_secret(),
            verify_ssl: Self::default_verify_ssl(),
            token_verification: TokenVerification::default(),
            shared_secret: None,
        }
    }
}

impl From<UaaConfig> for herald_core::config::UaaConfig {
    fn from(config: UaaConfig) -> Self {
        let token_verification = match config.token_verification {
            TokenVerification::Jwks => herald_core::config::TokenVerification::Jwks,
            TokenVerification::SharedSecret => herald_core::config::TokenVerification::SharedSecret {
                key: config.shared_secret.unwrap_or_default(),
            },
        };

        Self {
            host: config.host,
            client_id: config.client_id,
            client_secret: config.client_secret,
            verify_ssl: config.verify_ssl,
            token_verification,
        }
    }
}
