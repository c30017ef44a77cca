use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CloudControllerConfig {
    /// Cloud Controller base URL (e.g. <https://api.example.com>)
    #[serde(default = "CloudControllerConfig::default_host")]
    pub host: String,

    /// Enable TLS certificate verification
    #[serde(default = "CloudControllerConfig::default_verify_ssl")]
    pub verify_ssl: bool,
}

impl CloudControllerConfig {
    #[inline]
    pub fn default_host() -> String { "https://api.example.com".to_string() }

    #[inline]
    pub const fn default_verify_ssl() -> bool { true }
}

impl Default for CloudControllerConfig {
    fn default() -> Self {
        Self { host: Self::default_host(), verify_ssl: Self::default_verify_ssl() }
    }
}

impl From<CloudControllerConfig> for herald_core::config::CloudControllerConfig {
    fn from(config: CloudControllerConfig) -> Self {
        Self { host: config.host, verify_ssl: config.verify_ssl }
    }
}
