use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SmtpConfig {
    /// SMTP relay hostname
    #[serde(default = "SmtpConfig::default_host")]
    pub host: String,

    /// SMTP relay port
    #[serde(default = "SmtpConfig::default_port")]
    pub port: u16,

    /// Optional authentication username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Optional authentication password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Upgrade the connection with STARTTLS. Disable only for local relays
    #[serde(default = "SmtpConfig::default_starttls")]
    pub starttls: bool,
}

impl SmtpConfig {
    #[inline]
    pub fn default_host() -> String { "127.0.0.1".to_string() }

    #[inline]
    pub const fn default_port() -> u16 { 587 }

    #[inline]
    pub const fn default_starttls() -> bool { true }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            username: None,
            password: None,
            starttls: Self::default_starttls(),
        }
    }
}

impl From<SmtpConfig> for herald_mail::smtp::Config {
    fn from(config: SmtpConfig) -> Self {
        Self {
            host: config.host,
            port: config.port,
            username: config.username,
            password: config.password,
            starttls: config.starttls,
        }
    }
}
