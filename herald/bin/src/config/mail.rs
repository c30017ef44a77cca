use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MailConfig {
    /// Sender address stamped on every outgoing message
    #[serde(default = "MailConfig::default_sender")]
    pub sender: String,

    /// Upper bound on concurrently in-flight deliveries per dispatch
    #[serde(default = "MailConfig::default_delivery_concurrency")]
    pub delivery_concurrency: usize,
}

impl MailConfig {
    #[inline]
    pub fn default_sender() -> String { "no-reply@notifications.example.com".to_string() }

    #[inline]
    pub const fn default_delivery_concurrency() -> usize { 16 }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender: Self::default_sender(),
            delivery_concurrency: Self::default_delivery_concurrency(),
        }
    }
}

impl From<MailConfig> for herald_core::config::MailConfig {
    fn from(config: MailConfig) -> Self {
        Self { sender: config.sender, delivery_concurrency: config.delivery_concurrency }
    }
}
