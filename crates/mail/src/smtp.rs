//! SMTP transport backed by `lettre`'s async client.

use async_trait::async_trait;
use lettre::{
    transport::smtp::authentication::Credentials, AsyncSmtpTransport, AsyncTransport,
    Tokio1Executor,
};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::{build_message, error, Error, MailTransport, OutgoingEmail};

/// Configuration for the SMTP client.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    /// SMTP relay hostname.
    pub host: String,

    /// SMTP relay port.
    pub port: u16,

    /// Optional authentication username.
    pub username: Option<String>,

    /// Optional authentication password.
    pub password: Option<String>,

    /// Upgrade the connection with STARTTLS. Disable only for local relays.
    pub starttls: bool,
}

/// SMTP client for sending emails.
#[derive(Clone)]
pub struct Client {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl Client {
    /// Creates a new SMTP client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay hostname is not usable for a TLS
    /// connection.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let mut builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .context(error::CreateTransportSnafu)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        }
        .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self { transport: builder.build() })
    }
}

#[async_trait]
impl MailTransport for Client {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), Error> {
        let message = build_message(email)?;

        let _response = self.transport.send(message).await.context(error::SendSnafu)?;

        tracing::debug!(
            to = %email.to,
            notification_id = %email.notification_id,
            "submitted message to smtp relay"
        );

        Ok(())
    }
}
