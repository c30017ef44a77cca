//! # Mail Crate
//!
//! Email assembly and delivery for the notification service. Messages are
//! built with `lettre` and handed to a [`MailTransport`], whose production
//! implementation speaks SMTP.

mod error;
mod message;
pub mod smtp;

use async_trait::async_trait;
pub use error::Error;
pub use message::{build_message, OutgoingEmail};

/// Trait for transports that can push a fully rendered email out the door.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Sends a single email.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be assembled or the transport
    /// rejects it.
    async fn send(&self, email: &OutgoingEmail) -> Result<(), Error>;
}
