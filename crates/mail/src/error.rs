use snafu::Snafu;

/// Errors that can occur while assembling or delivering an email.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// An address did not parse as a mailbox.
    #[snafu(display("Invalid email address `{address}`: {source}"))]
    InvalidAddress { address: String, source: lettre::address::AddressError },

    /// Failed to build the MIME message.
    #[snafu(display("Failed to build email message: {source}"))]
    BuildMessage { source: lettre::error::Error },

    /// Failed to construct the SMTP transport.
    #[snafu(display("Failed to create SMTP transport: {source}"))]
    CreateTransport { source: lettre::transport::smtp::Error },

    /// The SMTP server rejected the message.
    #[snafu(display("Failed to send email: {source}"))]
    Send { source: lettre::transport::smtp::Error },
}
