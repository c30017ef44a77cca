use lettre::{
    message::{
        header::{ContentType, Header, HeaderName, HeaderValue},
        Mailbox, MultiPart,
    },
    Message,
};
use snafu::ResultExt;

use crate::{error, Error};

/// A fully rendered email, ready for transport.
///
/// `notification_id` and `client_id` travel as message headers so delivered
/// mail can be correlated with the dispatch response.
#[derive(Clone, Debug)]
pub struct OutgoingEmail {
    pub from: String,
    pub reply_to: Option<String>,
    pub to: String,
    pub subject: String,
    pub text: Option<String>,
    pub html: Option<String>,
    pub notification_id: String,
    pub client_id: String,
}

#[derive(Clone)]
struct NotificationIdHeader(String);

impl Header for NotificationIdHeader {
    fn name() -> HeaderName { HeaderName::new_from_ascii_str("X-CF-Notification-ID") }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.to_string()))
    }

    fn display(&self) -> HeaderValue { HeaderValue::new(Self::name(), self.0.clone()) }
}

#[derive(Clone)]
struct ClientIdHeader(String);

impl Header for ClientIdHeader {
    fn name() -> HeaderName { HeaderName::new_from_ascii_str("X-CF-Client-ID") }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.to_string()))
    }

    fn display(&self) -> HeaderValue { HeaderValue::new(Self::name(), self.0.clone()) }
}

/// Builds the MIME message for an [`OutgoingEmail`].
///
/// Text and HTML bodies become a `multipart/alternative` pair when both are
/// present; otherwise whichever part exists is sent on its own.
///
/// # Errors
///
/// Returns an error if an address does not parse or the message cannot be
/// assembled.
pub fn build_message(email: &OutgoingEmail) -> Result<Message, Error> {
    let mut builder = Message::builder()
        .from(parse_mailbox(&email.from)?)
        .to(parse_mailbox(&email.to)?)
        .subject(email.subject.clone())
        .header(NotificationIdHeader(email.notification_id.clone()))
        .header(ClientIdHeader(email.client_id.clone()));

    if let Some(reply_to) = &email.reply_to {
        builder = builder.reply_to(parse_mailbox(reply_to)?);
    }

    match (&email.text, &email.html) {
        (Some(text), Some(html)) => builder
            .multipart(MultiPart::alternative_plain_html(text.clone(), html.clone()))
            .context(error::BuildMessageSnafu),
        (Some(text), None) => builder
            .header(ContentType::TEXT_PLAIN)
            .body(text.clone())
            .context(error::BuildMessageSnafu),
        (None, html) => builder
            .header(ContentType::TEXT_HTML)
            .body(html.clone().unwrap_or_default())
            .context(error::BuildMessageSnafu),
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, Error> {
    address.parse().context(error::InvalidAddressSnafu { address: address.to_string() })
}
