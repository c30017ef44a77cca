//! The fan-out delivery loop. Every recipient is processed independently:
//! one bad address must never suppress delivery to the rest.

use std::sync::Arc;

use futures::{stream, StreamExt};
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    directory::{Organization, Space, UserDirectory},
    postal::{IdGenerator, MessageContext, Options, Recipient, Templates},
};
use herald_mail::{MailTransport, OutgoingEmail};

/// Outcome of a single recipient's delivery attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Delivered,
    Failed,
    Queued,
    Undeliverable,
}

/// Internal per-recipient delivery record. Trimmed to the public response
/// shape at the web boundary.
#[derive(Clone, Debug)]
pub struct Delivery {
    pub status: DeliveryStatus,
    pub recipient: String,
    pub notification_id: String,
    pub email: Option<String>,
}

/// Renders and sends one message per recipient over a bounded worker pool.
pub struct Mailer {
    directory: Arc<dyn UserDirectory>,
    transport: Arc<dyn MailTransport>,
    ids: Arc<dyn IdGenerator>,
    sender: String,
    concurrency: usize,
}

impl Mailer {
    #[must_use]
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        transport: Arc<dyn MailTransport>,
        ids: Arc<dyn IdGenerator>,
        sender: String,
        concurrency: usize,
    ) -> Self {
        Self { directory, transport, ids, sender, concurrency: concurrency.max(1) }
    }

    /// Delivers to every recipient and returns exactly one [`Delivery`] per
    /// recipient, successes and failures both. The order of the returned
    /// sequence is unspecified.
    #[allow(clippy::too_many_arguments)]
    pub async fn deliver(
        &self,
        recipients: Vec<Recipient>,
        options: &Options,
        space: &Space,
        organization: &Organization,
        client_id: &str,
        scope: &str,
        templates: &Templates,
        token: &str,
    ) -> Vec<Delivery> {
        stream::iter(recipients)
            .map(|recipient| {
                self.deliver_one(
                    recipient,
                    options,
                    space,
                    organization,
                    client_id,
                    scope,
                    templates,
                    token,
                )
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn deliver_one(
        &self,
        recipient: Recipient,
        options: &Options,
        space: &Space,
        organization: &Organization,
        client_id: &str,
        scope: &str,
        templates: &Templates,
        token: &str,
    ) -> Delivery {
        let guid = recipient.guid;

        let emails = match self.directory.user_emails(&guid, token).await {
            Ok(emails) => emails,
            Err(error) => {
                tracing::warn!(user_guid = %guid, %error, "address lookup failed");
                return Delivery {
                    status: DeliveryStatus::Failed,
                    recipient: guid,
                    notification_id: String::new(),
                    email: None,
                };
            }
        };

        let Some(email) = emails.into_iter().next() else {
            tracing::debug!(user_guid = %guid, "no registered address, skipping send");
            return Delivery {
                status: DeliveryStatus::Undeliverable,
                recipient: guid,
                notification_id: String::new(),
                email: None,
            };
        };

        let context = MessageContext::build(
            &email,
            options,
            &self.sender,
            space,
            organization,
            client_id,
            scope,
            self.ids.as_ref(),
            templates,
        );
        let notification_id = context.message_id.clone();

        let outgoing = match render_email(context) {
            Ok(outgoing) => outgoing,
            Err(error) => {
                tracing::warn!(user_guid = %guid, %error, "message rendering failed");
                return Delivery {
                    status: DeliveryStatus::Failed,
                    recipient: guid,
                    notification_id,
                    email: Some(email),
                };
            }
        };

        match self.transport.send(&outgoing).await {
            Ok(()) => Delivery {
                status: DeliveryStatus::Delivered,
                recipient: guid,
                notification_id,
                email: Some(email),
            },
            Err(error) => {
                tracing::warn!(user_guid = %guid, %error, "transport rejected message");
                Delivery {
                    status: DeliveryStatus::Failed,
                    recipient: guid,
                    notification_id,
                    email: Some(email),
                }
            }
        }
    }
}

/// Renders the endorsement, then subject and bodies, against the context.
///
/// Only body parts the caller actually supplied end up in the message;
/// a text-only dispatch does not grow an empty HTML part.
fn render_email(mut context: MessageContext) -> Result<OutgoingEmail, handlebars::RenderError> {
    let endorsement_template = std::mem::take(&mut context.endorsement);
    context.endorsement = render(&endorsement_template, &context)?;

    let subject = render(&context.subject_template, &context)?;
    let text =
        if context.text.is_empty() { None } else { Some(render(&context.text_template, &context)?) };
    let html =
        if context.html.is_empty() { None } else { Some(render(&context.html_template, &context)?) };

    Ok(OutgoingEmail {
        from: context.from,
        reply_to: if context.reply_to.is_empty() { None } else { Some(context.reply_to) },
        to: context.to,
        subject,
        text,
        html,
        notification_id: context.message_id,
        client_id: context.client_id,
    })
}

/// Placeholder substitution. Strict mode makes an unresolved placeholder a
/// render error instead of leaving it verbatim; escaping is disabled because
/// plain-text parts go through the same engine.
fn render(template: &str, context: &MessageContext) -> Result<String, handlebars::RenderError> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_escape_fn(handlebars::no_escape);
    registry.render_template(template, context)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{DeliveryStatus, Mailer};
    use crate::{
        directory::{Organization, Space},
        postal::{
            testing::{CountingGenerator, FakeTransport, FakeUserDirectory},
            Options, Recipient, Templates,
        },
    };

    fn templates() -> Templates {
        Templates {
            subject: "Notification: {{subject}}".to_string(),
            text: "{{endorsement}}\n\n{{text}}".to_string(),
            html: "<p>{{endorsement}}</p>{{html}}".to_string(),
        }
    }

    fn options() -> Options {
        Options {
            kind_id: "instance_down".to_string(),
            subject: "Your instance is down".to_string(),
            text: "get it back up".to_string(),
            html: "<em>get it back up</em>".to_string(),
            endorsement: "You belong to the \"{{space}}\" space.".to_string(),
            ..Options::default()
        }
    }

    fn mailer(directory: FakeUserDirectory, transport: Arc<FakeTransport>) -> Mailer {
        Mailer::new(
            Arc::new(directory),
            transport,
            Arc::new(CountingGenerator::default()),
            "no-reply@notifications.example.com".to_string(),
            4,
        )
    }

    fn recipients(guids: &[&str]) -> Vec<Recipient> {
        guids.iter().map(|guid| Recipient::new(*guid)).collect()
    }

    #[tokio::test]
    async fn one_transport_failure_does_not_suppress_the_rest() {
        let directory = FakeUserDirectory::with_emails(&[
            ("user-1", &["one@example.com"]),
            ("user-2", &["two@example.com"]),
            ("user-3", &["three@example.com"]),
        ]);
        let transport = Arc::new(FakeTransport {
            fail_for: vec!["two@example.com".to_string()],
            ..FakeTransport::default()
        });
        let mailer = mailer(directory, Arc::clone(&transport));

        let deliveries = mailer
            .deliver(
                recipients(&["user-1", "user-2", "user-3"]),
                &options(),
                &Space::default(),
                &Organization::default(),
                "my-client",
                "",
                &templates(),
                "token",
            )
            .await;

        assert_eq!(deliveries.len(), 3);
        let failed: Vec<_> =
            deliveries.iter().filter(|d| d.status == DeliveryStatus::Failed).collect();
        let delivered: Vec<_> =
            deliveries.iter().filter(|d| d.status == DeliveryStatus::Delivered).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].recipient, "user-2");
        assert_eq!(delivered.len(), 2);
        assert_eq!(transport.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn recipient_without_an_address_is_undeliverable_and_never_sent() {
        let directory = FakeUserDirectory::with_emails(&[
            ("user-1", &["one@example.com"]),
            ("user-2", &[]),
        ]);
        let transport = Arc::new(FakeTransport::default());
        let mailer = mailer(directory, Arc::clone(&transport));

        let deliveries = mailer
            .deliver(
                recipients(&["user-1", "user-2"]),
                &options(),
                &Space::default(),
                &Organization::default(),
                "my-client",
                "",
                &templates(),
                "token",
            )
            .await;

        let undeliverable =
            deliveries.iter().find(|d| d.status == DeliveryStatus::Undeliverable).unwrap();
        assert_eq!(undeliverable.recipient, "user-2");

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "one@example.com");
    }

    #[tokio::test]
    async fn unresolved_placeholder_is_a_render_failure_not_a_panic() {
        let directory = FakeUserDirectory::with_emails(&[("user-1", &["one@example.com"])]);
        let transport = Arc::new(FakeTransport::default());
        let mailer = mailer(directory, Arc::clone(&transport));

        let broken = Templates { text: "{{no_such_field}}".to_string(), ..templates() };
        let deliveries = mailer
            .deliver(
                recipients(&["user-1"]),
                &options(),
                &Space::default(),
                &Organization::default(),
                "my-client",
                "",
                &broken,
                "token",
            )
            .await;

        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].status, DeliveryStatus::Failed);
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn renders_endorsement_subject_and_bodies_into_the_message() {
        let directory = FakeUserDirectory::with_emails(&[("user-1", &["one@example.com"])]);
        let transport = Arc::new(FakeTransport::default());
        let mailer = mailer(directory, Arc::clone(&transport));

        let space = Space { name: "production".to_string(), ..Space::default() };
        let _ = mailer
            .deliver(
                recipients(&["user-1"]),
                &options(),
                &space,
                &Organization::default(),
                "my-client",
                "",
                &templates(),
                "token",
            )
            .await;

        let sent = transport.sent.lock().unwrap();
        let message = &sent[0];
        assert_eq!(message.subject, "Notification: Your instance is down");
        assert_eq!(
            message.text.as_deref(),
            Some("You belong to the \"production\" space.\n\nget it back up")
        );
        assert_eq!(
            message.html.as_deref(),
            Some("<p>You belong to the \"production\" space.</p><em>get it back up</em>")
        );
        assert_eq!(message.client_id, "my-client");
        assert_eq!(message.from, "no-reply@notifications.example.com");
    }

    #[tokio::test]
    async fn every_recipient_gets_a_fresh_notification_id() {
        let directory = FakeUserDirectory::with_emails(&[
            ("user-1", &["one@example.com"]),
            ("user-2", &["two@example.com"]),
        ]);
        let transport = Arc::new(FakeTransport::default());
        let mailer = mailer(directory, Arc::clone(&transport));

        let deliveries = mailer
            .deliver(
                recipients(&["user-1", "user-2"]),
                &options(),
                &Space::default(),
                &Organization::default(),
                "my-client",
                "",
                &templates(),
                "token",
            )
            .await;

        assert_ne!(deliveries[0].notification_id, deliveries[1].notification_id);
        assert!(!deliveries[0].notification_id.is_empty());
    }

    #[tokio::test]
    async fn text_only_dispatch_sends_no_html_part() {
        let directory = FakeUserDirectory::with_emails(&[("user-1", &["one@example.com"])]);
        let transport = Arc::new(FakeTransport::default());
        let mailer = mailer(directory, Arc::clone(&transport));

        let options = Options { html: String::new(), ..options() };
        let _ = mailer
            .deliver(
                recipients(&["user-1"]),
                &options,
                &Space::default(),
                &Organization::default(),
                "my-client",
                "",
                &templates(),
                "token",
            )
            .await;

        let sent = transport.sent.lock().unwrap();
        assert!(sent[0].html.is_none());
        assert!(sent[0].text.is_some());
    }
}
