//! Render-ready message context, assembled once per recipient-message.

use serde::Serialize;

use crate::{
    directory::{Organization, Space},
    postal::{Options, Templates},
};

/// Produces fresh, globally unique message identifiers. Injected so tests can
/// substitute a deterministic source.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Production id source: random v4 UUIDs.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String { uuid::Uuid::new_v4().to_string() }
}

/// Everything a single render needs, owned by exactly one delivery and
/// discarded after the send. Serialized field names double as the
/// placeholder vocabulary available to templates.
#[derive(Clone, Debug, Serialize)]
pub struct MessageContext {
    pub from: String,
    pub reply_to: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
    pub subject_template: String,
    pub text_template: String,
    pub html_template: String,
    pub kind_description: String,
    pub source_description: String,
    pub client_id: String,
    pub message_id: String,
    pub endorsement: String,
    pub space: String,
    pub organization: String,
    pub scope: String,
}

impl MessageContext {
    /// Merges template, options, recipient and sender identity into one
    /// structure. The only conditional logic is the two description
    /// fallbacks; everything else is a direct copy.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        email: &str,
        options: &Options,
        sender: &str,
        space: &Space,
        organization: &Organization,
        client_id: &str,
        scope: &str,
        ids: &dyn IdGenerator,
        templates: &Templates,
    ) -> Self {
        let kind_description = if options.kind_description.is_empty() {
            options.kind.clone()
        } else {
            options.kind_description.clone()
        };

        let source_description = if options.source_description.is_empty() {
            client_id.to_string()
        } else {
            options.source_description.clone()
        };

        Self {
            from: sender.to_string(),
            reply_to: options.reply_to.clone(),
            to: email.to_string(),
            subject: options.subject.clone(),
            text: options.text.clone(),
            html: options.html.clone(),
            subject_template: templates.subject.clone(),
            text_template: templates.text.clone(),
            html_template: templates.html.clone(),
            kind_description,
            source_description,
            client_id: client_id.to_string(),
            message_id: ids.generate(),
            endorsement: options.endorsement.clone(),
            space: space.name.clone(),
            organization: organization.name.clone(),
            scope: scope.to_string(),
        }
    }
}
