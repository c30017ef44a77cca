//! The dispatch engine: addressing strategies expand a target into a set of
//! recipients, templates get resolved per client and kind, and the mailer
//! fans rendered messages out over SMTP while recording per-recipient
//! outcomes.

pub mod context;
mod error;
pub mod mailer;
pub mod recipients;
pub mod strategies;
pub mod templates;
#[cfg(test)]
pub(crate) mod testing;
mod token;

pub use self::{
    context::{IdGenerator, MessageContext, UuidGenerator},
    error::{DispatchError, TemplateError},
    mailer::{Delivery, DeliveryStatus, Mailer},
    recipients::{AllUsersResolver, OrganizationResolver, ScopeResolver, SpaceResolver},
    strategies::{Strategies, Strategy},
    templates::{ContentSuffix, TemplateResolver},
    token::{TokenLoader, UaaTokenLoader},
};
use herald_core::model::OrgRole;

/// Opaque identity reference for one addressee. Lives only for the duration
/// of a single dispatch call; the mailer resolves it to addresses later.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Recipient {
    pub guid: String,
}

impl Recipient {
    #[must_use]
    pub fn new(guid: impl Into<String>) -> Self { Self { guid: guid.into() } }
}

/// Dispatch-time content bundle, built once from the request body and never
/// mutated afterwards except for `endorsement`, which the chosen strategy
/// stamps before delivery.
#[derive(Clone, Debug, Default)]
pub struct Options {
    pub kind_id: String,
    /// Legacy raw kind identifier; only used as the kind-description
    /// fallback.
    pub kind: String,
    pub kind_description: String,
    pub source_description: String,
    pub subject: String,
    pub text: String,
    pub html: String,
    pub reply_to: String,
    pub endorsement: String,
    pub critical: bool,
    pub role: Option<OrgRole>,
}

/// Subject/text/HTML template triple with handlebars placeholders.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Templates {
    pub subject: String,
    pub text: String,
    pub html: String,
}
