use snafu::Snafu;

use crate::{directory, service};

/// Errors that abort an entire dispatch. Per-recipient delivery failures
/// never appear here; they are reported through each recipient's
/// [`crate::postal::Delivery`].
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DispatchError {
    #[snafu(display("Failed to load a directory service token: {source}"))]
    LoadToken { source: directory::Error },

    #[snafu(display("Failed to resolve the recipient audience: {source}"))]
    ResolveRecipients { source: directory::Error },

    /// Distinguishable from the other variants so the web boundary reports a
    /// server-side fault rather than a client validation fault.
    #[snafu(display("Failed to load templates: {source}"))]
    LoadTemplates { source: TemplateError },

    #[snafu(display("Failed to record delivery receipts: {source}"))]
    RecordReceipts { source: service::Error },
}

/// Errors raised while resolving a template triple.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum TemplateError {
    #[snafu(display("Failed to look up template `{name}`: {source}"))]
    Lookup { name: String, source: service::Error },

    #[snafu(display("No template found for `{name}`"))]
    NotFound { name: String },
}
