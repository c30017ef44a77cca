use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::postal::{Delivery, DeliveryStatus, Options};
use herald_core::model::OrgRole;

/// Body of a dispatch request, shared by all five notify endpoints.
#[derive(Clone, Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct NotifyRequest {
    /// Notification kind. Authoritative when both this and `kind` are given.
    #[schema(example = "instance_down")]
    pub kind_id: Option<String>,

    /// Legacy alias for `kind_id`; also the kind-description fallback.
    pub kind: Option<String>,

    pub subject: Option<String>,

    /// Plain-text body. At least one of `text`/`html` is required.
    pub text: Option<String>,

    /// HTML body. At least one of `text`/`html` is required.
    pub html: Option<String>,

    pub reply_to: Option<String>,

    pub kind_description: Option<String>,

    pub source_description: Option<String>,

    /// Requires the critical-notifications scope on the caller's token.
    #[serde(default)]
    pub critical: bool,

    /// Organization role filter; only meaningful for organization dispatch.
    #[schema(example = "OrgManager")]
    pub role: Option<String>,
}

impl NotifyRequest {
    /// Parses a raw body. A failure here is a parse error (400), not a
    /// validation error.
    ///
    /// # Errors
    ///
    /// Returns the underlying deserialization error for malformed JSON.
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> { serde_json::from_slice(body) }

    /// One human-readable message per missing required field. Empty means
    /// the request is well-formed.
    #[must_use]
    pub fn missing_field_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if is_blank(self.kind_id.as_deref()) && is_blank(self.kind.as_deref()) {
            errors.push("\"kind_id\" is a required field".to_string());
        }

        if is_blank(self.text.as_deref()) && is_blank(self.html.as_deref()) {
            errors.push("\"text\" or \"html\" fields must be supplied".to_string());
        }

        errors
    }

    /// Converts the request into dispatch options. `kind_id` wins over the
    /// legacy `kind` when both are present; `kind` is kept around purely as
    /// the kind-description fallback source.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unrecognized organization role.
    pub fn into_options(self) -> Result<Options, herald_core::error::Error> {
        let role = match self.role.as_deref() {
            None | Some("") => None,
            Some(role) => Some(role.parse::<OrgRole>()?),
        };

        let kind = self.kind.unwrap_or_default();
        let kind_id = self.kind_id.filter(|id| !id.is_empty()).unwrap_or_else(|| kind.clone());

        Ok(Options {
            kind_id,
            kind,
            kind_description: self.kind_description.unwrap_or_default(),
            source_description: self.source_description.unwrap_or_default(),
            subject: self.subject.unwrap_or_default(),
            text: self.text.unwrap_or_default(),
            html: self.html.unwrap_or_default(),
            reply_to: self.reply_to.unwrap_or_default(),
            endorsement: String::new(),
            critical: self.critical,
            role,
        })
    }
}

fn is_blank(value: Option<&str>) -> bool { value.is_none_or(str::is_empty) }

/// Public per-recipient outcome: exactly the three fields clients get to
/// see, nothing else.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct NotifyResponse {
    pub status: DeliveryStatus,

    /// The resolved recipient guid.
    pub recipient: String,

    /// Opaque identifier, safe to echo back for correlation with delivery
    /// logs.
    pub notification_id: String,
}

/// Projects internal delivery records down to the public response shape,
/// dropping internal-only fields.
#[must_use]
pub fn trim_deliveries(deliveries: Vec<Delivery>) -> Vec<NotifyResponse> {
    deliveries
        .into_iter()
        .map(|delivery| NotifyResponse {
            status: delivery.status,
            recipient: delivery.recipient,
            notification_id: delivery.notification_id,
        })
        .collect()
}
