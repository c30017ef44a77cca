//! Template resolution with a most-specific-first fallback chain.

use std::sync::Arc;

use crate::{
    postal::{error, TemplateError, Templates},
    service::TemplateStore,
};

/// Content-name suffix keyed to the addressing scheme, the last segment of
/// every template name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentSuffix {
    User,
    Space,
    Organization,
    Everyone,
    UaaScope,
}

impl ContentSuffix {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user_body",
            Self::Space => "space_body",
            Self::Organization => "organization_body",
            Self::Everyone => "everyone_body",
            Self::UaaScope => "uaa_scope_body",
        }
    }
}

/// Loads the subject/text/HTML triple for a (client, kind, suffix)
/// combination.
///
/// Precedence, most specific first: `{client}.{kind}.{suffix}`,
/// `{client}.{suffix}`, then the seeded global default `{suffix}`.
#[derive(Clone)]
pub struct TemplateResolver {
    store: Arc<dyn TemplateStore>,
}

impl TemplateResolver {
    #[must_use]
    pub fn new(store: Arc<dyn TemplateStore>) -> Self { Self { store } }

    /// # Errors
    ///
    /// Returns [`TemplateError::Lookup`] when the store fails and
    /// [`TemplateError::NotFound`] when the whole chain comes up empty.
    pub async fn load(
        &self,
        client_id: &str,
        kind_id: &str,
        suffix: ContentSuffix,
    ) -> Result<Templates, TemplateError> {
        let suffix = suffix.as_str();
        let names = [
            format!("{client_id}.{kind_id}.{suffix}"),
            format!("{client_id}.{suffix}"),
            suffix.to_string(),
        ];

        for name in &names {
            let row = self
                .store
                .find_by_name(name)
                .await
                .map_err(|source| TemplateError::Lookup { name: name.clone(), source })?;

            if let Some(row) = row {
                tracing::debug!(template = %name, "resolved templates");
                return Ok(Templates { subject: row.subject, text: row.text, html: row.html });
            }
        }

        Err(error::NotFoundSnafu { name: suffix.to_string() }.build())
    }
}
