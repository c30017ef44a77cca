use std::sync::Arc;

use async_trait::async_trait;
use snafu::ResultExt;

use super::{guids_of, Strategy, StrategyDeps};
use crate::{
    directory::{OrgDirectory, Space},
    postal::{
        error, templates::ContentSuffix, Delivery, DispatchError, Mailer, Options,
        OrganizationResolver, TemplateResolver, TokenLoader,
    },
    service::ReceiptsRepo,
};

pub const ORGANIZATION_ENDORSEMENT: &str = "You received this message because you belong to the \
                                            \"{{organization}}\" organization.";

/// Delivers to the members of the targeted organization, optionally narrowed
/// to one role. Role strings were validated at the web boundary.
pub struct OrganizationStrategy {
    token_loader: Arc<dyn TokenLoader>,
    orgs: Arc<dyn OrgDirectory>,
    resolver: OrganizationResolver,
    templates: TemplateResolver,
    mailer: Arc<Mailer>,
    receipts: Arc<dyn ReceiptsRepo>,
}

impl OrganizationStrategy {
    #[must_use]
    pub fn new(deps: &StrategyDeps) -> Self {
        Self {
            token_loader: Arc::clone(&deps.token_loader),
            orgs: Arc::clone(&deps.orgs),
            resolver: OrganizationResolver::new(Arc::clone(&deps.orgs)),
            templates: deps.templates.clone(),
            mailer: Arc::clone(&deps.mailer),
            receipts: Arc::clone(&deps.receipts),
        }
    }
}

#[async_trait]
impl Strategy for OrganizationStrategy {
    async fn dispatch(
        &self,
        client_id: &str,
        target_id: &str,
        mut options: Options,
    ) -> Result<Vec<Delivery>, DispatchError> {
        let token = self.token_loader.load().await.context(error::LoadTokenSnafu)?;

        let organization = self
            .orgs
            .load_organization(target_id, &token)
            .await
            .context(error::ResolveRecipientsSnafu)?;
        let recipients = self
            .resolver
            .resolve(target_id, options.role, &token)
            .await
            .context(error::ResolveRecipientsSnafu)?;
        let recipient_guids = guids_of(&recipients);

        let templates = self
            .templates
            .load(client_id, &options.kind_id, ContentSuffix::Organization)
            .await
            .context(error::LoadTemplatesSnafu)?;

        options.endorsement = ORGANIZATION_ENDORSEMENT.to_string();

        let deliveries = self
            .mailer
            .deliver(
                recipients,
                &options,
                &Space::default(),
                &organization,
                client_id,
                "",
                &templates,
                &token,
            )
            .await;

        self.receipts
            .create(client_id, &options.kind_id, &recipient_guids)
            .await
            .context(error::RecordReceiptsSnafu)?;

        Ok(deliveries)
    }
}
