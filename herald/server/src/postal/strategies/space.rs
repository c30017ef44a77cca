use std::sync::Arc;

use async_trait::async_trait;
use snafu::ResultExt;

use super::{guids_of, Strategy, StrategyDeps};
use crate::{
    directory::OrgDirectory,
    postal::{
        error, templates::ContentSuffix, Delivery, DispatchError, Mailer, Options,
        SpaceResolver, TemplateResolver, TokenLoader,
    },
    service::ReceiptsRepo,
};

pub const SPACE_ENDORSEMENT: &str = "You received this message because you belong to the \
                                     \"{{space}}\" space in the \"{{organization}}\" organization.";

/// Delivers to every user in the targeted space.
pub struct SpaceStrategy {
    token_loader: Arc<dyn TokenLoader>,
    orgs: Arc<dyn OrgDirectory>,
    resolver: SpaceResolver,
    templates: TemplateResolver,
    mailer: Arc<Mailer>,
    receipts: Arc<dyn ReceiptsRepo>,
}

impl SpaceStrategy {
    #[must_use]
    pub fn new(deps: &StrategyDeps) -> Self {
        Self {
            token_loader: Arc::clone(&deps.token_loader),
            orgs: Arc::clone(&deps.orgs),
            resolver: SpaceResolver::new(Arc::clone(&deps.orgs)),
            templates: deps.templates.clone(),
            mailer: Arc::clone(&deps.mailer),
            receipts: Arc::clone(&deps.receipts),
        }
    }
}

#[async_trait]
impl Strategy for SpaceStrategy {
    async fn dispatch(
        &self,
        client_id: &str,
        target_id: &str,
        mut options: Options,
    ) -> Result<Vec<Delivery>, DispatchError> {
        let token = self.token_loader.load().await.context(error::LoadTokenSnafu)?;

        let space = self
            .orgs
            .load_space(target_id, &token)
            .await
            .context(error::ResolveRecipientsSnafu)?;
        let organization = self
            .orgs
            .load_organization(&space.organization_guid, &token)
            .await
            .context(error::ResolveRecipientsSnafu)?;
        let recipients = self
            .resolver
            .resolve(target_id, &token)
            .await
            .context(error::ResolveRecipientsSnafu)?;
        let recipient_guids = guids_of(&recipients);

        let templates = self
            .templates
            .load(client_id, &options.kind_id, ContentSuffix::Space)
            .await
            .context(error::LoadTemplatesSnafu)?;

        options.endorsement = SPACE_ENDORSEMENT.to_string();

        let deliveries = self
            .mailer
            .deliver(recipients, &options, &space, &organization, client_id, "", &templates, &token)
            .await;

        self.receipts
            .create(client_id, &options.kind_id, &recipient_guids)
            .await
            .context(error::RecordReceiptsSnafu)?;

        Ok(deliveries)
    }
}
