use std::sync::Arc;

use async_trait::async_trait;
use snafu::ResultExt;

use super::{guids_of, Strategy, StrategyDeps};
use crate::{
    directory::{Organization, Space},
    postal::{
        error, templates::ContentSuffix, Delivery, DispatchError, Mailer, Options, ScopeResolver,
        TemplateResolver, TokenLoader,
    },
    service::ReceiptsRepo,
};

pub const UAA_SCOPE_ENDORSEMENT: &str =
    "You received this message because you have the \"{{scope}}\" scope.";

/// Delivers to every user holding the targeted authorization scope.
pub struct UaaScopeStrategy {
    token_loader: Arc<dyn TokenLoader>,
    resolver: ScopeResolver,
    templates: TemplateResolver,
    mailer: Arc<Mailer>,
    receipts: Arc<dyn ReceiptsRepo>,
}

impl UaaScopeStrategy {
    #[must_use]
    pub fn new(deps: &StrategyDeps) -> Self {
        Self {
            token_loader: Arc::clone(&deps.token_loader),
            resolver: ScopeResolver::new(Arc::clone(&deps.users)),
            templates: deps.templates.clone(),
            mailer: Arc::clone(&deps.mailer),
            receipts: Arc::clone(&deps.receipts),
        }
    }
}

#[async_trait]
impl Strategy for UaaScopeStrategy {
    async fn dispatch(
        &self,
        client_id: &str,
        target_id: &str,
        mut options: Options,
    ) -> Result<Vec<Delivery>, DispatchError> {
        let token = self.token_loader.load().await.context(error::LoadTokenSnafu)?;

        let recipients = self
            .resolver
            .resolve(target_id, &token)
            .await
            .context(error::ResolveRecipientsSnafu)?;
        let recipient_guids = guids_of(&recipients);

        let templates = self
            .templates
            .load(client_id, &options.kind_id, ContentSuffix::UaaScope)
            .await
            .context(error::LoadTemplatesSnafu)?;

        options.endorsement = UAA_SCOPE_ENDORSEMENT.to_string();

        let deliveries = self
            .mailer
            .deliver(
                recipients,
                &options,
                &Space::default(),
                &Organization::default(),
                client_id,
                target_id,
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
