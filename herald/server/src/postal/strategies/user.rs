use std::sync::Arc;

use async_trait::async_trait;
use snafu::ResultExt;

use super::{Strategy, StrategyDeps};
use crate::{
    directory::{Organization, Space},
    postal::{
        error, templates::ContentSuffix, Delivery, DispatchError, Mailer, Options, Recipient,
        TemplateResolver, TokenLoader,
    },
    service::ReceiptsRepo,
};

pub const USER_ENDORSEMENT: &str = "This message was sent directly to you.";

/// Delivers to exactly the one user named by the target guid.
pub struct UserStrategy {
    token_loader: Arc<dyn TokenLoader>,
    templates: TemplateResolver,
    mailer: Arc<Mailer>,
    receipts: Arc<dyn ReceiptsRepo>,
}

impl UserStrategy {
    #[must_use]
    pub fn new(deps: &StrategyDeps) -> Self {
        Self {
            token_loader: Arc::clone(&deps.token_loader),
            templates: deps.templates.clone(),
            mailer: Arc::clone(&deps.mailer),
            receipts: Arc::clone(&deps.receipts),
        }
    }
}

#[async_trait]
impl Strategy for UserStrategy {
    async fn dispatch(
        &self,
        client_id: &str,
        target_id: &str,
        mut options: Options,
    ) -> Result<Vec<Delivery>, DispatchError> {
        let token = self.token_loader.load().await.context(error::LoadTokenSnafu)?;

        let recipients = vec![Recipient::new(target_id)];

        let templates = self
            .templates
            .load(client_id, &options.kind_id, ContentSuffix::User)
            .await
            .context(error::LoadTemplatesSnafu)?;

        options.endorsement = USER_ENDORSEMENT.to_string();

        let deliveries = self
            .mailer
            .deliver(
                recipients,
                &options,
                &Space::default(),
                &Organization::default(),
                client_id,
                "",
                &templates,
                &token,
            )
            .await;

        self.receipts
            .create(client_id, &options.kind_id, &[target_id.to_string()])
            .await
            .context(error::RecordReceiptsSnafu)?;

        Ok(deliveries)
    }
}
