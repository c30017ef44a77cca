use std::sync::Arc;

use async_trait::async_trait;
use snafu::ResultExt;

use super::{Strategy, StrategyDeps};
use crate::{
    directory::{Organization, Space},
    postal::{
        error, templates::ContentSuffix, AllUsersResolver, Delivery, DispatchError, Mailer,
        Options, TemplateResolver, TokenLoader,
    },
};

pub const EVERYONE_ENDORSEMENT: &str = "This message was sent to everyone.";

/// Delivers to every known user. Broadcasts are not individually tracked, so
/// no receipts are recorded.
pub struct EveryoneStrategy {
    token_loader: Arc<dyn TokenLoader>,
    resolver: AllUsersResolver,
    templates: TemplateResolver,
    mailer: Arc<Mailer>,
}

impl EveryoneStrategy {
    #[must_use]
    pub fn new(deps: &StrategyDeps) -> Self {
        Self {
            token_loader: Arc::clone(&deps.token_loader),
            resolver: AllUsersResolver::new(Arc::clone(&deps.users)),
            templates: deps.templates.clone(),
            mailer: Arc::clone(&deps.mailer),
        }
    }
}

#[async_trait]
impl Strategy for EveryoneStrategy {
    async fn dispatch(
        &self,
        client_id: &str,
        _target_id: &str,
        mut options: Options,
    ) -> Result<Vec<Delivery>, DispatchError> {
        let token = self.token_loader.load().await.context(error::LoadTokenSnafu)?;

        let recipients =
            self.resolver.resolve(&token).await.context(error::ResolveRecipientsSnafu)?;

        let templates = self
            .templates
            .load(client_id, &options.kind_id, ContentSuffix::Everyone)
            .await
            .context(error::LoadTemplatesSnafu)?;

        options.endorsement = EVERYONE_ENDORSEMENT.to_string();

        Ok(self
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
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::{EveryoneStrategy, Strategy, EVERYONE_ENDORSEMENT};
    use crate::postal::{
        strategies::test_support::harness,
        testing::{FakeOrgDirectory, FakeTemplates, FakeTokenLoader, FakeUserDirectory},
        DispatchError, Options,
    };

    fn options() -> Options {
        Options {
            kind_id: "welcome_user".to_string(),
            subject: "Your Official Welcome".to_string(),
            text: "Welcome to the system, now get off my lawn.".to_string(),
            ..Options::default()
        }
    }

    fn users() -> FakeUserDirectory {
        FakeUserDirectory {
            all_users: vec!["user-380".to_string(), "user-319".to_string()],
            ..FakeUserDirectory::with_emails(&[
                ("user-380", &["user-380@example.com"]),
                ("user-319", &["user-319@example.com"]),
            ])
        }
    }

    #[tokio::test]
    async fn delivers_to_every_known_user() {
        let h = harness(
            users(),
            FakeOrgDirectory::default(),
            FakeTemplates::with_defaults(),
            FakeTokenLoader::default(),
        );
        let strategy = EveryoneStrategy::new(&h.deps);

        let deliveries = strategy.dispatch("my-client", "", options()).await.unwrap();

        assert_eq!(deliveries.len(), 2);
        let mut guids: Vec<_> = deliveries.iter().map(|d| d.recipient.clone()).collect();
        guids.sort();
        assert_eq!(guids, ["user-319", "user-380"]);

        let sent = h.transport.sent.lock().unwrap();
        assert!(sent[0].text.as_deref().unwrap().contains(EVERYONE_ENDORSEMENT));
    }

    #[tokio::test]
    async fn broadcasts_record_no_receipts() {
        let h = harness(
            users(),
            FakeOrgDirectory::default(),
            FakeTemplates::with_defaults(),
            FakeTokenLoader::default(),
        );
        let strategy = EveryoneStrategy::new(&h.deps);

        let _ = strategy.dispatch("my-client", "", options()).await.unwrap();

        assert!(h.receipts.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn directory_failure_aborts_the_dispatch() {
        let users = FakeUserDirectory { fail_lookups: true, ..users() };
        let h = harness(
            users,
            FakeOrgDirectory::default(),
            FakeTemplates::with_defaults(),
            FakeTokenLoader::default(),
        );
        let strategy = EveryoneStrategy::new(&h.deps);

        let err = strategy.dispatch("my-client", "", options()).await.unwrap_err();

        assert!(matches!(err, DispatchError::ResolveRecipients { .. }));
    }
}
