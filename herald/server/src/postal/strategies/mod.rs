//! Addressing strategies. Each one expands a target identifier into a
//! recipient set, resolves the matching templates, stamps its endorsement
//! and hands the batch to the mailer. The dispatch sequence is identical
//! across variants; only recipient resolution differs.

mod everyone;
mod organization;
mod space;
mod uaa_scope;
mod user;

use std::sync::Arc;

use async_trait::async_trait;

pub use self::{
    everyone::{EveryoneStrategy, EVERYONE_ENDORSEMENT},
    organization::{OrganizationStrategy, ORGANIZATION_ENDORSEMENT},
    space::{SpaceStrategy, SPACE_ENDORSEMENT},
    uaa_scope::{UaaScopeStrategy, UAA_SCOPE_ENDORSEMENT},
    user::{UserStrategy, USER_ENDORSEMENT},
};
use crate::{
    directory::{OrgDirectory, UserDirectory},
    postal::{Delivery, DispatchError, Mailer, Options, Recipient, TemplateResolver, TokenLoader},
    service::ReceiptsRepo,
};

/// One addressing scheme.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Expands `target_id`, delivers to every resolved recipient and returns
    /// one delivery record per recipient. Fatal errors abort the whole
    /// dispatch; per-recipient failures do not.
    async fn dispatch(
        &self,
        client_id: &str,
        target_id: &str,
        options: Options,
    ) -> Result<Vec<Delivery>, DispatchError>;
}

/// Collaborators shared by every strategy, injected once at startup.
#[derive(Clone)]
pub struct StrategyDeps {
    pub token_loader: Arc<dyn TokenLoader>,
    pub users: Arc<dyn UserDirectory>,
    pub orgs: Arc<dyn OrgDirectory>,
    pub templates: TemplateResolver,
    pub mailer: Arc<Mailer>,
    pub receipts: Arc<dyn ReceiptsRepo>,
}

/// The five concrete strategies, ready for the router to pick from.
#[derive(Clone)]
pub struct Strategies {
    pub user: Arc<dyn Strategy>,
    pub space: Arc<dyn Strategy>,
    pub organization: Arc<dyn Strategy>,
    pub everyone: Arc<dyn Strategy>,
    pub uaa_scope: Arc<dyn Strategy>,
}

impl Strategies {
    #[must_use]
    pub fn new(deps: &StrategyDeps) -> Self {
        Self {
            user: Arc::new(UserStrategy::new(deps)),
            space: Arc::new(SpaceStrategy::new(deps)),
            organization: Arc::new(OrganizationStrategy::new(deps)),
            everyone: Arc::new(EveryoneStrategy::new(deps)),
            uaa_scope: Arc::new(UaaScopeStrategy::new(deps)),
        }
    }
}

fn guids_of(recipients: &[Recipient]) -> Vec<String> {
    recipients.iter().map(|recipient| recipient.guid.clone()).collect()
}
