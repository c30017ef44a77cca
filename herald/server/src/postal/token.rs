use std::sync::Arc;

use async_trait::async_trait;

use crate::directory::{self, UaaClient};

/// Obtains the short-lived service credential used to authorize directory
/// queries. A failure here aborts the whole dispatch.
#[async_trait]
pub trait TokenLoader: Send + Sync {
    async fn load(&self) -> Result<String, directory::Error>;
}

/// Production token loader backed by the UAA client-credentials grant.
#[derive(Clone)]
pub struct UaaTokenLoader {
    uaa: Arc<UaaClient>,
}

impl UaaTokenLoader {
    #[must_use]
    pub fn new(uaa: Arc<UaaClient>) -> Self { Self { uaa } }
}

#[async_trait]
impl TokenLoader for UaaTokenLoader {
    async fn load(&self) -> Result<String, directory::Error> { self.uaa.fetch_token().await }
}
