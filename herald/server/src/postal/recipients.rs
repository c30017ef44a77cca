//! Recipient resolvers: each addressing scheme maps a selector onto a set of
//! user guids by querying the directory. Resolution errors are handed back
//! unchanged; callers only care that resolution failed.

use std::sync::Arc;

use crate::{
    directory::{self, OrgDirectory, UserDirectory},
    postal::Recipient,
};
use herald_core::model::OrgRole;

/// Resolves every known user in the system.
#[derive(Clone)]
pub struct AllUsersResolver {
    directory: Arc<dyn UserDirectory>,
}

impl AllUsersResolver {
    #[must_use]
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self { Self { directory } }

    /// # Errors
    ///
    /// Propagates the directory error unchanged.
    pub async fn resolve(&self, token: &str) -> Result<Vec<Recipient>, directory::Error> {
        Ok(into_recipients(self.directory.all_user_guids(token).await?))
    }
}

/// Resolves users holding a named authorization scope.
#[derive(Clone)]
pub struct ScopeResolver {
    directory: Arc<dyn UserDirectory>,
}

impl ScopeResolver {
    #[must_use]
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self { Self { directory } }

    /// # Errors
    ///
    /// Propagates the directory error unchanged.
    pub async fn resolve(
        &self,
        scope: &str,
        token: &str,
    ) -> Result<Vec<Recipient>, directory::Error> {
        Ok(into_recipients(self.directory.user_guids_with_scope(scope, token).await?))
    }
}

/// Resolves users belonging to a space.
#[derive(Clone)]
pub struct SpaceResolver {
    directory: Arc<dyn OrgDirectory>,
}

impl SpaceResolver {
    #[must_use]
    pub fn new(directory: Arc<dyn OrgDirectory>) -> Self { Self { directory } }

    /// # Errors
    ///
    /// Propagates the directory error unchanged.
    pub async fn resolve(
        &self,
        space_guid: &str,
        token: &str,
    ) -> Result<Vec<Recipient>, directory::Error> {
        Ok(into_recipients(self.directory.user_guids_in_space(space_guid, token).await?))
    }
}

/// Resolves members of an organization, optionally narrowed to one role.
/// Role strings are validated at the web boundary; by the time a resolver
/// runs the role is already a well-formed [`OrgRole`].
#[derive(Clone)]
pub struct OrganizationResolver {
    directory: Arc<dyn OrgDirectory>,
}

impl OrganizationResolver {
    #[must_use]
    pub fn new(directory: Arc<dyn OrgDirectory>) -> Self { Self { directory } }

    /// # Errors
    ///
    /// Propagates the directory error unchanged.
    pub async fn resolve(
        &self,
        org_guid: &str,
        role: Option<OrgRole>,
        token: &str,
    ) -> Result<Vec<Recipient>, directory::Error> {
        Ok(into_recipients(
            self.directory.user_guids_in_organization(org_guid, role, token).await?,
        ))
    }
}

/// Membership listings may repeat a guid (a user can hold several roles in
/// the same listing); the recipient set never does.
fn into_recipients(mut guids: Vec<String>) -> Vec<Recipient> {
    guids.sort_unstable();
    guids.dedup();
    guids.into_iter().map(Recipient::new).collect()
}
