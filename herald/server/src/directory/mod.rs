//! HTTP clients for the platform directory: the identity provider (UAA) owns
//! users, scopes and email addresses; the Cloud Controller owns organization
//! and space membership.

pub mod cloud_controller;
mod error;
pub mod uaa;

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use self::{cloud_controller::CloudControllerClient, error::Error, uaa::UaaClient};
use herald_core::model::OrgRole;

/// Read-only queries against the user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Every known user guid in the system.
    async fn all_user_guids(&self, token: &str) -> Result<Vec<String>, Error>;

    /// Guids of users holding the named authorization scope.
    async fn user_guids_with_scope(&self, scope: &str, token: &str) -> Result<Vec<String>, Error>;

    /// Email addresses registered for one user. May be empty.
    async fn user_emails(&self, user_guid: &str, token: &str) -> Result<Vec<String>, Error>;
}

/// Read-only queries against org/space membership.
#[async_trait]
pub trait OrgDirectory: Send + Sync {
    async fn load_space(&self, space_guid: &str, token: &str) -> Result<Space, Error>;

    async fn load_organization(&self, org_guid: &str, token: &str)
        -> Result<Organization, Error>;

    async fn user_guids_in_space(&self, space_guid: &str, token: &str)
        -> Result<Vec<String>, Error>;

    /// Members of an organization, optionally narrowed to one role.
    async fn user_guids_in_organization(
        &self,
        org_guid: &str,
        role: Option<OrgRole>,
        token: &str,
    ) -> Result<Vec<String>, Error>;
}

/// Space projection. Zero-value when the addressing scheme involves no space.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Space {
    pub guid: String,
    pub name: String,
    pub organization_guid: String,
}

/// Organization projection. Zero-value when the addressing scheme involves no
/// organization.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Organization {
    pub guid: String,
    pub name: String,
}

/// Emits the latency of an external directory request as a structured event,
/// keyed the same way the dashboards expect.
pub(crate) fn record_request_duration(metric: &'static str, started: Instant) {
    tracing::info!(
        target: "herald::metrics",
        metric,
        duration_seconds = started.elapsed().as_secs_f64(),
        "external request finished"
    );
}
