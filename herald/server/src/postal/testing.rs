//! In-memory collaborators for the postal unit tests.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;

use crate::{
    directory::{self, OrgDirectory, Organization, Space, UserDirectory},
    postal::{IdGenerator, TokenLoader},
    service::{self, ReceiptsRepo, TemplateRow, TemplateStore},
};
use herald_core::model::OrgRole;
use herald_mail::{Error as MailError, MailTransport, OutgoingEmail};

fn unreachable_host_error() -> directory::Error {
    directory::Error::UnexpectedStatus { url: "http://directory.test".to_string(), status: 503 }
}

/// Deterministic id source.
#[derive(Debug, Default)]
pub(crate) struct CountingGenerator {
    next: AtomicUsize,
}

impl IdGenerator for CountingGenerator {
    fn generate(&self) -> String {
        format!("message-{}", self.next.fetch_add(1, Ordering::SeqCst))
    }
}

#[derive(Default)]
pub(crate) struct FakeTokenLoader {
    pub fail: bool,
    pub loads: AtomicUsize,
}

#[async_trait]
impl TokenLoader for FakeTokenLoader {
    async fn load(&self) -> Result<String, directory::Error> {
        let _ = self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(unreachable_host_error());
        }
        Ok("service-token".to_string())
    }
}

/// User directory fixture: all known guids, scope membership and per-user
/// email addresses.
#[derive(Default)]
pub(crate) struct FakeUserDirectory {
    pub all_users: Vec<String>,
    pub scopes: HashMap<String, Vec<String>>,
    pub emails: HashMap<String, Vec<String>>,
    pub fail_lookups: bool,
    pub email_lookups: AtomicUsize,
}

impl FakeUserDirectory {
    pub fn with_emails(entries: &[(&str, &[&str])]) -> Self {
        let emails = entries
            .iter()
            .map(|(guid, addresses)| {
                ((*guid).to_string(), addresses.iter().map(|a| (*a).to_string()).collect())
            })
            .collect();
        Self { emails, ..Self::default() }
    }
}

#[async_trait]
impl UserDirectory for FakeUserDirectory {
    async fn all_user_guids(&self, _token: &str) -> Result<Vec<String>, directory::Error> {
        if self.fail_lookups {
            return Err(unreachable_host_error());
        }
        Ok(self.all_users.clone())
    }

    async fn user_guids_with_scope(
        &self,
        scope: &str,
        _token: &str,
    ) -> Result<Vec<String>, directory::Error> {
        if self.fail_lookups {
            return Err(unreachable_host_error());
        }
        Ok(self.scopes.get(scope).cloned().unwrap_or_default())
    }

    async fn user_emails(
        &self,
        user_guid: &str,
        _token: &str,
    ) -> Result<Vec<String>, directory::Error> {
        let _ = self.email_lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookups {
            return Err(unreachable_host_error());
        }
        Ok(self.emails.get(user_guid).cloned().unwrap_or_default())
    }
}

/// Org/space directory fixture.
#[derive(Default)]
pub(crate) struct FakeOrgDirectory {
    pub spaces: HashMap<String, Space>,
    pub organizations: HashMap<String, Organization>,
    pub space_members: HashMap<String, Vec<String>>,
    pub org_members: HashMap<(String, Option<OrgRole>), Vec<String>>,
}

#[async_trait]
impl OrgDirectory for FakeOrgDirectory {
    async fn load_space(&self, space_guid: &str, _token: &str) -> Result<Space, directory::Error> {
        self.spaces.get(space_guid).cloned().ok_or_else(unreachable_host_error)
    }

    async fn load_organization(
        &self,
        org_guid: &str,
        _token: &str,
    ) -> Result<Organization, directory::Error> {
        self.organizations.get(org_guid).cloned().ok_or_else(unreachable_host_error)
    }

    async fn user_guids_in_space(
        &self,
        space_guid: &str,
        _token: &str,
    ) -> Result<Vec<String>, directory::Error> {
        self.space_members.get(space_guid).cloned().ok_or_else(unreachable_host_error)
    }

    async fn user_guids_in_organization(
        &self,
        org_guid: &str,
        role: Option<OrgRole>,
        _token: &str,
    ) -> Result<Vec<String>, directory::Error> {
        self.org_members
            .get(&(org_guid.to_string(), role))
            .cloned()
            .ok_or_else(unreachable_host_error)
    }
}

/// Mail transport fixture recording everything it was asked to send.
#[derive(Default)]
pub(crate) struct FakeTransport {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub fail_for: Vec<String>,
}

#[async_trait]
impl MailTransport for FakeTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        if self.fail_for.iter().any(|address| address == &email.to) {
            return Err(MailError::InvalidAddress {
                address: email.to.clone(),
                source: "@".parse::<lettre::Address>().unwrap_err(),
            });
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Receipt store fixture: appends every row it is handed.
#[derive(Default)]
pub(crate) struct FakeReceipts {
    pub rows: Mutex<Vec<(String, String, String)>>,
    pub fail: bool,
}

#[async_trait]
impl ReceiptsRepo for FakeReceipts {
    async fn create(
        &self,
        client_id: &str,
        kind_id: &str,
        user_guids: &[String],
    ) -> Result<(), service::Error> {
        if self.fail {
            return Err(service::Error::CreateReceipts { source: sqlx::Error::PoolClosed });
        }
        let mut rows = self.rows.lock().unwrap();
        for guid in user_guids {
            rows.push((client_id.to_string(), kind_id.to_string(), guid.clone()));
        }
        Ok(())
    }
}

/// Template store fixture holding a fixed set of named rows.
#[derive(Default)]
pub(crate) struct FakeTemplates {
    pub rows: HashMap<String, TemplateRow>,
    pub fail: bool,
}

impl FakeTemplates {
    /// Seeds the five global defaults with passthrough bodies.
    pub fn with_defaults() -> Self {
        let rows = ["user_body", "space_body", "organization_body", "everyone_body", "uaa_scope_body"]
            .into_iter()
            .map(|name| {
                (name.to_string(), TemplateRow {
                    name: name.to_string(),
                    subject: "Notification: {{subject}}".to_string(),
                    text: "{{endorsement}}\n\n{{text}}".to_string(),
                    html: "<p>{{endorsement}}</p>{{html}}".to_string(),
                })
            })
            .collect();
        Self { rows, fail: false }
    }
}

#[async_trait]
impl TemplateStore for FakeTemplates {
    async fn find_by_name(&self, name: &str) -> Result<Option<TemplateRow>, service::Error> {
        if self.fail {
            return Err(service::Error::FindTemplate { source: sqlx::Error::PoolClosed });
        }
        Ok(self.rows.get(name).cloned())
    }
}
