//! Cloud Controller client: org/space projections and membership listings.

use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;
use snafu::ResultExt;

use super::{error, record_request_duration, Error, OrgDirectory, Organization, Space};
use herald_core::{config::CloudControllerConfig, model::OrgRole};

/// Cloud Controller client speaking the v2 API.
#[derive(Clone)]
pub struct CloudControllerClient {
    http: reqwest::Client,
    host: String,
}

#[derive(Debug, Deserialize)]
struct Resource<E> {
    metadata: Metadata,
    entity: E,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    guid: String,
}

#[derive(Debug, Deserialize)]
struct SpaceEntity {
    name: String,
    organization_guid: String,
}

#[derive(Debug, Deserialize)]
struct OrganizationEntity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct UserEntity {}

#[derive(Debug, Deserialize)]
struct Page<E> {
    next_url: Option<String>,
    resources: Vec<Resource<E>>,
}

impl CloudControllerClient {
    /// Creates a new Cloud Controller client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &CloudControllerConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .context(error::BuildClientSnafu)?;

        Ok(Self { http, host: config.host.clone() })
    }

    async fn get_json<T>(&self, url: String, token: &str) -> Result<T, Error>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .context(error::RequestSnafu { url: url.clone() })?;

        if !response.status().is_success() {
            return Err(Error::UnexpectedStatus { url, status: response.status().as_u16() });
        }

        response.json().await.context(error::DecodeResponseSnafu { url })
    }

    /// Walks a paginated user listing, following `next_url` until exhausted.
    async fn list_user_guids(&self, path: String, token: &str) -> Result<Vec<String>, Error> {
        let mut guids = Vec::new();
        let mut next = Some(path);

        while let Some(path) = next {
            let page: Page<UserEntity> =
                self.get_json(format!("{}{path}", self.host), token).await?;

            guids.extend(page.resources.into_iter().map(|resource| resource.metadata.guid));
            next = page.next_url;
        }

        Ok(guids)
    }
}

#[async_trait]
impl OrgDirectory for CloudControllerClient {
    async fn load_space(&self, space_guid: &str, token: &str) -> Result<Space, Error> {
        let started = Instant::now();

        let url = format!("{}/v2/spaces/{space_guid}", self.host);
        let resource: Resource<SpaceEntity> = self.get_json(url, token).await?;

        record_request_duration("external-requests.cc.space", started);

        Ok(Space {
            guid: resource.metadata.guid,
            name: resource.entity.name,
            organization_guid: resource.entity.organization_guid,
        })
    }

    async fn load_organization(
        &self,
        org_guid: &str,
        token: &str,
    ) -> Result<Organization, Error> {
        let started = Instant::now();

        let url = format!("{}/v2/organizations/{org_guid}", self.host);
        let resource: Resource<OrganizationEntity> = self.get_json(url, token).await?;

        record_request_duration("external-requests.cc.organization", started);

        Ok(Organization { guid: resource.metadata.guid, name: resource.entity.name })
    }

    async fn user_guids_in_space(
        &self,
        space_guid: &str,
        token: &str,
    ) -> Result<Vec<String>, Error> {
        let started = Instant::now();

        let guids = self.list_user_guids(format!("/v2/spaces/{space_guid}/developers"), token).await;

        record_request_duration("external-requests.cc.users-by-space", started);

        guids
    }

    async fn user_guids_in_organization(
        &self,
        org_guid: &str,
        role: Option<OrgRole>,
        token: &str,
    ) -> Result<Vec<String>, Error> {
        let started = Instant::now();

        let segment = match role {
            None => "users",
            Some(OrgRole::OrgManager) => "managers",
            Some(OrgRole::OrgAuditor) => "auditors",
            Some(OrgRole::BillingManager) => "billing_managers",
        };

        let guids =
            self.list_user_guids(format!("/v2/organizations/{org_guid}/{segment}"), token).await;

        record_request_duration("external-requests.cc.users-by-organization", started);

        guids
    }
}
