//! Identity provider (UAA) client: service tokens plus SCIM user and group
//! queries.

use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;
use snafu::ResultExt;

use super::{error, record_request_duration, Error, UserDirectory};
use herald_core::config::UaaConfig;

const USERS_PAGE_SIZE: usize = 500;

/// UAA client speaking the OAuth token endpoint and the SCIM API.
#[derive(Clone)]
pub struct UaaClient {
    http: reqwest::Client,
    host: String,
    client_id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScimUserPage {
    resources: Vec<ScimUserId>,
    total_results: usize,
}

#[derive(Debug, Deserialize)]
struct ScimUserId {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScimGroupPage {
    resources: Vec<ScimGroup>,
}

#[derive(Debug, Deserialize)]
struct ScimGroup {
    #[serde(default)]
    members: Vec<ScimGroupMember>,
}

#[derive(Debug, Deserialize)]
struct ScimGroupMember {
    value: String,
}

#[derive(Debug, Deserialize)]
struct ScimUser {
    #[serde(default)]
    emails: Vec<ScimEmail>,
}

#[derive(Debug, Deserialize)]
struct ScimEmail {
    value: String,
}

impl UaaClient {
    /// Creates a new UAA client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &UaaConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .context(error::BuildClientSnafu)?;

        Ok(Self {
            http,
            host: config.host.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }

    /// Fetches a client-credentials token scoped to read directory data.
    ///
    /// # Errors
    ///
    /// Returns an error when the identity provider is unreachable or rejects
    /// the service credentials.
    pub async fn fetch_token(&self) -> Result<String, Error> {
        let url = format!("{}/oauth/token", self.host);
        let started = Instant::now();

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context(error::RequestSnafu { url: url.clone() })?;

        if !response.status().is_success() {
            return Err(Error::UnexpectedStatus { url, status: response.status().as_u16() });
        }

        let token: TokenResponse =
            response.json().await.context(error::DecodeResponseSnafu { url })?;

        record_request_duration("external-requests.uaa.token", started);

        Ok(token.access_token)
    }

    async fn get_json<T>(&self, url: String, token: &str) -> Result<T, Error>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .header(http::header::ACCEPT, mime::APPLICATION_JSON.as_ref())
            .send()
            .await
            .context(error::RequestSnafu { url: url.clone() })?;

        if !response.status().is_success() {
            return Err(Error::UnexpectedStatus { url, status: response.status().as_u16() });
        }

        response.json().await.context(error::DecodeResponseSnafu { url })
    }
}

#[async_trait]
impl UserDirectory for UaaClient {
    async fn all_user_guids(&self, token: &str) -> Result<Vec<String>, Error> {
        let started = Instant::now();
        let mut guids = Vec::new();

        // SCIM pages are 1-indexed by `startIndex`.
        loop {
            let url = format!(
                "{}/Users?attributes=id&startIndex={}&count={USERS_PAGE_SIZE}",
                self.host,
                guids.len() + 1,
            );
            let page: ScimUserPage = self.get_json(url, token).await?;

            if page.resources.is_empty() {
                break;
            }

            guids.extend(page.resources.into_iter().map(|user| user.id));

            if guids.len() >= page.total_results {
                break;
            }
        }

        record_request_duration("external-requests.uaa.all-users", started);

        Ok(guids)
    }

    async fn user_guids_with_scope(&self, scope: &str, token: &str) -> Result<Vec<String>, Error> {
        let started = Instant::now();

        let filter = urlencoding::encode(&format!("displayName eq \"{scope}\"")).into_owned();
        let url = format!("{}/Groups?filter={filter}", self.host);
        let page: ScimGroupPage = self.get_json(url, token).await?;

        record_request_duration("external-requests.uaa.users-with-scope", started);

        Ok(page
            .resources
            .into_iter()
            .next()
            .map(|group| group.members.into_iter().map(|member| member.value).collect())
            .unwrap_or_default())
    }

    async fn user_emails(&self, user_guid: &str, token: &str) -> Result<Vec<String>, Error> {
        let started = Instant::now();

        let url = format!("{}/Users/{user_guid}", self.host);
        let user: ScimUser = self.get_json(url, token).await?;

        record_request_duration("external-requests.uaa.user-emails", started);

        Ok(user.emails.into_iter().map(|email| email.value).collect())
    }
}
