use std::time::Duration;

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::ApiConfig;
use crate::staffing::api_types::{ApiActivity, ApiProject, ApiTokenResponse};
use crate::staffing::types::{Activity, Credential, Project};
use crate::staffing::JobSource;

/// Status filter the API uses for open staffing needs
const TO_BE_STAFFED: &str = "to_be_staffed";

/// Staffing API client wrapper
#[derive(Clone)]
pub struct StaffingClient {
  http: reqwest::Client,
  base_url: Url,
  token_url: Url,
  client_id: String,
  client_secret: String,
}

impl StaffingClient {
  pub fn new(api: &ApiConfig, client_secret: String) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(api.timeout_secs))
      .user_agent(concat!("staffwatch/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Self::with_http_client(http, api, client_secret)
  }

  fn with_http_client(http: reqwest::Client, api: &ApiConfig, client_secret: String) -> Result<Self> {
    let base_url = normalize_base(&api.base_url)?;
    let token_url = Url::parse(&api.token_url)
      .map_err(|e| eyre!("Invalid token url {}: {}", api.token_url, e))?;

    Ok(Self {
      http,
      base_url,
      token_url,
      client_id: api.client_id.clone(),
      client_secret,
    })
  }

  fn endpoint(&self, path: &str) -> Result<Url> {
    self
      .base_url
      .join(path)
      .map_err(|e| eyre!("Invalid endpoint {}: {}", path, e))
  }

  /// GET a JSON resource with bearer auth
  async fn get_json<T: DeserializeOwned>(&self, url: Url, credential: &Credential) -> Result<T> {
    debug!(%url, "GET");

    let response = self
      .http
      .get(url.clone())
      .bearer_auth(&credential.access_token)
      .send()
      .await
      .map_err(|e| eyre!("Request to {} failed: {}", url, e))?
      .error_for_status()
      .map_err(|e| eyre!("Request to {} was rejected: {}", url, e))?;

    response
      .json::<T>()
      .await
      .map_err(|e| eyre!("Failed to parse response from {}: {}", url, e))
  }
}

#[async_trait]
impl JobSource for StaffingClient {
  /// Exchange client credentials for an access token
  async fn access_token(&self) -> Result<Credential> {
    let params = [
      ("grant_type", "client_credentials"),
      ("client_id", self.client_id.as_str()),
      ("client_secret", self.client_secret.as_str()),
    ];

    let response: ApiTokenResponse = self
      .http
      .post(self.token_url.clone())
      .form(&params)
      .send()
      .await
      .map_err(|e| eyre!("Failed to request access token: {}", e))?
      .error_for_status()
      .map_err(|e| eyre!("Access token request was rejected: {}", e))?
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse access token response: {}", e))?;

    if let Some(kind) = response.token_type.as_deref() {
      if !kind.eq_ignore_ascii_case("bearer") {
        return Err(eyre!("Unsupported token type: {}", kind));
      }
    }

    Ok(Credential {
      access_token: response.access_token,
    })
  }

  /// Get all projects that currently have staffing needs
  async fn fetch_projects_to_be_staffed(&self, credential: &Credential) -> Result<Vec<Project>> {
    let mut url = self.endpoint("projects")?;
    url.query_pairs_mut().append_pair("status", TO_BE_STAFFED);

    let projects: Vec<ApiProject> = self.get_json(url, credential).await?;
    debug!(count = projects.len(), "Fetched projects");

    Ok(projects.into_iter().map(Project::from).collect())
  }

  /// Get the open activities of the given projects
  async fn fetch_activities_to_be_staffed(
    &self,
    credential: &Credential,
    projects: &[Project],
  ) -> Result<Vec<Activity>> {
    if projects.is_empty() {
      return Ok(Vec::new());
    }

    let project_ids = projects
      .iter()
      .map(|p| p.id.as_str())
      .collect::<Vec<_>>()
      .join(",");

    let mut url = self.endpoint("activities")?;
    url
      .query_pairs_mut()
      .append_pair("status", TO_BE_STAFFED)
      .append_pair("projectIds", &project_ids);

    let activities: Vec<ApiActivity> = self.get_json(url, credential).await?;
    debug!(count = activities.len(), "Fetched activities");

    Ok(activities.into_iter().map(Activity::from).collect())
  }
}

/// Parse the API base url so that relative joins append to its path.
fn normalize_base(raw: &str) -> Result<Url> {
  let mut raw = raw.trim().to_string();
  if !raw.ends_with('/') {
    raw.push('/');
  }
  Url::parse(&raw).map_err(|e| eyre!("Invalid API base url {}: {}", raw, e))
}
