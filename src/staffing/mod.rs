//! Remote staffing API: wire types, HTTP client and job serialization.

pub mod api_types;
pub mod client;
pub mod serializer;
pub mod types;

use async_trait::async_trait;
use color_eyre::Result;

use types::{Activity, Credential, Project};

/// Source of raw staffing records.
///
/// Every call may fail with a transport or authorization error; callers
/// propagate those unchanged.
#[async_trait]
pub trait JobSource: Send + Sync {
  async fn access_token(&self) -> Result<Credential>;

  async fn fetch_projects_to_be_staffed(&self, credential: &Credential) -> Result<Vec<Project>>;

  /// Activities are scoped to a known project set.
  async fn fetch_activities_to_be_staffed(
    &self,
    credential: &Credential,
    projects: &[Project],
  ) -> Result<Vec<Activity>>;
}
