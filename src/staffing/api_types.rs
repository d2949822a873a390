//! Serde-deserializable types matching staffing API responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use serde::{Deserialize, Deserializer};

use super::types::{Activity, Project};

/// Ids come back as strings on some endpoints and as numbers on others.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
  Text(String),
  Number(i64),
}

impl From<RawId> for String {
  fn from(raw: RawId) -> Self {
    match raw {
      RawId::Text(s) => s,
      RawId::Number(n) => n.to_string(),
    }
  }
}

fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  RawId::deserialize(deserializer).map(String::from)
}

fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

// ============================================================================
// Token endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiTokenResponse {
  pub access_token: String,
  #[serde(default)]
  pub token_type: Option<String>,
}

// ============================================================================
// Projects endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiProject {
  #[serde(deserialize_with = "de_id")]
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub customer_name: Option<String>,
}

impl From<ApiProject> for Project {
  fn from(p: ApiProject) -> Self {
    Project {
      id: p.id,
      name: p.name,
      customer: p.customer_name,
    }
  }
}

// ============================================================================
// Activities endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiActivity {
  #[serde(default, deserialize_with = "de_opt_id")]
  pub id: Option<String>,
  #[serde(default)]
  pub title: String,
  #[serde(deserialize_with = "de_id")]
  pub project_id: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub start_date: Option<String>,
}

impl From<ApiActivity> for Activity {
  fn from(a: ApiActivity) -> Self {
    Activity {
      id: a.id,
      title: a.title,
      project_id: a.project_id,
      description: a.description,
      start_date: a.start_date,
    }
  }
}
