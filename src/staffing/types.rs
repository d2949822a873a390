use serde::{Deserialize, Serialize};

/// Access credential handed out by the staffing API
#[derive(Clone)]
pub struct Credential {
  pub access_token: String,
}

impl std::fmt::Debug for Credential {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credential")
      .field("access_token", &"<redacted>")
      .finish()
  }
}

/// Project that has open staffing needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
  pub id: String,
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub customer: Option<String>,
}

/// Activity (role) within a project that needs to be staffed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
  /// Identity used for change detection. `None` for malformed records.
  #[serde(default)]
  pub id: Option<String>,
  pub title: String,
  pub project_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub start_date: Option<String>,
}

/// A staffing opportunity: one activity together with its project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
  pub project: Project,
  pub activity: Activity,
}

impl Job {
  /// Key used to decide whether two jobs are the same job.
  ///
  /// Only the activity id counts; a job whose project changed is still the same job.
  pub fn identity(&self) -> Option<&str> {
    self.activity.id.as_deref()
  }
}

pub type JobList = Vec<Job>;
