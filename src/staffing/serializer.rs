//! Merges raw projects and activities into the normalized job list.

use std::collections::HashMap;

use tracing::debug;

use super::types::{Activity, Job, JobList, Project};

/// Build one job per activity, in activity order, joined to its project.
///
/// Activities that reference a project outside `projects` are dropped.
pub fn serialize(projects: &[Project], activities: &[Activity]) -> JobList {
  let by_id: HashMap<&str, &Project> = projects.iter().map(|p| (p.id.as_str(), p)).collect();

  activities
    .iter()
    .filter_map(|activity| match by_id.get(activity.project_id.as_str()) {
      Some(project) => Some(Job {
        project: (*project).clone(),
        activity: activity.clone(),
      }),
      None => {
        debug!(
          activity = ?activity.id,
          project = %activity.project_id,
          "Dropping activity for unknown project"
        );
        None
      }
    })
    .collect()
}
