//! Reconciles a fresh job list against the cached snapshot.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::staffing::types::Job;

/// Outcome of comparing two job lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
  /// There was no previous snapshot to compare against
  Bootstrap,
  /// The fresh list is missing, so there is nothing to compare
  NoFreshData,
  /// Both lists were present and have been diffed
  Diffed { added: Vec<Job>, removed: Vec<Job> },
}

/// Change report handed to callers and notifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeReport {
  pub is_init: bool,
  pub has_changes: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub added_jobs: Option<Vec<Job>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub removed_jobs: Option<Vec<Job>>,
}

impl From<Comparison> for ChangeReport {
  fn from(comparison: Comparison) -> Self {
    match comparison {
      Comparison::Bootstrap => ChangeReport {
        is_init: true,
        has_changes: false,
        added_jobs: None,
        removed_jobs: None,
      },
      Comparison::NoFreshData => ChangeReport {
        is_init: false,
        has_changes: false,
        added_jobs: None,
        removed_jobs: None,
      },
      Comparison::Diffed { added, removed } => ChangeReport {
        is_init: false,
        has_changes: !added.is_empty() || !removed.is_empty(),
        added_jobs: Some(added),
        removed_jobs: Some(removed),
      },
    }
  }
}

/// Classify the difference between `fresh` and `old`.
///
/// A missing `old` wins over a missing `fresh`.
pub fn diff(fresh: Option<&[Job]>, old: Option<&[Job]>) -> Comparison {
  let (fresh, old) = match (fresh, old) {
    (_, None) => return Comparison::Bootstrap,
    (None, Some(_)) => return Comparison::NoFreshData,
    (Some(fresh), Some(old)) => (fresh, old),
  };

  Comparison::Diffed {
    added: missing_from(fresh, old),
    removed: missing_from(old, fresh),
  }
}

/// Compare a fresh job list against the cached one.
pub fn compare(fresh: Option<&[Job]>, old: Option<&[Job]>) -> ChangeReport {
  diff(fresh, old).into()
}

/// Jobs of `jobs` whose activity id does not occur in `other`, in `jobs` order.
///
/// Jobs without an activity id never match anything.
fn missing_from(jobs: &[Job], other: &[Job]) -> Vec<Job> {
  let known: HashSet<&str> = other.iter().filter_map(Job::identity).collect();

  jobs
    .iter()
    .filter(|job| !job.identity().is_some_and(|id| known.contains(id)))
    .cloned()
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::staffing::types::{Activity, Project};

  fn job_in(activity: &str, project: &str) -> Job {
    Job {
      project: Project {
        id: project.to_string(),
        name: format!("Project {}", project),
        customer: None,
      },
      activity: Activity {
        id: Some(activity.to_string()),
        title: format!("Activity {}", activity),
        project_id: project.to_string(),
        description: None,
        start_date: None,
      },
    }
  }

  fn job(activity: u32) -> Job {
    job_in(&activity.to_string(), "p")
  }

  fn jobs(ids: &[u32]) -> Vec<Job> {
    ids.iter().copied().map(job).collect()
  }

  fn ids(jobs: &Option<Vec<Job>>) -> Vec<String> {
    jobs
      .as_ref()
      .unwrap()
      .iter()
      .map(|j| j.identity().unwrap().to_string())
      .collect()
  }

  #[test]
  fn test_added_and_removed() {
    let old = jobs(&[1, 2, 3]);
    let fresh = jobs(&[2, 3, 4, 5]);

    let report = compare(Some(fresh.as_slice()), Some(old.as_slice()));

    assert!(!report.is_init);
    assert!(report.has_changes);
    assert_eq!(ids(&report.added_jobs), vec!["4", "5"]);
    assert_eq!(ids(&report.removed_jobs), vec!["1"]);
  }

  #[test]
  fn test_no_old_list_is_bootstrap() {
    let fresh = jobs(&[1, 2]);

    assert_eq!(diff(Some(fresh.as_slice()), None), Comparison::Bootstrap);
    assert_eq!(diff(None, None), Comparison::Bootstrap);

    let report = compare(Some(fresh.as_slice()), None);
    assert!(report.is_init);
    assert!(!report.has_changes);
    assert!(report.added_jobs.is_none());
    assert!(report.removed_jobs.is_none());
  }

  #[test]
  fn test_no_fresh_list() {
    let old = jobs(&[1, 2]);

    assert_eq!(diff(None, Some(old.as_slice())), Comparison::NoFreshData);

    let report = compare(None, Some(old.as_slice()));
    assert!(!report.is_init);
    assert!(!report.has_changes);
    assert!(report.added_jobs.is_none());
    assert!(report.removed_jobs.is_none());
  }

  #[test]
  fn test_identical_lists() {
    let list = jobs(&[1, 2, 3]);

    let report = compare(Some(list.as_slice()), Some(list.as_slice()));

    assert!(!report.has_changes);
    assert_eq!(report.added_jobs, Some(vec![]));
    assert_eq!(report.removed_jobs, Some(vec![]));
  }

  #[test]
  fn test_both_empty() {
    let report = compare(Some(&[][..]), Some(&[][..]));
    assert!(!report.is_init);
    assert!(!report.has_changes);
    assert_eq!(report.added_jobs, Some(vec![]));
    assert_eq!(report.removed_jobs, Some(vec![]));
  }

  #[test]
  fn test_added_removed_symmetry() {
    let cases = [
      (jobs(&[1, 2, 3]), jobs(&[2, 3, 4, 5])),
      (jobs(&[]), jobs(&[7, 8])),
      (jobs(&[9, 1, 4]), jobs(&[4, 9, 1])),
      (jobs(&[5, 6]), jobs(&[])),
    ];

    for (a, b) in cases {
      let forward = compare(Some(a.as_slice()), Some(b.as_slice()));
      let backward = compare(Some(b.as_slice()), Some(a.as_slice()));
      assert_eq!(forward.added_jobs, backward.removed_jobs);
      assert_eq!(forward.removed_jobs, backward.added_jobs);
    }
  }

  #[test]
  fn test_preserves_input_order() {
    let old = jobs(&[9, 3, 7, 1]);
    let fresh = jobs(&[8, 1, 6, 2]);

    let report = compare(Some(fresh.as_slice()), Some(old.as_slice()));

    assert_eq!(ids(&report.added_jobs), vec!["8", "6", "2"]);
    assert_eq!(ids(&report.removed_jobs), vec!["9", "3", "7"]);
  }

  #[test]
  fn test_project_change_is_not_a_change() {
    let old = vec![job_in("1", "alpha")];
    let fresh = vec![job_in("1", "beta")];

    let report = compare(Some(fresh.as_slice()), Some(old.as_slice()));

    assert!(!report.has_changes);
    assert_eq!(report.added_jobs, Some(vec![]));
    assert_eq!(report.removed_jobs, Some(vec![]));
  }

  #[test]
  fn test_jobs_without_activity_id_never_match() {
    let mut malformed = job(1);
    malformed.activity.id = None;
    let list = vec![malformed.clone(), job(2)];

    let report = compare(Some(list.as_slice()), Some(list.as_slice()));

    assert!(report.has_changes);
    assert_eq!(report.added_jobs, Some(vec![malformed.clone()]));
    assert_eq!(report.removed_jobs, Some(vec![malformed]));
  }

  #[test]
  fn test_report_json_shape() {
    let init = serde_json::to_value(compare(Some(jobs(&[1]).as_slice()), None)).unwrap();
    assert_eq!(init, serde_json::json!({ "isInit": true, "hasChanges": false }));

    let empty = serde_json::to_value(compare(None, Some(jobs(&[1]).as_slice()))).unwrap();
    assert_eq!(empty, serde_json::json!({ "isInit": false, "hasChanges": false }));

    let list = jobs(&[1]);
    let diffed = serde_json::to_value(compare(Some(&list[..]), Some(&list[..]))).unwrap();
    assert_eq!(
      diffed,
      serde_json::json!({
        "isInit": false,
        "hasChanges": false,
        "addedJobs": [],
        "removedJobs": [],
      })
    );
  }
}
