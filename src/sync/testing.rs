//! In-memory collaborators for exercising the sync cycle.

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::ChangeReport;
use crate::notify::subscribers::Subscriber;
use crate::notify::Notifier;
use crate::staffing::types::{Activity, Credential, Project};
use crate::staffing::JobSource;

#[derive(Default)]
pub struct FakeSource {
  pub projects: Mutex<Vec<Project>>,
  pub activities: Mutex<Vec<Activity>>,
  pub fail_activities: AtomicBool,
  pub token_calls: AtomicUsize,
  pub project_calls: AtomicUsize,
  pub activity_calls: AtomicUsize,
}

impl FakeSource {
  pub fn serving(activity_ids: &[&str]) -> Self {
    let source = Self::default();
    source.serve(activity_ids);
    source
  }

  /// Serve one project per activity id
  pub fn serve(&self, activity_ids: &[&str]) {
    let projects = activity_ids
      .iter()
      .map(|id| Project {
        id: format!("p{}", id),
        name: format!("Project {}", id),
        customer: None,
      })
      .collect();
    let activities = activity_ids
      .iter()
      .map(|id| Activity {
        id: Some(id.to_string()),
        title: format!("Activity {}", id),
        project_id: format!("p{}", id),
        description: None,
        start_date: None,
      })
      .collect();
    *self.projects.lock().unwrap() = projects;
    *self.activities.lock().unwrap() = activities;
  }

  pub fn calls(&self) -> (usize, usize, usize) {
    (
      self.token_calls.load(Ordering::SeqCst),
      self.project_calls.load(Ordering::SeqCst),
      self.activity_calls.load(Ordering::SeqCst),
    )
  }
}

#[async_trait]
impl JobSource for FakeSource {
  async fn access_token(&self) -> Result<Credential> {
    self.token_calls.fetch_add(1, Ordering::SeqCst);
    Ok(Credential {
      access_token: "token".to_string(),
    })
  }

  async fn fetch_projects_to_be_staffed(&self, credential: &Credential) -> Result<Vec<Project>> {
    assert_eq!(credential.access_token, "token");
    self.project_calls.fetch_add(1, Ordering::SeqCst);
    Ok(self.projects.lock().unwrap().clone())
  }

  async fn fetch_activities_to_be_staffed(
    &self,
    _credential: &Credential,
    projects: &[Project],
  ) -> Result<Vec<Activity>> {
    self.activity_calls.fetch_add(1, Ordering::SeqCst);
    assert_eq!(projects, self.projects.lock().unwrap().as_slice());
    if self.fail_activities.load(Ordering::SeqCst) {
      return Err(eyre!("503 Service Unavailable"));
    }
    Ok(self.activities.lock().unwrap().clone())
  }
}

#[derive(Default)]
pub struct RecordingNotifier {
  pub sent: Mutex<Vec<(ChangeReport, Vec<String>)>>,
  pub fail: bool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
  async fn send_change_notification(
    &self,
    report: &ChangeReport,
    recipients: &[Subscriber],
  ) -> Result<()> {
    if self.fail {
      return Err(eyre!("smtp down"));
    }
    let emails = recipients.iter().map(|s| s.email().to_string()).collect();
    self.sent.lock().unwrap().push((report.clone(), emails));
    Ok(())
  }
}
