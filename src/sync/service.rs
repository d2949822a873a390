//! Fetch-and-cache, the cached read path and the synchronization cycle.

use color_eyre::Result;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::differ::{self, ChangeReport};
use crate::cache::{CacheLayer, CacheResult, CacheStorage};
use crate::notify::{Notifier, SubscriberStore};
use crate::staffing::serializer;
use crate::staffing::types::JobList;
use crate::staffing::JobSource;

/// Cache key of the job list snapshot
pub const JOBS_CACHE_KEY: &str = "jobs";

/// Ties the job source, cache, subscribers and notifier together.
///
/// Not safe to run two `synchronize` calls against the same cache at once;
/// callers must serialize cycles.
pub struct JobService<S: CacheStorage> {
  source: Arc<dyn JobSource>,
  cache: CacheLayer<S>,
  subscribers: Arc<dyn SubscriberStore>,
  notifier: Arc<dyn Notifier>,
}

impl<S: CacheStorage> JobService<S> {
  pub fn new(
    source: Arc<dyn JobSource>,
    cache: CacheLayer<S>,
    subscribers: Arc<dyn SubscriberStore>,
    notifier: Arc<dyn Notifier>,
  ) -> Self {
    Self {
      source,
      cache,
      subscribers,
      notifier,
    }
  }

  /// Fetch the current jobs from the API and overwrite the cached snapshot.
  ///
  /// Always hits the network. Nothing is written if any fetch fails.
  pub async fn fetch_and_cache(&self) -> Result<JobList> {
    let credential = self.source.access_token().await?;
    let projects = self.source.fetch_projects_to_be_staffed(&credential).await?;
    let activities = self
      .source
      .fetch_activities_to_be_staffed(&credential, &projects)
      .await?;

    let jobs = serializer::serialize(&projects, &activities);
    self.cache.set(JOBS_CACHE_KEY, &jobs).await?;

    debug!(
      projects = projects.len(),
      activities = activities.len(),
      jobs = jobs.len(),
      "Fetched and cached jobs"
    );
    Ok(jobs)
  }

  /// Get the job list, from the cache when present.
  ///
  /// Never diffs and never notifies.
  pub async fn get_jobs(&self) -> Result<CacheResult<JobList>> {
    if let Some(cached) = self.cache.get::<JobList>(JOBS_CACHE_KEY).await? {
      debug!(jobs = cached.data.len(), "Serving jobs from cache");
      return Ok(cached);
    }

    let jobs = self.fetch_and_cache().await?;
    Ok(CacheResult::from_network(jobs))
  }

  /// Run one synchronization cycle and return its change report.
  pub async fn synchronize(&self) -> Result<ChangeReport> {
    let previous = self
      .cache
      .get::<JobList>(JOBS_CACHE_KEY)
      .await?
      .map(|cached| cached.data);

    let fresh = self.fetch_and_cache().await?;

    let report = differ::compare(Some(&fresh[..]), previous.as_deref());

    if report.is_init {
      info!(jobs = fresh.len(), "Initial sync, no previous snapshot");
    } else {
      info!(
        jobs = fresh.len(),
        added = report.added_jobs.as_ref().map_or(0, Vec::len),
        removed = report.removed_jobs.as_ref().map_or(0, Vec::len),
        "Sync complete"
      );
    }

    if report.has_changes {
      if let Err(e) = self.notify(&report).await {
        error!(error = %e, "Failed to send change notification");
      }
    }

    Ok(report)
  }

  async fn notify(&self, report: &ChangeReport) -> Result<()> {
    let recipients = self.subscribers.all()?;
    if recipients.is_empty() {
      debug!("No subscribers, skipping notification");
      return Ok(());
    }

    self
      .notifier
      .send_change_notification(report, &recipients)
      .await
  }
}
