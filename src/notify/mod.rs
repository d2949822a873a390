//! Change notifications: email rendering, delivery and subscribers.

pub mod mailer;
pub mod subscribers;
pub mod template;

use async_trait::async_trait;
use color_eyre::Result;
use tracing::warn;

use crate::sync::ChangeReport;
use subscribers::Subscriber;

pub use mailer::SmtpNotifier;
pub use subscribers::{SqliteSubscriberStore, SubscriberStore};

/// Delivers a change report to subscribers.
#[async_trait]
pub trait Notifier: Send + Sync {
  async fn send_change_notification(
    &self,
    report: &ChangeReport,
    recipients: &[Subscriber],
  ) -> Result<()>;
}

/// Notifier used when no mail server is configured.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
  async fn send_change_notification(
    &self,
    _report: &ChangeReport,
    recipients: &[Subscriber],
  ) -> Result<()> {
    warn!(
      recipients = recipients.len(),
      "Mail is not configured, skipping change notification"
    );
    Ok(())
  }
}
